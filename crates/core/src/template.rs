//! Brace-placeholder template engine
//!
//! Templates are plain text with `{name}` placeholders:
//!
//! - `{name}` substitutes the variable `name`
//! - `{{` and `}}` produce literal braces
//! - `{name:spec}` pads the value, where `spec` is `[[fill]align][0][width][type]`,
//!   `align` is one of `<`, `>`, `^` and `type` is `d` (integers) or `s` (text)
//!
//! Rendering never guesses: an unknown variable or a malformed placeholder is a
//! [`TemplateError`], and the caller decides whether to fall back.

use std::fmt;

/// Errors produced while rendering a template
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown template variable '{0}'")]
    UnknownVariable(String),

    #[error("unterminated placeholder starting at offset {0}")]
    UnterminatedPlaceholder(usize),

    #[error("single '}}' encountered at offset {0}")]
    StrayClosingBrace(usize),

    #[error("unexpected '{{' inside placeholder at offset {0}")]
    NestedPlaceholder(usize),

    #[error("empty placeholder at offset {0}")]
    EmptyPlaceholder(usize),

    #[error("conversion '!{conversion}' is not supported for '{name}'")]
    UnsupportedConversion { name: String, conversion: String },

    #[error("invalid format spec '{spec}' for '{name}'")]
    InvalidFormatSpec { name: String, spec: String },
}

/// A template variable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    Text(String),
    Int(i64),
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValue::Text(s) => f.write_str(s),
            TemplateValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        TemplateValue::Text(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        TemplateValue::Text(value)
    }
}

impl From<i64> for TemplateValue {
    fn from(value: i64) -> Self {
        TemplateValue::Int(value)
    }
}

/// An ordered set of named template variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    entries: Vec<(&'static str, TemplateValue)>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a variable
    pub fn with(mut self, name: &'static str, value: impl Into<TemplateValue>) -> Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }
}

/// Render `template`, substituting every placeholder from `vars`
pub fn render_template(template: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    output.push('{');
                    continue;
                }

                let mut field = String::new();
                let mut closed = false;
                for (inner_offset, inner) in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(TemplateError::NestedPlaceholder(inner_offset)),
                        other => field.push(other),
                    }
                }
                if !closed {
                    return Err(TemplateError::UnterminatedPlaceholder(offset));
                }

                output.push_str(&render_field(&field, offset, vars)?);
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(TemplateError::StrayClosingBrace(offset));
                }
                output.push('}');
            }
            other => output.push(other),
        }
    }

    Ok(output)
}

fn render_field(field: &str, offset: usize, vars: &TemplateVars) -> Result<String, TemplateError> {
    let (name_part, spec) = match field.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (field, None),
    };

    let (name, conversion) = match name_part.split_once('!') {
        Some((name, conversion)) => (name, Some(conversion)),
        None => (name_part, None),
    };

    if name.is_empty() {
        return Err(TemplateError::EmptyPlaceholder(offset));
    }

    let value = vars
        .get(name)
        .ok_or_else(|| TemplateError::UnknownVariable(name.to_string()))?;

    let value = match conversion {
        None => value.clone(),
        Some("s") => TemplateValue::Text(value.to_string()),
        Some(other) => {
            return Err(TemplateError::UnsupportedConversion {
                name: name.to_string(),
                conversion: other.to_string(),
            })
        }
    };

    match spec {
        None | Some("") => Ok(value.to_string()),
        Some(spec) => {
            let format = FormatSpec::parse(spec).ok_or_else(|| invalid_spec(name, spec))?;
            format
                .apply(&value)
                .ok_or_else(|| invalid_spec(name, spec))
        }
    }
}

fn invalid_spec(name: &str, spec: &str) -> TemplateError {
    TemplateError::InvalidFormatSpec {
        name: name.to_string(),
        spec: spec.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeCode {
    Decimal,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatSpec {
    fill: char,
    align: Option<Align>,
    zero_pad: bool,
    width: usize,
    type_code: Option<TypeCode>,
}

impl FormatSpec {
    fn parse(spec: &str) -> Option<Self> {
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0;
        let mut fill = ' ';
        let mut align = None;

        if chars.len() >= 2 && Align::from_char(chars[1]).is_some() {
            fill = chars[0];
            align = Align::from_char(chars[1]);
            i = 2;
        } else if let Some(a) = chars.first().and_then(|&c| Align::from_char(c)) {
            align = Some(a);
            i = 1;
        }

        let mut zero_pad = false;
        if chars.get(i) == Some(&'0') {
            zero_pad = true;
            i += 1;
        }

        let digits: String = chars[i..].iter().take_while(|c| c.is_ascii_digit()).collect();
        i += digits.len();
        let width = if digits.is_empty() {
            0
        } else {
            digits.parse().ok()?
        };

        let type_code = match chars.get(i) {
            None => None,
            Some('d') => Some(TypeCode::Decimal),
            Some('s') => Some(TypeCode::Text),
            Some(_) => return None,
        };
        if type_code.is_some() {
            i += 1;
        }

        if i != chars.len() {
            return None;
        }

        Some(Self {
            fill,
            align,
            zero_pad,
            width,
            type_code,
        })
    }

    fn apply(&self, value: &TemplateValue) -> Option<String> {
        match (self.type_code, value) {
            (Some(TypeCode::Decimal), TemplateValue::Text(_))
            | (Some(TypeCode::Text), TemplateValue::Int(_)) => return None,
            _ => {}
        }

        let text = value.to_string();
        let len = text.chars().count();
        if len >= self.width {
            return Some(text);
        }
        let pad = self.width - len;

        // Zero padding on an integer goes between the sign and the digits
        if let (TemplateValue::Int(n), true, None) = (value, self.zero_pad, self.align) {
            let digits = n.unsigned_abs().to_string();
            let sign = if *n < 0 { "-" } else { "" };
            return Some(format!("{sign}{}{digits}", "0".repeat(pad)));
        }

        let fill = if self.zero_pad && self.align.is_none() {
            '0'
        } else {
            self.fill
        };
        let align = self.align.unwrap_or(match value {
            TemplateValue::Int(_) => Align::Right,
            TemplateValue::Text(_) => Align::Left,
        });

        let (left, right) = match align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };

        let mut padded = String::with_capacity(text.len() + pad);
        padded.extend(std::iter::repeat_n(fill, left));
        padded.push_str(&text);
        padded.extend(std::iter::repeat_n(fill, right));
        Some(padded)
    }
}
