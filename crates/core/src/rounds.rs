//! Round coercion and round labels
//!
//! Challonge encodes the bracket side in the sign of a match's round: positive
//! rounds are in the winners bracket, negative rounds in the losers bracket and
//! round `0` has no side (Swiss and group stages report rounds without a sign).

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::stage::{stage_name, StageKind};
use crate::template::{render_template, TemplateError, TemplateVars};

/// Bracket side derived from the sign of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bracket {
    Winners,
    Losers,
    Round,
}

impl Bracket {
    pub fn from_round(round: i64) -> Self {
        match round {
            r if r > 0 => Bracket::Winners,
            r if r < 0 => Bracket::Losers,
            _ => Bracket::Round,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bracket::Winners => "Winners",
            Bracket::Losers => "Losers",
            Bracket::Round => "Round",
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coerce a raw round value to an integer
///
/// Integers are used as-is, floats are truncated toward zero, booleans count as
/// `1`/`0` and strings are parsed after trimming. Everything else is `0`.
///
/// The result never goes below `-i64::MAX`, so its magnitude always fits in an `i64`.
pub fn coerce_round(value: &Value) -> i64 {
    let round = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    round.max(-i64::MAX)
}

/// Variables available to a `round_label_template`
///
/// An unknown stage renders `{stage}` as an empty string, not as `None`, so the
/// label template and the thread templates see the same value.
pub fn round_label_vars(round: i64, stage: Option<StageKind>) -> TemplateVars {
    TemplateVars::new()
        .with("stage", stage_name(stage))
        .with("bracket", Bracket::from_round(round).as_str())
        .with("round", round)
        .with("abs_round", round.saturating_abs())
}

/// Render a user supplied round label template
///
/// Returns `Ok(None)` when the template is blank.
pub fn try_template_label(
    round: i64,
    stage: Option<StageKind>,
    template: Option<&str>,
) -> Result<Option<String>, TemplateError> {
    match template {
        Some(template) if !template.trim().is_empty() => {
            render_template(template, &round_label_vars(round, stage)).map(Some)
        }
        _ => Ok(None),
    }
}

/// Built-in round label
///
/// Swiss and group stages read "Swiss R2"/"Groups R2" (round `0` shows as `R1`);
/// everything else reads "Winners R2", "Losers R2" or "Round 0".
pub fn default_round_label(round: i64, stage: Option<StageKind>) -> String {
    if let Some(stage) = stage.filter(StageKind::is_round_robin) {
        let shown = if round == 0 { 1 } else { round };
        return format!("{stage} R{shown}");
    }

    match Bracket::from_round(round) {
        Bracket::Winners => format!("Winners R{round}"),
        Bracket::Losers => format!("Losers R{}", round.saturating_abs()),
        Bracket::Round => format!("Round {round}"),
    }
}

/// Label for an already coerced round
///
/// A template that fails to render falls back to [`default_round_label`].
pub fn round_label(round: i64, stage: Option<StageKind>, template: Option<&str>) -> String {
    match try_template_label(round, stage, template) {
        Ok(Some(label)) => label,
        Ok(None) | Err(_) => default_round_label(round, stage),
    }
}

/// Label for a raw round value of any JSON type
pub fn make_round_label(round: &Value, stage: Option<StageKind>, template: Option<&str>) -> String {
    round_label(coerce_round(round), stage, template)
}
