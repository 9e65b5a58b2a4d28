//! Tournament stage classification

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Competition format in effect for a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StageKind {
    Swiss,
    Groups,
    Elimination,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Swiss => "Swiss",
            StageKind::Groups => "Groups",
            StageKind::Elimination => "Elimination",
        }
    }

    /// Swiss and Groups stages label rounds without a winners/losers side
    pub fn is_round_robin(&self) -> bool {
        matches!(self, StageKind::Swiss | StageKind::Groups)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage name for template variables; empty when the stage is unknown
pub fn stage_name(stage: Option<StageKind>) -> &'static str {
    stage.map(|s| s.as_str()).unwrap_or("")
}

/// Classify a `GET /tournaments/{slug}` document
///
/// A tournament is in a group stage when its `state` mentions "group" or
/// `group_stage_enabled` is truthy; the group stage is Swiss when
/// `group_stage_options.stage_type` is "swiss". Anything else is Elimination.
///
/// Missing, null, zero, false and empty values count as absent. Returns `None`
/// when the document is not a JSON object, or when `data`, `attributes` or
/// `group_stage_options` hold a non-empty non-object, or `state` or
/// `stage_type` hold a non-empty non-string.
pub fn classify_stage(document: &Value) -> Option<StageKind> {
    if !document.is_object() {
        return None;
    }

    let data = object_or_empty(document.get("data"))?;
    let attributes = object_or_empty(data.get("attributes"))?;

    let state = lowercase_text(attributes.get("state"))?;
    let group_stage_enabled = attributes.get("group_stage_enabled").is_some_and(is_truthy);
    let options = object_or_empty(attributes.get("group_stage_options"))?;
    let stage_type = lowercase_text(options.get("stage_type"))?;

    if state.contains("group") || group_stage_enabled {
        if stage_type == "swiss" {
            Some(StageKind::Swiss)
        } else {
            Some(StageKind::Groups)
        }
    } else {
        Some(StageKind::Elimination)
    }
}

/// Truthiness of a JSON value: null, false, zero and empty values are false
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn object_or_empty(value: Option<&Value>) -> Option<&Value> {
    static EMPTY: Value = Value::Null;
    match value {
        Some(object @ Value::Object(_)) => Some(object),
        Some(other) if is_truthy(other) => None,
        _ => Some(&EMPTY),
    }
}

fn lowercase_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.to_lowercase()),
        Some(other) if is_truthy(other) => None,
        _ => Some(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tournament(attributes: Value) -> Value {
        json!({ "data": { "id": "1", "type": "tournament", "attributes": attributes } })
    }

    #[test]
    fn test_classify_stage_elimination() {
        let doc = tournament(json!({ "state": "underway", "group_stage_enabled": false }));
        assert_eq!(classify_stage(&doc), Some(StageKind::Elimination));
    }

    #[test]
    fn test_classify_stage_group_state_is_case_insensitive() {
        let doc = tournament(json!({ "state": "GROUP_STAGES_UNDERWAY" }));
        assert_eq!(classify_stage(&doc), Some(StageKind::Groups));
    }

    #[test]
    fn test_classify_stage_group_stage_enabled_flag() {
        let doc = tournament(json!({ "state": "pending", "group_stage_enabled": true }));
        assert_eq!(classify_stage(&doc), Some(StageKind::Groups));
    }

    #[test]
    fn test_classify_stage_swiss() {
        let doc = tournament(json!({
            "state": "group_stages_underway",
            "group_stage_options": { "stage_type": "Swiss" }
        }));
        assert_eq!(classify_stage(&doc), Some(StageKind::Swiss));
    }

    #[test]
    fn test_classify_stage_swiss_type_without_group_stage_is_elimination() {
        let doc = tournament(json!({
            "state": "underway",
            "group_stage_enabled": false,
            "group_stage_options": { "stage_type": "swiss" }
        }));
        assert_eq!(classify_stage(&doc), Some(StageKind::Elimination));
    }

    #[test]
    fn test_classify_stage_missing_attributes_is_elimination() {
        assert_eq!(classify_stage(&json!({})), Some(StageKind::Elimination));
        assert_eq!(
            classify_stage(&json!({ "data": null })),
            Some(StageKind::Elimination)
        );
    }

    #[test]
    fn test_classify_stage_non_object_is_none() {
        assert_eq!(classify_stage(&Value::Null), None);
        assert_eq!(classify_stage(&json!([1, 2])), None);
        assert_eq!(classify_stage(&json!("oops")), None);
    }

    #[test]
    fn test_classify_stage_group_stage_enabled_is_truthy() {
        for flag in [json!(1), json!("yes"), json!([1]), json!({ "on": true })] {
            let doc = tournament(json!({ "state": "pending", "group_stage_enabled": flag }));
            assert_eq!(classify_stage(&doc), Some(StageKind::Groups));
        }
        for flag in [json!(0), json!(""), json!([]), json!(null), json!(false)] {
            let doc = tournament(json!({ "state": "pending", "group_stage_enabled": flag }));
            assert_eq!(classify_stage(&doc), Some(StageKind::Elimination));
        }
    }

    #[test]
    fn test_classify_stage_falsy_non_string_state_is_blank() {
        let doc = tournament(json!({ "state": 0, "group_stage_enabled": true }));
        assert_eq!(classify_stage(&doc), Some(StageKind::Groups));
        let doc = tournament(json!({ "state": false }));
        assert_eq!(classify_stage(&doc), Some(StageKind::Elimination));
    }

    #[test]
    fn test_classify_stage_malformed_fields_are_unknown() {
        assert_eq!(classify_stage(&tournament(json!({ "state": 5 }))), None);
        assert_eq!(
            classify_stage(&tournament(json!({
                "group_stage_enabled": true,
                "group_stage_options": { "stage_type": ["swiss"] }
            }))),
            None
        );
        assert_eq!(
            classify_stage(&tournament(json!({ "group_stage_options": "swiss" }))),
            None
        );
        assert_eq!(classify_stage(&json!({ "data": [1] })), None);
        assert_eq!(
            classify_stage(&json!({ "data": { "attributes": "x" } })),
            None
        );
    }

    #[test]
    fn test_stage_name() {
        assert_eq!(stage_name(Some(StageKind::Swiss)), "Swiss");
        assert_eq!(stage_name(None), "");
    }
}
