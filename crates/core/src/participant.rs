//! Participant identity resolution
//!
//! Turns a raw Challonge participant record into a clean display name and the
//! string used to address that participant on Discord.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jsonapi::Resource;

/// Display name used when a participant record carries no usable name
pub const UNKNOWN_NAME: &str = "UNKNOWN";

/// Attribute names tried, in order, to find a participant's name
const NAME_ATTRIBUTES: [&str; 3] = ["username", "name", "display_name"];

static INVITE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(invitation pending\)\s*$").unwrap());

#[derive(Deserialize)]
#[serde(untagged)]
enum SnowflakeInner {
    Number(u64),
    String(String),
}

impl TryFrom<SnowflakeInner> for Snowflake {
    type Error = String;

    fn try_from(inner: SnowflakeInner) -> Result<Self, Self::Error> {
        match inner {
            SnowflakeInner::Number(n) => Ok(Self(n)),
            SnowflakeInner::String(s) => s
                .trim()
                .parse::<u64>()
                .map(Self)
                .map_err(|_| format!("invalid Discord id: {s:?}")),
        }
    }
}

/// Discord user, role or channel id. Written as a YAML number or string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "SnowflakeInner", into = "u64")]
pub struct Snowflake(pub u64);

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Snowflake> for u64 {
    fn from(Snowflake(id): Snowflake) -> Self {
        id
    }
}

/// Participant username → Discord user id
pub type RunnerMap = HashMap<String, Snowflake>;

/// A resolved tournament participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: String,
    /// `raw_name` with the invitation-pending marker removed
    pub username: String,
    pub raw_name: String,
    /// `<@user_id>` when the username is in the runner map, the username otherwise
    pub mention: String,
}

/// Remove a trailing "(invitation pending)" marker (any case) and surrounding whitespace
pub fn clean_runner_name(name: &str) -> String {
    INVITE_SUFFIX_RE.replace(name, "").trim().to_string()
}

/// Extract the raw participant name from a participant resource
///
/// Tries `username`, `name` and `display_name` in that order, skipping empty values.
/// Returns [`UNKNOWN_NAME`] when the record is missing, none of the attributes is set,
/// or the first populated attribute is not a string.
pub fn participant_username(resource: Option<&Resource>) -> String {
    let Some(resource) = resource else {
        return UNKNOWN_NAME.to_string();
    };

    NAME_ATTRIBUTES
        .iter()
        .filter_map(|attr| resource.attribute(attr))
        .find(|value| is_truthy(value))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_NAME)
        .to_string()
}

/// Build the string used to address a participant
pub fn mention_for_name(name: &str, runner_map: &RunnerMap) -> String {
    match runner_map.get(name) {
        Some(user_id) => format!("<@{user_id}>"),
        None => name.to_string(),
    }
}

/// Space separated Discord role mentions (`<@&role_id>`)
pub fn build_role_mentions(role_ids: &[Snowflake]) -> String {
    role_ids
        .iter()
        .map(|id| format!("<@&{id}>"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a participant id against the participants index
///
/// Returns `None` (a TBD slot) when the record is not in the index.
pub fn resolve_participant(
    id: &str,
    resource: Option<&Resource>,
    runner_map: &RunnerMap,
) -> Option<Participant> {
    let resource = resource?;

    let raw_name = participant_username(Some(resource));
    let mut username = clean_runner_name(&raw_name);
    if username.is_empty() {
        username = UNKNOWN_NAME.to_string();
    }
    let mention = mention_for_name(&username, runner_map);

    Some(Participant {
        id: id.to_string(),
        username,
        raw_name,
        mention,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
