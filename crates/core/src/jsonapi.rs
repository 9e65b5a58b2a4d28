//! Raw JSON:API documents returned by the Challonge v2.1 API
//!
//! The API is loose about the shape of individual records (ids arrive as numbers or
//! strings, sections may be `null`), so attributes and relationships are kept as
//! [`serde_json::Value`] and read through accessors that never fail.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Resource type tag for participant records in `included`
pub const PARTICIPANT_TYPE: &str = "participant";

#[derive(Deserialize)]
#[serde(untagged)]
enum ResourceIdInner {
    Number(serde_json::Number),
    String(String),
}

impl From<ResourceIdInner> for ResourceId {
    fn from(inner: ResourceIdInner) -> Self {
        Self(match inner {
            ResourceIdInner::Number(n) => n.to_string(),
            ResourceIdInner::String(s) => s,
        })
    }
}

/// Resource id, normalized to its string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "ResourceIdInner", into = "String")]
pub struct ResourceId(pub String);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ResourceId> for String {
    fn from(ResourceId(s): ResourceId) -> Self {
        s
    }
}

/// A single JSON:API resource (a match, a participant, a tournament...)
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Resource {
    #[serde(default)]
    pub id: Option<ResourceId>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    #[serde(default)]
    pub attributes: Value,
    #[serde(default)]
    pub relationships: Value,
}

impl Resource {
    /// Look up an attribute by name; `None` when missing or when `attributes` is not an object
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Id of the resource linked through a to-one relationship, if any
    pub fn related_id(&self, relationship: &str) -> Option<String> {
        let id = self.relationships.get(relationship)?.get("data")?.get("id")?;
        value_to_id(id)
    }

    pub fn is_participant(&self) -> bool {
        self.resource_type == PARTICIPANT_TYPE
    }
}

/// One page of `GET /tournaments/{slug}/matches`
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct BracketPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Resource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub included: Vec<Resource>,
}

/// Stringify a JSON id value. Only numbers and strings are ids.
pub fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
