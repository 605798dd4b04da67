//! EONET API wire types.
//!
//! Envelopes keep their records as raw JSON values so that each record can be
//! validated on its own. The `Raw*` structs define only the fields we need and
//! make every field optional; required-field validation happens in
//! [`super::convert`].
//!
//! API docs: https://eonet.gsfc.nasa.gov/docs/v3

use serde::Deserialize;
use serde_json::Value;

/// Body of the categories endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesEnvelope {
    pub categories: Vec<Value>,
}

/// Body of the events endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsEnvelope {
    pub events: Vec<Value>,
}

/// Identifier that older API versions send as a number and newer ones as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// EONET category record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCategory {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

/// Reference from an event to one of its categories.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCategoryRef {
    Id(RawId),
    Object { id: RawId },
}

impl RawCategoryRef {
    pub fn into_id(self) -> String {
        match self {
            RawCategoryRef::Id(id) | RawCategoryRef::Object { id } => id.into_string(),
        }
    }
}

/// A single observation point of an event; only its date is used.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGeometry {
    pub date: Option<String>,
}

/// EONET event record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<RawCategoryRef>,
    pub closed: Option<String>,
    pub date: Option<String>,
    /// v3 calls this `geometry`, v2.1 `geometries`.
    #[serde(default, alias = "geometries")]
    pub geometry: Vec<RawGeometry>,
}
