//! Analytics event data model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Property key stamped at ingestion with the event's UTC timestamp.
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Property key identifying the business an event refers to.
pub const BUSINESS_ID_KEY: &str = "businessId";
/// Property key identifying the acting user, when known.
pub const USER_ID_KEY: &str = "userId";
/// Property key for the traffic source of an event.
pub const SOURCE_KEY: &str = "source";
/// Property key for the search term of a `search_performed` event.
pub const SEARCH_TERM_KEY: &str = "searchTerm";
/// Property key for seconds spent on a page in session events.
pub const TIME_SPENT_KEY: &str = "timeSpent";
/// Property key stamped from the `User-Agent` request header at ingestion.
pub const USER_AGENT_KEY: &str = "userAgent";

/// A single value in an event's property bag.
///
/// Callers send arbitrary JSON; the common scalar shapes get first-class
/// variants while arrays and objects pass through untouched via `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number (integer or float).
    Number(serde_json::Number),
    /// JSON string.
    String(String),
    /// Any other JSON shape (arrays, nested objects).
    Other(serde_json::Value),
}

impl PropertyValue {
    /// Returns the string slice if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if this value is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns `true` for JSON `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Canonical JSON rendering, used for value-identity comparisons.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(serde_json::Number::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Property bag attached to every event.
pub type Properties = BTreeMap<String, PropertyValue>;

/// An immutable record of something that happened on the platform.
///
/// Events are owned by the store once appended and never mutated. Insertion
/// order is preserved and used as the tie-break for recency sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier, derived from ingestion time in milliseconds.
    pub id: String,
    /// Event type, free-form (e.g. `business_listing_viewed`).
    pub name: String,
    /// Caller-supplied fields plus the ingestion `timestamp`.
    pub properties: Properties,
}

impl Event {
    /// Looks up a property by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Returns the `businessId` property when it is a non-empty string.
    #[must_use]
    pub fn business_id(&self) -> Option<&str> {
        self.property(BUSINESS_ID_KEY)
            .and_then(PropertyValue::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Parses the ingestion timestamp stamped into the property bag.
    ///
    /// Returns `None` when the property is absent or not valid RFC 3339,
    /// which cannot happen for events produced by the store.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.property(TIMESTAMP_KEY)
            .and_then(PropertyValue::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}
