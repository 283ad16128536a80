//! Record representation consumed by the HTTP output.
//!
//! A [`Record`] is the unit the upstream pipeline hands over: a routing tag, an
//! event timestamp, and an ordered set of named fields. Field order is the
//! order of insertion and is preserved through both serialisers.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Ordered field mapping carried by a record.
pub type Fields = Map<String, Value>;

/// A single structured event bound for the endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Routing tag assigned by the upstream pipeline.
    pub tag: String,
    /// Event time.
    pub time: DateTime<Utc>,
    /// Field values, in insertion order.
    pub fields: Fields,
}

impl Record {
    /// Construct a record stamped with the current time.
    pub fn new(tag: &str, fields: Fields) -> Self {
        Self::with_time(tag, Utc::now(), fields)
    }

    /// Construct a record with an explicit timestamp.
    pub fn with_time(tag: &str, time: DateTime<Utc>, fields: Fields) -> Self {
        Self {
            tag: tag.to_owned(),
            time,
            fields,
        }
    }

    /// Build a record from string pairs, keeping their order.
    pub fn from_pairs<K, V>(tag: &str, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(tag, fields)
    }

    /// Borrow the field mapping.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}
