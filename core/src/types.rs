//! Wire schema shared by the client and the server.
//!
//! # Design
//! Both sides of the API serialize through these definitions, so the request
//! and response bodies cannot drift apart. `date` is pinned to `yyyy-MM-dd`
//! through [`date_format`]; the contract checks that text byte for byte.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A record as it travels over the wire. It carries no identifier; the
/// server assigns one when it stores the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    pub name: String,
    pub value: f64,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
}

impl Thing {
    pub fn new(name: impl Into<String>, value: f64, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            value,
            date,
        }
    }
}

/// Server-assigned identifier, encoded as `{"id": <integer>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThingId {
    pub id: u64,
}

impl ThingId {
    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    pub const fn get(self) -> u64 {
        self.id
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Serde adapter for `NaiveDate` using the fixed `yyyy-MM-dd` pattern.
pub mod date_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let date = NaiveDate::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)?;
        // chrono accepts unpadded fields; the wire format does not.
        if date.format(FORMAT).to_string() != raw {
            return Err(de::Error::custom(format!("date `{raw}` is not in yyyy-MM-dd form")));
        }
        Ok(date)
    }
}
