// Wire models for the line-tracking API.
//
// Field names follow the backend's JSON casing exactly (`TTL`, `Lot_id`,
// `Business_id`, `Machine_ID`, ...), so every field carries an explicit
// rename.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── RecordId ────────────────────────────────────────────────────────

/// Identifier of a business or station.
///
/// The backend is not consistent about whether ids are JSON numbers or
/// strings, so both are accepted. Equality and hashing use the rendered
/// form: `5` and `"5"` are the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Numeric value, when the id is (or parses as) an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn canonical(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for RecordId {}

impl Hash for RecordId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// Text that is exactly the decimal form of an integer becomes a number;
/// anything else (`"007"`, `" 5"`, `"+5"`) stays text so it renders as given.
impl From<String> for RecordId {
    fn from(s: String) -> Self {
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Self::Number(n),
            _ => Self::Text(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

// ── Direction ───────────────────────────────────────────────────────

/// Whether a counter reading is taken before (`in`) or after (`out`) a
/// process step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Path segment used by the counter endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(format!("expected 'in' or 'out', got '{other}'")),
        }
    }
}

// ── Counter record ──────────────────────────────────────────────────

/// A display value that the backend may send as a string, a number, or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    #[default]
    Empty,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Current counter reading for one station and direction.
///
/// `GET /api/countrecords_counttray/Position/{Machine_ID}/{Direction}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterRecord {
    #[serde(rename = "TTL", default)]
    pub ttl: FieldValue,
    #[serde(rename = "Lot_id", default)]
    pub lot_id: FieldValue,
}

// ── Business / Station ──────────────────────────────────────────────

/// Top-level organizational unit owning stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    #[serde(rename = "Business_id")]
    pub id: RecordId,
    #[serde(rename = "Business_name")]
    pub name: String,
}

/// A tracked point on the line (a machine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "Machine_ID")]
    pub id: RecordId,
    #[serde(rename = "Machine_name")]
    pub name: String,
    /// Owning business. Some responses omit it; the client fills it in
    /// from the request context.
    #[serde(rename = "Business_id", default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<RecordId>,
}

/// Body returned by `POST /api/station`. Only the new id is relied upon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedStation {
    #[serde(rename = "Machine_ID")]
    pub id: RecordId,
}
