//! Typed field values used by search, filtering and sorting.
//!
//! Records expose their fields as [`FieldValue`]s so the query engine can
//! compare them by type: text case-insensitively, timestamps by instant,
//! numbers numerically.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::entity::EntityId;

/// The value of a single record field.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use crm_engine::FieldValue;
///
/// let a = FieldValue::text("acme");
/// let b = FieldValue::text("Beta");
/// assert_eq!(a.compare(&b), Ordering::Less);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// Text value from anything string-like.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text value for an optional field; `None` becomes `Null`.
    #[must_use]
    pub fn optional_text(value: Option<&str>) -> Self {
        value.map_or(Self::Null, Self::text)
    }

    /// Calendar dates compare as midnight UTC.
    #[must_use]
    pub fn date(value: NaiveDate) -> Self {
        Self::Timestamp(value.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Timestamp(_) => "timestamp",
            Self::Bool(_) => "bool",
            Self::Null => "null",
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Timestamp(_) => 3,
            Self::Text(_) => 4,
        }
    }

    /// Type-aware ordering used by the sort step.
    ///
    /// `Null` sorts before every other value. Values of different types
    /// order by type so the comparator stays total.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Case-insensitive substring test; `needle` must already be lowercase.
    #[must_use]
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        match self {
            Self::Text(v) => v.to_lowercase().contains(needle),
            _ => false,
        }
    }

    /// Equality against a filter value coming from the caller as a string.
    ///
    /// Text compares exactly, numbers and booleans are parsed first, and
    /// timestamps accept either RFC 3339 or a plain `YYYY-MM-DD` date.
    #[must_use]
    pub fn equals_filter(&self, expected: &str) -> bool {
        match self {
            Self::Text(v) => v == expected,
            Self::Number(v) => expected
                .trim()
                .parse::<f64>()
                .is_ok_and(|n| n.total_cmp(v) == Ordering::Equal),
            Self::Bool(v) => expected.trim().parse::<bool>().is_ok_and(|b| b == *v),
            Self::Timestamp(v) => {
                let expected = expected.trim();
                if let Ok(ts) = DateTime::parse_from_rfc3339(expected) {
                    return ts.with_timezone(&Utc) == *v;
                }
                NaiveDate::parse_from_str(expected, "%Y-%m-%d").is_ok_and(|d| d == v.date_naive())
            }
            Self::Null => false,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Null
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<EntityId> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: EntityId) -> Self {
        Self::Number(value.get() as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Null, Self::Timestamp)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Null => write!(f, "null"),
        }
    }
}
