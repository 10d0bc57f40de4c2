//! Typed categorical values for dimension columns.
//!
//! Floats are intentionally excluded: categorical dimensions are discrete,
//! and float stringification would make canonical output non-deterministic.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

/// The label a null category compares and displays as.
pub const NULL_CATEGORY: &str = "<null>";

/// A categorical value in a dimension column.
///
/// A missing or explicit-null input value is a distinct category of its own,
/// compared as the string `"<null>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    /// Explicit null category.
    Null,
    /// Boolean category.
    Boolean(bool),
    /// 64-bit signed integer category.
    Int64(i64),
    /// Arbitrary string category.
    String(String),
}

impl DimensionValue {
    /// Converts a JSON value into a dimension value.
    ///
    /// JSON null maps to [`DimensionValue::Null`]. Floats, arrays, and
    /// objects are not valid categories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] for non-categorical JSON values.
    pub fn from_json(column: &str, value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Boolean(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int64).ok_or_else(|| {
                Error::malformed_input(format!(
                    "column '{column}' holds non-integer number {n}; dimension values must be categorical"
                ))
            }),
            serde_json::Value::String(s) => Ok(Self::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(Error::malformed_input(format!(
                    "column '{column}' holds a nested JSON value; dimension values must be scalar"
                )))
            }
        }
    }

    /// Returns the value as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Int64(n) => serde_json::Value::Number((*n).into()),
            Self::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Returns the category label used for ordering and display.
    ///
    /// Nulls label as `"<null>"` so they participate in string comparisons
    /// as a distinct category.
    #[must_use]
    pub fn category_label(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(NULL_CATEGORY),
            Self::Boolean(true) => Cow::Borrowed("true"),
            Self::Boolean(false) => Cow::Borrowed("false"),
            Self::Int64(n) => Cow::Owned(n.to_string()),
            Self::String(s) => Cow::Borrowed(s),
        }
    }

    /// Returns true for the null category.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Rank for ordering by type. Null shares the string rank: it is
    /// compared as the string `"<null>"`.
    const fn type_rank(&self) -> u8 {
        match self {
            Self::Boolean(_) => 0,
            Self::Int64(_) => 1,
            Self::String(_) | Self::Null => 2,
        }
    }
}

impl PartialOrd for DimensionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DimensionValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.type_rank().cmp(&other.type_rank()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            // Strings and nulls share a rank and compare by label.
            _ => self.category_label().cmp(&other.category_label()),
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category_label())
    }
}

impl From<&str> for DimensionValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for DimensionValue {
    fn from(n: i64) -> Self {
        Self::Int64(n)
    }
}
