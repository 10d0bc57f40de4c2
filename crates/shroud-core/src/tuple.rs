//! Dimension tuples with deterministic canonical encoding.
//!
//! A [`DimensionTuple`] maps dimension names to categorical values. It is the
//! primary key of a suppressed cell and the element type of peer-group sets.
//! `BTreeMap` storage makes the encoding insertion-order independent, and the
//! derived ordering (dimension name lexicographically, then value) is the
//! stable tie-break used by every window scan.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::canonical_json::write_json_string;
use crate::value::DimensionValue;

/// A set of dimension tuples, ordered and deduplicated.
///
/// Serializes as a sorted JSON array of objects, which keeps peer-group
/// output byte-stable across runs.
pub type PeerSet = BTreeSet<DimensionTuple>;

/// An ordered mapping from dimension name to categorical value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct DimensionTuple(BTreeMap<String, DimensionValue>);

impl DimensionTuple {
    /// Creates a new empty tuple.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a dimension, replacing any existing value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: DimensionValue) {
        self.0.insert(name.into(), value);
    }

    /// Gets a dimension value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DimensionValue> {
        self.0.get(name)
    }

    /// Returns true if the tuple has no dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates dimensions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DimensionValue)> {
        self.0.iter()
    }

    /// Projects the tuple onto the given dimension names.
    ///
    /// Names absent from the tuple project to the null category, so a
    /// projection always carries every requested dimension.
    #[must_use]
    pub fn project(&self, names: &[String]) -> Self {
        let mut projected = Self::new();
        for name in names {
            let value = self.0.get(name).cloned().unwrap_or(DimensionValue::Null);
            projected.insert(name.clone(), value);
        }
        projected
    }

    /// Returns the canonical JSON rendering of the tuple.
    ///
    /// Keys sorted, no whitespace, native JSON values. This is deterministic:
    /// the same logical tuple always renders the same string regardless of
    /// insertion order, which makes it safe to embed in redaction reasons and
    /// to compare in tests.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        let mut out = String::with_capacity(16 * self.0.len() + 2);
        out.push('{');
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_json_string(name, &mut out);
            out.push(':');
            match value {
                DimensionValue::Null => out.push_str("null"),
                DimensionValue::Boolean(true) => out.push_str("true"),
                DimensionValue::Boolean(false) => out.push_str("false"),
                DimensionValue::Int64(n) => out.push_str(&n.to_string()),
                DimensionValue::String(s) => write_json_string(s, &mut out),
            }
        }
        out.push('}');
        out
    }
}

impl fmt::Display for DimensionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_string())
    }
}

/// Builds a tuple from `(name, value)` pairs.
impl<N: Into<String>, V: Into<DimensionValue>> FromIterator<(N, V)> for DimensionTuple {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(pairs: I) -> Self {
        let mut tuple = Self::new();
        for (name, value) in pairs {
            tuple.insert(name, value.into());
        }
        tuple
    }
}
