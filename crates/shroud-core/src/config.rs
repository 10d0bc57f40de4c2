//! Suppression run configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// The default anonymity threshold: a cell needs at least this many
/// incidences to be publishable on its own.
pub const DEFAULT_THRESHOLD: u64 = 11;

/// The default column holding the pre-aggregated count.
pub const DEFAULT_INCIDENCE_COLUMN: &str = "incidence";

/// The default sentinel substituted for redacted counts in the output.
pub const DEFAULT_REDACTION_SENTINEL: &str = "Redacted";

fn default_threshold() -> u64 {
    DEFAULT_THRESHOLD
}

fn default_incidence_column() -> String {
    DEFAULT_INCIDENCE_COLUMN.to_string()
}

fn default_redaction_sentinel() -> String {
    DEFAULT_REDACTION_SENTINEL.to_string()
}

/// Configuration for one suppression run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionConfig {
    /// The reporting dimensions, in the order the caller publishes them.
    /// Every other input column is passed through untouched.
    pub dimensions: Vec<String>,

    /// The input column holding the non-negative integer count.
    #[serde(default = "default_incidence_column")]
    pub incidence_column: String,

    /// Minimum count for a cell to be anonymous; cells below it are
    /// redacted outright.
    #[serde(default = "default_threshold")]
    pub threshold: u64,

    /// When true, only the small cells themselves are redacted and the
    /// latent-revelation propagation is skipped entirely. This leaves the
    /// small values recoverable by subtraction; use only when the published
    /// totals make that acceptable.
    #[serde(default)]
    pub first_order_only: bool,

    /// Dimensions whose totals are never published. Subtraction across such
    /// a dimension is meaningless to a consumer, so leaks through it are not
    /// considered.
    #[serde(default)]
    pub non_summable_dimensions: Vec<String>,

    /// Value substituted for the incidence of redacted cells in the output.
    #[serde(default = "default_redaction_sentinel")]
    pub redaction_sentinel: String,

    /// When true, a count of exactly zero is treated as anonymous even when
    /// it is below the threshold. A structurally-empty cell discloses
    /// nothing about individuals.
    #[serde(default)]
    pub allow_zeroes: bool,
}

impl SuppressionConfig {
    /// Creates a configuration with the given dimensions and defaults for
    /// everything else.
    #[must_use]
    pub fn new<S: Into<String>>(dimensions: impl IntoIterator<Item = S>) -> Self {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            incidence_column: default_incidence_column(),
            threshold: DEFAULT_THRESHOLD,
            first_order_only: false,
            non_summable_dimensions: Vec::new(),
            redaction_sentinel: default_redaction_sentinel(),
            allow_zeroes: false,
        }
    }

    /// Sets the anonymity threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the incidence column name.
    #[must_use]
    pub fn with_incidence_column(mut self, column: impl Into<String>) -> Self {
        self.incidence_column = column.into();
        self
    }

    /// Restricts suppression to the small cells themselves.
    #[must_use]
    pub fn with_first_order_only(mut self, first_order_only: bool) -> Self {
        self.first_order_only = first_order_only;
        self
    }

    /// Declares dimensions whose totals are never published.
    #[must_use]
    pub fn with_non_summable<S: Into<String>>(
        mut self,
        dimensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.non_summable_dimensions = dimensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the output sentinel for redacted counts.
    #[must_use]
    pub fn with_redaction_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.redaction_sentinel = sentinel.into();
        self
    }

    /// Treats zero counts as anonymous.
    #[must_use]
    pub fn with_allow_zeroes(mut self, allow_zeroes: bool) -> Self {
        self.allow_zeroes = allow_zeroes;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the threshold is zero, the
    /// dimension list is empty or contains duplicates, the incidence column
    /// collides with a dimension, or a non-summable dimension is not a
    /// dimension.
    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 {
            return Err(Error::invalid_config("threshold must be >= 1"));
        }
        if self.dimensions.is_empty() {
            return Err(Error::invalid_config("dimensions list must not be empty"));
        }

        let mut seen = BTreeSet::new();
        for dim in &self.dimensions {
            if !seen.insert(dim.as_str()) {
                return Err(Error::invalid_config(format!(
                    "duplicate dimension '{dim}'"
                )));
            }
        }

        if seen.contains(self.incidence_column.as_str()) {
            return Err(Error::invalid_config(format!(
                "incidence column '{}' is also listed as a dimension",
                self.incidence_column
            )));
        }

        for dim in &self.non_summable_dimensions {
            if !seen.contains(dim.as_str()) {
                return Err(Error::invalid_config(format!(
                    "non-summable dimension '{dim}' is not in the dimensions list"
                )));
            }
        }

        Ok(())
    }

    /// Returns true when the dimension's totals are published.
    #[must_use]
    pub fn is_summable(&self, dimension: &str) -> bool {
        !self
            .non_summable_dimensions
            .iter()
            .any(|d| d == dimension)
    }

    /// The dimension names in lexicographic order.
    ///
    /// Axis enumeration and window tie-breaks are defined over this order so
    /// they do not depend on the caller's column ordering.
    #[must_use]
    pub fn sorted_dimensions(&self) -> Vec<String> {
        let mut dims = self.dimensions.clone();
        dims.sort();
        dims
    }

    /// The summable dimensions in lexicographic order.
    #[must_use]
    pub fn summable_dimensions(&self) -> Vec<String> {
        self.sorted_dimensions()
            .into_iter()
            .filter(|d| self.is_summable(d))
            .collect()
    }

    /// The non-summable dimensions in lexicographic order.
    #[must_use]
    pub fn sorted_non_summable_dimensions(&self) -> Vec<String> {
        let mut dims = self.non_summable_dimensions.clone();
        dims.sort();
        dims
    }
}
