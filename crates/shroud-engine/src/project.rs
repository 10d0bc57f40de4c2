//! Projects the converged dataset into the published output.
//!
//! Redacted rows get the configured sentinel in place of their count; every
//! row carries its flags, reason, and peer sets as structured fields. Rows
//! are emitted in a stable order (the configured dimension list, value by
//! value) so output is reproducible byte for byte.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use shroud_core::{DimensionTuple, DimensionValue, SuppressionConfig};

use crate::dataset::{Dataset, Record};

/// The incidence column of one output row: the count, or the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncidenceCell {
    /// The published count.
    Count(u64),
    /// The redaction sentinel.
    Redacted(String),
}

/// One row of the privacy-safe output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressedRow {
    /// The full dimension tuple, values unchanged from the input.
    pub dims: DimensionTuple,
    /// The count, or the sentinel when redacted.
    pub incidence: IncidenceCell,
    /// Whether the cell met the threshold at classification.
    pub is_anonymous: bool,
    /// Whether the cell is suppressed.
    pub is_redacted: bool,
    /// Why the cell was suppressed; null when clear.
    pub redaction_reason: Option<String>,
    /// Partition descriptors in which this row's redaction was chosen.
    pub peer_group: Vec<DimensionTuple>,
    /// Scan-axis values that forced this row's redaction.
    pub redacted_peers: Vec<DimensionTuple>,
    /// Passthrough columns, untouched.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SuppressedRow {
    /// Flattens the row into a single record: dimension columns, the
    /// incidence under its configured column name, the structured fields,
    /// and the passthrough columns.
    #[must_use]
    pub fn to_record(&self, incidence_column: &str) -> Record {
        let mut record = Record::new();
        for (name, value) in self.dims.iter() {
            record.insert(name.clone(), value.to_json());
        }
        let incidence = match &self.incidence {
            IncidenceCell::Count(n) => serde_json::Value::from(*n),
            IncidenceCell::Redacted(sentinel) => serde_json::Value::from(sentinel.clone()),
        };
        record.insert(incidence_column.to_string(), incidence);
        record.insert("is_anonymous".to_string(), self.is_anonymous.into());
        record.insert("is_redacted".to_string(), self.is_redacted.into());
        record.insert(
            "redaction_reason".to_string(),
            match &self.redaction_reason {
                Some(reason) => serde_json::Value::from(reason.clone()),
                None => serde_json::Value::Null,
            },
        );
        record.insert("peer_group".to_string(), peers_to_json(&self.peer_group));
        record.insert(
            "redacted_peers".to_string(),
            peers_to_json(&self.redacted_peers),
        );
        for (name, value) in &self.extra {
            record.insert(name.clone(), value.clone());
        }
        record
    }
}

fn peers_to_json(peers: &[DimensionTuple]) -> serde_json::Value {
    let objects: Vec<serde_json::Value> = peers
        .iter()
        .map(|tuple| {
            tuple
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect::<serde_json::Map<_, _>>()
                .into()
        })
        .collect();
    objects.into()
}

/// Summary statistics for one suppression run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of cells in the table.
    pub total_cells: usize,
    /// Number of suppressed cells.
    pub redacted_cells: usize,
    /// Number of cells below the threshold (primary redactions).
    pub non_anonymous_cells: usize,
    /// `redacted_cells / total_cells`; zero for an empty table.
    pub suppression_rate: f64,
    /// The threshold the run used.
    pub threshold_used: u64,
    /// The summable dimensions the run scanned, in enumeration order.
    pub dimension_suppressed: Vec<String>,
}

/// The engine's result: the redacted table plus run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppressionOutput {
    /// The redacted rows, in stable output order.
    pub data: Vec<SuppressedRow>,
    /// Run statistics.
    pub stats: RunStats,
}

impl SuppressionOutput {
    /// Flattens every row via [`SuppressedRow::to_record`].
    #[must_use]
    pub fn to_records(&self, incidence_column: &str) -> Vec<Record> {
        self.data
            .iter()
            .map(|row| row.to_record(incidence_column))
            .collect()
    }
}

/// Projects the dataset into its output form.
#[must_use]
pub fn project(dataset: &Dataset, config: &SuppressionConfig) -> SuppressionOutput {
    let mut data: Vec<SuppressedRow> = dataset
        .rows()
        .iter()
        .map(|row| {
            let incidence = if row.is_redacted {
                IncidenceCell::Redacted(config.redaction_sentinel.clone())
            } else {
                IncidenceCell::Count(row.incidence)
            };
            SuppressedRow {
                dims: row.dims.clone(),
                incidence,
                is_anonymous: row.is_anonymous,
                is_redacted: row.is_redacted,
                redaction_reason: row.redaction_reason.clone(),
                peer_group: row.peer_group.iter().cloned().collect(),
                redacted_peers: row.redacted_peers.iter().cloned().collect(),
                extra: row.extra.clone(),
            }
        })
        .collect();

    // Stable output order: the configured dimension list, value by value.
    data.sort_by_cached_key(|row| {
        config
            .dimensions
            .iter()
            .map(|d| row.dims.get(d).cloned().unwrap_or(DimensionValue::Null))
            .collect::<Vec<_>>()
    });

    let total_cells = data.len();
    let redacted_cells = data.iter().filter(|r| r.is_redacted).count();
    let non_anonymous_cells = data.iter().filter(|r| !r.is_anonymous).count();
    let suppression_rate = if total_cells == 0 {
        0.0
    } else {
        redacted_cells as f64 / total_cells as f64
    };

    SuppressionOutput {
        data,
        stats: RunStats {
            total_cells,
            redacted_cells,
            non_anonymous_cells,
            suppression_rate,
            threshold_used: config.threshold,
            dimension_suppressed: config.summable_dimensions(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::driver::suppress;

    fn records(rows: &[serde_json::Value]) -> Vec<Record> {
        rows.iter()
            .map(|v| v.as_object().cloned().expect("object"))
            .collect()
    }

    #[test]
    fn sentinel_replaces_redacted_counts() {
        let config = SuppressionConfig::new(["cat"]).with_incidence_column("n");
        let data = records(&[
            json!({"cat": "a", "n": 3}),
            json!({"cat": "b", "n": 20}),
        ]);
        let output = suppress(&data, &config).unwrap();

        let small = &output.data[0];
        assert_eq!(
            small.incidence,
            IncidenceCell::Redacted("Redacted".to_string())
        );
        let large = &output.data[1];
        assert_eq!(large.incidence, IncidenceCell::Count(20));
    }

    #[test]
    fn rows_sort_by_configured_dimension_order() {
        let config = SuppressionConfig::new(["zip", "age"]).with_incidence_column("n");
        let data = records(&[
            json!({"zip": "00001", "age": 15, "n": 12}),
            json!({"zip": "00000", "age": 55, "n": 13}),
            json!({"zip": "00000", "age": 25, "n": 20}),
        ]);
        let output = suppress(&data, &config).unwrap();

        let order: Vec<String> = output
            .data
            .iter()
            .map(|r| {
                format!(
                    "{}/{}",
                    r.dims.get("zip").expect("zip"),
                    r.dims.get("age").expect("age")
                )
            })
            .collect();
        assert_eq!(order, vec!["00000/25", "00000/55", "00001/15"]);
    }

    #[test]
    fn flat_records_carry_every_contract_field() {
        let config = SuppressionConfig::new(["cat"]).with_incidence_column("n");
        let data = records(&[
            json!({"cat": "a", "n": 3, "note": "x"}),
            json!({"cat": "b", "n": 20}),
        ]);
        let output = suppress(&data, &config).unwrap();
        let flat = output.to_records("n");

        let small = &flat[0];
        assert_eq!(small.get("cat"), Some(&json!("a")));
        assert_eq!(small.get("n"), Some(&json!("Redacted")));
        assert_eq!(small.get("is_redacted"), Some(&json!(true)));
        assert_eq!(small.get("redaction_reason"), Some(&json!("was a small cell")));
        assert_eq!(small.get("peer_group"), Some(&json!([{"cat": "a"}])));
        assert_eq!(small.get("redacted_peers"), Some(&json!([])));
        assert_eq!(small.get("note"), Some(&json!("x")));

        let large = &flat[1];
        assert_eq!(large.get("n"), Some(&json!(20)));
        assert_eq!(large.get("redaction_reason"), Some(&json!(null)));
    }

    #[test]
    fn stats_reflect_the_run() {
        let config = SuppressionConfig::new(["cat", "month"])
            .with_incidence_column("n")
            .with_non_summable(["month"]);
        let data = records(&[
            json!({"cat": "a", "month": "m1", "n": 3}),
            json!({"cat": "b", "month": "m1", "n": 20}),
            json!({"cat": "a", "month": "m2", "n": 30}),
            json!({"cat": "b", "month": "m2", "n": 40}),
        ]);
        let output = suppress(&data, &config).unwrap();

        assert_eq!(output.stats.total_cells, 4);
        assert_eq!(output.stats.non_anonymous_cells, 1);
        assert_eq!(output.stats.threshold_used, 11);
        assert_eq!(output.stats.dimension_suppressed, vec!["cat"]);
        assert_eq!(output.stats.redacted_cells, 2, "primary plus one neighbor");
        assert!((output.stats.suppression_rate - 0.5).abs() < f64::EPSILON);
    }
}
