//! The window scan that detects subtraction leaks along one axis.
//!
//! Rows are sorted by `(partition values, scan value, non-summable values,
//! full tuple)` and walked once per partition, maintaining a small window
//! state: the previous row's snapshot and the running incidence sum. A clear
//! cell must join its redacted predecessor when either the predecessor is the
//! only redacted cell its slice can hide behind, or the running delta past it
//! would itself expose a small population.
//!
//! All context is read from dataset state as of the start of the scan: a scan
//! observes merges from earlier axes in the same pass, never its own.

use shroud_core::{DimensionTuple, DimensionValue, Error, Result, SuppressionConfig};

use crate::axis::Axis;
use crate::dataset::Dataset;
use crate::row::Row;

/// Snapshot of the previous row in a window at context time.
///
/// Lagged non-summable values are read through `dims`.
#[derive(Debug, Clone)]
pub struct PreviousCell {
    /// The previous row's full dimension tuple.
    pub dims: DimensionTuple,
    /// Its incidence.
    pub incidence: u64,
    /// Whether it was redacted when the scan started.
    pub is_redacted: bool,
    /// Whether it met the threshold at classification.
    pub is_anonymous: bool,
    /// Its redaction reason, when redacted.
    pub redaction_reason: Option<String>,
}

/// Window-derived evaluation context for one row along one axis.
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Index of the row in the dataset.
    pub row_index: usize,
    /// Running incidence sum within the window, up to and including this row.
    pub run_sum_by_axis: u64,
    /// Redacted rows in this row's summable slice when the scan started.
    pub masked_value_count: usize,
    /// The previous row in the window; `None` at a window start.
    pub previous: Option<PreviousCell>,
}

/// A redaction the merger must apply to one row.
#[derive(Debug, Clone)]
pub struct RedactionRecord {
    /// The target row's dimension tuple.
    pub dims: DimensionTuple,
    /// The target's projection onto the partition plus scan dimension.
    pub peer_group: DimensionTuple,
    /// The previous row's projection onto the same dimensions.
    pub previous_peer_group: DimensionTuple,
    /// The target's scan-dimension value.
    pub redacted_peers: DimensionTuple,
    /// The previous row's scan-dimension value.
    pub previous_redacted_peers: DimensionTuple,
    /// Why the target must be redacted.
    pub reason: String,
}

/// Builds the per-row window contexts for an axis.
///
/// Windows partition rows by their values on `axis.partition_dims` and order
/// them by scan value, then non-summable values, then the full tuple
/// (dimension name, then value) as the stable tie-break.
#[must_use]
pub fn build_contexts(
    dataset: &Dataset,
    axis: &Axis,
    config: &SuppressionConfig,
) -> Vec<ScanContext> {
    let non_summable = config.sorted_non_summable_dimensions();
    let masked_by_slice = dataset.redacted_count_by_slice(&non_summable);

    let mut ordered: Vec<(SortKey, usize)> = dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| (sort_key(row, axis, &non_summable), index))
        .collect();
    ordered.sort();

    let mut contexts = Vec::with_capacity(ordered.len());
    let mut current_partition: Option<DimensionTuple> = None;
    let mut run_sum = 0u64;
    let mut previous: Option<PreviousCell> = None;

    for (key, index) in ordered {
        if current_partition.as_ref() != Some(&key.partition) {
            current_partition = Some(key.partition.clone());
            run_sum = 0;
            previous = None;
        }

        let row = &dataset.rows()[index];
        run_sum += row.incidence;

        let slice = row.dims.project(&non_summable);
        let masked_value_count = masked_by_slice.get(&slice).copied().unwrap_or(0);

        contexts.push(ScanContext {
            row_index: index,
            run_sum_by_axis: run_sum,
            masked_value_count,
            previous: previous.clone(),
        });

        previous = Some(PreviousCell {
            dims: row.dims.clone(),
            incidence: row.incidence,
            is_redacted: row.is_redacted,
            is_anonymous: row.is_anonymous,
            redaction_reason: row.redaction_reason.clone(),
        });
    }

    contexts
}

/// Scans one axis and returns the redactions it forces.
///
/// A clear cell is redacted when its window predecessor is redacted, they
/// agree on every non-summable dimension, and either fewer than two cells in
/// the slice are redacted (the predecessor alone is recoverable from a
/// partition total) or the running sum minus the predecessor's incidence is
/// itself below the threshold.
///
/// # Errors
///
/// Returns [`Error::InternalInvariant`] if a redacted predecessor carries no
/// reason; classification and merging always stamp one.
pub fn scan_axis(
    dataset: &Dataset,
    axis: &Axis,
    config: &SuppressionConfig,
) -> Result<Vec<RedactionRecord>> {
    let non_summable = config.sorted_non_summable_dimensions();
    let peer_dims = axis.peer_dims();
    let scan_dims = std::slice::from_ref(&axis.scan_dim);

    let mut records = Vec::new();

    for context in build_contexts(dataset, axis, config) {
        let row = &dataset.rows()[context.row_index];
        if row.is_redacted {
            continue;
        }
        let Some(previous) = &context.previous else {
            continue;
        };
        if !previous.is_redacted {
            continue;
        }

        // Subtracting across a non-summable dimension is meaningless to a
        // consumer; only a predecessor in the same slice can leak.
        let same_slice = non_summable
            .iter()
            .all(|d| row.dims.get(d) == previous.dims.get(d));
        if !same_slice {
            continue;
        }

        let delta = context.run_sum_by_axis - previous.incidence;
        let exposed = context.masked_value_count < 2 || delta < config.threshold;
        if !exposed {
            continue;
        }

        let reason = compose_reason(previous, context.masked_value_count)?;
        records.push(RedactionRecord {
            dims: row.dims.clone(),
            peer_group: row.dims.project(&peer_dims),
            previous_peer_group: previous.dims.project(&peer_dims),
            redacted_peers: row.dims.project(scan_dims),
            previous_redacted_peers: previous.dims.project(scan_dims),
            reason,
        });
    }

    Ok(records)
}

fn compose_reason(previous: &PreviousCell, masked_value_count: usize) -> Result<String> {
    if !previous.is_anonymous {
        return Ok(format!(
            "{} was a small cell",
            previous.dims.canonical_string()
        ));
    }

    let inherited = previous.redaction_reason.clone().ok_or_else(|| {
        Error::internal(format!(
            "redacted cell {} carries no redaction reason",
            previous.dims.canonical_string()
        ))
    })?;

    if masked_value_count < 2 {
        Ok(inherited)
    } else {
        Ok(format!(
            "{inherited} and the delta would construct a small population."
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    partition: DimensionTuple,
    scan_value: DimensionValue,
    non_summable: DimensionTuple,
    tie_break: DimensionTuple,
}

fn sort_key(row: &Row, axis: &Axis, non_summable: &[String]) -> SortKey {
    SortKey {
        partition: row.dims.project(&axis.partition_dims),
        scan_value: row
            .dims
            .get(&axis.scan_dim)
            .cloned()
            .unwrap_or(DimensionValue::Null),
        non_summable: row.dims.project(non_summable),
        tie_break: row.dims.clone(),
    }
}
