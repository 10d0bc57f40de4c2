//! The row type held by the dataset store.

use std::collections::BTreeMap;

use shroud_core::{DimensionTuple, PeerSet};

/// The reason stamped on cells redacted for being below the threshold.
pub const SMALL_CELL_REASON: &str = "was a small cell";

/// One aggregated cell at the full reporting dimensionality.
///
/// Dimension values and the incidence are immutable after ingestion. The
/// redaction flag is one-way: once a row is redacted it stays redacted, and
/// the merge step only ever adds to the peer sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The full dimension tuple; unique within a dataset.
    pub dims: DimensionTuple,

    /// Non-negative incidence count.
    pub incidence: u64,

    /// Whether the cell met the anonymity threshold at classification time.
    /// Rows redacted later to block subtraction keep `is_anonymous = true`;
    /// the flag records why the cell itself needed no protection.
    pub is_anonymous: bool,

    /// Whether the cell is suppressed in the output.
    pub is_redacted: bool,

    /// Why the cell was redacted; `None` while the cell is clear.
    pub redaction_reason: Option<String>,

    /// The partition descriptors in which this row's redaction was chosen.
    pub peer_group: PeerSet,

    /// The scan-axis values that forced this row's redaction.
    pub redacted_peers: PeerSet,

    /// Input columns that are neither dimensions nor the incidence; passed
    /// through to the output untouched.
    pub extra: BTreeMap<String, serde_json::Value>,
}
