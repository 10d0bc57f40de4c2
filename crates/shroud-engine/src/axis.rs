//! Axis enumeration: the (partition dimensions, scan dimension) pairs along
//! which subtraction leaks are checked.
//!
//! For every non-empty subset `P` of the dimensions and every summable
//! dimension `s` outside `P`, there is one axis `(P, s)`: rows are grouped by
//! their `P`-values and scanned in `s` order within each group. Axes are
//! ordered by `|P|` ascending, then lexicographically: coarser partitions
//! first, which surfaces leaks earlier and shortens the fixed-point loop.

use std::fmt;

use shroud_core::SuppressionConfig;

/// One scan axis: a partition and a scan direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    /// The dimensions rows are grouped by, in lexicographic order.
    pub partition_dims: Vec<String>,
    /// The summable dimension rows are ordered by within each group.
    pub scan_dim: String,
}

impl Axis {
    /// The dimensions identifying a peer cell along this axis: the partition
    /// plus the scan direction, in lexicographic order.
    #[must_use]
    pub fn peer_dims(&self) -> Vec<String> {
        let mut dims = self.partition_dims.clone();
        dims.push(self.scan_dim.clone());
        dims.sort();
        dims
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) scan {}", self.partition_dims.join(","), self.scan_dim)
    }
}

/// Enumerates every axis for the configured dimensions.
///
/// The order is deterministic: subset size ascending, then lexicographic
/// over the partition, then lexicographic over the scan dimension.
#[must_use]
pub fn enumerate_axes(config: &SuppressionConfig) -> Vec<Axis> {
    let dims = config.sorted_dimensions();
    let mut axes = Vec::new();

    for size in 1..=dims.len() {
        for partition in combinations(&dims, size) {
            for scan_dim in &dims {
                if partition.contains(scan_dim) || !config.is_summable(scan_dim) {
                    continue;
                }
                axes.push(Axis {
                    partition_dims: partition.clone(),
                    scan_dim: scan_dim.clone(),
                });
            }
        }
    }

    axes
}

/// All `size`-element combinations of `items`, in lexicographic order.
/// `items` must already be sorted.
fn combinations(items: &[String], size: usize) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(size);
    fill(items, size, 0, &mut current, &mut out);
    out
}

fn fill(
    items: &[String],
    size: usize,
    start: usize,
    current: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for i in start..items.len() {
        current.push(items[i].clone());
        fill(items, size, i + 1, current, out);
        current.pop();
    }
}
