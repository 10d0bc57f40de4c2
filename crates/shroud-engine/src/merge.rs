//! Applies scan results back into the row store.
//!
//! Peer sets merge by union; the redaction flag only ever flips from clear to
//! redacted; the first reason written for a row wins.

use shroud_core::{Error, Result};

use crate::dataset::Dataset;
use crate::scan::RedactionRecord;

/// Merges the records from one axis scan into the dataset.
///
/// Returns the number of rows newly redacted.
///
/// # Errors
///
/// Returns [`Error::InternalInvariant`] if a record targets a row that is
/// not in the store; scans only ever emit rows they read from it.
pub fn apply_redactions(dataset: &mut Dataset, records: &[RedactionRecord]) -> Result<usize> {
    let mut newly_redacted = 0;

    for record in records {
        let row = dataset.get_mut(&record.dims).ok_or_else(|| {
            Error::internal(format!(
                "redaction record targets unknown row {}",
                record.dims.canonical_string()
            ))
        })?;

        if !row.is_redacted {
            row.is_redacted = true;
            newly_redacted += 1;
        }

        row.peer_group.insert(record.peer_group.clone());
        row.peer_group.insert(record.previous_peer_group.clone());
        row.redacted_peers.insert(record.redacted_peers.clone());
        row.redacted_peers
            .insert(record.previous_redacted_peers.clone());

        if row.redaction_reason.is_none() {
            row.redaction_reason = Some(record.reason.clone());
        }
    }

    Ok(newly_redacted)
}
