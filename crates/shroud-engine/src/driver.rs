//! The fixed-point driver: the public entry point of the engine.
//!
//! Each pass scans every axis in order and merges the redactions it finds;
//! the loop ends when a full pass adds nothing. Termination is guaranteed
//! because the redacted set only grows and is bounded by the row count; a
//! pass bound of `2 x rows + 2` backstops that argument against bugs.

use tracing::{debug, info};

use shroud_core::{Error, Result, SuppressionConfig, suppression_span};

use crate::axis::enumerate_axes;
use crate::dataset::{Dataset, Record};
use crate::merge::apply_redactions;
use crate::project::{SuppressionOutput, project};
use crate::scan::scan_axis;

/// Runs the full suppression pipeline over the given records.
///
/// Classifies every cell against the threshold, then repeatedly scans every
/// axis until no new cell needs redaction, and projects the redacted table
/// plus run statistics. With `first_order_only` set, only the classification
/// step runs.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for a bad configuration,
/// [`Error::MalformedInput`] for bad records, and
/// [`Error::InternalInvariant`] if the loop fails to converge within its
/// pass bound.
pub fn suppress(records: &[Record], config: &SuppressionConfig) -> Result<SuppressionOutput> {
    config.validate()?;

    let span = suppression_span("suppress", records.len(), config.threshold);
    let _guard = span.enter();

    let mut dataset = Dataset::ingest(records, config)?;
    info!(
        rows = dataset.len(),
        primary_redactions = dataset.redacted_count(),
        "classified input cells"
    );

    if config.first_order_only {
        return Ok(project(&dataset, config));
    }

    let axes = enumerate_axes(config);
    let max_passes = dataset.len() * 2 + 2;
    let mut pass = 0usize;

    loop {
        pass += 1;
        if pass > max_passes {
            return Err(Error::internal(format!(
                "suppression did not converge within {max_passes} passes"
            )));
        }

        let mut changed = false;
        for axis in &axes {
            let additions = scan_axis(&dataset, axis, config)?;
            if additions.is_empty() {
                continue;
            }
            debug!(axis = %axis, additions = additions.len(), pass, "redacting cells");
            if apply_redactions(&mut dataset, &additions)? > 0 {
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    info!(
        passes = pass,
        redacted = dataset.redacted_count(),
        "suppression converged"
    );

    Ok(project(&dataset, config))
}
