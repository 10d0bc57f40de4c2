//! # shroud-engine
//!
//! The iterative latent-revelation suppression engine.
//!
//! Given a pre-aggregated table of counts broken down by categorical
//! dimensions, the engine redacts every cell whose count falls below a
//! configured threshold, then keeps redacting neighboring cells until no
//! combination of sums or differences along any publishable axis can
//! reconstruct a suppressed value.
//!
//! The pipeline:
//!
//! 1. **Ingest + classify** ([`Dataset::ingest`]): type the rows, mark each
//!    cell anonymous or not, redact the small cells outright.
//! 2. **Fixed point** ([`suppress`]): for every axis from
//!    [`enumerate_axes`], run the window scan ([`scan_axis`]) and merge its
//!    findings ([`apply_redactions`]); repeat until a full pass adds nothing.
//! 3. **Project** ([`project`]): emit the redacted table in stable order
//!    plus run statistics.
//!
//! The engine is synchronous and deterministic: the same row set and
//! configuration produce byte-identical output, including peer-group and
//! reason contents.
//!
//! ## Example
//!
//! ```rust
//! use shroud_core::SuppressionConfig;
//! use shroud_engine::{Record, suppress};
//!
//! let config = SuppressionConfig::new(["age", "sex"]).with_incidence_column("count");
//! let records: Vec<Record> = serde_json::from_str(
//!     r#"[
//!         {"age": 35, "sex": "M", "count": 3},
//!         {"age": 25, "sex": "F", "count": 20}
//!     ]"#,
//! )?;
//!
//! let output = suppress(&records, &config)?;
//! assert_eq!(output.stats.redacted_cells, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod axis;
pub mod dataset;
pub mod driver;
pub mod merge;
pub mod project;
pub mod row;
pub mod scan;

pub use axis::{Axis, enumerate_axes};
pub use dataset::{Dataset, Record};
pub use driver::suppress;
pub use merge::apply_redactions;
pub use project::{IncidenceCell, RunStats, SuppressedRow, SuppressionOutput, project};
pub use row::{Row, SMALL_CELL_REASON};
pub use scan::{PreviousCell, RedactionRecord, ScanContext, build_contexts, scan_axis};
