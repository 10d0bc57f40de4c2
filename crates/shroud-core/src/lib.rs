//! # shroud-core
//!
//! Core primitives for the shroud small-cell suppression engine.
//!
//! This crate provides the foundational types used across all shroud
//! components:
//!
//! - **Dimension Values and Tuples**: Typed categorical values keyed by
//!   dimension name, with deterministic ordering and canonical encoding
//! - **Canonical JSON**: Byte-stable serialization for peer groups, reasons,
//!   and output comparison
//! - **Configuration**: The suppression run settings and their validation
//! - **Error Types**: Shared error definitions and result types
//!
//! ## Crate Boundary
//!
//! `shroud-core` is the only crate allowed to define shared primitives. The
//! engine and CLI crates build on the contracts defined here.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod canonical_json;
pub mod config;
pub mod error;
pub mod observability;
pub mod tuple;
pub mod value;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use shroud_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SuppressionConfig;
    pub use crate::error::{Error, Result};
    pub use crate::tuple::{DimensionTuple, PeerSet};
    pub use crate::value::DimensionValue;
}

// Re-export key types at crate root for ergonomics
pub use canonical_json::{CanonicalJsonError, to_canonical_bytes, to_canonical_string};
pub use config::{DEFAULT_REDACTION_SENTINEL, DEFAULT_THRESHOLD, SuppressionConfig};
pub use error::{Error, Result};
pub use observability::{LogFormat, init_logging, suppression_span};
pub use tuple::{DimensionTuple, PeerSet};
pub use value::{DimensionValue, NULL_CATEGORY};
