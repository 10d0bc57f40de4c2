//! # shroud-cli
//!
//! Command-line driver for the shroud suppression engine.
//!
//! ## Commands
//!
//! - `shroud suppress` - Redact a JSON aggregate file
//!
//! ## Configuration
//!
//! The run is configured by a JSON config file (`--config`) or directly by
//! flags; flags override the file. The input is a JSON array of records,
//! each mapping column names to values.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod commands;

use clap::{Parser, Subcommand};
use shroud_core::LogFormat;

/// Shroud CLI - small-cell suppression for published aggregates.
#[derive(Debug, Parser)]
#[command(name = "shroud")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Log output format.
    #[arg(long, env = "SHROUD_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Redact a pre-aggregated JSON dataset.
    Suppress(commands::suppress::SuppressArgs),
}

/// Output format.
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// JSON document with data and stats.
    Json,
}

/// Log format flag.
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum LogFormatArg {
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
    /// JSON structured logs.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}
