//! The `shroud suppress` command.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use shroud_core::SuppressionConfig;
use shroud_engine::{Record, suppress};

use crate::OutputFormat;

/// Arguments for `shroud suppress`.
#[derive(Debug, clap::Args)]
pub struct SuppressArgs {
    /// Input file: a JSON array of records.
    #[arg(long)]
    pub input: PathBuf,

    /// JSON config file; flags below override its fields.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reporting dimensions, comma separated. Required without --config.
    #[arg(long, value_delimiter = ',')]
    pub dimensions: Vec<String>,

    /// Column holding the count.
    #[arg(long)]
    pub incidence_column: Option<String>,

    /// Anonymity threshold.
    #[arg(long)]
    pub threshold: Option<u64>,

    /// Redact only the small cells themselves.
    #[arg(long)]
    pub first_order_only: bool,

    /// Dimensions whose totals are never published, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub non_summable: Vec<String>,

    /// Sentinel substituted for redacted counts.
    #[arg(long)]
    pub sentinel: Option<String>,

    /// Write the result here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Runs the suppression pipeline over the input file.
///
/// # Errors
///
/// Returns an error when the input or config cannot be read or parsed, or
/// when the engine rejects the configuration or records.
pub fn execute(args: &SuppressArgs, format: &OutputFormat) -> Result<()> {
    let config = build_config(args)?;

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input {}", args.input.display()))?;
    let records: Vec<Record> =
        serde_json::from_str(&raw).context("input must be a JSON array of records")?;
    info!(records = records.len(), "loaded aggregate");

    let result = suppress(&records, &config)?;

    match format {
        OutputFormat::Json => {
            let document = serde_json::json!({
                "data": result.to_records(&config.incidence_column),
                "stats": result.stats,
                "success": true,
            });
            let rendered = serde_json::to_string_pretty(&document)?;
            write_output(args, &rendered)?;
        }
        OutputFormat::Text => {
            let stats = &result.stats;
            println!("cells:            {}", stats.total_cells);
            println!("small cells:      {}", stats.non_anonymous_cells);
            println!("redacted cells:   {}", stats.redacted_cells);
            println!("suppression rate: {:.1}%", stats.suppression_rate * 100.0);
            println!("threshold:        {}", stats.threshold_used);
            println!("scanned:          {}", stats.dimension_suppressed.join(", "));
            if let Some(path) = &args.output {
                let rendered = serde_json::to_string_pretty(
                    &result.to_records(&config.incidence_column),
                )?;
                fs::write(path, rendered)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("wrote:            {}", path.display());
            }
        }
    }

    Ok(())
}

fn build_config(args: &SuppressArgs) -> Result<SuppressionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => SuppressionConfig::new(args.dimensions.clone()),
    };

    if args.config.is_some() && !args.dimensions.is_empty() {
        config.dimensions = args.dimensions.clone();
    }
    if let Some(column) = &args.incidence_column {
        config.incidence_column = column.clone();
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if args.first_order_only {
        config.first_order_only = true;
    }
    if !args.non_summable.is_empty() {
        config.non_summable_dimensions = args.non_summable.clone();
    }
    if let Some(sentinel) = &args.sentinel {
        config.redaction_sentinel = sentinel.clone();
    }

    Ok(config)
}

fn write_output(args: &SuppressArgs, rendered: &str) -> Result<()> {
    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}
