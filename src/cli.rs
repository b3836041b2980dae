//! CLI argument parsing for phenocorr

use crate::model::MeasurementKind;
use crate::statistic::CorrelationKind;
use crate::store::MouseFilter;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for query responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON response objects for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "phenocorr")]
#[command(version)]
#[command(
    about = "Correlation search across gene expression and phenotypes of a mouse cohort",
    long_about = None
)]
pub struct Cli {
    /// Cohort snapshot (JSON); overrides `snapshot` in the config file
    #[arg(short = 'd', long = "data", value_name = "PATH", global = true)]
    pub data: Option<PathBuf>,

    /// Service configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Enable debug tracing to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank measurements by correlation with a reference measurement
    Correlate {
        /// Gene id or phenotype id (`sub_key.key_id`)
        reference_id: String,

        /// Correlation statistic (defaults to the configured one)
        #[arg(short = 's', long = "statistic", value_enum)]
        statistic: Option<CorrelationKind>,

        /// Kind of the reference measurement
        #[arg(long = "reference-kind", value_enum, default_value = "expression")]
        reference_kind: MeasurementKind,

        /// Kind of measurement to score against the reference
        #[arg(long = "candidate-kind", value_enum, default_value = "expression")]
        candidate_kind: MeasurementKind,

        /// Number of results to return (clamped to the configured limit)
        #[arg(short = 'n', long = "max-results", value_name = "N")]
        max_results: Option<usize>,

        /// Cancel the scan if it runs longer than this
        #[arg(long = "timeout-ms", value_name = "MS")]
        timeout_ms: Option<u64>,
    },

    /// Search the gene or phenotype catalog by id or name
    Search {
        #[arg(value_enum)]
        kind: MeasurementKind,

        /// Case-insensitive regex; invalid patterns match literally
        text: String,

        /// 1-based index of the first hit to show
        #[arg(long = "start", default_value = "1", allow_hyphen_values = true)]
        start: i64,

        /// Hits per page (defaults to the configured page size)
        #[arg(long = "count", allow_hyphen_values = true)]
        count: Option<i64>,
    },

    /// One measurement across every mouse, with strain, diet and factors
    Table {
        #[arg(value_enum)]
        kind: MeasurementKind,
        id: String,
    },

    /// Show one mouse record
    Mouse { mouse_id: String },

    /// List mice matching a filter
    Mice {
        #[arg(long = "group")]
        group: Option<String>,

        #[arg(long = "diet")]
        diet: Option<String>,

        /// Factor equality, repeatable (e.g. --factor sex=F)
        #[arg(long = "factor", value_name = "KEY=VALUE", value_parser = parse_factor)]
        factors: Vec<(String, String)>,

        /// Only mice with expression data
        #[arg(long = "with-expression")]
        with_expression: bool,
    },
}

impl Command {
    /// Build the store filter for `mice`; `None` for other subcommands
    pub fn mouse_filter(&self) -> Option<MouseFilter> {
        match self {
            Command::Mice {
                group,
                diet,
                factors,
                with_expression,
            } => Some(MouseFilter {
                mouse_id: None,
                group: group.clone(),
                diet_desc: diet.clone(),
                factors: factors.iter().cloned().collect(),
                with_expression: *with_expression,
            }),
            _ => None,
        }
    }
}

fn parse_factor(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
