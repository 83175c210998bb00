//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wrangler: clean and transform tabular data
#[derive(Parser)]
#[command(name = "wrangler")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer column types and report data quality issues
    Analyze {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List suggested cleaning and transformation operations
    Suggest {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply a recipe of operations and export the result
    Apply {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON recipe: an array of {"name", "params"} operations
        #[arg(short, long, value_name = "RECIPE")]
        recipe: PathBuf,

        /// Output path (default: <file>_wrangled.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension, else csv)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Convert between CSV and JSON
    Convert {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (default: from the output extension)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn export_format(self) -> wrangler::ExportFormat {
        match self {
            OutputFormat::Csv => wrangler::ExportFormat::Csv,
            OutputFormat::Json => wrangler::ExportFormat::Json,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
