//! Command line argument parsing for the docexpand CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::expansion::ExpansionType;

/// docexpand - Expand documents with generated queries and predicted terms
#[derive(Parser, Debug, Clone)]
#[command(name = "docexpand")]
#[command(about = "Expand documents with generated queries and predicted terms before indexing")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct DocExpandArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl DocExpandArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Default log filter directive for the effective verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity() {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Expand documents with one or more strategies
    Expand(ExpandArgs),

    /// List the supported expansion types
    Types,
}

/// Arguments for expanding documents
#[derive(Parser, Debug, Clone)]
pub struct ExpandArgs {
    /// Document text to expand (repeatable)
    #[arg(short, long, value_name = "TEXT", conflicts_with = "input")]
    pub text: Vec<String>,

    /// Input file: one document per line, or JSONL objects with a "text" field.
    /// Reads standard input when neither --text nor --input is given.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Expansion strategy (repeatable): t5doc2query, splade, tilde
    #[arg(
        short,
        long = "strategy",
        value_name = "TYPE",
        default_value = "tilde",
        value_parser = parse_expansion_type
    )]
    pub strategies: Vec<ExpansionType>,

    /// Maximum number of terms or queries per document
    #[arg(short = 'k', long = "top-k", value_name = "K")]
    pub k: Option<usize>,

    /// Expansion configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

fn parse_expansion_type(s: &str) -> std::result::Result<ExpansionType, String> {
    s.parse().map_err(|e: crate::error::DocExpandError| e.to_string())
}

/// Output formats available in CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// A single JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}
