//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// rulebot - a declarative automation rule engine.
#[derive(Debug, Parser)]
#[command(name = "rulebot", version, about)]
pub struct Cli {
    /// Output format; defaults to the configured format.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse and validate a rule file.
    Check {
        /// Rule file to check.
        file: PathBuf,
    },
    /// Parse a rule file and print it re-serialized.
    Fmt {
        /// Rule file to format.
        file: PathBuf,
        /// Rewrite the file in place instead of printing.
        #[arg(long)]
        write: bool,
    },
    /// List the rules in the store with their status.
    List {
        /// Rules directory; defaults to `~/.rulebot/rules`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable, colored.
    #[default]
    Pretty,
    /// Machine-readable JSON.
    Json,
}
