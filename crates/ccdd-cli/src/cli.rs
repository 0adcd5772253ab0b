//! CLI argument definitions for the dataset generator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ccdd",
    version,
    about = "Canonical clinical drug dataset generator",
    long_about = "Normalize raw drug product and ingredient records into the\n\
                  canonical terminology hierarchy: products, Named Therapeutic\n\
                  Products (NTP) and Therapeutic Moieties (TM), with stable\n\
                  interned identifiers and formal descriptions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline over a snapshot folder and write the output tables.
    Generate(GenerateArgs),

    /// List the snapshot tables the pipeline expects.
    Inputs,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Path to the snapshot folder containing the reference CSV tables.
    #[arg(value_name = "SNAPSHOT_DIR")]
    pub snapshot_dir: PathBuf,

    /// Output directory for generated tables (default: <SNAPSHOT_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of ranked usage entries the priority filter considers.
    #[arg(long = "top-n", value_name = "N", default_value_t = 250)]
    pub top_n: usize,

    /// Produce full (unfiltered) tables even when ranked usage is available.
    #[arg(long = "no-priority-filter")]
    pub no_priority_filter: bool,

    /// Run the pipeline and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
