use std::path::PathBuf;

use clap::Parser;

use crate::cli::{ColorChoice, LogLevel};

/// Replays a scripted sequence of filesystem events and renames against a site tree.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Scenario file describing the initial tree and the steps to apply
    pub script: PathBuf,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Record committed renames instead of moving anything on disk
    #[clap(long)]
    pub dry_run: bool,

    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorChoice,
}
