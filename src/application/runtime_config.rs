use std::path::PathBuf;

use crate::cli::{Cli, ColorChoice};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub script: PathBuf,
    pub dry_run: bool,
    pub color: ColorChoice,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            script: cli.script,
            dry_run: cli.dry_run,
            color: cli.color,
        }
    }
}
