use std::sync::Arc;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::application::replay::{Replay, ReplayError, ReplayReport};
use crate::filesystem::{DryRunFileSystem, FileSystem, LocalFileSystem};
use crate::render::TreePrinter;
use crate::scenario::{Scenario, ScenarioError};

pub struct Application;

impl Application {
    pub async fn run(
        runtime_config: impl Into<RuntimeConfig>,
    ) -> Result<ReplayReport, ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        colored::control::set_override(runtime_config.color.enabled());

        let scenario = Scenario::from_path(&runtime_config.script)
            .await
            .context(ScenarioSnafu)?;
        debug!("Loaded scenario: {:?}", scenario);

        let file_system: Arc<dyn FileSystem> = if runtime_config.dry_run {
            info!("Dry run: committed renames will not touch the disk");
            Arc::new(DryRunFileSystem::new())
        } else {
            Arc::new(LocalFileSystem)
        };

        let (root, report) = Replay::new(&scenario, file_system)
            .context(ReplaySnafu)?
            .run()
            .context(ReplaySnafu)?;
        info!("Replay finished: {:?}", report);

        print!("{}", TreePrinter::render(&root));
        Ok(report)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the scenario"))]
    ScenarioError { source: ScenarioError },
    #[snafu(display("Critical failure encountered while replaying the scenario"))]
    ReplayError { source: ReplayError },
}
