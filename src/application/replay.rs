use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::{Report, prelude::*};
use tracing::{debug, info, warn};

use crate::ext::PathExt;
use crate::filesystem::FileSystem;
use crate::notifications::{ChangeFeed, ChangePublisher, ChangeSubscription, PublishError};
use crate::scenario::{Scenario, Step};
use crate::site::{ChangeEvent, ItemKind, SiteItem, TreeError};

/// Tallies of what a replay did, mainly for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub events_applied: usize,
    pub events_ignored: usize,
    pub renames_committed: usize,
    pub renames_failed: usize,
    pub steps_skipped: usize,
}

/// Acts as the tree's owner for the duration of a scenario.
///
/// Event steps go through a [`ChangeFeed`] exactly like watcher output would,
/// and are drained into the tree right away. Rename and selection steps act on
/// the addressed node directly.
pub struct Replay<'a> {
    scenario: &'a Scenario,
    root: SiteItem,
    publisher: ChangePublisher,
    subscription: ChangeSubscription,
    report: ReplayReport,
}

impl<'a> Replay<'a> {
    pub fn new(scenario: &'a Scenario, file_system: Arc<dyn FileSystem>) -> Result<Self, ReplayError> {
        let root = Self::build_tree(scenario, file_system)?;
        let (publisher, subscription) = ChangeFeed::new();
        Ok(Self {
            scenario,
            root,
            publisher,
            subscription,
            report: ReplayReport::default(),
        })
    }

    fn build_tree(
        scenario: &Scenario,
        file_system: Arc<dyn FileSystem>,
    ) -> Result<SiteItem, ReplayError> {
        let mut root = SiteItem::folder(Arc::clone(&file_system), scenario.root.clone());

        for entry in &scenario.tree {
            let path = scenario.resolve(&entry.path);
            let parent = path
                .parent()
                .and_then(|parent| root.find_mut(parent))
                .context(OrphanEntrySnafu { path: path.clone() })?;
            let child = match entry.kind {
                ItemKind::Folder => SiteItem::folder(Arc::clone(&file_system), path),
                ItemKind::File => SiteItem::file(Arc::clone(&file_system), path),
            };
            parent.insert_child(child).context(TreeSnafu)?;
        }

        debug!(
            "Built initial tree of {} nodes under {}",
            root.node_count(),
            scenario.root.best_effort_display()
        );
        Ok(root)
    }

    pub fn run(mut self) -> Result<(SiteItem, ReplayReport), ReplayError> {
        for (index, step) in self.scenario.steps.iter().enumerate() {
            debug!("Step #{}: {:?}", index, step);
            self.apply(step)?;
        }
        Ok((self.root, self.report))
    }

    fn apply(&mut self, step: &Step) -> Result<(), ReplayError> {
        match step {
            Step::Event(event) => {
                let event = self.resolve_event(event);
                self.publisher.publish(event).context(PublishSnafu)?;
                if self.subscription.drain_into(&mut self.root) {
                    self.report.events_applied += 1;
                } else {
                    self.report.events_ignored += 1;
                }
            }
            Step::Select(path) => {
                let path = self.scenario.resolve(path);
                if let Some(node) = locate(&mut self.root, &mut self.report, &path) {
                    node.set_selected(true);
                }
            }
            Step::BeginRename(path) => {
                let path = self.scenario.resolve(path);
                if let Some(node) = locate(&mut self.root, &mut self.report, &path) {
                    if let Err(e) = node.begin_rename() {
                        warn!("{}", e);
                    }
                }
            }
            Step::Edit { path, name } => {
                let path = self.scenario.resolve(path);
                if let Some(node) = locate(&mut self.root, &mut self.report, &path) {
                    if let Err(e) = node.edit_name(name.as_str()) {
                        warn!("{}", e);
                    }
                }
            }
            Step::Commit(path) => {
                let path = self.scenario.resolve(path);
                if let Some(node) = locate(&mut self.root, &mut self.report, &path) {
                    match node.commit_rename() {
                        Ok(()) => self.report.renames_committed += 1,
                        Err(e) => {
                            // the node stays in renaming state, as an open edit box would
                            warn!("{}", Report::from_error(e));
                            self.report.renames_failed += 1;
                        }
                    }
                }
            }
            Step::Undo(path) => {
                let path = self.scenario.resolve(path);
                if let Some(node) = locate(&mut self.root, &mut self.report, &path) {
                    node.undo_rename();
                }
            }
        }
        Ok(())
    }

    fn resolve_event(&self, event: &ChangeEvent) -> ChangeEvent {
        match event {
            ChangeEvent::Created { path } => ChangeEvent::created(self.scenario.resolve(path)),
            ChangeEvent::Renamed { old_path, new_path } => ChangeEvent::renamed(
                self.scenario.resolve(old_path),
                self.scenario.resolve(new_path),
            ),
            ChangeEvent::Deleted { path } => ChangeEvent::deleted(self.scenario.resolve(path)),
        }
    }
}

fn locate<'r>(
    root: &'r mut SiteItem,
    report: &mut ReplayReport,
    path: &Path,
) -> Option<&'r mut SiteItem> {
    let node = root.find_mut(path);
    if node.is_none() {
        info!("No node at {}; skipping step", path.best_effort_display());
        report.steps_skipped += 1;
    }
    node
}

#[derive(Debug, Snafu)]
pub enum ReplayError {
    #[snafu(display(
        "Tree entry {} has no parent folder in the tree",
        path.best_effort_display()
    ))]
    OrphanEntry { path: PathBuf },
    #[snafu(display("Failed to build the initial tree"))]
    TreeError { source: TreeError },
    #[snafu(display("Failed to deliver a change event"))]
    PublishError { source: PublishError },
}
