use std::path::Path;

use tracing::{debug, info, trace};

use crate::ext::PathExt;

use super::rename::resolve_target;
use super::{ChangeEvent, ChangeHandler, RenameState, SiteItem};

impl ChangeHandler for SiteItem {
    fn handle(&mut self, event: &ChangeEvent) -> bool {
        let mut changed = match event {
            ChangeEvent::Created { path } => self.on_created(path),
            ChangeEvent::Renamed { old_path, new_path } => self.on_renamed(old_path, new_path),
            ChangeEvent::Deleted { path } => self.on_deleted(path),
        };

        for child in &mut self.children {
            changed |= child.handle(event);
        }
        changed
    }
}

impl SiteItem {
    fn is_parent_of(&self, path: &Path) -> bool {
        path.parent() == Some(self.path.as_path())
    }

    fn on_created(&mut self, path: &Path) -> bool {
        if !self.kind.is_folder() || !self.is_parent_of(path) {
            return false;
        }

        let name = path.display_name();
        if self.child_named(&name).is_some() {
            trace!(
                "Ignoring repeated creation of {}",
                path.best_effort_display()
            );
            return false;
        }

        let child = self.spawn_child(path);
        debug!(
            "Adding {} {} to {}",
            child.kind(),
            name,
            self.path.best_effort_display()
        );
        self.children.push(child);
        true
    }

    fn on_renamed(&mut self, old_path: &Path, new_path: &Path) -> bool {
        let mut changed = false;

        if self.path == old_path {
            self.apply_external_rename(new_path);
            changed = true;
        }

        if self.kind.is_folder() {
            changed |= self.reparent_for_rename(old_path, new_path);
        }
        changed
    }

    fn on_deleted(&mut self, path: &Path) -> bool {
        match self.remove_child(path) {
            Some(removed) => {
                debug!(
                    "Removed {} from {}",
                    removed.name(),
                    self.path.best_effort_display()
                );
                true
            }
            None => false,
        }
    }

    /// Takes on the path reported by the watcher.
    ///
    /// A rename in progress survives only when the watcher reports the very
    /// target the pending edit resolves to. Any other target reflects what the
    /// disk now holds, so the stale edit is dropped.
    fn apply_external_rename(&mut self, new_path: &Path) {
        let old_path = std::mem::replace(&mut self.path, new_path.to_path_buf());
        self.name = new_path.display_name();
        self.rebase_descendants(&old_path, new_path);

        if let RenameState::Renaming { edit_buffer, .. } = &self.rename {
            let converges = resolve_target(&old_path, edit_buffer)
                .is_ok_and(|target| target.as_path() == new_path);
            if !converges {
                info!(
                    "{} was renamed externally to {}; discarding pending edit '{}'",
                    old_path.best_effort_display(),
                    new_path.best_effort_display(),
                    edit_buffer
                );
                self.rename = RenameState::Idle;
            }
        }
    }

    /// Keeps the children list in step with renames that touch this folder.
    ///
    /// The renamed node updates itself when the event is forwarded to it; here
    /// the folder only handles what the node cannot: a sibling replaced by the
    /// rename, or an entry moving into or out of this folder. A node committed
    /// locally already sits at `new_path` when the watcher confirms the move,
    /// so it must not be mistaken for the replaced sibling.
    fn reparent_for_rename(&mut self, old_path: &Path, new_path: &Path) -> bool {
        if old_path == new_path {
            return false;
        }

        match (self.is_parent_of(old_path), self.is_parent_of(new_path)) {
            (true, true) => {
                let pending = self.children.iter().any(|child| child.path == old_path);
                if pending && self.remove_child(new_path).is_some() {
                    debug!(
                        "{} was replaced by a rename",
                        new_path.best_effort_display()
                    );
                    return true;
                }
                false
            }
            (true, false) => {
                let moved = self
                    .remove_child(old_path)
                    .or_else(|| self.remove_child(new_path));
                if let Some(moved) = &moved {
                    debug!(
                        "{} moved out of {}",
                        moved.name(),
                        self.path.best_effort_display()
                    );
                }
                moved.is_some()
            }
            (false, true) => self.on_created(new_path),
            (false, false) => false,
        }
    }
}
