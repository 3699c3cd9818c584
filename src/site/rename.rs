use std::path::{Component, Path, PathBuf};

use derive_more::IsVariant;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::ext::PathExt;
use crate::filesystem::MoveError;

use super::SiteItem;

/// Progress of a user-driven rename.
#[derive(Debug, Clone, Default, PartialEq, Eq, IsVariant)]
pub enum RenameState {
    #[default]
    Idle,
    Renaming {
        /// The committed name at the moment the rename began.
        original_name: String,
        /// Free-form text being typed; may be transiently invalid.
        edit_buffer: String,
    },
}

impl RenameState {
    pub fn edit_buffer(&self) -> Option<&str> {
        match self {
            RenameState::Idle => None,
            RenameState::Renaming { edit_buffer, .. } => Some(edit_buffer),
        }
    }

    pub fn original_name(&self) -> Option<&str> {
        match self {
            RenameState::Idle => None,
            RenameState::Renaming { original_name, .. } => Some(original_name),
        }
    }
}

impl SiteItem {
    pub fn is_renaming(&self) -> bool {
        self.rename.is_renaming()
    }

    pub fn rename_state(&self) -> &RenameState {
        &self.rename
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.rename.edit_buffer()
    }

    /// Text to show for this node: the edit buffer while renaming, the name otherwise.
    pub fn display_label(&self) -> &str {
        self.rename.edit_buffer().unwrap_or(&self.name)
    }

    /// Enters the renaming state, seeding the edit buffer with the current name.
    pub fn begin_rename(&mut self) -> Result<(), RenameError> {
        if self.rename.is_renaming() {
            return AlreadyRenamingSnafu {
                path: self.path.clone(),
            }
            .fail();
        }

        debug!("Beginning rename of {}", self.path.best_effort_display());
        self.rename = RenameState::Renaming {
            original_name: self.name.clone(),
            edit_buffer: self.name.clone(),
        };
        Ok(())
    }

    /// Flag-style entry point: `true` begins a rename, `false` abandons it.
    pub fn set_renaming(&mut self, renaming: bool) {
        match (renaming, self.rename.is_renaming()) {
            (true, false) => {
                self.rename = RenameState::Renaming {
                    original_name: self.name.clone(),
                    edit_buffer: self.name.clone(),
                };
            }
            (false, true) => self.undo_rename(),
            _ => {}
        }
    }

    /// Replaces the edit buffer with `text`.
    pub fn edit_name(&mut self, text: impl Into<String>) -> Result<(), RenameError> {
        match &mut self.rename {
            RenameState::Renaming { edit_buffer, .. } => {
                *edit_buffer = text.into();
                Ok(())
            }
            RenameState::Idle => NotRenamingSnafu {
                path: self.path.clone(),
            }
            .fail(),
        }
    }

    /// Moves the entry on disk to the name in the edit buffer.
    ///
    /// On failure nothing changes: the node stays renaming at its original
    /// path, so the caller may retry after editing or call [`undo_rename`].
    ///
    /// [`undo_rename`]: SiteItem::undo_rename
    pub fn commit_rename(&mut self) -> Result<(), RenameError> {
        let RenameState::Renaming { edit_buffer, .. } = &self.rename else {
            return NotRenamingSnafu {
                path: self.path.clone(),
            }
            .fail();
        };
        let target = resolve_target(&self.path, edit_buffer)?;

        if target == self.path {
            debug!(
                "Rename of {} left the name unchanged",
                self.path.best_effort_display()
            );
            self.rename = RenameState::Idle;
            return Ok(());
        }

        self.file_system
            .move_entry(&self.path, &target)
            .context(MoveSnafu {
                path: self.path.clone(),
            })?;

        info!(
            "Renamed {} to {}",
            self.path.best_effort_display(),
            target.best_effort_display()
        );
        let old_path = std::mem::replace(&mut self.path, target);
        self.name = self.path.display_name();
        let new_path = self.path.clone();
        self.rebase_descendants(&old_path, &new_path);
        self.rename = RenameState::Idle;
        Ok(())
    }

    /// Abandons the rename. The committed name and path were never touched,
    /// so dropping the edit buffer restores the pre-rename state.
    pub fn undo_rename(&mut self) {
        if let RenameState::Renaming { original_name, .. } = &self.rename {
            debug!(
                "Undoing rename of {} (was '{}')",
                self.path.best_effort_display(),
                original_name
            );
        }
        self.rename = RenameState::Idle;
    }
}

/// Turns edited text into the full destination path of a rename.
///
/// A plain file name is placed next to `current`. An absolute path is taken
/// literally. Text with surrounding whitespace, or anything that is not a
/// single path component, is rejected rather than rewritten.
pub(super) fn resolve_target(current: &Path, edited: &str) -> Result<PathBuf, RenameError> {
    if edited.trim() != edited {
        return InvalidNameSnafu { name: edited }.fail();
    }

    let candidate = Path::new(edited);
    if candidate.is_absolute() {
        return Ok(candidate.to_path_buf());
    }

    let mut components = candidate.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Ok(match current.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }),
        _ => InvalidNameSnafu { name: edited }.fail(),
    }
}

#[derive(Debug, Snafu)]
pub enum RenameError {
    #[snafu(display("{} is already being renamed", path.best_effort_display()))]
    AlreadyRenaming { path: PathBuf },
    #[snafu(display("{} is not being renamed", path.best_effort_display()))]
    NotRenaming { path: PathBuf },
    #[snafu(display("'{}' is not a valid file name", name))]
    InvalidName { name: String },
    #[snafu(display("Failed to rename {}", path.best_effort_display()))]
    Move { path: PathBuf, source: MoveError },
}
