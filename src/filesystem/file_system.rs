use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use snafu::Snafu;
use tracing::{debug, info};

use crate::ext::PathExt;

pub trait FileSystem: Debug + Send + Sync {
    /// Relocates a file or folder. Must not overwrite an existing destination.
    fn move_entry(&self, from: &Path, to: &Path) -> Result<(), MoveError>;

    fn is_dir(&self, path: &Path) -> bool;
}

/// Moves entries on the real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn move_entry(&self, from: &Path, to: &Path) -> Result<(), MoveError> {
        if let Err(e) = from.symlink_metadata() {
            return Err(classify_io_error(e, from, to));
        }
        // `rename` silently replaces files on unix, so the clash is checked up front
        if to.symlink_metadata().is_ok() {
            return Err(MoveError::DestinationExists {
                path: to.to_path_buf(),
            });
        }

        debug!(
            "Moving {} to {}",
            from.best_effort_display(),
            to.best_effort_display()
        );
        std::fs::rename(from, to).map_err(|e| classify_io_error(e, from, to))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

fn classify_io_error(error: io::Error, from: &Path, to: &Path) -> MoveError {
    match error.kind() {
        io::ErrorKind::NotFound => MoveError::SourceMissing {
            path: from.to_path_buf(),
        },
        io::ErrorKind::AlreadyExists => MoveError::DestinationExists {
            path: to.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => MoveError::PermissionDenied {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: error,
        },
        _ => MoveError::Io {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: error,
        },
    }
}

/// Accepts every move without touching the disk and remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct DryRunFileSystem {
    moves: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl DryRunFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> Vec<(PathBuf, PathBuf)> {
        match self.moves.lock() {
            Ok(moves) => moves.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl FileSystem for DryRunFileSystem {
    fn move_entry(&self, from: &Path, to: &Path) -> Result<(), MoveError> {
        info!(
            "[dry run] would move {} to {}",
            from.best_effort_display(),
            to.best_effort_display()
        );
        let mut moves = match self.moves.lock() {
            Ok(moves) => moves,
            Err(poisoned) => poisoned.into_inner(),
        };
        moves.push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[derive(Debug, Snafu)]
pub enum MoveError {
    #[snafu(display("Cannot move {}: it does not exist", path.best_effort_display()))]
    SourceMissing { path: PathBuf },
    #[snafu(display("Cannot move onto {}: it already exists", path.best_effort_display()))]
    DestinationExists { path: PathBuf },
    #[snafu(display(
        "Permission denied moving {} to {}",
        from.best_effort_display(),
        to.best_effort_display()
    ))]
    PermissionDenied {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[snafu(display(
        "Failed to move {} to {}",
        from.best_effort_display(),
        to.best_effort_display()
    ))]
    Io {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn local_move_relocates_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("old.md");
        let to = temp_dir.path().join("new.md");
        fs::write(&from, "# heading").expect("Failed to write file");

        LocalFileSystem
            .move_entry(&from, &to)
            .expect("Move should succeed");

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "# heading");
    }

    #[test]
    fn local_move_relocates_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("drafts");
        let to = temp_dir.path().join("posts");
        fs::create_dir(&from).expect("Failed to create folder");
        fs::write(from.join("a.md"), "a").expect("Failed to write file");

        LocalFileSystem
            .move_entry(&from, &to)
            .expect("Move should succeed");

        assert!(LocalFileSystem.is_dir(&to));
        assert!(to.join("a.md").exists());
    }

    #[test]
    fn local_move_reports_missing_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("ghost.md");
        let to = temp_dir.path().join("new.md");

        let result = LocalFileSystem.move_entry(&from, &to);

        match result {
            Err(MoveError::SourceMissing { path }) => assert_eq!(path, from),
            other => panic!("Expected SourceMissing, got {:?}", other),
        }
    }

    #[test]
    fn local_move_refuses_to_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("old.md");
        let to = temp_dir.path().join("taken.md");
        fs::write(&from, "mine").expect("Failed to write file");
        fs::write(&to, "theirs").expect("Failed to write file");

        let result = LocalFileSystem.move_entry(&from, &to);

        assert!(matches!(result, Err(MoveError::DestinationExists { .. })));
        assert_eq!(fs::read_to_string(&to).unwrap(), "theirs");
        assert!(from.exists());
    }

    #[test]
    fn dry_run_records_without_moving() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("old.md");
        let to = temp_dir.path().join("new.md");
        fs::write(&from, "content").expect("Failed to write file");

        let file_system = DryRunFileSystem::new();
        file_system
            .move_entry(&from, &to)
            .expect("Dry run never fails");

        assert!(from.exists());
        assert!(!to.exists());
        assert_eq!(file_system.moves(), vec![(from, to)]);
    }

    #[test]
    fn move_error_display_names_paths() {
        let error = MoveError::DestinationExists {
            path: PathBuf::from("/site/taken.md"),
        };

        let message = format!("{}", error);

        assert!(message.contains("already exists"));
        assert!(message.contains("/site/taken.md"));
    }
}
