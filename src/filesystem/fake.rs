use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{FileSystem, MoveError};

/// In-memory stand-in for the disk used by unit tests.
#[derive(Debug, Default)]
pub(crate) struct FakeFileSystem {
    dirs: HashSet<PathBuf>,
    moves: Mutex<Vec<(PathBuf, PathBuf)>>,
    failing: Mutex<bool>,
}

impl FakeFileSystem {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Makes every following move fail with `DestinationExists` until reset.
    pub(crate) fn fail_moves(&self, fail: bool) {
        *self.failing.lock().unwrap() = fail;
    }

    pub(crate) fn moves(&self) -> Vec<(PathBuf, PathBuf)> {
        self.moves.lock().unwrap().clone()
    }
}

impl FileSystem for FakeFileSystem {
    fn move_entry(&self, from: &Path, to: &Path) -> Result<(), MoveError> {
        self.moves
            .lock()
            .unwrap()
            .push((from.to_path_buf(), to.to_path_buf()));
        if *self.failing.lock().unwrap() {
            return Err(MoveError::DestinationExists {
                path: to.to_path_buf(),
            });
        }
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}
