use std::path::PathBuf;

use derive_more::{Display, IsVariant};

/// A filesystem change notice as delivered by the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Display, IsVariant)]
pub enum ChangeEvent {
    #[display("created {}", path.display())]
    Created { path: PathBuf },
    #[display("renamed {} to {}", old_path.display(), new_path.display())]
    Renamed { old_path: PathBuf, new_path: PathBuf },
    #[display("deleted {}", path.display())]
    Deleted { path: PathBuf },
}

impl ChangeEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        ChangeEvent::Created { path: path.into() }
    }

    pub fn renamed(old_path: impl Into<PathBuf>, new_path: impl Into<PathBuf>) -> Self {
        ChangeEvent::Renamed {
            old_path: old_path.into(),
            new_path: new_path.into(),
        }
    }

    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        ChangeEvent::Deleted { path: path.into() }
    }
}

/// Something that reacts to change events of every kind.
///
/// Implementors decide locally whether an event concerns them and ignore it
/// silently otherwise.
pub trait ChangeHandler {
    /// Applies the event and reports whether any displayed state changed.
    fn handle(&mut self, event: &ChangeEvent) -> bool;
}
