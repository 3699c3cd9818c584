use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use derive_more::{Display, IsVariant};
use snafu::Snafu;
use tracing::debug;

use crate::ext::PathExt;
use crate::filesystem::FileSystem;

use super::RenameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IsVariant)]
pub enum ItemKind {
    #[display("file")]
    File,
    #[display("folder")]
    Folder,
}

/// One file or folder of the displayed site.
///
/// The node's identity is its current `path`. `name` is always the last
/// segment of that path; text typed during a rename lives in the
/// [`RenameState`] edit buffer and never overwrites `name` until committed.
#[derive(Debug)]
pub struct SiteItem {
    pub(super) path: PathBuf,
    pub(super) name: String,
    pub(super) kind: ItemKind,
    pub(super) children: Vec<SiteItem>,
    pub(super) selected: bool,
    pub(super) rename: RenameState,
    pub(super) file_system: Arc<dyn FileSystem>,
}

impl SiteItem {
    /// Creates a node for `path`, asking the file system whether it is a folder.
    pub fn new(file_system: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = if file_system.is_dir(&path) {
            ItemKind::Folder
        } else {
            ItemKind::File
        };
        Self::with_kind(file_system, path, kind)
    }

    pub fn file(file_system: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self::with_kind(file_system, path.into(), ItemKind::File)
    }

    pub fn folder(file_system: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self::with_kind(file_system, path.into(), ItemKind::Folder)
    }

    fn with_kind(file_system: Arc<dyn FileSystem>, path: PathBuf, kind: ItemKind) -> Self {
        Self {
            name: path.display_name(),
            path,
            kind,
            children: Vec::new(),
            selected: false,
            rename: RenameState::Idle,
            file_system,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn children(&self) -> &[SiteItem] {
        &self.children
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Builds a child of this folder for `path`, sharing this node's file system.
    pub(super) fn spawn_child(&self, path: &Path) -> SiteItem {
        SiteItem::new(Arc::clone(&self.file_system), path)
    }

    pub fn child_named(&self, name: &str) -> Option<&SiteItem> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Appends an owner-constructed child, keeping names unique.
    pub fn insert_child(&mut self, child: SiteItem) -> Result<(), TreeError> {
        if self.kind.is_file() {
            return NotAFolderSnafu {
                path: self.path.clone(),
            }
            .fail();
        }
        if self.child_named(&child.name).is_some() {
            return DuplicateNameSnafu {
                parent: self.path.clone(),
                name: child.name.clone(),
            }
            .fail();
        }

        debug!(
            "Inserting {} into {}",
            child.name,
            self.path.best_effort_display()
        );
        self.children.push(child);
        Ok(())
    }

    /// Detaches the child at `path`. Dropping the returned node drops its whole subtree.
    pub fn remove_child(&mut self, path: &Path) -> Option<SiteItem> {
        let index = self.children.iter().position(|child| child.path == path)?;
        Some(self.children.remove(index))
    }

    /// Re-sorts the subtree: folders first, then by case-insensitive name.
    pub fn sort_children(&mut self) {
        self.children.sort_by(compare_for_display);
        for child in &mut self.children {
            child.sort_children();
        }
    }

    pub fn find(&self, path: &Path) -> Option<&SiteItem> {
        if self.path == path {
            return Some(self);
        }
        self.children
            .iter()
            .filter(|child| path.starts_with(&child.path))
            .find_map(|child| child.find(path))
    }

    pub fn find_mut(&mut self, path: &Path) -> Option<&mut SiteItem> {
        if self.path == path {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter(|child| path.starts_with(&child.path))
            .find_map(|child| child.find_mut(path))
    }

    /// Pre-order walk over this node and all of its descendants.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn selected_paths(&self) -> Vec<&Path> {
        self.iter()
            .filter(|item| item.selected)
            .map(|item| item.path())
            .collect()
    }

    /// Moves every descendant path from under `old_prefix` to under `new_prefix`.
    pub(super) fn rebase_descendants(&mut self, old_prefix: &Path, new_prefix: &Path) {
        for child in &mut self.children {
            if let Ok(rest) = child.path.strip_prefix(old_prefix) {
                child.path = new_prefix.join(rest);
            }
            child.rebase_descendants(old_prefix, new_prefix);
        }
    }
}

fn compare_for_display(a: &SiteItem, b: &SiteItem) -> Ordering {
    b.kind
        .is_folder()
        .cmp(&a.kind.is_folder())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

pub struct Iter<'a> {
    stack: Vec<&'a SiteItem>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SiteItem;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;
        self.stack.extend(item.children.iter().rev());
        Some(item)
    }
}

#[derive(Debug, Snafu)]
pub enum TreeError {
    #[snafu(display(
        "{} already contains an entry named '{}'",
        parent.best_effort_display(),
        name
    ))]
    DuplicateName { parent: PathBuf, name: String },
    #[snafu(display("{} is a file and cannot hold children", path.best_effort_display()))]
    NotAFolder { path: PathBuf },
}
