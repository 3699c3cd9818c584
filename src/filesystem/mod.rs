//! Boundary to the disk.
//!
//! Tree nodes never touch the filesystem directly: they go through the
//! [`FileSystem`] trait, which offers the move primitive used when a rename is
//! committed and a probe telling folders from files when a creation notice
//! arrives.

mod file_system;
#[cfg(test)]
pub(crate) mod fake;

pub use file_system::{DryRunFileSystem, FileSystem, LocalFileSystem, MoveError};
