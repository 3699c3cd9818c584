//! In-memory mirror of a directory subtree.
//!
//! A [`SiteItem`] is one file or folder. Folders own their children, and every
//! node reacts to the [`ChangeEvent`]s handed to it through [`ChangeHandler`],
//! forwarding each event to its children so that nodes at any depth see it.
//! Nodes also carry a rename state machine driven by their owner.

mod events;
mod handler;
mod item;
mod rename;

pub use events::{ChangeEvent, ChangeHandler};
pub use item::{ItemKind, Iter, SiteItem, TreeError};
pub use rename::{RenameError, RenameState};
