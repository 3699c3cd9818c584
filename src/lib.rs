//! An in-memory mirror of a directory subtree that stays consistent as
//! filesystem change notifications arrive, with an interactive rename workflow
//! that either commits to disk or is discarded without side effects.
//!
//! The core lives in [`site`]: [`site::SiteItem`] nodes react to
//! [`site::ChangeEvent`]s and carry their own rename state machine. The disk is
//! reached only through [`filesystem::FileSystem`]. [`notifications`] provides
//! a channel to carry events from a watcher to the tree's owner, and
//! [`application`] is a scenario-driven owner used by the command line tool.

pub mod application;
pub mod cli;
pub mod ext;
pub mod filesystem;
pub mod notifications;
pub mod render;
pub mod scenario;
pub mod site;
