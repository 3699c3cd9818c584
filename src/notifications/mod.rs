//! In-process notification channel carrying change events to a tree owner.

mod change_feed;

pub use change_feed::{ChangeFeed, ChangePublisher, ChangeSubscription, PublishError};
