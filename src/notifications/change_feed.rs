use futures::StreamExt;
use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use snafu::Snafu;
use tracing::{debug, trace};

use crate::site::{ChangeEvent, ChangeHandler};

/// Publish/subscribe channel for filesystem change events.
///
/// Publishers may be cloned and moved to other threads (a watcher, for
/// instance). The single subscription is drained on the owner's context, which
/// keeps every tree mutation on one sequential context. Events are delivered
/// in the order they were published.
pub struct ChangeFeed;

impl ChangeFeed {
    pub fn new() -> (ChangePublisher, ChangeSubscription) {
        let (sender, receiver) = mpsc::unbounded();
        (
            ChangePublisher { sender },
            ChangeSubscription { receiver },
        )
    }
}

#[derive(Debug, Clone)]
pub struct ChangePublisher {
    sender: UnboundedSender<ChangeEvent>,
}

impl ChangePublisher {
    pub fn publish(&self, event: ChangeEvent) -> Result<(), PublishError> {
        trace!("Publishing {}", event);
        self.sender
            .unbounded_send(event)
            .map_err(|e| PublishError::SubscriptionClosed {
                event: e.into_inner(),
            })
    }
}

#[derive(Debug)]
pub struct ChangeSubscription {
    receiver: UnboundedReceiver<ChangeEvent>,
}

impl ChangeSubscription {
    /// Hands every event published so far to `handler` without waiting.
    ///
    /// Returns whether any of them changed the handler's displayed state.
    pub fn drain_into(&mut self, handler: &mut impl ChangeHandler) -> bool {
        let mut changed = false;
        while let Ok(Some(event)) = self.receiver.try_next() {
            changed |= deliver(handler, &event);
        }
        changed
    }

    /// Delivers events as they arrive until every publisher has been dropped.
    pub async fn run_until_closed(mut self, handler: &mut impl ChangeHandler) {
        while let Some(event) = self.receiver.next().await {
            deliver(handler, &event);
        }
        debug!("All change publishers closed");
    }
}

fn deliver(handler: &mut impl ChangeHandler, event: &ChangeEvent) -> bool {
    let changed = handler.handle(event);
    if changed {
        debug!("Applied {}", event);
    } else {
        trace!("No node affected by {}", event);
    }
    changed
}

#[derive(Debug, Snafu)]
pub enum PublishError {
    #[snafu(display("Cannot publish '{}': the subscription was dropped", event))]
    SubscriptionClosed { event: ChangeEvent },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::fake::FakeFileSystem;
    use crate::site::SiteItem;
    use std::path::Path;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<ChangeEvent>,
    }

    impl ChangeHandler for Recorder {
        fn handle(&mut self, event: &ChangeEvent) -> bool {
            self.seen.push(event.clone());
            event.is_created()
        }
    }

    #[test]
    fn drain_delivers_in_publish_order() {
        let (publisher, mut subscription) = ChangeFeed::new();
        let events = vec![
            ChangeEvent::created("/site/a.md"),
            ChangeEvent::renamed("/site/a.md", "/site/b.md"),
            ChangeEvent::deleted("/site/b.md"),
        ];
        for event in &events {
            publisher.publish(event.clone()).unwrap();
        }

        let mut recorder = Recorder::default();
        let changed = subscription.drain_into(&mut recorder);

        assert!(changed);
        assert_eq!(recorder.seen, events);
        assert!(!subscription.drain_into(&mut recorder));
    }

    #[test]
    fn publish_fails_once_subscription_is_dropped() {
        let (publisher, subscription) = ChangeFeed::new();
        drop(subscription);

        let result = publisher.publish(ChangeEvent::deleted("/site/a.md"));

        assert!(matches!(
            result,
            Err(PublishError::SubscriptionClosed { .. })
        ));
    }

    #[test]
    fn publishers_on_other_threads_reach_the_tree() {
        let (publisher, mut subscription) = ChangeFeed::new();
        let mut root = SiteItem::folder(Arc::new(FakeFileSystem::new()), "/site");

        let watcher = std::thread::spawn(move || {
            publisher
                .publish(ChangeEvent::created("/site/a.md"))
                .unwrap();
        });
        watcher.join().unwrap();

        assert!(subscription.drain_into(&mut root));
        assert!(root.find(Path::new("/site/a.md")).is_some());
    }

    #[compio::test]
    async fn run_until_closed_stops_after_last_publisher() {
        let (publisher, subscription) = ChangeFeed::new();
        let mut root = SiteItem::folder(Arc::new(FakeFileSystem::new()), "/site");
        publisher
            .publish(ChangeEvent::created("/site/a.md"))
            .unwrap();
        publisher
            .publish(ChangeEvent::created("/site/b.md"))
            .unwrap();
        drop(publisher);

        subscription.run_until_closed(&mut root).await;

        assert_eq!(root.node_count(), 3);
    }
}
