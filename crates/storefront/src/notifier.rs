//! In-process "list changed" notifications.
//!
//! A [`ViewNotifier`] is handed to every store that should announce changes
//! and to every consumer that wants to hear about them (header badges, cache
//! warmers, the event logger in `main`). Delivery is best effort: events are
//! not persisted, not replayed to late subscribers, and never leave the
//! process.

use lunette_core::{ListEvent, ListKind};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Events buffered per subscriber before the slowest one starts lagging.
const DEFAULT_BUFFER: usize = 64;

/// Publish/subscribe hub for [`ListEvent`]s.
///
/// Cheap to clone; clones share subscribers.
#[derive(Debug, Clone)]
pub struct ViewNotifier {
    sender: broadcast::Sender<ListEvent>,
}

impl Default for ViewNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

impl ViewNotifier {
    /// Create a notifier buffering up to `buffer` events per subscriber.
    #[must_use]
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, event: ListEvent) {
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(event = %event.kind, count = ?event.count, receivers, "List event published");
            }
            Err(_) => debug!(event = %event.kind, "List event dropped, no subscribers"),
        }
    }

    /// Announce that `kind` changed and now holds `count` entries.
    pub fn notify(&self, kind: ListKind, count: usize) {
        self.publish(ListEvent::with_count(kind, count));
    }

    /// Receive every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            only: None,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving end of a [`ViewNotifier`].
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ListEvent>,
    only: Option<ListKind>,
}

impl Subscription {
    /// Only yield events for `kind`.
    #[must_use]
    pub const fn only(mut self, kind: ListKind) -> Self {
        self.only = Some(kind);
        self
    }

    fn wanted(&self, event: &ListEvent) -> bool {
        self.only.is_none_or(|kind| kind == event.kind)
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once every notifier clone has been dropped.
    pub async fn next(&mut self) -> Option<ListEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.wanted(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "List event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published event, without waiting.
    pub fn try_next(&mut self) -> Option<ListEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.wanted(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "List event subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}
