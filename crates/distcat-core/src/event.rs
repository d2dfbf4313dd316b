//! Event bus for distcat using tokio::broadcast
//!
//! Publishes cache changes so UIs can re-render and diagnostics can log.

use tokio::sync::broadcast;

/// Events emitted by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    /// A group payload was fetched and cached
    GroupLoaded { group: u32, count: usize },
    /// Fetching or decoding a group failed; caches untouched
    GroupLoadFailed { group: u32, message: String },
    /// Both caches were emptied
    CacheCleared,
}

/// Event bus for broadcasting loader events
///
/// Multi-consumer; lagging receivers drop the oldest events.
pub struct EventBus {
    sender: broadcast::Sender<LoaderEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: LoaderEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.sender.subscribe()
    }
}
