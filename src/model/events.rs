//! Tree Change Events
//!
//! Every carbon tree node owns a broadcast channel. Edits publish on the
//! edited node; path-addressed edits additionally publish `ChildChanged` on
//! every ancestor.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const DEFAULT_EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TreeEvent {
    /// Bulk count or connection set of the node changed.
    Changed { asset_id: String },
    /// A descendant changed; `origin_id` is the edited node.
    ChildChanged { asset_id: String, origin_id: String },
}

/// Sending half of a node's event channel. Clones publish to the same
/// subscribers.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<TreeEvent>,
    capacity: usize,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Publish to all current subscribers. Without subscribers the event is
    /// dropped.
    pub fn publish(&self, event: TreeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.tx.subscribe()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
