use futurebattles_core::VoteUpdate;
use tokio::sync::broadcast;

/// Fan-out of vote count changes to live subscribers.
///
/// Delivery is best effort: a publish with no subscribers is not an error and
/// slow subscribers may miss updates.
#[derive(Clone)]
pub struct VoteBroadcaster {
    tx: broadcast::Sender<VoteUpdate>,
}

impl VoteBroadcaster {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        // Initial receiver dropped - subscribers use subscribe()
        let (tx, _initial_rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, update: VoteUpdate) {
        match self.tx.send(update) {
            Ok(receivers) => tracing::debug!(receivers, "published vote update"),
            Err(_) => tracing::debug!("vote update dropped, no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VoteUpdate> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for VoteBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
