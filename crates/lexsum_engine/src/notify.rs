use lexsum_core::SessionId;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCompleted {
    pub session: SessionId,
    pub request_id: String,
    pub file_name: String,
}

/// Broadcasts finished sessions so other views can refresh their own lists.
#[derive(Debug, Clone)]
pub struct CompletionNotifier {
    tx: broadcast::Sender<SessionCompleted>,
}

impl Default for CompletionNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl CompletionNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionCompleted> {
        self.tx.subscribe()
    }

    /// Returns how many subscribers received the event.
    pub fn notify(&self, event: SessionCompleted) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}
