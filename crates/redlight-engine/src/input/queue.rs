/// Player/UI intents the engine understands.
/// Generic UI plumbing, no timing semantics live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// START pressed on the idle screen.
    RequestStart,
    /// The reaction button was tapped.
    Tap,
    /// Retry requested from the results modal.
    Retry,
    /// Results modal dismissed without retrying.
    CloseResults,
}

/// A queue of pending intents.
/// The host writes intents into the queue; the engine drains them each tick.
pub struct IntentQueue {
    events: Vec<Intent>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(8),
        }
    }

    /// Push a new intent (called from the host bridge).
    pub fn push(&mut self, intent: Intent) {
        self.events.push(intent);
    }

    /// Drain all pending intents. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.events)
    }

    /// Check if there are pending intents.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending intents.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for IntentQueue {
    fn default() -> Self {
        Self::new()
    }
}
