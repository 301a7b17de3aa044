//! Input guard: two-latch admission control for tap events.
//!
//! Touch and click can fire together for one physical tap, and a second
//! logical tap can arrive while the first is still being scored. The guard
//! holds both latches in one place so acceptance sets them together, before
//! any scoring work proceeds: at most one accepted tap per round no matter
//! how many events land in the same tick.

use crate::api::types::{GameState, TapDecision, TapRejection};

/// The debounce latch rejects duplicate events of the same physical tap;
/// the processing latch rejects a second logical tap while the first one's
/// dwell is still running. Both are cleared together, only by dwell
/// completion or by the reset path.
#[derive(Debug, Clone, Copy, Default)]
pub struct TapGuard {
    debounce: bool,
    processing: bool,
}

impl TapGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a tap. Acceptance requires state `WaitingForTap`, an open
    /// input window and both latches clear; it latches before returning so
    /// no further work can race a second event.
    pub fn try_accept(&mut self, state: GameState, window_active: bool) -> TapDecision {
        if self.debounce {
            return TapDecision::Rejected(TapRejection::Debounced);
        }
        if self.processing {
            return TapDecision::Rejected(TapRejection::AlreadyProcessing);
        }
        if state != GameState::WaitingForTap {
            return TapDecision::Rejected(TapRejection::WrongState);
        }
        if !window_active {
            return TapDecision::Rejected(TapRejection::ButtonInactive);
        }
        self.debounce = true;
        self.processing = true;
        TapDecision::Accepted
    }

    /// Clear both latches. Called when the post-tap dwell completes or on
    /// reset.
    pub fn clear(&mut self) {
        self.debounce = false;
        self.processing = false;
    }

    pub fn latched(&self) -> bool {
        self.debounce || self.processing
    }
}
