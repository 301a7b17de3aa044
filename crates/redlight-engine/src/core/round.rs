//! Round identity and per-round timing.
//!
//! All instants are milliseconds on the host's monotonic clock, passed into
//! the engine with every tick. The engine never reads a clock itself, so it
//! injects no latency of its own and tests can drive it synthetically.

/// Identifies one round. Bumped on every reset; deadlines and position
/// watches carry the round they were armed in and are ignored once stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundId(pub u32);

impl RoundId {
    pub fn next(self) -> RoundId {
        RoundId(self.0.wrapping_add(1))
    }
}

/// The measured instants of one round. `go_at` and `tap_at` are each set at
/// most once; everything is cleared only by the reset path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTiming {
    /// When the input window opened.
    pub go_at: Option<u64>,
    /// When the first accepted tap landed.
    pub tap_at: Option<u64>,
    /// `tap_at - go_at`, computed once the tap is accepted.
    pub reaction_millis: Option<u32>,
}

impl RoundTiming {
    /// Stamp the moment the "go" signal fired. A second stamp in the same
    /// round indicates a scheduling defect and is refused.
    pub fn stamp_go(&mut self, now: u64) {
        if self.go_at.is_some() {
            log::warn!("go timestamp already set this round, ignoring restamp");
            return;
        }
        self.go_at = Some(now);
    }

    /// Stamp the accepted tap and compute the reaction time. Returns the
    /// reaction in milliseconds, or `None` if the go signal never fired
    /// (the guard's state check makes that unreachable in normal operation).
    pub fn stamp_tap(&mut self, now: u64) -> Option<u32> {
        let go = self.go_at?;
        if self.tap_at.is_some() {
            log::warn!("tap timestamp already set this round, ignoring restamp");
            return self.reaction_millis;
        }
        if now < go {
            // Clock anomaly: report zero rather than a negative reaction.
            log::warn!("tap instant {now} precedes go instant {go}, clamping to 0");
        }
        self.tap_at = Some(now);
        let reaction = now.saturating_sub(go).min(u64::from(u32::MAX)) as u32;
        self.reaction_millis = Some(reaction);
        Some(reaction)
    }

    pub fn clear(&mut self) {
        *self = RoundTiming::default();
    }
}

/// A revocable, round-stamped timer. Fires only when the clock has passed it
/// *and* the round it was armed in is still current, so a stale expiry after
/// a reset is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    fires_at: u64,
    round: RoundId,
}

impl Deadline {
    pub fn new(fires_at: u64, round: RoundId) -> Self {
        Self { fires_at, round }
    }

    pub fn due(&self, now: u64, current: RoundId) -> bool {
        self.round == current && now >= self.fires_at
    }

    pub fn fires_at(&self) -> u64 {
        self.fires_at
    }
}
