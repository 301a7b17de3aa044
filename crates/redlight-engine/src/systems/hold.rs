//! Seedable pseudo-random number generator (xorshift64) for the pre-signal
//! hold. Deterministic, fast, no-std compatible.

/// Seedable pseudo-random number generator (xorshift64).
/// Draws the randomized hold that separates the countdown pause from the
/// "go" signal. Seeded at engine construction so tests and hosts can pin it.
#[derive(Debug, Clone)]
pub struct HoldRng {
    state: u64,
}

impl HoldRng {
    pub fn new(seed: u64) -> Self {
        HoldRng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Draw a hold duration uniformly from `[0, max_millis]`.
    pub fn hold_millis(&mut self, max_millis: u32) -> u32 {
        (self.next_u64() % (u64::from(max_millis) + 1)) as u32
    }
}
