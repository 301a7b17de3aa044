use serde::{Deserialize, Serialize};

/// Configuration for one round of the reaction game, provided by the host.
///
/// The threshold/resume positions are product tuning values, not protocol
/// invariants; nothing in the engine compares against literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Video position (seconds) at which the countdown is paused.
    pub pause_at_secs: f32,
    /// Video position (seconds) the playhead is parked at for the resume,
    /// slightly past the pause threshold so the player always sees the same
    /// clean frame regardless of when the pause actually landed.
    pub resume_at_secs: f32,
    /// Upper bound (milliseconds) of the randomized hold between the pause
    /// and the "go" signal. The hold is drawn uniformly from [0, max].
    pub max_hold_millis: u32,
    /// Fixed dwell (milliseconds) after an accepted tap, letting the start
    /// sound and video feedback play out before the results show.
    pub post_tap_dwell_millis: u32,
    /// Total lifetime (milliseconds) of the mission banner: fade in, hold,
    /// fade out.
    pub banner_millis: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pause_at_secs: 4.20,
            resume_at_secs: 5.21,
            max_hold_millis: 3000,
            post_tap_dwell_millis: 1000,
            banner_millis: 2600,
        }
    }
}

impl GameConfig {
    /// Parse a config from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
