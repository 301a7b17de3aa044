use serde::{Deserialize, Serialize};

/// Media manifest naming the three assets a round needs.
/// Loaded from a JSON string at init; the URIs are opaque to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaManifest {
    /// Full countdown + start video.
    pub video: String,
    /// Countdown audio cue, played alongside the video.
    pub countdown: String,
    /// Start sound, fetched and decoded up front, played on the tap.
    pub start_sound: String,
}

impl MediaManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Append the cache-busting query parameter that defeats stale-asset
/// caching across reloads.
pub fn bust(uri: &str, key: u64) -> String {
    format!("{uri}?t={key}")
}
