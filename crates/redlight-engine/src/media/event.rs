//! Media traffic between the engine and the host.
//!
//! The engine never touches a media element. It emits [`MediaIntent`]s the
//! host executes on its video/audio elements, and consumes [`MediaEvent`]s
//! the host forwards from native playback notifications.

/// A command the engine issues to the host's media layer.
///
/// Load/fetch intents carry the cache-busted URI; everything else acts on
/// the elements the host already holds.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaIntent {
    /// Set the video source and preload it.
    LoadVideo { uri: String },
    /// Set the countdown audio source and preload it.
    LoadCountdown { uri: String },
    /// Fetch and decode the start sound into an in-memory buffer.
    FetchStartSound { uri: String },
    PlayVideo,
    PlayCountdown,
    PauseVideo,
    PauseCountdown,
    /// Reset the countdown audio position to zero.
    RewindCountdown,
    /// Seek the video to an exact position. Does not start or stop
    /// playback on its own.
    SeekVideo { secs: f32 },
    /// Play the decoded start-sound buffer once.
    PlayStartSound,
    StopVideo,
    /// Clear both element sources.
    ClearSources,
    /// Release the decoding context. A fresh one is created on reload.
    CloseAudioContext,
}

impl MediaIntent {
    /// Stable wire encoding for the intent buffer the host drains each tick.
    /// Load intents keep their URIs out of the float buffer; the host reads
    /// those through the string accessors.
    pub fn kind_code(&self) -> u32 {
        match self {
            MediaIntent::LoadVideo { .. } => 1,
            MediaIntent::LoadCountdown { .. } => 2,
            MediaIntent::FetchStartSound { .. } => 3,
            MediaIntent::PlayVideo => 4,
            MediaIntent::PlayCountdown => 5,
            MediaIntent::PauseVideo => 6,
            MediaIntent::PauseCountdown => 7,
            MediaIntent::RewindCountdown => 8,
            MediaIntent::SeekVideo { .. } => 9,
            MediaIntent::PlayStartSound => 10,
            MediaIntent::StopVideo => 11,
            MediaIntent::ClearSources => 12,
            MediaIntent::CloseAudioContext => 13,
        }
    }

    /// Numeric payload for the wire encoding (seek position, else zero).
    pub fn payload(&self) -> f32 {
        match self {
            MediaIntent::SeekVideo { secs } => *secs,
            _ => 0.0,
        }
    }
}

/// A native media notification forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// The video reached playable data.
    VideoLoaded,
    /// The video source errored. Blocks the round from starting.
    VideoLoadFailed { message: String },
    /// The countdown audio reached playable data.
    CountdownLoaded,
    /// The countdown audio failed to load. Non-fatal.
    CountdownLoadFailed,
    /// The start sound was fetched and decoded.
    StartSoundDecoded,
    /// The start sound failed to fetch or decode. Non-fatal.
    StartSoundDecodeFailed { message: String },
    /// A playback-position notification (`timeupdate`) from the video.
    VideoPosition { secs: f32 },
    /// The video play() promise rejected.
    VideoPlayRejected { message: String },
    /// The countdown audio play() promise rejected.
    CountdownPlayRejected { message: String },
}
