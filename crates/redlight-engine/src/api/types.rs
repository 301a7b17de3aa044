use thiserror::Error;

/// The game's single state value. Transitions run strictly forward along
/// the round cycle; `Reloading -> Init` is the only reset path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Idle start screen; media may still be loading.
    Init,
    /// Mission banner is fading in/out.
    MissionIntro,
    /// Countdown video is running toward the pause threshold.
    Playing,
    /// Input window: the "go" signal fired, a tap is eligible to score.
    WaitingForTap,
    /// Round scored, results modal shown.
    Results,
    /// Media torn down and reloading after a retry.
    Reloading,
}

impl GameState {
    /// Stable wire encoding read by the TypeScript host.
    pub fn code(self) -> u32 {
        match self {
            GameState::Init => 0,
            GameState::MissionIntro => 1,
            GameState::Playing => 2,
            GameState::WaitingForTap => 3,
            GameState::Results => 4,
            GameState::Reloading => 5,
        }
    }
}

/// Why a tap was not scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapRejection {
    /// A duplicate event from the same physical tap (touch + click).
    Debounced,
    /// A previous tap is still being scored/animated.
    AlreadyProcessing,
    /// Game state is not `WaitingForTap`.
    WrongState,
    /// The input window has not opened yet.
    ButtonInactive,
}

/// Outcome of offering a tap to the input guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapDecision {
    Accepted,
    Rejected(TapRejection),
}

/// Everything that can go wrong during a round. Nothing here is fatal to
/// the process: fatal-to-round errors force a state transition, the rest
/// are logged and ignored.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    /// Video failed to load. Blocks the round from starting.
    #[error("failed to load video: {0}")]
    MediaLoadFailure(String),
    /// Start-sound decode failed. The round proceeds silently.
    #[error("failed to decode start sound: {0}")]
    AudioDecodeFailure(String),
    /// A playback promise rejected mid-round. The round is abandoned.
    #[error("media playback rejected: {0}")]
    PlaybackRejected(String),
    /// A tap arrived that the guard refused.
    #[error("tap rejected: {0:?}")]
    InvalidTap(TapRejection),
    /// A lifecycle action was requested from the wrong state.
    #[error("invalid transition request: {0}")]
    InvalidTransitionRequest(&'static str),
}
