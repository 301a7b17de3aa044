pub mod api;
pub mod bridge;
pub mod core;
pub mod input;
pub mod media;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::GameConfig;
pub use api::types::{GameError, GameState, TapDecision, TapRejection};
pub use bridge::protocol::{write_snapshot, IntentWire, ProtocolLayout};
pub use self::core::engine::Engine;
pub use self::core::round::{Deadline, RoundId, RoundTiming};
pub use input::guard::TapGuard;
pub use input::queue::{Intent, IntentQueue};
pub use media::cache::{MediaCache, MediaReadiness};
pub use media::event::{MediaEvent, MediaIntent};
pub use media::manifest::MediaManifest;
pub use media::sync::PlaybackSynchronizer;
pub use systems::hold::HoldRng;
