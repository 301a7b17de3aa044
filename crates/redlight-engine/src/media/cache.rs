//! Media cache: owns readiness for the three assets and the cache-bust key.
//!
//! Sans-IO: `load` emits the load/fetch intents and `on_*` fold the host's
//! completion/error notifications back in. The engine reads readiness to
//! gate the `Init -> MissionIntro` transition.

use crate::api::types::GameError;
use crate::media::event::MediaIntent;
use crate::media::manifest::{bust, MediaManifest};

/// Load/decode status of the three assets. Created empty, mutated only by
/// load-completion and error notifications, reset to empty on teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaReadiness {
    /// Video reached playable data. Gates the round start.
    pub video_ready: bool,
    /// Video load failure, surfaced to the UI as a blocking condition.
    pub video_error: Option<String>,
    /// Countdown audio reached playable data.
    pub countdown_ready: bool,
    /// Countdown audio load failed (non-fatal, round runs without the cue).
    pub countdown_failed: bool,
    /// Start sound fetched and decoded into the host's buffer.
    pub audio_decoded: bool,
    /// Start sound fetch/decode failed (non-fatal, round runs silently).
    pub audio_failed: bool,
}

impl MediaReadiness {
    /// Every asset has resolved one way or the other.
    pub fn settled(&self) -> bool {
        (self.video_ready || self.video_error.is_some())
            && (self.countdown_ready || self.countdown_failed)
            && (self.audio_decoded || self.audio_failed)
    }
}

/// Holds the three assets' readiness and the cache-busted URIs the host
/// loads them from. Reconstructed (not reused) across rounds: teardown
/// closes the decoding context, which invalidates the decoded buffer.
#[derive(Debug, Clone)]
pub struct MediaCache {
    manifest: MediaManifest,
    readiness: MediaReadiness,
    bust_key: u64,
    video_uri: String,
    countdown_uri: String,
    start_sound_uri: String,
    /// A load is in flight and readiness has not settled.
    loading: bool,
    /// Sources are set on the host; cleared by teardown.
    active: bool,
}

impl MediaCache {
    pub fn new(manifest: MediaManifest) -> Self {
        Self {
            manifest,
            readiness: MediaReadiness::default(),
            bust_key: 0,
            video_uri: String::new(),
            countdown_uri: String::new(),
            start_sound_uri: String::new(),
            loading: false,
            active: false,
        }
    }

    /// Begin loading all three assets under a fresh cache-bust key.
    /// Resets readiness; completion arrives through the `on_*` methods.
    pub fn load(&mut self, bust_key: u64, out: &mut Vec<MediaIntent>) {
        self.bust_key = bust_key;
        self.readiness = MediaReadiness::default();
        self.video_uri = bust(&self.manifest.video, bust_key);
        self.countdown_uri = bust(&self.manifest.countdown, bust_key);
        self.start_sound_uri = bust(&self.manifest.start_sound, bust_key);
        self.loading = true;
        self.active = true;
        out.push(MediaIntent::LoadVideo { uri: self.video_uri.clone() });
        out.push(MediaIntent::LoadCountdown { uri: self.countdown_uri.clone() });
        out.push(MediaIntent::FetchStartSound { uri: self.start_sound_uri.clone() });
    }

    /// Stop playback, clear sources, release the decoding context and reset
    /// readiness to empty. Idempotent: a second call changes nothing and
    /// emits nothing.
    pub fn teardown(&mut self, out: &mut Vec<MediaIntent>) {
        if !self.active {
            return;
        }
        out.push(MediaIntent::StopVideo);
        out.push(MediaIntent::PauseCountdown);
        out.push(MediaIntent::ClearSources);
        out.push(MediaIntent::CloseAudioContext);
        self.readiness = MediaReadiness::default();
        self.loading = false;
        self.active = false;
    }

    pub fn on_video_loaded(&mut self) {
        self.readiness.video_ready = true;
        self.update_loading();
    }

    pub fn on_video_failed(&mut self, message: String) {
        log::error!("video load failed: {message}");
        self.readiness.video_error = Some(message);
        self.update_loading();
    }

    pub fn on_countdown_loaded(&mut self) {
        self.readiness.countdown_ready = true;
        self.update_loading();
    }

    pub fn on_countdown_failed(&mut self) {
        log::warn!("countdown audio failed to load, round will run without the cue");
        self.readiness.countdown_failed = true;
        self.update_loading();
    }

    pub fn on_start_sound_decoded(&mut self) {
        self.readiness.audio_decoded = true;
        self.update_loading();
    }

    pub fn on_start_sound_failed(&mut self, message: String) {
        log::warn!(
            "{}, round runs silently",
            GameError::AudioDecodeFailure(message)
        );
        self.readiness.audio_failed = true;
        self.update_loading();
    }

    fn update_loading(&mut self) {
        if self.readiness.settled() {
            self.loading = false;
        }
    }

    pub fn readiness(&self) -> &MediaReadiness {
        &self.readiness
    }

    pub fn video_ready(&self) -> bool {
        self.readiness.video_ready
    }

    pub fn video_error(&self) -> Option<&str> {
        self.readiness.video_error.as_deref()
    }

    pub fn audio_decoded(&self) -> bool {
        self.readiness.audio_decoded
    }

    pub fn countdown_ready(&self) -> bool {
        self.readiness.countdown_ready
    }

    pub fn settled(&self) -> bool {
        self.readiness.settled()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn bust_key(&self) -> u64 {
        self.bust_key
    }

    pub fn video_uri(&self) -> &str {
        &self.video_uri
    }

    pub fn countdown_uri(&self) -> &str {
        &self.countdown_uri
    }

    pub fn start_sound_uri(&self) -> &str {
        &self.start_sound_uri
    }
}
