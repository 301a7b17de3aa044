//! The timing engine: owns the game state and sequences one round of
//! preload -> countdown -> randomized hold -> input window -> scoring ->
//! reset.
//!
//! Host-driven and single-threaded: the host calls [`Engine::tick`] once per
//! animation frame with its monotonic clock, pushes intents and media events
//! beforehand, and drains the engine's media intents afterwards. Every timer
//! is a round-stamped deadline checked against the supplied clock, so a
//! stale expiry or a stale position report after a reset is a no-op.

use crate::api::config::GameConfig;
use crate::api::types::{GameError, GameState, TapDecision};
use crate::core::round::{Deadline, RoundId, RoundTiming};
use crate::input::guard::TapGuard;
use crate::input::queue::{Intent, IntentQueue};
use crate::media::cache::MediaCache;
use crate::media::event::{MediaEvent, MediaIntent};
use crate::media::manifest::MediaManifest;
use crate::media::sync::PlaybackSynchronizer;
use crate::systems::hold::HoldRng;

pub struct Engine {
    config: GameConfig,
    cache: MediaCache,
    sync: PlaybackSynchronizer,
    guard: TapGuard,
    intents: IntentQueue,
    media_events: Vec<MediaEvent>,
    /// Media intents awaiting the host; drained after each tick.
    out: Vec<MediaIntent>,
    rng: HoldRng,

    state: GameState,
    round: RoundId,
    timing: RoundTiming,
    /// The input window: a tap is only eligible while this is set.
    window_active: bool,
    results_open: bool,
    /// Loading indicator for the idle screen, re-asserted when a start
    /// request arrives before media is ready.
    loading_hint: bool,
    /// The round-fatal error, if any, for the presentation layer to poll.
    error: Option<GameError>,

    banner_deadline: Option<Deadline>,
    hold_deadline: Option<Deadline>,
    dwell_deadline: Option<Deadline>,
    frame: u64,
}

impl Engine {
    pub fn new(manifest: MediaManifest, config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            cache: MediaCache::new(manifest),
            sync: PlaybackSynchronizer::new(),
            guard: TapGuard::new(),
            intents: IntentQueue::new(),
            media_events: Vec::with_capacity(8),
            out: Vec::with_capacity(16),
            rng: HoldRng::new(seed),
            state: GameState::Init,
            round: RoundId(0),
            timing: RoundTiming::default(),
            window_active: false,
            results_open: false,
            loading_hint: false,
            error: None,
            banner_deadline: None,
            hold_deadline: None,
            dwell_deadline: None,
            frame: 0,
        }
    }

    /// Kick off the initial media preload. Call once after construction.
    pub fn init(&mut self, now_millis: u64) {
        self.loading_hint = true;
        self.cache.load(now_millis, &mut self.out);
    }

    /// Push a player/UI intent; processed on the next tick.
    pub fn push_intent(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Push a host media notification; processed on the next tick.
    pub fn push_media_event(&mut self, event: MediaEvent) {
        self.media_events.push(event);
    }

    /// Run one engine tick: fold in media events, process intents, then
    /// fire any due deadlines. `now_millis` is the host's monotonic clock.
    pub fn tick(&mut self, now_millis: u64) {
        self.frame += 1;
        let media = std::mem::take(&mut self.media_events);
        for event in media {
            self.handle_media_event(event, now_millis);
        }
        let intents = self.intents.drain();
        for intent in intents {
            self.handle_intent(intent, now_millis);
        }
        self.check_deadlines(now_millis);
    }

    /// Take the media intents accumulated since the last drain. The host
    /// executes them in order on its video/audio elements.
    pub fn drain_media_intents(&mut self) -> Vec<MediaIntent> {
        std::mem::take(&mut self.out)
    }

    fn handle_media_event(&mut self, event: MediaEvent, now: u64) {
        match event {
            MediaEvent::VideoLoaded => {
                self.cache.on_video_loaded();
                self.after_load_progress();
            }
            MediaEvent::VideoLoadFailed { message } => {
                self.error = Some(GameError::MediaLoadFailure(message.clone()));
                self.cache.on_video_failed(message);
                self.after_load_progress();
            }
            MediaEvent::CountdownLoaded => {
                self.cache.on_countdown_loaded();
                self.after_load_progress();
            }
            MediaEvent::CountdownLoadFailed => {
                self.cache.on_countdown_failed();
                self.after_load_progress();
            }
            MediaEvent::StartSoundDecoded => {
                self.cache.on_start_sound_decoded();
                self.after_load_progress();
            }
            MediaEvent::StartSoundDecodeFailed { message } => {
                self.cache.on_start_sound_failed(message);
                self.after_load_progress();
            }
            MediaEvent::VideoPosition { secs } => {
                if self.state != GameState::Playing {
                    return;
                }
                if self.sync.on_position(secs, self.round, &mut self.out) {
                    let hold = self.rng.hold_millis(self.config.max_hold_millis);
                    log::debug!("threshold reached, holding for {hold}ms");
                    self.hold_deadline = Some(Deadline::new(now + u64::from(hold), self.round));
                }
            }
            MediaEvent::VideoPlayRejected { message }
            | MediaEvent::CountdownPlayRejected { message } => {
                if matches!(self.state, GameState::Playing | GameState::WaitingForTap) {
                    self.fail_round(GameError::PlaybackRejected(message));
                } else {
                    log::warn!("playback rejection outside an active round: {message}");
                }
            }
        }
    }

    /// Media readiness moved; settle the loading indicator and finish a
    /// pending reset once everything resolved.
    fn after_load_progress(&mut self) {
        if !self.cache.settled() {
            return;
        }
        self.loading_hint = false;
        if self.state == GameState::Reloading {
            // The only path back to Init. Fresh round: all per-round data
            // and both guard latches go with the old one.
            self.timing.clear();
            self.guard.clear();
            self.window_active = false;
            // A failed reload still comes back to Init, with the fresh
            // load's blocking error exposed in place of the old round's.
            self.error = self
                .cache
                .video_error()
                .map(|m| GameError::MediaLoadFailure(m.to_string()));
            self.state = GameState::Init;
            log::info!("media reloaded, back to init (round {})", self.round.0);
        }
    }

    fn handle_intent(&mut self, intent: Intent, now: u64) {
        match intent {
            Intent::RequestStart => self.request_start(now),
            Intent::Tap => self.tap(now),
            Intent::Retry => self.retry(now),
            Intent::CloseResults => {
                self.results_open = false;
            }
        }
    }

    fn request_start(&mut self, now: u64) {
        if self.state != GameState::Init {
            log::warn!(
                "{}",
                GameError::InvalidTransitionRequest("start outside init")
            );
            return;
        }
        if self.cache.video_error().is_some() {
            // Blocking condition: the UI is already showing the error.
            log::warn!("start requested but video failed to load");
            return;
        }
        if !self.cache.video_ready() {
            self.loading_hint = true;
            log::debug!("start requested before media ready, showing loader");
            return;
        }
        self.loading_hint = false;
        // A stale round-fatal error from a previous attempt ends here.
        self.error = None;
        self.state = GameState::MissionIntro;
        self.banner_deadline = Some(Deadline::new(
            now + u64::from(self.config.banner_millis),
            self.round,
        ));
    }

    fn tap(&mut self, now: u64) {
        match self.guard.try_accept(self.state, self.window_active) {
            TapDecision::Accepted => {
                let Some(reaction) = self.timing.stamp_tap(now) else {
                    // Guard state check makes this unreachable; recover the
                    // latches anyway rather than wedge the round.
                    log::error!("tap accepted without a go timestamp");
                    self.guard.clear();
                    return;
                };
                log::info!("tap scored: {reaction}ms");
                self.window_active = false;
                if self.cache.audio_decoded() {
                    self.out.push(MediaIntent::PlayStartSound);
                }
                // Resume the start video synchronously with the tap.
                self.sync.play(&mut self.out);
                self.dwell_deadline = Some(Deadline::new(
                    now + u64::from(self.config.post_tap_dwell_millis),
                    self.round,
                ));
            }
            TapDecision::Rejected(reason) => {
                log::debug!("{}", GameError::InvalidTap(reason));
            }
        }
    }

    /// Lifecycle reset. Legal only from `Results`; the full teardown +
    /// reload reconstructs the media cache (the decoding context cannot be
    /// reused once closed).
    fn retry(&mut self, now: u64) {
        if self.state != GameState::Results {
            log::warn!(
                "{}",
                GameError::InvalidTransitionRequest("retry outside results")
            );
            return;
        }
        self.results_open = false;
        self.cache.teardown(&mut self.out);
        self.state = GameState::Reloading;
        self.loading_hint = true;
        self.round = self.round.next();
        self.banner_deadline = None;
        self.hold_deadline = None;
        self.dwell_deadline = None;
        self.sync.cancel_watch();
        self.timing.clear();
        self.guard.clear();
        self.window_active = false;
        self.error = None;
        self.cache.load(now, &mut self.out);
    }

    /// Abandon the round: revoke everything pending and fall back to Init
    /// with the error exposed. Terminal for the round, not retried.
    fn fail_round(&mut self, error: GameError) {
        log::error!("{error}");
        self.error = Some(error);
        self.banner_deadline = None;
        self.hold_deadline = None;
        self.dwell_deadline = None;
        self.sync.cancel_watch();
        self.guard.clear();
        self.window_active = false;
        self.results_open = false;
        self.timing.clear();
        self.sync.stop(&mut self.out);
        self.out.push(MediaIntent::PauseCountdown);
        self.state = GameState::Init;
    }

    fn check_deadlines(&mut self, now: u64) {
        if let Some(deadline) = self.banner_deadline {
            if deadline.due(now, self.round) && self.state == GameState::MissionIntro {
                self.banner_deadline = None;
                self.state = GameState::Playing;
                self.sync.begin(self.cache.countdown_ready(), &mut self.out);
                self.sync
                    .watch_threshold(self.config.pause_at_secs, self.round);
            }
        }
        if let Some(deadline) = self.hold_deadline {
            // A reset may have happened during the hold; the state check,
            // not a cleared flag, is what makes a stale expiry a no-op.
            if deadline.due(now, self.round) && self.state == GameState::Playing {
                self.hold_deadline = None;
                self.sync
                    .resume_from(self.config.resume_at_secs, &mut self.out);
                self.timing.stamp_go(now);
                self.window_active = true;
                self.state = GameState::WaitingForTap;
                log::debug!("input window open at {now}");
            }
        }
        if let Some(deadline) = self.dwell_deadline {
            if deadline.due(now, self.round)
                && self.state == GameState::WaitingForTap
                && self.timing.reaction_millis.is_some()
            {
                self.dwell_deadline = None;
                self.state = GameState::Results;
                self.results_open = true;
                self.guard.clear();
                // Modal time doubles as preload time for the next round;
                // retry still tears down and reloads from scratch.
                self.cache.load(now, &mut self.out);
            }
        }
    }

    // ---- Observable fields for the presentation/visual boundary ----

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    pub fn timing(&self) -> &RoundTiming {
        &self.timing
    }

    pub fn button_active(&self) -> bool {
        self.window_active
    }

    pub fn results_open(&self) -> bool {
        self.results_open
    }

    pub fn is_loading(&self) -> bool {
        self.loading_hint || self.state == GameState::Reloading
    }

    pub fn video_error(&self) -> Option<&str> {
        self.cache.video_error()
    }

    pub fn reaction_millis(&self) -> Option<u32> {
        self.timing.reaction_millis
    }

    pub fn last_error(&self) -> Option<&GameError> {
        self.error.as_ref()
    }

    /// Rendered form of the round-fatal error for the host's error banner.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::GameState as S;

    fn manifest() -> MediaManifest {
        MediaManifest {
            video: "v.mp4".into(),
            countdown: "c.mp3".into(),
            start_sound: "s.mp3".into(),
        }
    }

    fn new_engine(max_hold_millis: u32) -> Engine {
        let config = GameConfig {
            max_hold_millis,
            ..GameConfig::default()
        };
        Engine::new(manifest(), config, 42)
    }

    fn settle_media(engine: &mut Engine) {
        engine.push_media_event(MediaEvent::VideoLoaded);
        engine.push_media_event(MediaEvent::CountdownLoaded);
        engine.push_media_event(MediaEvent::StartSoundDecoded);
    }

    /// Drive a fresh engine to `WaitingForTap`. Returns the go instant.
    fn open_input_window(engine: &mut Engine) -> u64 {
        engine.init(0);
        settle_media(engine);
        engine.tick(10);
        assert_eq!(engine.state(), S::Init);
        assert!(!engine.is_loading());

        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        assert_eq!(engine.state(), S::MissionIntro);

        let banner_done = 20 + u64::from(engine.config.banner_millis);
        engine.tick(banner_done);
        assert_eq!(engine.state(), S::Playing);

        engine.push_media_event(MediaEvent::VideoPosition { secs: 4.20 });
        engine.tick(banner_done + 100);

        // Jump safely past any possible hold.
        let after_hold = banner_done + 100 + u64::from(engine.config.max_hold_millis) + 1;
        engine.tick(after_hold);
        assert_eq!(engine.state(), S::WaitingForTap);
        engine.timing().go_at.expect("go must be stamped")
    }

    #[test]
    fn zero_hold_opens_window_at_threshold_tick() {
        // Scenario: media ready, start, banner completes, threshold at
        // 4.20s, hold of 0ms: the window opens in the same tick.
        let mut engine = new_engine(0);
        engine.init(0);
        settle_media(&mut engine);
        engine.tick(10);
        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        let banner_done = 20 + u64::from(engine.config.banner_millis);
        engine.tick(banner_done);
        assert_eq!(engine.state(), S::Playing);

        engine.push_media_event(MediaEvent::VideoPosition { secs: 4.20 });
        engine.tick(banner_done + 50);
        assert_eq!(engine.state(), S::WaitingForTap);
        assert_eq!(engine.timing().go_at, Some(banner_done + 50));
        assert!(engine.button_active());
    }

    #[test]
    fn reaction_time_is_tap_minus_go() {
        let mut engine = new_engine(3000);
        let go = open_input_window(&mut engine);

        engine.push_intent(Intent::Tap);
        engine.tick(go + 250);
        assert_eq!(engine.reaction_millis(), Some(250));
        assert_eq!(engine.state(), S::WaitingForTap);
        assert!(!engine.button_active());

        // After the dwell the results open with the value exposed.
        engine.tick(go + 250 + u64::from(engine.config.post_tap_dwell_millis));
        assert_eq!(engine.state(), S::Results);
        assert!(engine.results_open());
        assert_eq!(engine.reaction_millis(), Some(250));
    }

    #[test]
    fn back_to_back_taps_score_once() {
        let mut engine = new_engine(3000);
        let go = open_input_window(&mut engine);

        // Touch + click from the same physical tap, same tick.
        engine.push_intent(Intent::Tap);
        engine.push_intent(Intent::Tap);
        engine.tick(go + 100);
        assert_eq!(engine.reaction_millis(), Some(100));
        assert_eq!(engine.timing().tap_at, Some(go + 100));

        // A later tap while the first is still dwelling changes nothing.
        engine.push_intent(Intent::Tap);
        engine.tick(go + 300);
        assert_eq!(engine.reaction_millis(), Some(100));
    }

    #[test]
    fn tap_before_window_never_stamps() {
        let mut engine = new_engine(3000);
        engine.init(0);
        settle_media(&mut engine);
        engine.tick(10);
        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        let banner_done = 20 + u64::from(engine.config.banner_millis);
        engine.tick(banner_done);
        assert_eq!(engine.state(), S::Playing);

        engine.push_intent(Intent::Tap);
        engine.tick(banner_done + 10);
        assert_eq!(engine.timing().tap_at, None);
        assert_eq!(engine.state(), S::Playing);
    }

    #[test]
    fn video_load_failure_blocks_start() {
        let mut engine = new_engine(3000);
        engine.init(0);
        engine.push_media_event(MediaEvent::VideoLoadFailed {
            message: "network".into(),
        });
        engine.push_media_event(MediaEvent::CountdownLoaded);
        engine.push_media_event(MediaEvent::StartSoundDecoded);
        engine.tick(10);
        assert_eq!(engine.video_error(), Some("network"));

        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        assert_eq!(engine.state(), S::Init);
        assert!(matches!(
            engine.last_error(),
            Some(GameError::MediaLoadFailure(_))
        ));
    }

    #[test]
    fn start_before_ready_shows_loader() {
        let mut engine = new_engine(3000);
        engine.init(0);
        engine.tick(5);
        engine.push_intent(Intent::RequestStart);
        engine.tick(10);
        assert_eq!(engine.state(), S::Init);
        assert!(engine.is_loading());
    }

    #[test]
    fn restart_routes_through_reloading() {
        let mut engine = new_engine(3000);
        let go = open_input_window(&mut engine);
        engine.push_intent(Intent::Tap);
        engine.tick(go + 200);
        engine.tick(go + 200 + u64::from(engine.config.post_tap_dwell_millis));
        assert_eq!(engine.state(), S::Results);
        let old_round = engine.round();
        engine.drain_media_intents();

        engine.push_intent(Intent::Retry);
        engine.tick(go + 5000);
        assert_eq!(engine.state(), S::Reloading);
        assert!(engine.is_loading());
        assert!(!engine.results_open());
        assert_eq!(engine.timing(), &RoundTiming::default());
        assert_ne!(engine.round(), old_round);

        let intents = engine.drain_media_intents();
        assert!(intents.contains(&MediaIntent::ClearSources));
        assert!(intents.contains(&MediaIntent::CloseAudioContext));
        assert!(intents
            .iter()
            .any(|i| matches!(i, MediaIntent::LoadVideo { .. })));

        // Reloading -> Init only once the fresh load settles.
        engine.tick(go + 5100);
        assert_eq!(engine.state(), S::Reloading);
        settle_media(&mut engine);
        engine.tick(go + 5200);
        assert_eq!(engine.state(), S::Init);
        assert_eq!(engine.reaction_millis(), None);
        assert!(!engine.button_active());
    }

    #[test]
    fn retry_outside_results_is_ignored() {
        let mut engine = new_engine(3000);
        let _go = open_input_window(&mut engine);
        let round = engine.round();
        engine.push_intent(Intent::Retry);
        engine.tick(99_999);
        assert_eq!(engine.state(), S::WaitingForTap);
        assert_eq!(engine.round(), round);
    }

    #[test]
    fn playback_rejection_abandons_round() {
        let mut engine = new_engine(3000);
        engine.init(0);
        settle_media(&mut engine);
        engine.tick(10);
        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        let banner_done = 20 + u64::from(engine.config.banner_millis);
        engine.tick(banner_done);
        engine.push_media_event(MediaEvent::VideoPosition { secs: 4.5 });
        engine.tick(banner_done + 10);
        // Hold is pending now; the rejection must revoke it.
        engine.push_media_event(MediaEvent::VideoPlayRejected {
            message: "NotAllowedError".into(),
        });
        engine.tick(banner_done + 20);
        assert_eq!(engine.state(), S::Init);
        assert!(matches!(
            engine.last_error(),
            Some(GameError::PlaybackRejected(_))
        ));

        // Stale hold expiry long after: must not reopen the window.
        engine.tick(banner_done + 100_000);
        assert_eq!(engine.state(), S::Init);
        assert_eq!(engine.timing().go_at, None);
    }

    #[test]
    fn new_round_clears_stale_playback_error() {
        let mut engine = new_engine(3000);
        engine.init(0);
        settle_media(&mut engine);
        engine.tick(10);
        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        engine.tick(20 + u64::from(engine.config.banner_millis));
        engine.push_media_event(MediaEvent::VideoPlayRejected {
            message: "NotAllowedError".into(),
        });
        engine.tick(10_000);
        assert_eq!(engine.state(), S::Init);
        assert!(engine.last_error().is_some());

        // Media is still loaded; a fresh start must not carry the old
        // round's error into the new one.
        engine.push_intent(Intent::RequestStart);
        engine.tick(10_100);
        assert_eq!(engine.state(), S::MissionIntro);
        assert_eq!(engine.last_error(), None);
        assert_eq!(engine.error_message(), None);
    }

    #[test]
    fn stale_position_report_after_abandon_is_noop() {
        let mut engine = new_engine(3000);
        engine.init(0);
        settle_media(&mut engine);
        engine.tick(10);
        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        let banner_done = 20 + u64::from(engine.config.banner_millis);
        engine.tick(banner_done);
        engine.push_media_event(MediaEvent::CountdownPlayRejected {
            message: "blocked".into(),
        });
        engine.tick(banner_done + 10);
        assert_eq!(engine.state(), S::Init);
        engine.drain_media_intents();

        engine.push_media_event(MediaEvent::VideoPosition { secs: 9.0 });
        engine.tick(banner_done + 20);
        assert_eq!(engine.state(), S::Init);
        assert!(engine.drain_media_intents().is_empty());
    }

    #[test]
    fn go_always_precedes_tap() {
        let mut engine = new_engine(0);
        let go = open_input_window(&mut engine);
        engine.push_intent(Intent::Tap);
        engine.tick(go + 123);
        let timing = engine.timing();
        assert!(timing.go_at.unwrap() < timing.tap_at.unwrap());
        assert_eq!(
            timing.reaction_millis.unwrap() as u64,
            timing.tap_at.unwrap() - timing.go_at.unwrap()
        );
    }

    #[test]
    fn begin_emits_playback_intents() {
        let mut engine = new_engine(3000);
        engine.init(0);
        settle_media(&mut engine);
        engine.tick(10);
        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        engine.drain_media_intents();

        let banner_done = 20 + u64::from(engine.config.banner_millis);
        engine.tick(banner_done);
        let intents = engine.drain_media_intents();
        assert_eq!(
            intents,
            vec![
                MediaIntent::SeekVideo { secs: 0.0 },
                MediaIntent::PlayVideo,
                MediaIntent::RewindCountdown,
                MediaIntent::PlayCountdown,
            ]
        );
    }

    #[test]
    fn hold_expiry_parks_playhead_at_resume_position() {
        let mut engine = new_engine(0);
        engine.init(0);
        settle_media(&mut engine);
        engine.tick(10);
        engine.push_intent(Intent::RequestStart);
        engine.tick(20);
        let banner_done = 20 + u64::from(engine.config.banner_millis);
        engine.tick(banner_done);
        engine.drain_media_intents();

        engine.push_media_event(MediaEvent::VideoPosition { secs: 4.21 });
        engine.tick(banner_done + 30);
        let intents = engine.drain_media_intents();
        let resume = engine.config.resume_at_secs;
        assert!(intents.contains(&MediaIntent::PauseVideo));
        assert!(intents.contains(&MediaIntent::SeekVideo { secs: resume }));
    }
}
