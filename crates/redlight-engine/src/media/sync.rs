//! Playback synchronizer: drives the video/countdown elements through
//! intents and watches the reported playback position for the pause
//! threshold.
//!
//! The position watch is a polled check on the host's native
//! position-changed notification, not a fixed timer, so its firing time
//! depends on decode cadence. The design tolerates that jitter: the
//! threshold only gates entry into the randomized hold, and the later
//! resume seeks to an exact position so the player always sees the same
//! clean frame.

use crate::core::round::RoundId;
use crate::media::event::MediaIntent;

#[derive(Debug, Clone, Copy)]
struct Watch {
    threshold_secs: f32,
    round: RoundId,
}

/// Executes the engine's playback intents and owns the single, at-most-once
/// position watch. Registration is per use: once the watch fires it must be
/// re-armed for any subsequent round.
#[derive(Debug, Clone)]
pub struct PlaybackSynchronizer {
    watch: Option<Watch>,
}

impl PlaybackSynchronizer {
    pub fn new() -> Self {
        Self { watch: None }
    }

    /// Reset playback to zero and start video and countdown audio together.
    /// The countdown is only started when its asset loaded; the round runs
    /// without the cue otherwise.
    pub fn begin(&mut self, countdown_loaded: bool, out: &mut Vec<MediaIntent>) {
        out.push(MediaIntent::SeekVideo { secs: 0.0 });
        out.push(MediaIntent::PlayVideo);
        if countdown_loaded {
            out.push(MediaIntent::RewindCountdown);
            out.push(MediaIntent::PlayCountdown);
        }
    }

    /// Arm the position watch for the current round. Replaces any previous
    /// registration.
    pub fn watch_threshold(&mut self, threshold_secs: f32, round: RoundId) {
        self.watch = Some(Watch {
            threshold_secs,
            round,
        });
    }

    /// Feed one position report. When the armed watch's threshold is
    /// reached it pauses video and countdown, rewinds the countdown,
    /// disarms itself and returns `true`, at most once per registration.
    /// Reports from a stale round are ignored.
    pub fn on_position(
        &mut self,
        secs: f32,
        current: RoundId,
        out: &mut Vec<MediaIntent>,
    ) -> bool {
        match self.watch {
            Some(watch) if watch.round == current && secs >= watch.threshold_secs => {
                self.watch = None;
                out.push(MediaIntent::PauseVideo);
                out.push(MediaIntent::PauseCountdown);
                out.push(MediaIntent::RewindCountdown);
                log::debug!("pause threshold reached at {secs:.2}s");
                true
            }
            _ => false,
        }
    }

    /// Seek to the exact resume position, leaving the element paused and
    /// ready for the next play call.
    pub fn resume_from(&mut self, secs: f32, out: &mut Vec<MediaIntent>) {
        out.push(MediaIntent::SeekVideo { secs });
    }

    /// Resume playing from wherever the playhead is parked.
    pub fn play(&mut self, out: &mut Vec<MediaIntent>) {
        out.push(MediaIntent::PlayVideo);
    }

    /// Pause only, no position reset.
    pub fn stop(&mut self, out: &mut Vec<MediaIntent>) {
        out.push(MediaIntent::PauseVideo);
    }

    /// Revoke the watch; a pending threshold report becomes a no-op.
    pub fn cancel_watch(&mut self) {
        self.watch = None;
    }

    pub fn watch_armed(&self) -> bool {
        self.watch.is_some()
    }
}

impl Default for PlaybackSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
