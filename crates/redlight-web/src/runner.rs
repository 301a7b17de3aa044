use redlight_engine::{
    write_snapshot, Engine, GameConfig, Intent, MediaEvent, MediaManifest, ProtocolLayout,
};

/// Wires the engine to the browser loop.
///
/// The host calls `tick(now)` each animation frame after pushing any input
/// and media events; the runner drains the engine's media intents and packs
/// them with the observable game fields into one flat buffer TypeScript
/// reads over the WASM memory. Asset URIs and error messages stay out of
/// the float buffer and are read through the string accessors.
pub struct GameRunner {
    engine: Engine,
    layout: ProtocolLayout,
    snapshot: Vec<f32>,
}

impl GameRunner {
    pub fn new(manifest: MediaManifest, config: GameConfig, seed: u64) -> Self {
        let layout = ProtocolLayout::default();
        let snapshot = vec![0.0; layout.buffer_total_floats];
        Self {
            engine: Engine::new(manifest, config, seed),
            layout,
            snapshot,
        }
    }

    /// Start the initial media preload. Call once after construction.
    pub fn init(&mut self, now_millis: u64) {
        self.engine.init(now_millis);
        self.pack();
    }

    /// Run one frame tick and repack the shared buffer.
    pub fn tick(&mut self, now_millis: u64) {
        self.engine.tick(now_millis);
        self.pack();
    }

    pub fn push_intent(&mut self, intent: Intent) {
        self.engine.push_intent(intent);
    }

    pub fn push_media_event(&mut self, event: MediaEvent) {
        self.engine.push_media_event(event);
    }

    fn pack(&mut self) {
        let intents = self.engine.drain_media_intents();
        write_snapshot(&mut self.snapshot, &self.layout, &self.engine, &intents);
    }

    // ---- Pointer accessors for shared-memory reads ----

    pub fn snapshot_ptr(&self) -> *const f32 {
        self.snapshot.as_ptr()
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }

    pub fn max_intents(&self) -> u32 {
        self.layout.max_intents as u32
    }

    // ---- String accessors (read by TypeScript via wasm_bindgen exports) ----

    pub fn video_uri(&self) -> String {
        self.engine.cache().video_uri().to_string()
    }

    pub fn countdown_uri(&self) -> String {
        self.engine.cache().countdown_uri().to_string()
    }

    pub fn start_sound_uri(&self) -> String {
        self.engine.cache().start_sound_uri().to_string()
    }

    pub fn video_error_message(&self) -> Option<String> {
        self.engine.video_error().map(str::to_string)
    }

    pub fn round_error_message(&self) -> Option<String> {
        self.engine.error_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redlight_engine::bridge::protocol::{
        HEADER_HAS_ROUND_ERROR, HEADER_INTENT_COUNT, HEADER_IS_LOADING,
    };

    fn runner() -> GameRunner {
        let manifest = MediaManifest {
            video: "v.mp4".into(),
            countdown: "c.mp3".into(),
            start_sound: "s.mp3".into(),
        };
        GameRunner::new(manifest, GameConfig::default(), 7)
    }

    #[test]
    fn init_packs_load_intents() {
        let mut r = runner();
        r.init(1000);
        assert_eq!(r.snapshot[HEADER_INTENT_COUNT], 3.0);
        assert_eq!(r.snapshot[HEADER_IS_LOADING], 1.0);
        assert_eq!(r.video_uri(), "v.mp4?t=1000");
    }

    #[test]
    fn round_error_is_readable_after_play_rejection() {
        let mut r = runner();
        r.init(0);
        r.push_media_event(MediaEvent::VideoLoaded);
        r.push_media_event(MediaEvent::CountdownLoaded);
        r.push_media_event(MediaEvent::StartSoundDecoded);
        r.tick(10);
        r.push_intent(Intent::RequestStart);
        r.tick(20);
        r.tick(20_000);
        r.push_media_event(MediaEvent::VideoPlayRejected {
            message: "NotAllowedError".into(),
        });
        r.tick(20_016);
        assert_eq!(r.snapshot[HEADER_HAS_ROUND_ERROR], 1.0);
        assert!(r
            .round_error_message()
            .is_some_and(|m| m.contains("NotAllowedError")));
    }

    #[test]
    fn tick_clears_consumed_intents() {
        let mut r = runner();
        r.init(1000);
        r.push_media_event(MediaEvent::VideoLoaded);
        r.tick(1016);
        // Load intents were drained at init; a quiet tick packs none.
        assert_eq!(r.snapshot[HEADER_INTENT_COUNT], 0.0);
    }
}
