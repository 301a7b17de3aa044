pub mod runner;

pub use runner::GameRunner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use redlight_engine::{GameConfig, Intent, MediaEvent, MediaManifest};

thread_local! {
    static RUNNER: RefCell<Option<GameRunner>> = RefCell::new(None);
}

fn with_runner<R>(f: impl FnOnce(&mut GameRunner) -> R) -> R {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .expect("Game not initialized. Call game_init() first.");
        f(runner)
    })
}

/// Construct the engine and start the initial media preload.
///
/// `manifest_json` names the three asset URIs, `config_json` overrides the
/// round constants (empty object for defaults), `seed` pins the hold RNG
/// and `now_millis` is the host's monotonic clock (also the first
/// cache-bust key).
#[wasm_bindgen]
pub fn game_init(
    manifest_json: &str,
    config_json: &str,
    seed: u64,
    now_millis: f64,
) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let manifest = MediaManifest::from_json(manifest_json)
        .map_err(|e| JsValue::from_str(&format!("bad media manifest: {e}")))?;
    let config = GameConfig::from_json(config_json)
        .map_err(|e| JsValue::from_str(&format!("bad game config: {e}")))?;

    let mut runner = GameRunner::new(manifest, config, seed);
    runner.init(now_millis as u64);

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("redlight: initialized");
    Ok(())
}

/// One frame tick. Push input/media events first, read the buffer after.
#[wasm_bindgen]
pub fn game_tick(now_millis: f64) {
    with_runner(|r| r.tick(now_millis as u64));
}

// ---- Player/UI intents ----

#[wasm_bindgen]
pub fn game_request_start() {
    with_runner(|r| r.push_intent(Intent::RequestStart));
}

#[wasm_bindgen]
pub fn game_tap() {
    with_runner(|r| r.push_intent(Intent::Tap));
}

#[wasm_bindgen]
pub fn game_retry() {
    with_runner(|r| r.push_intent(Intent::Retry));
}

#[wasm_bindgen]
pub fn game_close_results() {
    with_runner(|r| r.push_intent(Intent::CloseResults));
}

// ---- Media notifications (forwarded from element listeners) ----

#[wasm_bindgen]
pub fn media_video_loaded() {
    with_runner(|r| r.push_media_event(MediaEvent::VideoLoaded));
}

#[wasm_bindgen]
pub fn media_video_load_failed(message: String) {
    with_runner(|r| r.push_media_event(MediaEvent::VideoLoadFailed { message }));
}

#[wasm_bindgen]
pub fn media_countdown_loaded() {
    with_runner(|r| r.push_media_event(MediaEvent::CountdownLoaded));
}

#[wasm_bindgen]
pub fn media_countdown_load_failed() {
    with_runner(|r| r.push_media_event(MediaEvent::CountdownLoadFailed));
}

#[wasm_bindgen]
pub fn media_start_sound_decoded() {
    with_runner(|r| r.push_media_event(MediaEvent::StartSoundDecoded));
}

#[wasm_bindgen]
pub fn media_start_sound_decode_failed(message: String) {
    with_runner(|r| r.push_media_event(MediaEvent::StartSoundDecodeFailed { message }));
}

#[wasm_bindgen]
pub fn media_video_position(secs: f32) {
    with_runner(|r| r.push_media_event(MediaEvent::VideoPosition { secs }));
}

#[wasm_bindgen]
pub fn media_video_play_rejected(message: String) {
    with_runner(|r| r.push_media_event(MediaEvent::VideoPlayRejected { message }));
}

#[wasm_bindgen]
pub fn media_countdown_play_rejected(message: String) {
    with_runner(|r| r.push_media_event(MediaEvent::CountdownPlayRejected { message }));
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_snapshot_ptr() -> *const f32 {
    with_runner(|r| r.snapshot_ptr())
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats())
}

#[wasm_bindgen]
pub fn get_max_intents() -> u32 {
    with_runner(|r| r.max_intents())
}

#[wasm_bindgen]
pub fn get_video_uri() -> String {
    with_runner(|r| r.video_uri())
}

#[wasm_bindgen]
pub fn get_countdown_uri() -> String {
    with_runner(|r| r.countdown_uri())
}

#[wasm_bindgen]
pub fn get_start_sound_uri() -> String {
    with_runner(|r| r.start_sound_uri())
}

#[wasm_bindgen]
pub fn get_video_error_message() -> Option<String> {
    with_runner(|r| r.video_error_message())
}

#[wasm_bindgen]
pub fn get_round_error_message() -> Option<String> {
    with_runner(|r| r.round_error_message())
}
