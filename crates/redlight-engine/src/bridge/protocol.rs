//! SharedArrayBuffer layout.
//! Must stay in sync with TypeScript `protocol.ts`.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Intents: max_intents × 2 floats]
//! ```
//!
//! The header carries the observable game fields the UI renders from plus
//! the intent count; capacities are written once at init and TypeScript
//! reads them to compute offsets dynamically. Strings (asset URIs, error
//! messages) never cross the float buffer; the host reads them
//! through dedicated accessors.

use bytemuck::{Pod, Zeroable};

use crate::core::engine::Engine;
use crate::media::event::MediaIntent;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_GAME_STATE: usize = 2;
pub const HEADER_BUTTON_ACTIVE: usize = 3;
pub const HEADER_IS_LOADING: usize = 4;
pub const HEADER_HAS_VIDEO_ERROR: usize = 5;
pub const HEADER_RESULTS_OPEN: usize = 6;
pub const HEADER_HAS_REACTION: usize = 7;
pub const HEADER_REACTION_MILLIS: usize = 8;
pub const HEADER_ROUND: usize = 9;
pub const HEADER_MAX_INTENTS: usize = 10;
pub const HEADER_INTENT_COUNT: usize = 11;
pub const HEADER_HAS_ROUND_ERROR: usize = 12;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per media intent: kind, payload (wire format, never changes).
pub const INTENT_FLOATS: usize = 2;

/// A media intent as it crosses the SharedArrayBuffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct IntentWire {
    pub kind: f32,
    pub a: f32,
}

impl From<&MediaIntent> for IntentWire {
    fn from(intent: &MediaIntent) -> Self {
        Self {
            kind: intent.kind_code() as f32,
            a: intent.payload(),
        }
    }
}

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    /// Maximum media intents per tick.
    pub max_intents: usize,
    /// Size of the intent section in floats.
    pub intent_data_floats: usize,
    /// Offset (in floats) where intent data begins.
    pub intent_data_offset: usize,
    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub const DEFAULT_MAX_INTENTS: usize = 32;

    pub fn new(max_intents: usize) -> Self {
        let intent_data_floats = max_intents * INTENT_FLOATS;
        let intent_data_offset = HEADER_FLOATS;
        let buffer_total_floats = intent_data_offset + intent_data_floats;
        Self {
            max_intents,
            intent_data_floats,
            intent_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }
}

impl Default for ProtocolLayout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_INTENTS)
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Pack the engine's observable fields and this tick's media intents into
/// the shared buffer. Intents beyond the layout capacity are dropped with a
/// warning (the host would have no slot to read them from).
pub fn write_snapshot(
    buf: &mut [f32],
    layout: &ProtocolLayout,
    engine: &Engine,
    intents: &[MediaIntent],
) {
    debug_assert!(buf.len() >= layout.buffer_total_floats);
    buf[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
    buf[HEADER_FRAME_COUNTER] = engine.frame() as f32;
    buf[HEADER_GAME_STATE] = engine.state().code() as f32;
    buf[HEADER_BUTTON_ACTIVE] = flag(engine.button_active());
    buf[HEADER_IS_LOADING] = flag(engine.is_loading());
    buf[HEADER_HAS_VIDEO_ERROR] = flag(engine.video_error().is_some());
    buf[HEADER_RESULTS_OPEN] = flag(engine.results_open());
    buf[HEADER_HAS_REACTION] = flag(engine.reaction_millis().is_some());
    buf[HEADER_REACTION_MILLIS] = engine.reaction_millis().unwrap_or(0) as f32;
    buf[HEADER_ROUND] = engine.round().0 as f32;
    buf[HEADER_MAX_INTENTS] = layout.max_intents as f32;
    buf[HEADER_HAS_ROUND_ERROR] = flag(engine.last_error().is_some());

    let count = intents.len().min(layout.max_intents);
    if intents.len() > layout.max_intents {
        log::warn!(
            "dropping {} media intents beyond buffer capacity",
            intents.len() - layout.max_intents
        );
    }
    buf[HEADER_INTENT_COUNT] = count as f32;
    for (i, intent) in intents.iter().take(count).enumerate() {
        let wire = IntentWire::from(intent);
        let at = layout.intent_data_offset + i * INTENT_FLOATS;
        buf[at] = wire.kind;
        buf[at + 1] = wire.a;
    }
}
