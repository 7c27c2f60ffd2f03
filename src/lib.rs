//! Music box strip transcriber WASM Module
//!
//! Converts Standard MIDI Files into punched paper strips for mechanical music
//! box combs: hole layouts split into printable pages, an SVG drawing of them,
//! and a playback MIDI file of what the comb will sound like.

pub mod models;
pub mod converters;
pub mod transposition;
pub mod transcription;
pub mod renderers;
pub mod api;

// Re-export commonly used types
pub use models::{InstrumentCatalog, InstrumentModel, NoteEvent, Performance, ToothBands};
pub use transcription::{
    transcribe, transcribe_with_model, TranscribeError, TranscribeResult, TranscribeSettings, Transcription,
    TranscriptionReport,
};
pub use transposition::TransposeMode;
pub use renderers::{LayoutSettings, StripLayout};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    init_logging();
    log::info!("Music box transcriber WASM module initialized");
}

#[cfg(feature = "console_log")]
fn init_logging() {
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        wasm_warn!("logger already initialized: {}", e);
    }
}

#[cfg(not(feature = "console_log"))]
fn init_logging() {}
