//! Renderers module for the music box transcriber
//!
//! This module turns tooth bands into output: the strip layout, its SVG
//! drawing and a playback MIDI file.

pub mod layout_engine;
pub mod display_list;
pub mod svg;
pub mod midi;

// Re-export commonly used types
pub use layout_engine::{split_points, LayoutEngine, LayoutSettings, StripScale};
pub use display_list::{GuideKind, GuideLine, Hole, Page, StripLayout};
pub use svg::render_svg;
pub use midi::{bands_to_track, encode_playback};
