//! Format converters
//!
//! This module contains the binary Standard MIDI File reader and writer.

pub mod smf;

// Re-export for convenience
pub use smf::{parse_smf, write_smf, Header, MidiEvent, OutputTrack, Smf, SmfError, TrackEvent};
