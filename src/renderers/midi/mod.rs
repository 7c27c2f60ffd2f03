//! Playback MIDI export
//!
//! Re-encodes the punched bands as a format 0 Standard MIDI File so a strip
//! can be auditioned before it is cut.

pub mod converter;
pub mod defaults;

pub use converter::bands_to_track;
pub use defaults::{DEFAULT_VELOCITY, PLAYBACK_CHANNEL};

use crate::converters::smf::write_smf;
use crate::models::{InstrumentModel, ToothBands};
use crate::transcription::TranscribeError;

/// Encode the bands as SMF bytes
pub fn encode_playback(
    bands: &ToothBands,
    model: &InstrumentModel,
    mindelta: u64,
    tpq: u16,
) -> Result<Vec<u8>, TranscribeError> {
    let track = bands_to_track(bands, model, mindelta, tpq);
    let mut bytes = Vec::new();
    write_smf(&track, &mut bytes)?;
    log::info!("encoded {} playback events ({} bytes)", track.events.len(), bytes.len());
    Ok(bytes)
}
