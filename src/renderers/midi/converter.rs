//! Band-to-MIDI conversion
//!
//! Every hole becomes a note-on at its tick and a note-off one `mindelta`
//! later, on the pitch of its tooth. The result plays back what the comb will
//! sound like.

use crate::converters::smf::{ChannelMessage, OutputTrack, TimedMessage};
use crate::models::{InstrumentModel, ToothBands};
use super::defaults::{playback_tpq, DEFAULT_VELOCITY, PLAYBACK_CHANNEL};

/// Ordering within a tick: lower pitch first, note-off before note-on
fn sort_key(event: &TimedMessage) -> (u64, u8, u8) {
    match event.message {
        ChannelMessage::NoteOff { key, .. } => (event.tick, key, 0),
        ChannelMessage::NoteOn { key, .. } => (event.tick, key, 1),
        ChannelMessage::ProgramChange { .. } => (event.tick, 0, 0),
    }
}

/// Build the playback track for a set of bands
///
/// # Arguments
/// * `bands` - punched ticks per tooth
/// * `model` - comb supplying the tooth pitches and optional program
/// * `mindelta` - note length in ticks
/// * `tpq` - resolution of the decoded input
pub fn bands_to_track(bands: &ToothBands, model: &InstrumentModel, mindelta: u64, tpq: u16) -> OutputTrack {
    let mut notes: Vec<TimedMessage> = Vec::with_capacity(bands.hole_count() * 2);

    for (tooth, ticks) in bands.iter() {
        let key = model.tooth_pitch(tooth);
        for tick in ticks {
            notes.push(TimedMessage {
                tick: *tick,
                channel: PLAYBACK_CHANNEL,
                message: ChannelMessage::NoteOn { key, velocity: DEFAULT_VELOCITY },
            });
            notes.push(TimedMessage {
                tick: tick + mindelta,
                channel: PLAYBACK_CHANNEL,
                message: ChannelMessage::NoteOff { key, velocity: DEFAULT_VELOCITY },
            });
        }
    }
    notes.sort_by_key(sort_key);

    let mut events = Vec::with_capacity(notes.len() + 1);
    if let Some(program) = model.program {
        events.push(TimedMessage {
            tick: 0,
            channel: PLAYBACK_CHANNEL,
            message: ChannelMessage::ProgramChange { program },
        });
    }
    events.extend(notes);

    OutputTrack {
        ticks_per_quarter: playback_tpq(tpq),
        events,
    }
}
