//! Note collection
//!
//! Walks the decoded tracks and keeps one [`NoteEvent`] per sounding note-on.
//! Note-offs are not needed: a plucked tooth has no sustain.

use crate::converters::smf::{MidiEvent, Smf};
use crate::models::{NoteEvent, Performance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which note-ons to drop while collecting
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectOptions {
    pub ignored_tracks: BTreeSet<usize>,
    pub percussion_program: Option<u8>,
    pub percussion_channel: Option<u8>,
}

/// Counters from one collection pass
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CollectStats {
    pub tracks: usize,
    pub ignored_tracks: usize,
    pub notes: usize,
    pub percussion_notes: usize,
}

/// Collect the note onsets of every track that is not ignored
pub fn collect_notes(smf: &Smf, options: &CollectOptions) -> (Performance, CollectStats) {
    let mut performance = Performance::default();
    let mut stats = CollectStats {
        tracks: smf.tracks.len(),
        ..CollectStats::default()
    };

    for (track, events) in smf.tracks.iter().enumerate() {
        if options.ignored_tracks.contains(&track) {
            log::info!("ignoring track {}", track);
            stats.ignored_tracks += 1;
            continue;
        }

        let mut program: Option<u8> = None;
        for event in events {
            match event.event {
                MidiEvent::ProgramChange { program: p, .. } => {
                    log::debug!("track {} tick {}: program change {}", track, event.tick, p);
                    program = Some(p);
                }
                MidiEvent::NoteOn { velocity: 0, .. } => {}
                MidiEvent::NoteOn { channel, key, .. } => {
                    let percussion = (program.is_some() && program == options.percussion_program)
                        || options.percussion_channel == Some(channel);
                    if percussion {
                        stats.percussion_notes += 1;
                        continue;
                    }
                    performance.add(NoteEvent::new(key, event.tick, channel, track));
                    stats.notes += 1;
                }
                _ => {}
            }
        }
    }

    log::info!(
        "collected {} notes from {} tracks ({} percussion notes dropped)",
        stats.notes,
        stats.tracks - stats.ignored_tracks,
        stats.percussion_notes
    );

    (performance, stats)
}
