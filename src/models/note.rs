//! Performed notes and the performance that owns them

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Why a note was excluded from the strip
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FilterTag {
    /// Repeats on the same pitch faster than the comb can re-pluck
    Repetition,
}

/// A single note onset taken from the input stream
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    /// MIDI note number 0-127, before transposition
    pub pitch: u8,
    /// Absolute tick within its track
    pub tick: u64,
    pub channel: u8,
    pub track: usize,
    /// Filter causes; empty means the note is punched
    pub filtered: BTreeSet<FilterTag>,
}

impl NoteEvent {
    pub fn new(pitch: u8, tick: u64, channel: u8, track: usize) -> Self {
        Self {
            pitch,
            tick,
            channel,
            track,
            filtered: BTreeSet::new(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        !self.filtered.is_empty()
    }
}

/// All collected notes plus the per-track transposition
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Performance {
    pub notes: Vec<NoteEvent>,
    /// One shift per track; a shorter list reuses its last entry
    pub transposes: Vec<i32>,
}

impl Performance {
    pub fn new(notes: Vec<NoteEvent>) -> Self {
        Self {
            notes,
            transposes: Vec::new(),
        }
    }

    pub fn add(&mut self, note: NoteEvent) {
        self.notes.push(note);
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Apply the same shift to every track
    pub fn set_transpose(&mut self, shift: i32) {
        self.transposes = vec![shift];
    }

    pub fn transpose_for(&self, track: usize) -> i32 {
        match self.transposes.len() {
            0 => 0,
            n => self.transposes[track.min(n - 1)],
        }
    }

    /// Pitch after the track's transposition, if it stays inside the MIDI range
    pub fn shifted_pitch(&self, note: &NoteEvent) -> Option<u8> {
        let shifted = note.pitch as i32 + self.transpose_for(note.track);
        u8::try_from(shifted).ok().filter(|p| *p <= 127)
    }

    /// Lowest and highest performed pitch, ignoring transposition
    pub fn pitch_range(&self) -> Option<(u8, u8)> {
        let lowest = self.notes.iter().map(|n| n.pitch).min()?;
        let highest = self.notes.iter().map(|n| n.pitch).max()?;
        Some((lowest, highest))
    }

    /// Number of notes per pitch over the whole MIDI range
    pub fn pitch_histogram(&self) -> [usize; 128] {
        let mut counts = [0usize; 128];
        for note in &self.notes {
            counts[note.pitch as usize] += 1;
        }
        counts
    }

    pub fn filtered_count(&self) -> usize {
        self.notes.iter().filter(|n| n.is_filtered()).count()
    }
}
