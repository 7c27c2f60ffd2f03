//! Octave folding and band mapping
//!
//! Every tooth plays its own pitch plus the same pitch class in the octaves
//! the comb does not cover. Walking outward from a tooth stops at the first
//! octave that another tooth plays, so a folded pitch always goes to the tooth
//! nearest to it.

use crate::models::{InstrumentModel, Performance, ToothBands, MAX_PITCH};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Claim {
    tooth: usize,
    distance: u8,
}

/// Pitch to tooth lookup for one model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoldTable {
    claims: [Option<Claim>; 128],
    tooth_count: usize,
}

impl FoldTable {
    pub fn new(model: &InstrumentModel) -> Self {
        let playable = model.playable_table();
        let mut table = Self {
            claims: [None; 128],
            tooth_count: model.tooth_count(),
        };

        for tooth in 0..model.tooth_count() {
            let own = model.tooth_pitch(tooth);
            table.claim(own, tooth, 0);

            // Downward walk
            let mut pitch = own as i32 - 12;
            while pitch >= 0 && !playable[pitch as usize] {
                table.claim(pitch as u8, tooth, own - pitch as u8);
                pitch -= 12;
            }

            // Upward walk
            let mut pitch = own as i32 + 12;
            while pitch <= MAX_PITCH as i32 && !playable[pitch as usize] {
                table.claim(pitch as u8, tooth, pitch as u8 - own);
                pitch += 12;
            }
        }

        table
    }

    /// Keep the nearer tooth; on a tie the earlier claim stands
    fn claim(&mut self, pitch: u8, tooth: usize, distance: u8) {
        let slot = &mut self.claims[pitch as usize];
        if !matches!(slot, Some(existing) if existing.distance <= distance) {
            *slot = Some(Claim { tooth, distance });
        }
    }

    /// Tooth that plays `pitch`, if any
    pub fn tooth_for(&self, pitch: u8) -> Option<usize> {
        self.claims.get(pitch as usize).copied().flatten().map(|c| c.tooth)
    }

    /// Every pitch folded onto `tooth`, ascending
    #[cfg(test)]
    fn source_pitches(&self, tooth: usize) -> Vec<u8> {
        (0..=MAX_PITCH).filter(|p| self.tooth_for(*p) == Some(tooth)).collect()
    }

    pub fn tooth_count(&self) -> usize {
        self.tooth_count
    }
}

/// Bands plus the notes that found no tooth
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BandMapping {
    pub bands: ToothBands,
    /// Unfiltered notes whose shifted pitch has no tooth
    pub dropped: usize,
}

/// Map every unfiltered note onto its tooth
pub fn map_bands(performance: &Performance, model: &InstrumentModel) -> BandMapping {
    let table = FoldTable::new(model);
    let mut ticks: Vec<Vec<u64>> = vec![Vec::new(); table.tooth_count()];
    let mut dropped = 0;

    for note in performance.notes.iter().filter(|n| !n.is_filtered()) {
        match performance.shifted_pitch(note).and_then(|p| table.tooth_for(p)) {
            Some(tooth) => ticks[tooth].push(note.tick),
            None => dropped += 1,
        }
    }

    let bands = ToothBands::from_ticks(ticks);
    log::debug!(
        "mapped {} holes onto {} teeth, {} filtered notes skipped, {} notes without a tooth",
        bands.hole_count(),
        bands.tooth_count(),
        performance.filtered_count(),
        dropped
    );

    BandMapping { bands, dropped }
}
