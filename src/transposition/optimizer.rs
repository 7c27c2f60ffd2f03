//! Transposition search
//!
//! Finds the semitone shift that lets the comb play as many of the performed
//! notes as possible. Every candidate between "everything below the comb" and
//! "everything above the comb" is scored by the number of notes that land on
//! a pitch the comb does not have.

use crate::models::{InstrumentModel, Performance};
use crate::transcription::TranscribeError;
use serde::{Deserialize, Serialize};

/// How the shift is chosen
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum TransposeMode {
    /// Search every shift
    #[default]
    Auto,
    /// Search whole-octave shifts only
    OctavesOnly,
    /// Search shifts congruent to `residue` modulo 12
    Residue { residue: i32 },
    /// Use this shift for every track
    Fixed { shift: i32 },
    /// One shift per track; the last one repeats for further tracks
    PerTrack { shifts: Vec<i32> },
}

/// Outcome of choosing a transposition
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransposeReport {
    /// Shift of track 0 in semitones
    pub shift: i32,
    /// Whole octaves of `shift`, rounded down
    pub octaves: i32,
    /// Remaining semitones upward, 0 to 11
    pub semitones: i32,
    /// Notes that no tooth can play at this shift
    pub unplayable: usize,
    /// Whether the shift came from a search rather than the caller
    pub searched: bool,
}

impl TransposeReport {
    fn new(shift: i32, unplayable: usize, searched: bool) -> Self {
        Self {
            shift,
            octaves: shift.div_euclid(12),
            semitones: shift.rem_euclid(12),
            unplayable,
            searched,
        }
    }
}

/// Count notes whose shifted pitch is not playable
///
/// `histogram` holds the number of notes per MIDI pitch.
pub fn count_unplayable(histogram: &[usize; 128], shift: i32, playable: &[bool; 128]) -> usize {
    histogram
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .filter(|(pitch, _)| {
            let shifted = *pitch as i32 + shift;
            !(0..128).contains(&shifted) || !playable[shifted as usize]
        })
        .map(|(_, count)| *count)
        .sum()
}

/// Search the best shift for the whole performance
///
/// Ties on the unplayable count go to the smaller absolute shift; between a
/// shift and its negation the negative one is found first and kept. With a
/// `residue` only shifts congruent to it modulo 12 are considered.
pub fn find_transpose(
    performance: &Performance,
    model: &InstrumentModel,
    residue: Option<i32>,
) -> Result<TransposeReport, TranscribeError> {
    let (lowest, highest) = performance.pitch_range().ok_or(TranscribeError::EmptyPerformance)?;

    let pitches = model.playable_pitches();
    let playable = model.playable_table();
    let histogram = performance.pitch_histogram();

    let min_playable = *pitches.iter().min().ok_or(TranscribeError::EmptyPerformance)? as i32;
    let max_playable = *pitches.iter().max().ok_or(TranscribeError::EmptyPerformance)? as i32;

    let first = min_playable - highest as i32 - 1;
    let mut last = max_playable - lowest as i32 + 1;
    if residue.is_some() {
        // A full octave of candidates always contains one with the residue
        last = last.max(first + 11);
    }

    let mut best: Option<(i32, usize)> = None;
    for shift in first..=last {
        if let Some(r) = residue {
            if shift.rem_euclid(12) != r.rem_euclid(12) {
                continue;
            }
        }

        let errors = count_unplayable(&histogram, shift, &playable);
        let better = match best {
            None => true,
            Some((best_shift, best_errors)) => {
                errors < best_errors || (errors == best_errors && shift.abs() < best_shift.abs())
            }
        };
        if better {
            best = Some((shift, errors));
        }
    }

    let (shift, unplayable) = best.ok_or(TranscribeError::EmptyPerformance)?;
    Ok(TransposeReport::new(shift, unplayable, true))
}

/// Choose the transposition for `mode` and store it in the performance
pub fn apply_transpose(
    performance: &mut Performance,
    model: &InstrumentModel,
    mode: &TransposeMode,
) -> Result<TransposeReport, TranscribeError> {
    if performance.is_empty() {
        return Err(TranscribeError::EmptyPerformance);
    }

    let report = match mode {
        TransposeMode::Auto => find_transpose(performance, model, None)?,
        TransposeMode::OctavesOnly => find_transpose(performance, model, Some(0))?,
        TransposeMode::Residue { residue } => find_transpose(performance, model, Some(*residue))?,
        TransposeMode::Fixed { shift } => {
            performance.set_transpose(*shift);
            TransposeReport::new(*shift, unplayable_notes(performance, model), false)
        }
        TransposeMode::PerTrack { shifts } => {
            if shifts.is_empty() {
                return Err(TranscribeError::Configuration(
                    "per-track transpose needs at least one shift".to_string(),
                ));
            }
            performance.transposes = shifts.clone();
            TransposeReport::new(shifts[0], unplayable_notes(performance, model), false)
        }
    };

    if report.searched {
        performance.set_transpose(report.shift);
    }

    log::info!(
        "transposing by {} octaves and {} halftones",
        report.octaves,
        report.semitones
    );
    log::info!("    --> {} notes not playable", report.unplayable);

    Ok(report)
}

/// Notes that miss every tooth with the performance's current transposition
pub fn unplayable_notes(performance: &Performance, model: &InstrumentModel) -> usize {
    let playable = model.playable_table();
    performance
        .notes
        .iter()
        .filter(|note| match performance.shifted_pitch(note) {
            Some(pitch) => !playable[pitch as usize],
            None => true,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteEvent;

    fn model(lowest: u8, offsets: &[u8]) -> InstrumentModel {
        InstrumentModel {
            name: "test".to_string(),
            lowest_pitch: lowest,
            playable_offsets: offsets.to_vec(),
            program: None,
            strip_height: 70.0,
            base_offset: 6.0,
            tooth_spacing: 2.0,
            hole_diameter: 1.8,
            step: 8.0,
        }
    }

    fn performance(pitches: &[u8]) -> Performance {
        Performance::new(
            pitches
                .iter()
                .enumerate()
                .map(|(i, p)| NoteEvent::new(*p, i as u64 * 120, 0, 0))
                .collect(),
        )
    }

    fn c_major() -> InstrumentModel {
        model(60, &[0, 2, 4, 5, 7, 9, 11, 12])
    }

    #[test]
    fn test_playable_input_needs_no_shift() {
        let perf = performance(&[60, 62, 64, 65, 67, 72]);
        let report = find_transpose(&perf, &c_major(), None).unwrap();
        assert_eq!(report.shift, 0);
        assert_eq!(report.unplayable, 0);
        assert!(report.searched);
    }

    #[test]
    fn test_finds_octave_shift() {
        // The same melody two octaves down
        let perf = performance(&[36, 38, 40, 41, 43]);
        let report = find_transpose(&perf, &c_major(), None).unwrap();
        assert_eq!(report.shift, 24);
        assert_eq!(report.octaves, 2);
        assert_eq!(report.semitones, 0);
        assert_eq!(report.unplayable, 0);
    }

    #[test]
    fn test_finds_key_change() {
        // D major fragment onto a C major comb: D E F# G A -> C D E F G
        let perf = performance(&[62, 64, 66, 67, 69]);
        let report = find_transpose(&perf, &c_major(), None).unwrap();
        assert_eq!(report.shift, -2);
        assert_eq!(report.octaves, -1);
        assert_eq!(report.semitones, 10);
        assert_eq!(report.unplayable, 0);
    }

    #[test]
    fn test_tie_prefers_smallest_absolute_shift() {
        // Comb with 60 and 72; a lone 66 fits at +6 and at -6
        let comb = model(60, &[0, 12]);
        let perf = performance(&[66]);
        let report = find_transpose(&perf, &comb, None).unwrap();
        assert_eq!(report.unplayable, 0);
        assert_eq!(report.shift, -6);

        // 61 fits at -1 and +11; the smaller magnitude wins
        let perf = performance(&[61]);
        assert_eq!(find_transpose(&perf, &comb, None).unwrap().shift, -1);
    }

    #[test]
    fn test_octaves_only_constraint() {
        let perf = performance(&[62, 64, 66, 67, 69]);
        let report = find_transpose(&perf, &c_major(), Some(0)).unwrap();
        assert_eq!(report.shift % 12, 0);
        assert_eq!(report.shift, 0);
        assert_eq!(report.unplayable, 1); // F#
    }

    #[test]
    fn test_residue_with_narrow_range() {
        // Single tooth, single pitch: the plain range is only three shifts wide
        let comb = model(60, &[0]);
        let perf = performance(&[60]);
        let report = find_transpose(&perf, &comb, Some(5)).unwrap();
        assert_eq!(report.shift.rem_euclid(12), 5);
        assert_eq!(report.unplayable, 1);
    }

    #[test]
    fn test_negative_shift_decomposition() {
        let report = TransposeReport::new(-14, 0, true);
        assert_eq!(report.octaves, -2);
        assert_eq!(report.semitones, 10);

        // A fifth down is one octave down and a fourth up
        let report = TransposeReport::new(-7, 0, false);
        assert_eq!((report.octaves, report.semitones), (-1, 5));

        let report = TransposeReport::new(14, 0, true);
        assert_eq!((report.octaves, report.semitones), (1, 2));
    }

    #[test]
    fn test_apply_fixed_and_per_track() {
        let comb = c_major();
        let mut perf = Performance::new(vec![NoteEvent::new(48, 0, 0, 0), NoteEvent::new(61, 0, 0, 1)]);

        let report = apply_transpose(&mut perf, &comb, &TransposeMode::Fixed { shift: 12 }).unwrap();
        assert!(!report.searched);
        assert_eq!(perf.transpose_for(1), 12);
        assert_eq!(report.unplayable, 1); // 61 + 12 = 73

        let mode = TransposeMode::PerTrack { shifts: vec![12, -1] };
        let report = apply_transpose(&mut perf, &comb, &mode).unwrap();
        assert_eq!(report.shift, 12);
        assert_eq!(report.unplayable, 0);
        assert_eq!(perf.transposes, vec![12, -1]);
    }

    #[test]
    fn test_apply_stores_searched_shift() {
        let mut perf = performance(&[36, 38, 40]);
        apply_transpose(&mut perf, &c_major(), &TransposeMode::Auto).unwrap();
        assert_eq!(perf.transpose_for(0), 24);
    }

    #[test]
    fn test_empty_performance_fails() {
        let mut perf = Performance::default();
        assert!(matches!(
            apply_transpose(&mut perf, &c_major(), &TransposeMode::Auto),
            Err(TranscribeError::EmptyPerformance)
        ));
        assert!(matches!(
            find_transpose(&perf, &c_major(), None),
            Err(TranscribeError::EmptyPerformance)
        ));
    }

    #[test]
    fn test_count_unplayable_outside_midi_range() {
        let mut histogram = [0usize; 128];
        histogram[120] = 2;
        let playable = c_major().playable_table();
        assert_eq!(count_unplayable(&histogram, 10, &playable), 2);
    }
}
