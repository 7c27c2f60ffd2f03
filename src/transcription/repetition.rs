//! Repetition filtering
//!
//! A comb tooth needs time to come to rest before it can be plucked again.
//! Onsets on the same pitch (or tooth) that follow the last kept onset by
//! less than the minimum interval are dropped, keeping the earliest note of
//! each cluster.

use crate::models::{FilterTag, Performance, ToothBands};

/// Number of smallest intervals written to the debug log
const LOGGED_INTERVALS: usize = 10;

/// Tag notes that repeat their sounding pitch too quickly
///
/// Notes are left sorted by sounding pitch, then tick. Notes that pass get a
/// stale repetition tag cleared, so the filter can be rerun with a different
/// interval. Returns the number of tagged notes.
pub fn filter_repetition(performance: &mut Performance, min_interval: u64) -> usize {
    let pitches: Vec<i32> = performance
        .notes
        .iter()
        .map(|n| n.pitch as i32 + performance.transpose_for(n.track))
        .collect();
    let mut keyed: Vec<_> = pitches.into_iter().zip(performance.notes.drain(..)).collect();
    keyed.sort_by_key(|(pitch, note)| (*pitch, note.tick));

    let mut count = 0;
    let mut last: Option<(i32, u64)> = None;
    for (pitch, note) in keyed.iter_mut() {
        match last {
            Some((last_pitch, last_tick)) if last_pitch == *pitch && note.tick - last_tick < min_interval => {
                note.filtered.insert(FilterTag::Repetition);
                count += 1;
            }
            _ => {
                note.filtered.remove(&FilterTag::Repetition);
                last = Some((*pitch, note.tick));
            }
        }
    }

    performance.notes = keyed.into_iter().map(|(_, note)| note).collect();

    if count > 0 {
        log::info!("{} repeated notes closer than {} ticks filtered", count, min_interval);
    }
    count
}

/// Apply the same rule to each tooth band; returns the number of ticks removed
pub fn filter_bands(bands: &mut ToothBands, min_interval: u64) -> usize {
    let mut removed = 0;
    for band in bands.bands_mut().iter_mut() {
        let before = band.len();
        let mut last: Option<u64> = None;
        band.retain(|tick| match last {
            Some(previous) if tick - previous < min_interval => false,
            _ => {
                last = Some(*tick);
                true
            }
        });
        removed += before - band.len();
    }

    if removed > 0 {
        log::info!("{} folded repeats closer than {} ticks removed", removed, min_interval);
    }
    removed
}

/// Shortest repetition interval on any tooth, or `fallback` when no tooth repeats
pub fn min_delta(bands: &ToothBands, fallback: u64) -> u64 {
    let histogram = bands.interval_histogram();
    for (delta, times) in histogram.iter().take(LOGGED_INTERVALS) {
        log::debug!("delta: {}, ({} times)", delta, times);
    }

    bands.min_interval().unwrap_or(fallback)
}
