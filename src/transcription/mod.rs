//! Transcription pipeline
//!
//! Turns a Standard MIDI File into punched-strip bands for one comb model:
//!
//! 1. decode the file and collect note onsets
//! 2. choose a transposition
//! 3. drop repeats the comb cannot play in time
//! 4. fold every note onto a tooth
//! 5. lay out the strip and encode the playback file
//!
//! Each stage lives in its own module and can be driven on its own; the
//! functions here run them in order.

pub mod errors;
pub mod settings;
pub mod collector;
pub mod band_mapper;
pub mod repetition;

pub use errors::{TranscribeError, TranscribeResult};
pub use settings::{OutputSettings, TranscribeSettings};
pub use collector::{collect_notes, CollectOptions, CollectStats};
pub use band_mapper::{map_bands, BandMapping, FoldTable};
pub use repetition::{filter_bands, filter_repetition, min_delta};

use crate::converters::smf::{parse_smf, Header};
use crate::models::{InstrumentCatalog, InstrumentModel, ToothBands};
use crate::renderers::{encode_playback, render_svg, LayoutEngine, StripLayout};
use crate::transposition::{apply_transpose, TransposeReport};
use serde::{Deserialize, Serialize};

/// What happened to the notes on their way to the strip
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionReport {
    pub model: String,
    pub collect: CollectStats,
    pub transpose: TransposeReport,
    /// Notes dropped for repeating their pitch too quickly
    pub repeated_notes: usize,
    /// Holes dropped because two folded pitches repeat a tooth too quickly
    pub folded_repeats: usize,
    /// Notes whose transposed pitch has no tooth
    pub dropped_notes: usize,
    /// Shortest repetition interval on any tooth, in ticks
    pub mindelta: u64,
    pub holes: usize,
    /// Hole count per tooth
    pub band_sizes: Vec<usize>,
    pub pages: usize,
    pub sheets: usize,
}

/// Result of a transcription run
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub header: Header,
    pub report: TranscriptionReport,
    pub bands: ToothBands,
    pub layout: StripLayout,
    /// Playback file, when requested
    pub midi: Option<Vec<u8>>,
    /// Strip drawing, when requested
    pub svg: Option<String>,
}

/// Transcribe for the catalog model named in `settings`
pub fn transcribe(bytes: &[u8], settings: &TranscribeSettings) -> TranscribeResult<Transcription> {
    settings.validate()?;
    let model = InstrumentCatalog::builtin().get(&settings.model)?;
    transcribe_with_model(bytes, model, settings)
}

/// Transcribe for an explicit model; `settings.model` is ignored
pub fn transcribe_with_model(
    bytes: &[u8],
    model: &InstrumentModel,
    settings: &TranscribeSettings,
) -> TranscribeResult<Transcription> {
    model.validate()?;
    log::info!("transcribing {} bytes for model {}", bytes.len(), model.name);

    let smf = parse_smf(bytes)?;
    let options = CollectOptions {
        ignored_tracks: settings.ignored_tracks.clone(),
        percussion_program: settings.percussion_program,
        percussion_channel: settings.percussion_channel,
    };
    let (mut performance, collect) = collect_notes(&smf, &options);
    if performance.is_empty() {
        return Err(TranscribeError::EmptyPerformance);
    }

    let transpose = apply_transpose(&mut performance, model, &settings.transpose)?;

    let min_interval = settings.min_interval.unwrap_or(0);
    let repeated_notes = filter_repetition(&mut performance, min_interval);

    let BandMapping { mut bands, dropped } = map_bands(&performance, model);
    let folded_repeats = filter_bands(&mut bands, min_interval);
    if bands.is_empty() {
        return Err(TranscribeError::EmptyPerformance);
    }

    let mindelta = min_delta(&bands, settings.fallback_mindelta);
    log::info!("mindelta: {} ticks", mindelta);

    let layout = LayoutEngine::new(model, &settings.layout).compute_layout(&bands, mindelta)?;

    let midi = if settings.outputs.midi {
        Some(encode_playback(&bands, model, mindelta, smf.header.ticks_per_quarter)?)
    } else {
        None
    };
    let svg = if settings.outputs.svg {
        Some(render_svg(&layout)?)
    } else {
        None
    };

    let report = TranscriptionReport {
        model: model.name.clone(),
        collect,
        transpose,
        repeated_notes,
        folded_repeats,
        dropped_notes: dropped,
        mindelta,
        holes: layout.hole_count(),
        band_sizes: bands.iter().map(|(_, ticks)| ticks.len()).collect(),
        pages: layout.pages.len(),
        sheets: layout.sheet_count,
    };

    Ok(Transcription {
        header: smf.header,
        report,
        bands,
        layout,
        midi,
        svg,
    })
}
