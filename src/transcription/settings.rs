//! Transcription settings
//!
//! Everything the caller can choose about a run. All fields have defaults so
//! a JavaScript caller may pass a partial object.

use crate::renderers::layout_engine::LayoutSettings;
use crate::transcription::TranscribeError;
use crate::transposition::TransposeMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Comb model used when none is named
pub const DEFAULT_MODEL: &str = "sankyo20";

/// Program number that marks a track as percussion
pub const DEFAULT_PERCUSSION_PROGRAM: u8 = 127;

/// Scale interval used when no tooth repeats
pub const DEFAULT_FALLBACK_MINDELTA: u64 = 1000;

/// Which artifacts a run produces besides the layout
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputSettings {
    /// Re-encode the punched notes as a MIDI file
    pub midi: bool,
    /// Render the layout as an SVG document
    pub svg: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            midi: true,
            svg: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscribeSettings {
    /// Instrument model name from the catalog
    pub model: String,

    pub transpose: TransposeMode,

    /// Repeats on one pitch closer than this many ticks are dropped;
    /// `None` keeps every repeat
    pub min_interval: Option<u64>,

    /// Track indices skipped during collection
    pub ignored_tracks: BTreeSet<usize>,

    /// Note-ons are dropped while this program is active on their track
    pub percussion_program: Option<u8>,

    /// Note-ons on this channel are dropped
    pub percussion_channel: Option<u8>,

    /// `mindelta` when no tooth sounds twice
    pub fallback_mindelta: u64,

    pub layout: LayoutSettings,

    pub outputs: OutputSettings,
}

impl Default for TranscribeSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            transpose: TransposeMode::Auto,
            min_interval: None,
            ignored_tracks: BTreeSet::new(),
            percussion_program: Some(DEFAULT_PERCUSSION_PROGRAM),
            percussion_channel: None,
            fallback_mindelta: DEFAULT_FALLBACK_MINDELTA,
            layout: LayoutSettings::default(),
            outputs: OutputSettings::default(),
        }
    }
}

impl TranscribeSettings {
    pub fn for_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }

    /// Parse settings from a JSON object
    pub fn from_json(json: &str) -> Result<Self, TranscribeError> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| TranscribeError::Configuration(format!("invalid settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), TranscribeError> {
        if self.fallback_mindelta == 0 {
            return Err(TranscribeError::Configuration(
                "fallbackMindelta must be at least 1".to_string(),
            ));
        }
        if let Some(channel) = self.percussion_channel {
            if channel > 15 {
                return Err(TranscribeError::Configuration(format!(
                    "percussion channel {} is not a MIDI channel",
                    channel
                )));
            }
        }
        self.layout.validate()
    }
}
