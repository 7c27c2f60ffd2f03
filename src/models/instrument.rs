//! Music box comb models
//!
//! An [`InstrumentModel`] describes one comb: which absolute pitches its teeth
//! play and the strip geometry needed to punch holes for it. Models are
//! configuration data; the built-in ones live in `instruments.yaml`.

use crate::transcription::TranscribeError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Highest MIDI note number
pub const MAX_PITCH: u8 = 127;

/// One comb model
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentModel {
    /// Catalog name (e.g. "sankyo20")
    pub name: String,

    /// MIDI pitch of tooth 0 plus `playable_offsets[0]`
    #[serde(alias = "lowest")]
    pub lowest_pitch: u8,

    /// Semitone offsets above `lowest_pitch`, one per tooth, strictly increasing
    #[serde(alias = "offsets")]
    pub playable_offsets: Vec<u8>,

    /// General MIDI program used for the playback stream
    #[serde(default)]
    pub program: Option<u8>,

    /// Strip height in mm
    #[serde(alias = "height")]
    pub strip_height: f64,

    /// Distance from the strip edge to the tooth 0 row in mm
    #[serde(alias = "offset")]
    pub base_offset: f64,

    /// Distance between neighbouring tooth rows in mm
    #[serde(alias = "distance")]
    pub tooth_spacing: f64,

    /// Punch diameter in mm
    #[serde(alias = "diameter")]
    pub hole_diameter: f64,

    /// Strip advance in mm for one `mindelta`
    pub step: f64,
}

impl InstrumentModel {
    /// Number of teeth on the comb
    pub fn tooth_count(&self) -> usize {
        self.playable_offsets.len()
    }

    /// Absolute MIDI pitch of a tooth
    pub fn tooth_pitch(&self, tooth: usize) -> u8 {
        self.lowest_pitch + self.playable_offsets[tooth]
    }

    /// Absolute pitches of all teeth, tooth 0 first
    pub fn playable_pitches(&self) -> Vec<u8> {
        (0..self.tooth_count()).map(|t| self.tooth_pitch(t)).collect()
    }

    /// Membership table over the whole MIDI range
    pub fn playable_table(&self) -> [bool; 128] {
        let mut table = [false; 128];
        for pitch in self.playable_pitches() {
            table[pitch as usize] = true;
        }
        table
    }

    pub fn hole_radius(&self) -> f64 {
        self.hole_diameter / 2.0
    }

    /// Check the structural invariants of the model
    pub fn validate(&self) -> Result<(), TranscribeError> {
        let invalid = |reason: String| {
            Err(TranscribeError::Configuration(format!(
                "instrument model '{}': {}",
                self.name, reason
            )))
        };

        if self.playable_offsets.is_empty() {
            return invalid("no playable offsets".to_string());
        }

        if let Some(pair) = self.playable_offsets.windows(2).find(|w| w[0] >= w[1]) {
            return invalid(format!(
                "offsets must be strictly increasing ({} then {})",
                pair[0], pair[1]
            ));
        }

        let highest = self.lowest_pitch as u16 + *self.playable_offsets.last().unwrap_or(&0) as u16;
        if highest > MAX_PITCH as u16 {
            return invalid(format!("highest tooth pitch {} is above {}", highest, MAX_PITCH));
        }

        if let Some(program) = self.program {
            if program > 127 {
                return invalid(format!("program {} is not a MIDI program", program));
            }
        }

        let geometry = [
            ("height", self.strip_height),
            ("distance", self.tooth_spacing),
            ("diameter", self.hole_diameter),
            ("step", self.step),
        ];
        for (label, value) in geometry {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{} must be positive, got {}", label, value));
            }
        }
        if !self.base_offset.is_finite() || self.base_offset < 0.0 {
            return invalid(format!("offset must be non-negative, got {}", self.base_offset));
        }

        Ok(())
    }
}

/// A named collection of comb models
#[derive(Clone, Debug, Default)]
pub struct InstrumentCatalog {
    models: Vec<InstrumentModel>,
}

impl InstrumentCatalog {
    /// Parse and validate a YAML list of models
    pub fn from_yaml(source: &str) -> Result<Self, TranscribeError> {
        let models: Vec<InstrumentModel> = serde_yaml::from_str(source)
            .map_err(|e| TranscribeError::Configuration(format!("invalid instrument table: {}", e)))?;

        for model in &models {
            model.validate()?;
        }

        if let Some(name) = duplicate_name(&models) {
            return Err(TranscribeError::Configuration(format!(
                "instrument model '{}' is defined twice",
                name
            )));
        }

        Ok(Self { models })
    }

    /// The models shipped with the crate
    pub fn builtin() -> &'static InstrumentCatalog {
        &BUILTIN
    }

    pub fn get(&self, name: &str) -> Result<&InstrumentModel, TranscribeError> {
        self.models.iter().find(|m| m.name == name).ok_or_else(|| {
            TranscribeError::Configuration(format!(
                "unknown instrument model '{}', available: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    /// Model names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.iter().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn models(&self) -> &[InstrumentModel] {
        &self.models
    }
}

fn duplicate_name(models: &[InstrumentModel]) -> Option<&str> {
    models
        .iter()
        .enumerate()
        .find(|(i, m)| models[..*i].iter().any(|other| other.name == m.name))
        .map(|(_, m)| m.name.as_str())
}

static BUILTIN: Lazy<InstrumentCatalog> = Lazy::new(|| {
    match InstrumentCatalog::from_yaml(include_str!("instruments.yaml")) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("built-in instrument table rejected: {}", e);
            InstrumentCatalog::default()
        }
    }
});
