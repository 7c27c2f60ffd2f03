//! Error types for transcription
//!
//! Every error aborts the run: a corrupt chunk cannot be skipped because chunk
//! boundaries are position-dependent. Notes the comb cannot play are counted
//! in the report instead.

use crate::converters::smf::SmfError;
use thiserror::Error;

/// Top-level transcription error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscribeError {
    /// The input stream is not a readable MIDI file
    #[error("MIDI parsing failed: {0}")]
    Smf(#[from] SmfError),

    /// Unknown instrument model or invalid settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Nothing left to punch
    #[error("no playable notes in the performance")]
    EmptyPerformance,

    /// The SVG template could not be rendered
    #[error("SVG rendering failed: {0}")]
    Template(String),
}

pub type TranscribeResult<T> = std::result::Result<T, TranscribeError>;
