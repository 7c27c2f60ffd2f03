//! Models module for the music box transcriber
//!
//! This module contains the data models shared by the pipeline stages:
//! comb models, performed notes and the per-tooth bands derived from them.

pub mod instrument;
pub mod note;
pub mod band;

// Re-export commonly used types
pub use instrument::{InstrumentCatalog, InstrumentModel, MAX_PITCH};
pub use note::{FilterTag, NoteEvent, Performance};
pub use band::ToothBands;
