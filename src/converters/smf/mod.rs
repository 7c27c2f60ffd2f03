//! Standard MIDI File codec
//!
//! Reads the chunked SMF container into per-track ticked events and writes a
//! single-track note stream back out. Only what the transcriber needs is
//! interpreted; everything else is passed through as raw bytes.

mod model;
mod parse;
pub mod vlq;
mod write;

pub use model::*;
pub use parse::{parse_smf, ChunkReader, TrackDecoder};
pub use write::write_smf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmfError {
    #[error("truncated stream: {needed} bytes needed at offset {offset}, only {available} available")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("first chunk is {found:?}, expected MThd")]
    MissingHeader { found: String },
    #[error("multiple MThd chunks")]
    DuplicateHeader,
    #[error("invalid MThd chunk: body is {length} bytes, expected 6")]
    InvalidHeader { length: usize },
    #[error("unknown MIDI event 0x{status:02X} at tick {tick} in track {track}")]
    UnknownEvent { status: u8, tick: u64, track: usize },
    #[error("variable-length quantity at offset {offset} is longer than 4 bytes")]
    InvalidVlq { offset: usize },
    #[error("delta time {delta} does not fit a 4-byte variable-length quantity")]
    DeltaTooLarge { delta: u64 },
}

pub type Result<T> = std::result::Result<T, SmfError>;
