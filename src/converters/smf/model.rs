/// SMF data model shared by the reader and the writer
///
/// Decoded events borrow their payloads from the input buffer; the writer
/// model owns everything and uses absolute ticks.

use serde::{Deserialize, Serialize};

pub const HEADER_TAG: [u8; 4] = *b"MThd";
pub const TRACK_TAG: [u8; 4] = *b"MTrk";

/// Meta event type for end-of-track
pub const META_END_OF_TRACK: u8 = 0x2F;

/// Contents of the MThd chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub format: u16,
    pub track_count: u16,
    /// Raw division word; metrical files store ticks per quarter note here
    pub ticks_per_quarter: u16,
}

/// One chunk of the container: 4-byte tag plus its body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub tag: [u8; 4],
    pub data: &'a [u8],
    /// Offset of `data` in the whole buffer
    pub offset: usize,
}

impl Chunk<'_> {
    pub fn tag_name(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }
}

/// A decoded track event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent<'a> {
    NoteOff { channel: u8, key: u8, velocity: u8 },
    NoteOn { channel: u8, key: u8, velocity: u8 },
    PolyPressure { channel: u8, key: u8, pressure: u8 },
    Controller { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// 14-bit bend value, 0x2000 is centre
    PitchBend { channel: u8, value: u16 },
    /// Payload after the length prefix, including a trailing F7 if present
    SysEx(&'a [u8]),
    Meta { kind: u8, data: &'a [u8] },
    /// Single-byte system real-time message
    Realtime(u8),
}

impl MidiEvent<'_> {
    pub fn is_end_of_track(&self) -> bool {
        matches!(self, MidiEvent::Meta { kind: META_END_OF_TRACK, .. })
    }
}

/// An event with its track index and absolute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEvent<'a> {
    pub track: usize,
    pub tick: u64,
    pub event: MidiEvent<'a>,
}

/// A fully decoded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smf<'a> {
    pub header: Header,
    pub tracks: Vec<Vec<TrackEvent<'a>>>,
}

impl<'a> Smf<'a> {
    /// All events of all tracks, track by track
    pub fn events(&self) -> impl Iterator<Item = &TrackEvent<'a>> {
        self.tracks.iter().flatten()
    }
}

/// Channel message for the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChannelMessage {
    NoteOff { key: u8, velocity: u8 },
    NoteOn { key: u8, velocity: u8 },
    ProgramChange { program: u8 },
}

impl ChannelMessage {
    /// Status nibble (upper four bits of the status byte)
    pub fn status_nibble(&self) -> u8 {
        match self {
            ChannelMessage::NoteOff { .. } => 0x8,
            ChannelMessage::NoteOn { .. } => 0x9,
            ChannelMessage::ProgramChange { .. } => 0xC,
        }
    }
}

/// A message at an absolute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedMessage {
    pub tick: u64,
    pub channel: u8,
    pub message: ChannelMessage,
}

/// Single output track, events sorted by tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTrack {
    pub ticks_per_quarter: u16,
    pub events: Vec<TimedMessage>,
}
