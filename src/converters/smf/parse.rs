use crate::converters::smf::vlq::{decode_vlq, VlqError};
use crate::converters::smf::{model::*, Result, SmfError};

/// Size of a chunk preamble: tag plus big-endian length
const CHUNK_PREAMBLE: usize = 8;

/// Bounds-checked reader over one slice of the input buffer
struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// Offset of `data` in the whole buffer, for error reporting
    base: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn truncated(&self, needed: usize) -> SmfError {
        SmfError::TruncatedStream {
            offset: self.base + self.pos,
            needed,
            available: self.remaining(),
        }
    }

    fn peek(&self) -> Result<u8> {
        self.data.get(self.pos).copied().ok_or_else(|| self.truncated(1))
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(self.truncated(len));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_vlq(&mut self) -> Result<u32> {
        match decode_vlq(&self.data[self.pos.min(self.data.len())..]) {
            Ok((value, used)) => {
                self.pos += used;
                Ok(value)
            }
            Err(VlqError::Truncated { needed }) => Err(self.truncated(needed)),
            Err(VlqError::TooLong) => Err(SmfError::InvalidVlq {
                offset: self.base + self.pos,
            }),
        }
    }
}

/// Lazy iterator over the chunks of an SMF buffer
///
/// Yields each chunk once its declared length has been checked against the
/// remaining bytes. Iteration stops after the first error.
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_chunk(&mut self) -> Result<Chunk<'a>> {
        let rest = &self.data[self.pos..];
        let tag = [rest[0], rest[1], rest[2], rest[3]];
        let length = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let available = rest.len() - CHUNK_PREAMBLE;

        if available < length {
            return Err(SmfError::TruncatedStream {
                offset: self.pos + CHUNK_PREAMBLE,
                needed: length,
                available,
            });
        }

        let offset = self.pos + CHUNK_PREAMBLE;
        self.pos = offset + length;

        Ok(Chunk {
            tag,
            data: &self.data[offset..offset + length],
            offset,
        })
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.data.len().saturating_sub(self.pos);
        if remaining == 0 {
            return None;
        }

        if remaining < CHUNK_PREAMBLE {
            log::warn!("{} bytes remaining at end of MIDI file, ignored", remaining);
            self.pos = self.data.len();
            return None;
        }

        let chunk = self.read_chunk();
        if chunk.is_err() {
            self.pos = self.data.len();
        }
        Some(chunk)
    }
}

fn parse_header(chunk: &Chunk) -> Result<Header> {
    if chunk.data.len() != 6 {
        return Err(SmfError::InvalidHeader {
            length: chunk.data.len(),
        });
    }

    let word = |i: usize| u16::from_be_bytes([chunk.data[i], chunk.data[i + 1]]);
    Ok(Header {
        format: word(0),
        track_count: word(2),
        ticks_per_quarter: word(4),
    })
}

/// Lazy decoder for the events of one MTrk chunk
///
/// Absolute ticks start at 0 for every track. Decoding ends at the
/// end-of-track meta event or at the end of the chunk, whichever comes first.
pub struct TrackDecoder<'a> {
    cursor: ByteCursor<'a>,
    track: usize,
    tick: u64,
    running_status: Option<u8>,
    finished: bool,
}

impl<'a> TrackDecoder<'a> {
    pub fn new(chunk: &Chunk<'a>, track: usize) -> Self {
        Self {
            cursor: ByteCursor::new(chunk.data, chunk.offset),
            track,
            tick: 0,
            running_status: None,
            finished: false,
        }
    }

    fn unknown(&self, status: u8) -> SmfError {
        SmfError::UnknownEvent {
            status,
            tick: self.tick,
            track: self.track,
        }
    }

    /// Read a 7-bit data byte; a set high bit is a status byte out of place
    fn data_byte(&mut self) -> Result<u8> {
        let byte = self.cursor.read_u8()?;
        if byte & 0x80 != 0 {
            return Err(self.unknown(byte));
        }
        Ok(byte)
    }

    fn decode_event(&mut self) -> Result<TrackEvent<'a>> {
        let delta = self.cursor.read_vlq()?;
        self.tick += delta as u64;

        let first = self.cursor.peek()?;
        let status = if first & 0x80 != 0 {
            self.cursor.read_u8()?;
            first
        } else {
            // Running status: the data byte belongs to the previous event type
            self.running_status.ok_or_else(|| self.unknown(first))?
        };

        let channel = status & 0x0F;
        let event = match status >> 4 {
            0x8 => MidiEvent::NoteOff {
                channel,
                key: self.data_byte()?,
                velocity: self.data_byte()?,
            },
            0x9 => MidiEvent::NoteOn {
                channel,
                key: self.data_byte()?,
                velocity: self.data_byte()?,
            },
            0xA => MidiEvent::PolyPressure {
                channel,
                key: self.data_byte()?,
                pressure: self.data_byte()?,
            },
            0xB => MidiEvent::Controller {
                channel,
                controller: self.data_byte()?,
                value: self.data_byte()?,
            },
            0xC => MidiEvent::ProgramChange {
                channel,
                program: self.data_byte()?,
            },
            0xD => MidiEvent::ChannelPressure {
                channel,
                pressure: self.data_byte()?,
            },
            0xE => {
                let lsb = self.data_byte()? as u16;
                let msb = self.data_byte()? as u16;
                MidiEvent::PitchBend {
                    channel,
                    value: (msb << 7) | lsb,
                }
            }
            _ => match status {
                0xF0 | 0xF7 => {
                    let len = self.cursor.read_vlq()? as usize;
                    MidiEvent::SysEx(self.cursor.take(len)?)
                }
                0xFF => {
                    let kind = self.data_byte()?;
                    let len = self.cursor.read_vlq()? as usize;
                    MidiEvent::Meta {
                        kind,
                        data: self.cursor.take(len)?,
                    }
                }
                0xF8 | 0xFA | 0xFB | 0xFC => MidiEvent::Realtime(status),
                _ => return Err(self.unknown(status)),
            },
        };

        match status {
            0x80..=0xEF => self.running_status = Some(status),
            // Sysex and meta events cancel running status
            0xF0 | 0xF7 | 0xFF => self.running_status = None,
            _ => {}
        }

        if event.is_end_of_track() {
            self.finished = true;
        }

        Ok(TrackEvent {
            track: self.track,
            tick: self.tick,
            event,
        })
    }
}

impl<'a> Iterator for TrackDecoder<'a> {
    type Item = Result<TrackEvent<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.cursor.is_empty() {
            return None;
        }

        let event = self.decode_event();
        if event.is_err() {
            self.finished = true;
        }
        Some(event)
    }
}

/// Decode a complete SMF buffer
///
/// The first chunk must be the header. Track chunks are numbered in file
/// order; chunks with other tags are skipped.
pub fn parse_smf(bytes: &[u8]) -> Result<Smf<'_>> {
    let mut chunks = ChunkReader::new(bytes);

    let first = match chunks.next() {
        Some(chunk) => chunk?,
        None => {
            return Err(SmfError::MissingHeader {
                found: String::from("<empty>"),
            })
        }
    };
    if first.tag != HEADER_TAG {
        return Err(SmfError::MissingHeader {
            found: first.tag_name(),
        });
    }

    let header = parse_header(&first)?;
    log::info!(
        "MThd: format {}, {} tracks, {} ticks per quarter",
        header.format,
        header.track_count,
        header.ticks_per_quarter
    );

    let mut tracks = Vec::new();
    for chunk in chunks {
        let chunk = chunk?;
        match chunk.tag {
            HEADER_TAG => return Err(SmfError::DuplicateHeader),
            TRACK_TAG => {
                let track = tracks.len();
                let events = TrackDecoder::new(&chunk, track).collect::<Result<Vec<_>>>()?;
                log::debug!("MTrk {}: {} bytes, {} events", track, chunk.data.len(), events.len());
                tracks.push(events);
            }
            _ => log::debug!("skipping {} chunk ({} bytes)", chunk.tag_name(), chunk.data.len()),
        }
    }

    if tracks.len() != header.track_count as usize {
        log::warn!(
            "header announces {} tracks, file contains {}",
            header.track_count,
            tracks.len()
        );
    }

    Ok(Smf { header, tracks })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_chunk(tracks: u16, tpq: u16) -> Vec<u8> {
        let mut out = b"MThd".to_vec();
        out.extend(6u32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(tracks.to_be_bytes());
        out.extend(tpq.to_be_bytes());
        out
    }

    fn track_chunk(body: &[u8]) -> Vec<u8> {
        let mut out = b"MTrk".to_vec();
        out.extend((body.len() as u32).to_be_bytes());
        out.extend_from_slice(body);
        out
    }

    fn file(tracks: &[&[u8]]) -> Vec<u8> {
        let mut out = header_chunk(tracks.len() as u16, 480);
        for body in tracks {
            out.extend(track_chunk(body));
        }
        out
    }

    #[test]
    fn test_chunk_reader_yields_chunks_lazily() {
        let bytes = file(&[&[0x00, 0xFF, 0x2F, 0x00]]);
        let mut chunks = ChunkReader::new(&bytes);

        let header = chunks.next().unwrap().unwrap();
        assert_eq!(header.tag, HEADER_TAG);
        assert_eq!(header.data.len(), 6);
        assert_eq!(header.offset, 8);

        let track = chunks.next().unwrap().unwrap();
        assert_eq!(track.tag, TRACK_TAG);
        assert_eq!(track.data, &[0x00, 0xFF, 0x2F, 0x00]);
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_chunk_longer_than_buffer_is_truncated() {
        let mut bytes = header_chunk(1, 480);
        bytes.extend(b"MTrk");
        bytes.extend(10u32.to_be_bytes());
        bytes.extend([0x00, 0xFF, 0x2F]);

        let err = parse_smf(&bytes).unwrap_err();
        assert_eq!(
            err,
            SmfError::TruncatedStream {
                offset: 22,
                needed: 10,
                available: 3
            }
        );
    }

    #[test]
    fn test_header_must_come_first() {
        let bytes = track_chunk(&[0x00, 0xFF, 0x2F, 0x00]);
        assert!(matches!(parse_smf(&bytes), Err(SmfError::MissingHeader { .. })));
        assert!(matches!(parse_smf(&[]), Err(SmfError::MissingHeader { .. })));
    }

    #[test]
    fn test_duplicate_header() {
        let mut bytes = header_chunk(0, 480);
        bytes.extend(header_chunk(0, 480));
        assert_eq!(parse_smf(&bytes).unwrap_err(), SmfError::DuplicateHeader);
    }

    #[test]
    fn test_header_body_must_be_six_bytes() {
        let mut bytes = b"MThd".to_vec();
        bytes.extend(4u32.to_be_bytes());
        bytes.extend([0, 0, 0, 1]);
        assert_eq!(parse_smf(&bytes).unwrap_err(), SmfError::InvalidHeader { length: 4 });
    }

    #[test]
    fn test_short_trailer_is_ignored() {
        let mut bytes = file(&[&[0x00, 0xFF, 0x2F, 0x00]]);
        bytes.extend([0, 0, 0]);
        let smf = parse_smf(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 1);
    }

    #[test]
    fn test_unknown_chunks_are_skipped() {
        let mut bytes = header_chunk(1, 96);
        bytes.extend(b"XFIH");
        bytes.extend(2u32.to_be_bytes());
        bytes.extend([1, 2]);
        bytes.extend(track_chunk(&[0x00, 0xFF, 0x2F, 0x00]));

        let smf = parse_smf(&bytes).unwrap();
        assert_eq!(smf.header.ticks_per_quarter, 96);
        assert_eq!(smf.tracks.len(), 1);
    }

    #[test]
    fn test_running_status_and_absolute_ticks() {
        // note on 60, then note on 64 via running status, then velocity-0 off
        let body = [
            0x00, 0x90, 60, 100, //
            0x81, 0x40, 64, 90, // delta 192, running status
            0x60, 60, 0, // delta 96, running status
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let bytes = file(&[&body]);
        let smf = parse_smf(&bytes).unwrap();
        let events = &smf.tracks[0];

        assert_eq!(events.len(), 4);
        assert_eq!(events[0].tick, 0);
        assert_eq!(events[1].tick, 192);
        assert_eq!(
            events[1].event,
            MidiEvent::NoteOn {
                channel: 0,
                key: 64,
                velocity: 90
            }
        );
        assert_eq!(events[2].tick, 288);
        assert_eq!(
            events[2].event,
            MidiEvent::NoteOn {
                channel: 0,
                key: 60,
                velocity: 0
            }
        );
        assert!(events[3].event.is_end_of_track());
    }

    #[test]
    fn test_ticks_reset_per_track() {
        let first = [0x83, 0x60, 0x90, 60, 100, 0x00, 0xFF, 0x2F, 0x00];
        let second = [0x10, 0x91, 62, 100, 0x00, 0xFF, 0x2F, 0x00];
        let bytes = file(&[&first, &second]);
        let smf = parse_smf(&bytes).unwrap();

        assert_eq!(smf.tracks[0][0].tick, 480);
        assert_eq!(smf.tracks[1][0].tick, 16);
        assert_eq!(smf.tracks[1][0].track, 1);
    }

    #[test]
    fn test_payload_sizes() {
        let body = [
            0x00, 0xC2, 5, // program change, 1 byte
            0x00, 0xD2, 40, // channel pressure, 1 byte
            0x00, 0xB2, 7, 100, // controller, 2 bytes
            0x00, 0xE2, 0x00, 0x40, // pitch bend centre
            0x00, 0xF0, 0x03, 0x7E, 0x7F, 0xF7, // sysex
            0x00, 0xFF, 0x03, 0x02, b'h', b'i', // track name
            0x00, 0xF8, // timing clock
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let bytes = file(&[&body]);
        let events: Vec<_> = parse_smf(&bytes).unwrap().tracks[0].iter().map(|e| e.event).collect();

        assert_eq!(
            events,
            vec![
                MidiEvent::ProgramChange { channel: 2, program: 5 },
                MidiEvent::ChannelPressure { channel: 2, pressure: 40 },
                MidiEvent::Controller { channel: 2, controller: 7, value: 100 },
                MidiEvent::PitchBend { channel: 2, value: 0x2000 },
                MidiEvent::SysEx(&[0x7E, 0x7F, 0xF7]),
                MidiEvent::Meta { kind: 0x03, data: b"hi" },
                MidiEvent::Realtime(0xF8),
                MidiEvent::Meta { kind: 0x2F, data: &[] },
            ]
        );
    }

    #[test]
    fn test_decoding_stops_at_end_of_track() {
        let body = [0x00, 0xFF, 0x2F, 0x00, 0x00, 0x90, 60, 100];
        let bytes = file(&[&body]);
        assert_eq!(parse_smf(&bytes).unwrap().tracks[0].len(), 1);
    }

    #[test]
    fn test_unknown_status() {
        let body = [0x00, 0x90, 60, 100, 0x83, 0x60, 0xF4, 0x00];
        let bytes = file(&[&body]);
        assert_eq!(
            parse_smf(&bytes).unwrap_err(),
            SmfError::UnknownEvent {
                status: 0xF4,
                tick: 480,
                track: 0
            }
        );
    }

    #[test]
    fn test_data_byte_without_running_status() {
        let bytes = file(&[&[0x00, 0x3C, 0x40]]);
        assert!(matches!(
            parse_smf(&bytes),
            Err(SmfError::UnknownEvent { status: 0x3C, tick: 0, track: 0 })
        ));
    }

    #[test]
    fn test_status_byte_in_data_position() {
        // Note on whose key byte is another status
        let body = [0x00, 0x90, 60, 100, 0x10, 0x90, 0xBC, 0x40];
        let bytes = file(&[&body]);
        assert_eq!(
            parse_smf(&bytes).unwrap_err(),
            SmfError::UnknownEvent {
                status: 0xBC,
                tick: 16,
                track: 0
            }
        );

        // Pitch bend msb with the high bit set
        let body = [0x00, 0xE0, 0x00, 0xC0];
        assert!(matches!(
            parse_smf(&file(&[&body])),
            Err(SmfError::UnknownEvent { status: 0xC0, tick: 0, .. })
        ));
    }

    #[test]
    fn test_running_status_cancelled_by_meta() {
        let body = [0x00, 0x90, 60, 100, 0x00, 0xFF, 0x01, 0x00, 0x00, 62, 100];
        let bytes = file(&[&body]);
        assert!(matches!(
            parse_smf(&bytes),
            Err(SmfError::UnknownEvent { status: 62, .. })
        ));
    }

    #[test]
    fn test_event_cut_short_by_chunk_end() {
        let bytes = file(&[&[0x00, 0x90, 60]]);
        assert!(matches!(
            parse_smf(&bytes),
            Err(SmfError::TruncatedStream { needed: 1, available: 0, .. })
        ));

        let bytes = file(&[&[0x00, 0xFF, 0x01, 0x05, b'a']]);
        assert!(matches!(
            parse_smf(&bytes),
            Err(SmfError::TruncatedStream { needed: 5, available: 1, .. })
        ));
    }

    #[test]
    fn test_overlong_delta() {
        let bytes = file(&[&[0x81, 0x81, 0x81, 0x81, 0x00, 0x90, 60, 100]]);
        assert!(matches!(parse_smf(&bytes), Err(SmfError::InvalidVlq { .. })));
    }
}
