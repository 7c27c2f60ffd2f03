use crate::converters::smf::vlq::{encode_vlq, MAX_VLQ};
use crate::converters::smf::{model::*, Result, SmfError};

/// Write a single-track Standard MIDI File (format 0)
///
/// Events must already be sorted by tick. Every event carries its own status
/// byte; the track ends with an end-of-track meta event.
pub fn write_smf(track: &OutputTrack, out: &mut Vec<u8>) -> Result<()> {
    let body = encode_track(&track.events)?;

    out.extend_from_slice(&HEADER_TAG);
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&track.ticks_per_quarter.to_be_bytes());

    out.extend_from_slice(&TRACK_TAG);
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(&body);

    Ok(())
}

fn encode_track(events: &[TimedMessage]) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(events.len() * 4 + 4);
    let mut last_tick = 0u64;

    for event in events {
        let delta = event.tick.saturating_sub(last_tick);
        if delta > MAX_VLQ as u64 {
            return Err(SmfError::DeltaTooLarge { delta });
        }
        encode_vlq(delta as u32, &mut body);

        body.push((event.message.status_nibble() << 4) | (event.channel & 0x0F));
        match event.message {
            ChannelMessage::NoteOff { key, velocity } | ChannelMessage::NoteOn { key, velocity } => {
                body.push(key & 0x7F);
                body.push(velocity & 0x7F);
            }
            ChannelMessage::ProgramChange { program } => body.push(program & 0x7F),
        }

        last_tick = last_tick.max(event.tick);
    }

    body.extend_from_slice(&[0x00, 0xFF, META_END_OF_TRACK, 0x00]);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(tick: u64, message: ChannelMessage) -> TimedMessage {
        TimedMessage {
            tick,
            channel: 0,
            message,
        }
    }

    #[test]
    fn test_write_minimal_smf() {
        let track = OutputTrack {
            ticks_per_quarter: 480,
            events: vec![
                note(0, ChannelMessage::NoteOn { key: 60, velocity: 127 }),
                note(1000, ChannelMessage::NoteOff { key: 60, velocity: 127 }),
            ],
        };

        let mut out = Vec::new();
        write_smf(&track, &mut out).expect("Failed to write SMF");

        assert_eq!(&out[0..4], b"MThd");
        assert_eq!(&out[4..8], &[0, 0, 0, 6]);
        assert_eq!(&out[8..14], &[0, 0, 0, 1, 0x01, 0xE0]);
        assert_eq!(&out[14..18], b"MTrk");

        // 1000 = 0x3E8 -> 0x87 0x68
        let body = [
            0x00, 0x90, 60, 127, //
            0x87, 0x68, 0x80, 60, 127, //
            0x00, 0xFF, 0x2F, 0x00,
        ];
        assert_eq!(&out[18..22], &(body.len() as u32).to_be_bytes());
        assert_eq!(&out[22..], &body);
    }

    #[test]
    fn test_program_change_payload() {
        let body = encode_track(&[note(0, ChannelMessage::ProgramChange { program: 2 })]).unwrap();
        assert_eq!(body, vec![0x00, 0xC0, 2, 0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_empty_track_has_end_marker() {
        let body = encode_track(&[]).unwrap();
        assert_eq!(body, vec![0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_delta_too_large() {
        let events = [note(MAX_VLQ as u64 + 1, ChannelMessage::NoteOn { key: 60, velocity: 1 })];
        assert_eq!(
            encode_track(&events).unwrap_err(),
            SmfError::DeltaTooLarge {
                delta: MAX_VLQ as u64 + 1
            }
        );
    }
}
