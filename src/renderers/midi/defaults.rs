//! Default values for playback export

/// Velocity of every playback note; a plucked tooth has no dynamics
pub const DEFAULT_VELOCITY: u8 = 127;

/// Channel the playback track is written on
pub const PLAYBACK_CHANNEL: u8 = 0;

/// Resolution used when the input header carries none
pub const DEFAULT_TPQ: u16 = 480;

/// Use the decoded resolution unless it is unusable
pub fn playback_tpq(decoded: u16) -> u16 {
    if decoded == 0 || decoded & 0x8000 != 0 {
        DEFAULT_TPQ
    } else {
        decoded
    }
}
