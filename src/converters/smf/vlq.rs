//! Variable-length quantities
//!
//! Big-endian base-128: seven value bits per byte, continuation bit set on
//! every byte except the last. SMF caps them at four bytes.

/// Largest value representable in four bytes
pub const MAX_VLQ: u32 = 0x0FFF_FFFF;

/// Maximum encoded length accepted by the reader
pub const MAX_VLQ_BYTES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VlqError {
    /// Input ended before the terminal byte
    Truncated { needed: usize },
    /// No terminal byte within four bytes
    TooLong,
}

/// Decode a quantity from the start of `bytes`, returning it with the number
/// of bytes consumed
pub fn decode_vlq(bytes: &[u8]) -> Result<(u32, usize), VlqError> {
    let mut value = 0u32;
    for i in 0..MAX_VLQ_BYTES {
        let byte = *bytes.get(i).ok_or(VlqError::Truncated { needed: i + 1 })?;
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(VlqError::TooLong)
}

/// Append the encoding of `value`, most significant group first
pub fn encode_vlq(value: u32, out: &mut Vec<u8>) {
    let mut groups = [0u8; 5];
    let mut count = 0;
    let mut rest = value;
    loop {
        groups[count] = (rest & 0x7F) as u8;
        count += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i == 0 { 0x00 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}
