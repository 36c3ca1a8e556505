use crate::{buffer::WzBuffer, error::Result};

const OFFSET_CONSTANT: u32 = 0x581C_3F6D;

/// Multiplier derived from the decimal digits of a game version.
pub fn version_hash(version: u32) -> u32 {
    version.to_string().bytes().fold(0u32, |hash, digit| {
        hash.wrapping_mul(32)
            .wrapping_add(u32::from(digit))
            .wrapping_add(1)
    })
}

/// Value stored in the two bytes at the package start.
pub fn version_checksum(hash: u32) -> u16 {
    let checksum = hash.to_le_bytes().iter().fold(0xFF, |acc, b| acc ^ b);
    u16::from(checksum)
}

/// Keystream word an offset stored at `pos` is XORed with.
pub fn offset_key(pos: u32, start: u32, hash: u32) -> u32 {
    let t = !pos.wrapping_sub(start);
    let t = t.wrapping_mul(hash);
    let t = t.wrapping_sub(OFFSET_CONSTANT);
    t.rotate_left(t & 0x1F)
}

pub fn decode_offset(pos: u32, start: u32, hash: u32, encrypted: u32) -> u32 {
    (offset_key(pos, start, hash) ^ encrypted)
        .wrapping_add(start.wrapping_mul(2))
}

/// Reads the obfuscated offset at the cursor and returns the absolute
/// position it points to.
pub fn read_offset(
    buffer: &mut WzBuffer<'_>,
    start: u32,
    hash: u32,
) -> Result<usize> {
    let pos = buffer.offset() as u32;
    let encrypted = buffer.read_u32()?;
    Ok(decode_offset(pos, start, hash, encrypted) as usize)
}
