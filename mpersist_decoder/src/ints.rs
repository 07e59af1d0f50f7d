//! Unsigned integers on the wire. All of them are big-endian.

use crate::{ByteCursor, DecodeError};
use anyhow::{bail, Result};
use mpersist_types::serde::LengthSelector;

/// Interprets up to 8 big-endian bytes as an unsigned integer.
pub fn decode_int(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// A length-selected integer: one selector digit, then that many payload bytes.
pub fn load_int(cur: &mut ByteCursor) -> Result<u64> {
    let offset = cur.tell();
    let selector = cur.take_u8()?;
    let selector = match LengthSelector::from_byte(selector) {
        None => bail!(DecodeError::InvalidLengthSelector { offset, selector }),
        Some(sel) => sel,
    };
    match selector.payload_len() {
        0 => Ok(0),
        n => Ok(decode_int(cur.take(n)?)),
    }
}

/// A size or count. It may not exceed what is left of the buffer.
pub fn load_size(cur: &mut ByteCursor) -> Result<usize> {
    load_size_of(cur, 1)
}

/// A count of `unit`-byte items. The items must fit in what is left of the buffer.
pub fn load_size_of(cur: &mut ByteCursor, unit: usize) -> Result<usize> {
    let offset = cur.tell();
    let size = load_int(cur)?;
    let available = cur.remaining();
    let fits = size
        .checked_mul(unit as u64)
        .map_or(false, |total| total <= available as u64);
    if !fits {
        bail!(DecodeError::Truncation {
            offset,
            wanted: size,
            available,
        });
    }
    Ok(size as usize)
}

/// The fixed 4-byte small-int encoding.
pub fn load_small_int(cur: &mut ByteCursor) -> Result<u64> {
    load_fixed(cur, 4)
}

/// A fixed-width field of `width` bytes.
pub fn load_fixed(cur: &mut ByteCursor, width: usize) -> Result<u64> {
    Ok(decode_int(cur.take(width)?))
}
