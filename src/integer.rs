//! Prefix integer coding (RFC 7541 Section 5.1).
//!
//! An integer is carried in the low `bits` bits of its first octet, with
//! the representation's opcode stamped into the high bits. Values that do
//! not fit the prefix continue in 7-bit groups, least significant first,
//! each continuation octet flagged with the high bit.

use crate::buffer::{Reader, Writer};
use crate::error::Error;

/// Encode `value` with a `bits`-wide prefix, stamping the opcode bits of
/// `stamp` into the first octet.
pub fn encode(writer: &mut Writer, value: u32, stamp: u8, bits: u8) {
    let limit = (1u32 << bits) - 1;

    if value < limit {
        writer.put(stamp | value as u8);
        return;
    }

    writer.put(stamp | limit as u8);
    let mut rest = value - limit;
    while rest >= 0x80 {
        writer.put((rest & 0x7f) as u8 | 0x80);
        rest >>= 7;
    }
    writer.put(rest as u8);
}

/// Decode an integer with a `bits`-wide prefix.
///
/// Fails with a protocol error if the block ends mid-integer or the value
/// exceeds 32 bits. Overlong continuation sequences are rejected rather
/// than skipped.
pub fn decode(reader: &mut Reader<'_>, bits: u8) -> Result<u32, Error> {
    let limit = (1u32 << bits) - 1;
    let mut value = reader.get()? as u32 & limit;

    if value < limit {
        return Ok(value);
    }

    let mut shift = 0u32;
    loop {
        let octet = reader.get()?;

        let widened = value as u64 + (((octet & 0x7f) as u64) << shift);
        if widened > u32::MAX as u64 {
            return Err(Error::IntegerOverflow);
        }
        value = widened as u32;

        if octet & 0x80 == 0 {
            return Ok(value);
        }

        shift += 7;
        if shift > 28 {
            return Err(Error::IntegerOverflow);
        }
    }
}
