//! 7-bit-terminated varint encoding
//!
//! Unsigned little-endian base-128, with the continuation convention
//! inverted relative to LEB128: continuation bytes have the high bit
//! clear and the *terminating* byte has it set. The value is
//! `sum((b_i & 0x7F) << (7 * i))`.

use std::io::{self, Read, Write};

use crate::error::{PosidexError, Result};

/// Encode `value` into `out`, returning the number of bytes written
pub fn write_varint<W: Write>(out: &mut W, mut value: u64) -> io::Result<usize> {
    let mut written = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        written += 1;
        if value == 0 {
            out.write_all(&[byte | 0x80])?; // high bit marks the last byte
            return Ok(written);
        }
        out.write_all(&[byte])?;
    }
}

/// Decode one varint from `src`, returning the value and the number of
/// bytes consumed
pub fn read_varint<R: Read>(src: &mut R) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut consumed = 0usize;
    loop {
        let mut buf = [0u8; 1];
        src.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                PosidexError::Corrupt("unterminated varint".to_string())
            } else {
                PosidexError::Io(e)
            }
        })?;
        let byte = buf[0];
        consumed += 1;
        let payload = (byte & 0x7F) as u64;
        if shift > 63 || (shift == 63 && payload > 1) {
            return Err(PosidexError::Corrupt("varint exceeds 64 bits".to_string()));
        }
        value |= payload << shift;
        if byte & 0x80 != 0 {
            return Ok((value, consumed));
        }
        shift += 7;
    }
}
