//! Primitive wire forms shared by every header layout
//!
//! iSCSI carries its DataSegmentLength as a 24-bit big-endian integer and
//! packs most per-opcode options into single flag bytes. Everything here is
//! a pure function over bytes.

use crate::error::{IscsiError, PduResult};
use byteorder::{BigEndian, ByteOrder};

/// Largest value a 24-bit field can hold
pub const U24_MAX: u32 = 0x00FF_FFFF;

/// Opcode byte bit masks (byte 0 of every BHS)
pub const OP_RETRY: u8 = 0x80;
pub const OP_IMMEDIATE: u8 = 0x40;
pub const OPCODE_MASK: u8 = 0x3F;

/// Decode a 3-byte big-endian unsigned integer
pub fn decode_u24_be(bytes: [u8; 3]) -> u32 {
    BigEndian::read_u24(&bytes)
}

/// Encode a value into 3 big-endian bytes
///
/// Values above [`U24_MAX`] are rejected rather than truncated.
pub fn encode_u24_be(v: u32) -> PduResult<[u8; 3]> {
    check_u24("data_segment_length", v)?;
    let mut out = [0u8; 3];
    BigEndian::write_u24(&mut out, v);
    Ok(out)
}

fn check_u24(field: &'static str, v: u32) -> PduResult<()> {
    if v > U24_MAX {
        return Err(IscsiError::Range {
            field,
            value: v as u64,
            max: U24_MAX as u64,
        });
    }
    Ok(())
}

/// Test a single flag bit (or any bit of a mask)
#[inline]
pub fn flag(byte: u8, mask: u8) -> bool {
    byte & mask != 0
}

/// Set or clear the bits of `mask`
#[inline]
pub fn set_flag(byte: u8, mask: u8, on: bool) -> u8 {
    if on {
        byte | mask
    } else {
        byte & !mask
    }
}

/// Extract a multi-bit sub-field, e.g. the login CSG at mask 0x0C, shift 2
#[inline]
pub fn sub_field(byte: u8, mask: u8, shift: u32) -> u8 {
    (byte & mask) >> shift
}

/// Replace a multi-bit sub-field; bits of `value` outside the mask are dropped
#[inline]
pub fn with_sub_field(byte: u8, mask: u8, shift: u32, value: u8) -> u8 {
    (byte & !mask) | ((value << shift) & mask)
}

/// Byte 0 of a BHS: retry bit, immediate bit and the 6-bit opcode value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpcodeByte {
    pub retry: bool,
    pub immediate: bool,
    pub value: u8,
}

impl OpcodeByte {
    pub fn unpack(byte: u8) -> Self {
        OpcodeByte {
            retry: flag(byte, OP_RETRY),
            immediate: flag(byte, OP_IMMEDIATE),
            value: byte & OPCODE_MASK,
        }
    }

    pub fn pack(&self) -> u8 {
        let byte = set_flag(0, OP_RETRY, self.retry);
        let byte = set_flag(byte, OP_IMMEDIATE, self.immediate);
        byte | (self.value & OPCODE_MASK)
    }
}

// Fixed-offset accessors over a BHS buffer. Callers always hand in a full
// 48-byte header, so the slice bounds below cannot fail.

#[inline]
pub(crate) fn get_u16(buf: &[u8], offset: usize) -> u16 {
    BigEndian::read_u16(&buf[offset..offset + 2])
}

#[inline]
pub(crate) fn get_u32(buf: &[u8], offset: usize) -> u32 {
    BigEndian::read_u32(&buf[offset..offset + 4])
}

#[inline]
pub(crate) fn get_u64(buf: &[u8], offset: usize) -> u64 {
    BigEndian::read_u64(&buf[offset..offset + 8])
}

#[inline]
pub(crate) fn put_u16(buf: &mut [u8], offset: usize, v: u16) {
    BigEndian::write_u16(&mut buf[offset..offset + 2], v);
}

#[inline]
pub(crate) fn put_u32(buf: &mut [u8], offset: usize, v: u32) {
    BigEndian::write_u32(&mut buf[offset..offset + 4], v);
}

#[inline]
pub(crate) fn put_u64(buf: &mut [u8], offset: usize, v: u64) {
    BigEndian::write_u64(&mut buf[offset..offset + 8], v);
}
