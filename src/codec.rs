//! BHS decode/encode entry points
//!
//! `decode` takes the first 48 bytes of a PDU, dispatches on the opcode and
//! hands back the typed header together with the AHS and data segment
//! lengths the transport still has to read. `encode` is the inverse and
//! always produces exactly 48 bytes; AHS and data are appended by the
//! caller.

use crate::error::{IscsiError, PduResult};
use crate::field::{decode_u24_be, encode_u24_be, OpcodeByte, U24_MAX};
use crate::opcode;
use crate::pdu::{Header, BHS_SIZE};

/// Lengths of the segments that follow a BHS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentLengths {
    /// TotalAHSLength, in 4-byte words
    pub ahs_length: u8,
    /// DataSegmentLength, in bytes, excluding padding
    pub data_length: u32,
}

impl SegmentLengths {
    pub fn ahs_bytes(&self) -> usize {
        self.ahs_length as usize * 4
    }

    /// Data segment length rounded up to the 4-byte boundary
    pub fn padded_data_length(&self) -> usize {
        (self.data_length as usize).div_ceil(4) * 4
    }

    /// Full PDU length: BHS + AHS + padded data (digests not included)
    pub fn total_length(&self) -> usize {
        BHS_SIZE + self.ahs_bytes() + self.padded_data_length()
    }
}

/// A complete typed BHS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bhs {
    /// Bit 7 of byte 0
    pub retry: bool,
    /// Bit 6 of byte 0
    pub immediate: bool,
    pub lengths: SegmentLengths,
    pub header: Header,
}

impl Bhs {
    /// Wrap a header with no AHS, no data and no control bits set
    pub fn new(header: Header) -> Self {
        Bhs {
            retry: false,
            immediate: false,
            lengths: SegmentLengths::default(),
            header,
        }
    }

    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    pub fn with_data_length(mut self, data_length: u32) -> Self {
        self.lengths.data_length = data_length;
        self
    }

    pub fn with_ahs_length(mut self, ahs_length: u8) -> Self {
        self.lengths.ahs_length = ahs_length;
        self
    }
}

/// Header codec with transport limits
///
/// The default codec accepts every length the wire format can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduCodec {
    max_data_segment_length: u32,
    max_ahs_length: u8,
}

impl Default for PduCodec {
    fn default() -> Self {
        PduCodec {
            max_data_segment_length: U24_MAX,
            max_ahs_length: u8::MAX,
        }
    }
}

impl PduCodec {
    /// Create a new builder for configuring the codec
    pub fn builder() -> PduCodecBuilder {
        PduCodecBuilder::new()
    }

    pub fn max_data_segment_length(&self) -> u32 {
        self.max_data_segment_length
    }

    pub fn max_ahs_length(&self) -> u8 {
        self.max_ahs_length
    }

    fn check_lengths(&self, lengths: &SegmentLengths) -> PduResult<()> {
        if lengths.data_length > self.max_data_segment_length {
            return Err(IscsiError::DataSegmentTooLong {
                len: lengths.data_length,
                max: self.max_data_segment_length,
            });
        }
        if lengths.ahs_length > self.max_ahs_length {
            return Err(IscsiError::AhsTooLong {
                len: lengths.ahs_length,
                max: self.max_ahs_length,
            });
        }
        Ok(())
    }

    /// Decode the BHS at the start of `buf`
    ///
    /// Bytes past the first 48 are ignored; the returned lengths say how
    /// much AHS and data follow.
    pub fn decode(&self, buf: &[u8]) -> PduResult<(Bhs, SegmentLengths)> {
        let bhs = first_bhs(buf)?;
        let op = OpcodeByte::unpack(bhs[0]);

        let info = opcode::lookup(op.value).map_err(|e| {
            log::debug!("Rejecting BHS with opcode byte 0x{:02x}: {}", bhs[0], e);
            e
        })?;

        let lengths = read_lengths(bhs);
        self.check_lengths(&lengths).map_err(|e| {
            log::debug!("Rejecting {}: {}", info.name, e);
            e
        })?;

        let header = Header::decode(info.opcode, bhs).map_err(|e| {
            log::debug!("Rejecting {}: {}", info.name, e);
            e
        })?;

        log::trace!(
            "Decoded {} (I={}, R={}, AHS={} words, data={} bytes)",
            info.name,
            op.immediate,
            op.retry,
            lengths.ahs_length,
            lengths.data_length
        );

        Ok((
            Bhs {
                retry: op.retry,
                immediate: op.immediate,
                lengths,
                header,
            },
            lengths,
        ))
    }

    /// Encode a header into its 48-byte wire form
    pub fn encode(&self, bhs: &Bhs) -> PduResult<[u8; BHS_SIZE]> {
        // Range error takes precedence over codec limits
        let data_length = encode_u24_be(bhs.lengths.data_length)?;
        self.check_lengths(&bhs.lengths)?;

        let mut buf = [0u8; BHS_SIZE];
        bhs.header.encode_fields(&mut buf);

        buf[0] = OpcodeByte {
            retry: bhs.retry,
            immediate: bhs.immediate,
            value: bhs.header.opcode().value(),
        }
        .pack();
        buf[4] = bhs.lengths.ahs_length;
        buf[5..8].copy_from_slice(&data_length);

        log::trace!(
            "Encoded {} (data={} bytes)",
            bhs.header.name(),
            bhs.lengths.data_length
        );
        Ok(buf)
    }
}

/// Builder for configuring a [`PduCodec`]
#[derive(Debug, Default)]
pub struct PduCodecBuilder {
    max_data_segment_length: Option<u32>,
    max_ahs_length: Option<u8>,
}

impl PduCodecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest DataSegmentLength accepted, e.g. the negotiated
    /// MaxRecvDataSegmentLength
    pub fn max_data_segment_length(mut self, len: u32) -> Self {
        self.max_data_segment_length = Some(len);
        self
    }

    /// Largest TotalAHSLength accepted, in 4-byte words
    pub fn max_ahs_length(mut self, words: u8) -> Self {
        self.max_ahs_length = Some(words);
        self
    }

    pub fn build(self) -> PduResult<PduCodec> {
        let defaults = PduCodec::default();
        let max_data_segment_length = self
            .max_data_segment_length
            .unwrap_or(defaults.max_data_segment_length);

        if max_data_segment_length > U24_MAX {
            return Err(IscsiError::Config(format!(
                "max_data_segment_length {} exceeds the 24-bit wire limit {}",
                max_data_segment_length, U24_MAX
            )));
        }

        Ok(PduCodec {
            max_data_segment_length,
            max_ahs_length: self.max_ahs_length.unwrap_or(defaults.max_ahs_length),
        })
    }
}

fn first_bhs(buf: &[u8]) -> PduResult<&[u8; BHS_SIZE]> {
    buf.get(..BHS_SIZE)
        .and_then(|b| b.try_into().ok())
        .ok_or(IscsiError::TooShort {
            len: buf.len(),
            need: BHS_SIZE,
        })
}

fn read_lengths(bhs: &[u8; BHS_SIZE]) -> SegmentLengths {
    SegmentLengths {
        ahs_length: bhs[4],
        data_length: decode_u24_be([bhs[5], bhs[6], bhs[7]]),
    }
}

/// Decode a BHS with the default codec
pub fn decode(buf: &[u8]) -> PduResult<(Bhs, SegmentLengths)> {
    PduCodec::default().decode(buf)
}

/// Encode a BHS with the default codec
pub fn encode(bhs: &Bhs) -> PduResult<[u8; BHS_SIZE]> {
    PduCodec::default().encode(bhs)
}

/// Read only the segment lengths from a BHS, without validating the opcode
pub fn peek_lengths(buf: &[u8]) -> PduResult<SegmentLengths> {
    first_bhs(buf).map(read_lengths)
}
