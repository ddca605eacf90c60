//! Reject (RFC 3720 Section 10.17)

use super::{flags, offset, BhsLayout, BHS_SIZE, RESERVED_TAG};
use crate::error::{IscsiError, PduResult};
use crate::field::{get_u32, put_u32};
use crate::opcode::Opcode;

/// Reason byte of a Reject PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    CommandBeforeLogin = 0x01,
    DataDigestError = 0x02,
    SnackReject = 0x03,
    ProtocolError = 0x04,
    CommandNotSupported = 0x05,
    ImmediateCommandReject = 0x06,
    TaskInProgress = 0x07,
    InvalidDataAck = 0x08,
    InvalidPduField = 0x09,
    LongOperationReject = 0x0A,
    NegotiationReset = 0x0B,
    WaitingForLogout = 0x0C,
}

impl TryFrom<u8> for RejectReason {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            0x01 => Ok(RejectReason::CommandBeforeLogin),
            0x02 => Ok(RejectReason::DataDigestError),
            0x03 => Ok(RejectReason::SnackReject),
            0x04 => Ok(RejectReason::ProtocolError),
            0x05 => Ok(RejectReason::CommandNotSupported),
            0x06 => Ok(RejectReason::ImmediateCommandReject),
            0x07 => Ok(RejectReason::TaskInProgress),
            0x08 => Ok(RejectReason::InvalidDataAck),
            0x09 => Ok(RejectReason::InvalidPduField),
            0x0A => Ok(RejectReason::LongOperationReject),
            0x0B => Ok(RejectReason::NegotiationReset),
            0x0C => Ok(RejectReason::WaitingForLogout),
            other => Err(IscsiError::UnknownRejectReason(other)),
        }
    }
}

/// Reject
///
/// The rejected PDU's header travels in the data segment. It is not parsed
/// here; see [`Reject::rejected_header`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reject {
    /// Reason (byte 2)
    pub reason: RejectReason,
    /// StatSN (bytes 24-27)
    pub stat_sn: u32,
    /// ExpCmdSN (bytes 28-31)
    pub exp_cmd_sn: u32,
    /// MaxCmdSN (bytes 32-35)
    pub max_cmd_sn: u32,
    /// DataSN/R2TSN, only meaningful for data digest and SNACK rejects (bytes 36-39)
    pub data_sn: u32,
}

impl Reject {
    /// The rejected header bytes, taken verbatim from a Reject data segment
    ///
    /// Returns `None` if the segment is shorter than a BHS.
    pub fn rejected_header(data_segment: &[u8]) -> Option<&[u8]> {
        data_segment.get(..BHS_SIZE)
    }
}

impl BhsLayout for Reject {
    const OPCODE: Opcode = Opcode::Reject;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let reason = RejectReason::try_from(bhs[offset::BYTE2])?;
        Ok(Reject {
            reason,
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
            data_sn: get_u32(bhs, offset::WORD36),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL;
        bhs[offset::BYTE2] = self.reason as u8;
        put_u32(bhs, offset::ITT, RESERVED_TAG);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
        put_u32(bhs, offset::WORD36, self.data_sn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_layout() {
        let rej = Reject {
            reason: RejectReason::CommandNotSupported,
            stat_sn: 1,
            exp_cmd_sn: 2,
            max_cmd_sn: 3,
            data_sn: 0,
        };
        let mut bhs = [0u8; BHS_SIZE];
        rej.encode_fields(&mut bhs);
        assert_eq!(bhs[1], 0x80);
        assert_eq!(bhs[2], 0x05);
        assert_eq!(&bhs[16..20], &[0xFF; 4]);
        assert_eq!(&bhs[8..16], &[0; 8]);
        assert_eq!(Reject::decode_fields(&bhs).unwrap(), rej);
    }

    #[test]
    fn test_reject_reason_range() {
        let mut bhs = [0u8; BHS_SIZE];
        for good in 0x01u8..=0x0C {
            bhs[2] = good;
            let rej = Reject::decode_fields(&bhs).unwrap();
            assert_eq!(rej.reason as u8, good);
        }
        bhs[2] = 0x0C;
        assert_eq!(
            Reject::decode_fields(&bhs).unwrap().reason,
            RejectReason::WaitingForLogout
        );

        for bad in [0x00u8, 0x0D, 0xFF] {
            bhs[2] = bad;
            assert_eq!(
                Reject::decode_fields(&bhs),
                Err(IscsiError::UnknownRejectReason(bad))
            );
        }
    }

    #[test]
    fn test_rejected_header_passthrough() {
        let mut data = vec![0xC1u8; BHS_SIZE];
        data.extend_from_slice(&[1, 2, 3, 4]);
        let hdr = Reject::rejected_header(&data).unwrap();
        assert_eq!(hdr.len(), BHS_SIZE);
        assert!(hdr.iter().all(|&b| b == 0xC1));

        assert!(Reject::rejected_header(&data[..20]).is_none());
    }
}
