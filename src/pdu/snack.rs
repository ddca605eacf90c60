//! SNACK Request (RFC 3720 Section 10.16)

use super::{flags, offset, BhsLayout, BHS_SIZE};
use crate::error::{IscsiError, PduResult};
use crate::field::{get_u32, put_u32};
use crate::opcode::Opcode;

/// SNACK type (flags & 0x0F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnackType {
    DataR2t = 0,
    Status = 1,
    DataAck = 2,
    RData = 3,
}

impl TryFrom<u8> for SnackType {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            0 => Ok(SnackType::DataR2t),
            1 => Ok(SnackType::Status),
            2 => Ok(SnackType::DataAck),
            3 => Ok(SnackType::RData),
            other => Err(IscsiError::UnknownSnackType(other)),
        }
    }
}

/// SNACK Request. Bytes 8-15 are reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnackRequest {
    /// SNACK type (byte 1, bits 0-3)
    pub snack_type: SnackType,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Target Transfer Tag or SNACK Tag (bytes 20-23)
    pub ttt: u32,
    /// ExpStatSN (bytes 28-31)
    pub exp_stat_sn: u32,
    /// BegRun (bytes 40-43)
    pub beg_run: u32,
    /// RunLength, 0 means all remaining (bytes 44-47)
    pub run_length: u32,
}

impl BhsLayout for SnackRequest {
    const OPCODE: Opcode = Opcode::SnackRequest;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let snack_type = SnackType::try_from(bhs[offset::FLAGS] & flags::SNACK_TYPE_MASK)?;
        Ok(SnackRequest {
            snack_type,
            itt: get_u32(bhs, offset::ITT),
            ttt: get_u32(bhs, offset::WORD20),
            exp_stat_sn: get_u32(bhs, offset::WORD28),
            beg_run: get_u32(bhs, offset::WORD40),
            run_length: get_u32(bhs, offset::WORD44),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL | self.snack_type as u8;
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.ttt);
        put_u32(bhs, offset::WORD28, self.exp_stat_sn);
        put_u32(bhs, offset::WORD40, self.beg_run);
        put_u32(bhs, offset::WORD44, self.run_length);
    }
}
