//! NOP-Out / NOP-In (RFC 3720 Sections 10.18, 10.19)

use super::{flags, offset, BhsLayout, BHS_SIZE};
use crate::error::PduResult;
use crate::field::{get_u32, get_u64, put_u32, put_u64};
use crate::opcode::Opcode;

/// NOP-Out, initiator ping or reply to a NOP-In
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NopOut {
    /// Logical Unit Number (bytes 8-15)
    pub lun: u64,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Target Transfer Tag, echoed from a NOP-In or 0xFFFFFFFF (bytes 20-23)
    pub ttt: u32,
    /// CmdSN (bytes 24-27)
    pub cmd_sn: u32,
    /// ExpStatSN (bytes 28-31)
    pub exp_stat_sn: u32,
}

impl BhsLayout for NopOut {
    const OPCODE: Opcode = Opcode::NopOut;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        Ok(NopOut {
            lun: get_u64(bhs, offset::LUN),
            itt: get_u32(bhs, offset::ITT),
            ttt: get_u32(bhs, offset::WORD20),
            cmd_sn: get_u32(bhs, offset::WORD24),
            exp_stat_sn: get_u32(bhs, offset::WORD28),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL;
        put_u64(bhs, offset::LUN, self.lun);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.ttt);
        put_u32(bhs, offset::WORD24, self.cmd_sn);
        put_u32(bhs, offset::WORD28, self.exp_stat_sn);
    }
}

/// NOP-In, target ping or reply to a NOP-Out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NopIn {
    /// Logical Unit Number (bytes 8-15)
    pub lun: u64,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Target Transfer Tag (bytes 20-23)
    pub ttt: u32,
    /// StatSN (bytes 24-27)
    pub stat_sn: u32,
    /// ExpCmdSN (bytes 28-31)
    pub exp_cmd_sn: u32,
    /// MaxCmdSN (bytes 32-35)
    pub max_cmd_sn: u32,
}

impl BhsLayout for NopIn {
    const OPCODE: Opcode = Opcode::NopIn;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        Ok(NopIn {
            lun: get_u64(bhs, offset::LUN),
            itt: get_u32(bhs, offset::ITT),
            ttt: get_u32(bhs, offset::WORD20),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL;
        put_u64(bhs, offset::LUN, self.lun);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.ttt);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
    }
}
