//! Text Request / Text Response (RFC 3720 Sections 10.10, 10.11)

use super::{flags, offset, BhsLayout, BHS_SIZE};
use crate::error::PduResult;
use crate::field::{flag, get_u32, put_u32, set_flag};
use crate::opcode::Opcode;

fn text_flags(final_flag: bool, cont: bool) -> u8 {
    set_flag(set_flag(0, flags::FINAL, final_flag), flags::CONTINUE, cont)
}

/// Text Request. Bytes 8-15 are reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    /// Final flag (byte 1, bit 7)
    pub final_flag: bool,
    /// Continue flag (byte 1, bit 6)
    pub cont: bool,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Target Transfer Tag (bytes 20-23)
    pub ttt: u32,
    /// CmdSN (bytes 24-27)
    pub cmd_sn: u32,
    /// ExpStatSN (bytes 28-31)
    pub exp_stat_sn: u32,
}

impl BhsLayout for TextRequest {
    const OPCODE: Opcode = Opcode::TextRequest;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let f = bhs[offset::FLAGS];
        Ok(TextRequest {
            final_flag: flag(f, flags::FINAL),
            cont: flag(f, flags::CONTINUE),
            itt: get_u32(bhs, offset::ITT),
            ttt: get_u32(bhs, offset::WORD20),
            cmd_sn: get_u32(bhs, offset::WORD24),
            exp_stat_sn: get_u32(bhs, offset::WORD28),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = text_flags(self.final_flag, self.cont);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.ttt);
        put_u32(bhs, offset::WORD24, self.cmd_sn);
        put_u32(bhs, offset::WORD28, self.exp_stat_sn);
    }
}

/// Text Response. Bytes 8-15 are reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    /// Final flag (byte 1, bit 7)
    pub final_flag: bool,
    /// Continue flag (byte 1, bit 6)
    pub cont: bool,
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

impl BhsLayout for TextResponse {
    const OPCODE: Opcode = Opcode::TextResponse;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let f = bhs[offset::FLAGS];
        Ok(TextResponse {
            final_flag: flag(f, flags::FINAL),
            cont: flag(f, flags::CONTINUE),
            itt: get_u32(bhs, offset::ITT),
            ttt: get_u32(bhs, offset::WORD20),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = text_flags(self.final_flag, self.cont);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.ttt);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
    }
}
