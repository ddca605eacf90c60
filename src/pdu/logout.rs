//! Logout Request / Logout Response (RFC 3720 Sections 10.14, 10.15)

use super::{flags, offset, BhsLayout, BHS_SIZE};
use crate::error::{IscsiError, PduResult};
use crate::field::{get_u16, get_u32, put_u16, put_u32};
use crate::opcode::Opcode;

/// Logout reason code (flags & 0x7F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    CloseSession = 0,
    CloseConnection = 1,
    RemoveConnectionForRecovery = 2,
    /// Logout requested through an async event
    AsyncEventRequest = 3,
}

impl TryFrom<u8> for LogoutReason {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            0 => Ok(LogoutReason::CloseSession),
            1 => Ok(LogoutReason::CloseConnection),
            2 => Ok(LogoutReason::RemoveConnectionForRecovery),
            3 => Ok(LogoutReason::AsyncEventRequest),
            other => Err(IscsiError::UnknownLogoutReason(other)),
        }
    }
}

/// Logout response code (byte 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutResponseCode {
    Success = 0,
    CidNotFound = 1,
    ConnectionRecoveryNotSupported = 2,
    CleanupFailed = 3,
}

impl TryFrom<u8> for LogoutResponseCode {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            0 => Ok(LogoutResponseCode::Success),
            1 => Ok(LogoutResponseCode::CidNotFound),
            2 => Ok(LogoutResponseCode::ConnectionRecoveryNotSupported),
            3 => Ok(LogoutResponseCode::CleanupFailed),
            other => Err(IscsiError::UnknownLogoutResponse(other)),
        }
    }
}

/// Logout Request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutRequest {
    /// Reason code (byte 1, bits 0-6)
    pub reason: LogoutReason,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Connection ID to close, unused for CloseSession (bytes 20-21)
    pub cid: u16,
    /// CmdSN (bytes 24-27)
    pub cmd_sn: u32,
    /// ExpStatSN (bytes 28-31)
    pub exp_stat_sn: u32,
}

impl BhsLayout for LogoutRequest {
    const OPCODE: Opcode = Opcode::LogoutRequest;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let reason = LogoutReason::try_from(bhs[offset::FLAGS] & flags::REASON_MASK)?;
        Ok(LogoutRequest {
            reason,
            itt: get_u32(bhs, offset::ITT),
            cid: get_u16(bhs, offset::WORD20),
            cmd_sn: get_u32(bhs, offset::WORD24),
            exp_stat_sn: get_u32(bhs, offset::WORD28),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL | self.reason as u8;
        put_u32(bhs, offset::ITT, self.itt);
        put_u16(bhs, offset::WORD20, self.cid);
        put_u32(bhs, offset::WORD24, self.cmd_sn);
        put_u32(bhs, offset::WORD28, self.exp_stat_sn);
    }
}

/// Logout Response
///
/// `time2wait` and `time2retain` are in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutResponse {
    /// Response (byte 2)
    pub response: LogoutResponseCode,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// StatSN (bytes 24-27)
    pub stat_sn: u32,
    /// ExpCmdSN (bytes 28-31)
    pub exp_cmd_sn: u32,
    /// MaxCmdSN (bytes 32-35)
    pub max_cmd_sn: u32,
    /// Time2Wait in seconds (bytes 40-41)
    pub time2wait: u16,
    /// Time2Retain in seconds (bytes 42-43)
    pub time2retain: u16,
}

impl BhsLayout for LogoutResponse {
    const OPCODE: Opcode = Opcode::LogoutResponse;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let response = LogoutResponseCode::try_from(bhs[offset::BYTE2])?;
        Ok(LogoutResponse {
            response,
            itt: get_u32(bhs, offset::ITT),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
            time2wait: get_u16(bhs, offset::WORD40),
            time2retain: get_u16(bhs, 42),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL;
        bhs[offset::BYTE2] = self.response as u8;
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
        put_u16(bhs, offset::WORD40, self.time2wait);
        put_u16(bhs, 42, self.time2retain);
    }
}
