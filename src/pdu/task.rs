//! Task Management Function Request / Response (RFC 3720 Sections 10.5, 10.6)

use super::{flags, offset, BhsLayout, BHS_SIZE};
use crate::error::{IscsiError, PduResult};
use crate::field::{get_u32, get_u64, put_u32, put_u64};
use crate::opcode::Opcode;

/// Task management function code (flags & 0x7F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFunction {
    AbortTask = 1,
    AbortTaskSet = 2,
    ClearAca = 3,
    ClearTaskSet = 4,
    LogicalUnitReset = 5,
    TargetWarmReset = 6,
    TargetColdReset = 7,
    TaskReassign = 8,
}

impl TryFrom<u8> for TaskFunction {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            1 => Ok(TaskFunction::AbortTask),
            2 => Ok(TaskFunction::AbortTaskSet),
            3 => Ok(TaskFunction::ClearAca),
            4 => Ok(TaskFunction::ClearTaskSet),
            5 => Ok(TaskFunction::LogicalUnitReset),
            6 => Ok(TaskFunction::TargetWarmReset),
            7 => Ok(TaskFunction::TargetColdReset),
            8 => Ok(TaskFunction::TaskReassign),
            other => Err(IscsiError::UnknownFunction(other)),
        }
    }
}

/// Task management response code (byte 2 of the response)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResponse {
    Complete = 0x00,
    NoSuchTask = 0x01,
    NoSuchLun = 0x02,
    TaskStillAllegiant = 0x03,
    ReassignmentNotSupported = 0x04,
    NotSupported = 0x05,
    AuthorizationFailed = 0x06,
    Rejected = 0xFF,
}

impl TryFrom<u8> for TaskResponse {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            0x00 => Ok(TaskResponse::Complete),
            0x01 => Ok(TaskResponse::NoSuchTask),
            0x02 => Ok(TaskResponse::NoSuchLun),
            0x03 => Ok(TaskResponse::TaskStillAllegiant),
            0x04 => Ok(TaskResponse::ReassignmentNotSupported),
            0x05 => Ok(TaskResponse::NotSupported),
            0x06 => Ok(TaskResponse::AuthorizationFailed),
            0xFF => Ok(TaskResponse::Rejected),
            other => Err(IscsiError::UnknownTaskResponse(other)),
        }
    }
}

/// Task Management Function Request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskManagementRequest {
    /// Function code (byte 1, low 7 bits)
    pub function: TaskFunction,
    /// Logical Unit Number (bytes 8-15)
    pub lun: u64,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Task tag of the task to act on (bytes 20-23)
    pub referenced_task_tag: u32,
    /// CmdSN (bytes 24-27)
    pub cmd_sn: u32,
    /// ExpStatSN (bytes 28-31)
    pub exp_stat_sn: u32,
    /// RefCmdSN (bytes 32-35)
    pub ref_cmd_sn: u32,
    /// ExpDataSN (bytes 36-39)
    pub exp_data_sn: u32,
}

impl BhsLayout for TaskManagementRequest {
    const OPCODE: Opcode = Opcode::TaskManagementRequest;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let function = TaskFunction::try_from(bhs[offset::FLAGS] & flags::FUNCTION_MASK)?;
        Ok(TaskManagementRequest {
            function,
            lun: get_u64(bhs, offset::LUN),
            itt: get_u32(bhs, offset::ITT),
            referenced_task_tag: get_u32(bhs, offset::WORD20),
            cmd_sn: get_u32(bhs, offset::WORD24),
            exp_stat_sn: get_u32(bhs, offset::WORD28),
            ref_cmd_sn: get_u32(bhs, offset::WORD32),
            exp_data_sn: get_u32(bhs, offset::WORD36),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL | self.function as u8;
        put_u64(bhs, offset::LUN, self.lun);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.referenced_task_tag);
        put_u32(bhs, offset::WORD24, self.cmd_sn);
        put_u32(bhs, offset::WORD28, self.exp_stat_sn);
        put_u32(bhs, offset::WORD32, self.ref_cmd_sn);
        put_u32(bhs, offset::WORD36, self.exp_data_sn);
    }
}

/// Task Management Function Response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskManagementResponse {
    /// Response (byte 2)
    pub response: TaskResponse,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// StatSN (bytes 24-27)
    pub stat_sn: u32,
    /// ExpCmdSN (bytes 28-31)
    pub exp_cmd_sn: u32,
    /// MaxCmdSN (bytes 32-35)
    pub max_cmd_sn: u32,
}

impl BhsLayout for TaskManagementResponse {
    const OPCODE: Opcode = Opcode::TaskManagementResponse;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let response = TaskResponse::try_from(bhs[offset::BYTE2])?;
        Ok(TaskManagementResponse {
            response,
            itt: get_u32(bhs, offset::ITT),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL;
        bhs[offset::BYTE2] = self.response as u8;
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
    }
}
