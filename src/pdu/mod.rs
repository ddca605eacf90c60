//! iSCSI Basic Header Segment layouts
//!
//! One typed record per RFC 3720 header shape. Every layout shares the
//! common template below; the codec owns bytes 0 and 4-7, each variant owns
//! the rest.
//!
//! ```text
//! Byte/     0       |       1       |       2       |       3       |
//!     /              |               |               |               |
//!    |0 1 2 3 4 5 6 7|0 1 2 3 4 5 6 7|0 1 2 3 4 5 6 7|0 1 2 3 4 5 6 7|
//!    +---------------+---------------+---------------+---------------+
//!   0|R|I| Opcode    |F|  Opcode-specific fields                     |
//!    +---------------+---------------+---------------+---------------+
//!   4|TotalAHSLength | DataSegmentLength                             |
//!    +---------------+---------------+---------------+---------------+
//!   8| LUN or Opcode-specific fields                                 |
//!    +                                                               +
//!  12|                                                               |
//!    +---------------+---------------+---------------+---------------+
//!  16| Initiator Task Tag                                            |
//!    +---------------+---------------+---------------+---------------+
//!  20| Opcode-specific fields (28 bytes)                             |
//!    +                                                               +
//!  ...
//!  44|                                                               |
//!    +---------------+---------------+---------------+---------------+
//! ```
//!
//! Reserved bytes are ignored on decode and written as zero on encode.

mod async_event;
mod command;
mod login;
mod logout;
mod nop;
mod reject;
mod snack;
mod task;
mod text;

pub use async_event::{AsyncEvent, AsyncMessage};
pub use command::{ReadyToTransfer, ScsiCommand, ScsiDataIn, ScsiDataOut, ScsiResponse, TaskAttribute};
pub use login::{
    describe_login_status, login_status, LoginPhase, LoginRequest, LoginResponse, LoginStage,
    LoginStatusClass,
};
pub use logout::{LogoutReason, LogoutRequest, LogoutResponse, LogoutResponseCode};
pub use nop::{NopIn, NopOut};
pub use reject::{Reject, RejectReason};
pub use snack::{SnackRequest, SnackType};
pub use task::{TaskFunction, TaskManagementRequest, TaskManagementResponse, TaskResponse};
pub use text::{TextRequest, TextResponse};

use crate::error::PduResult;
use crate::opcode::{Direction, Opcode};

/// BHS (Basic Header Segment) size in bytes
pub const BHS_SIZE: usize = 48;

/// Task tag value meaning "no tag assigned"
pub const RESERVED_TAG: u32 = 0xFFFF_FFFF;

/// Common byte offsets inside the BHS
pub(crate) mod offset {
    pub const FLAGS: usize = 1;
    pub const BYTE2: usize = 2;
    pub const BYTE3: usize = 3;
    pub const LUN: usize = 8;
    pub const ITT: usize = 16;
    pub const WORD20: usize = 20;
    pub const WORD24: usize = 24;
    pub const WORD28: usize = 28;
    pub const WORD32: usize = 32;
    pub const WORD36: usize = 36;
    pub const WORD40: usize = 40;
    pub const WORD44: usize = 44;
}

/// Flag bits in byte 1, by PDU family
pub mod flags {
    // Common flags
    pub const FINAL: u8 = 0x80;
    pub const CONTINUE: u8 = 0x40;

    // SCSI command flags
    pub const READ: u8 = 0x40;
    pub const WRITE: u8 = 0x20;
    pub const ATTR_MASK: u8 = 0x07;

    // SCSI response / Data-In residual flags
    pub const BIDI_OVERFLOW: u8 = 0x10;
    pub const BIDI_UNDERFLOW: u8 = 0x08;
    pub const OVERFLOW: u8 = 0x04;
    pub const UNDERFLOW: u8 = 0x02;

    // Data-In flags
    pub const ACKNOWLEDGE: u8 = 0x40;
    pub const STATUS: u8 = 0x01;

    // Login flags
    pub const TRANSIT: u8 = 0x80;
    pub const CONTINUE_LOGIN: u8 = 0x40;
    pub const CSG_MASK: u8 = 0x0C;
    pub const CSG_SHIFT: u32 = 2;
    pub const NSG_MASK: u8 = 0x03;

    // Task management / logout carry a 7-bit code below the F bit
    pub const FUNCTION_MASK: u8 = 0x7F;
    pub const REASON_MASK: u8 = 0x7F;

    pub const SNACK_TYPE_MASK: u8 = 0x0F;
}

/// SCSI status codes (SAM)
pub mod scsi_status {
    pub const GOOD: u8 = 0x00;
    pub const CHECK_CONDITION: u8 = 0x02;
    pub const CONDITION_MET: u8 = 0x04;
    pub const BUSY: u8 = 0x08;
    pub const RESERVATION_CONFLICT: u8 = 0x18;
    pub const TASK_SET_FULL: u8 = 0x28;
    pub const ACA_ACTIVE: u8 = 0x30;
    pub const TASK_ABORTED: u8 = 0x40;
}

/// iSCSI service response codes carried in the SCSI Response PDU
pub mod service_response {
    pub const COMMAND_COMPLETED: u8 = 0x00;
    pub const TARGET_FAILURE: u8 = 0x01;
    pub const SUBSYSTEM_FAILURE: u8 = 0x02;
}

/// Structural decode/encode for one header shape
///
/// `decode_fields` reads the variant-owned bytes of a full BHS and validates
/// enumerated fields. `encode_fields` writes into a zeroed BHS; it never
/// touches byte 0 or bytes 4-7.
pub trait BhsLayout: Sized {
    const OPCODE: Opcode;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self>;

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]);
}

/// Typed header, one variant per defined opcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    NopOut(NopOut),
    ScsiCommand(ScsiCommand),
    TaskManagementRequest(TaskManagementRequest),
    LoginRequest(LoginRequest),
    TextRequest(TextRequest),
    ScsiDataOut(ScsiDataOut),
    LogoutRequest(LogoutRequest),
    SnackRequest(SnackRequest),
    NopIn(NopIn),
    ScsiResponse(ScsiResponse),
    TaskManagementResponse(TaskManagementResponse),
    LoginResponse(LoginResponse),
    TextResponse(TextResponse),
    ScsiDataIn(ScsiDataIn),
    LogoutResponse(LogoutResponse),
    ReadyToTransfer(ReadyToTransfer),
    AsyncMessage(AsyncMessage),
    Reject(Reject),
}

fn decode_as<T: BhsLayout>(bhs: &[u8; BHS_SIZE], wrap: fn(T) -> Header) -> PduResult<Header> {
    T::decode_fields(bhs).map(wrap)
}

impl Header {
    /// Decode the variant selected by `opcode` from a full BHS
    pub fn decode(opcode: Opcode, bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        match opcode {
            Opcode::NopOut => decode_as(bhs, Header::NopOut),
            Opcode::ScsiCommand => decode_as(bhs, Header::ScsiCommand),
            Opcode::TaskManagementRequest => decode_as(bhs, Header::TaskManagementRequest),
            Opcode::LoginRequest => decode_as(bhs, Header::LoginRequest),
            Opcode::TextRequest => decode_as(bhs, Header::TextRequest),
            Opcode::ScsiDataOut => decode_as(bhs, Header::ScsiDataOut),
            Opcode::LogoutRequest => decode_as(bhs, Header::LogoutRequest),
            Opcode::SnackRequest => decode_as(bhs, Header::SnackRequest),
            Opcode::NopIn => decode_as(bhs, Header::NopIn),
            Opcode::ScsiResponse => decode_as(bhs, Header::ScsiResponse),
            Opcode::TaskManagementResponse => decode_as(bhs, Header::TaskManagementResponse),
            Opcode::LoginResponse => decode_as(bhs, Header::LoginResponse),
            Opcode::TextResponse => decode_as(bhs, Header::TextResponse),
            Opcode::ScsiDataIn => decode_as(bhs, Header::ScsiDataIn),
            Opcode::LogoutResponse => decode_as(bhs, Header::LogoutResponse),
            Opcode::ReadyToTransfer => decode_as(bhs, Header::ReadyToTransfer),
            Opcode::AsyncMessage => decode_as(bhs, Header::AsyncMessage),
            Opcode::Reject => decode_as(bhs, Header::Reject),
        }
    }

    /// Write the variant-owned bytes into a BHS
    ///
    /// The opcode byte and segment lengths are left zero for the codec.
    pub fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        match self {
            Header::NopOut(h) => h.encode_fields(bhs),
            Header::ScsiCommand(h) => h.encode_fields(bhs),
            Header::TaskManagementRequest(h) => h.encode_fields(bhs),
            Header::LoginRequest(h) => h.encode_fields(bhs),
            Header::TextRequest(h) => h.encode_fields(bhs),
            Header::ScsiDataOut(h) => h.encode_fields(bhs),
            Header::LogoutRequest(h) => h.encode_fields(bhs),
            Header::SnackRequest(h) => h.encode_fields(bhs),
            Header::NopIn(h) => h.encode_fields(bhs),
            Header::ScsiResponse(h) => h.encode_fields(bhs),
            Header::TaskManagementResponse(h) => h.encode_fields(bhs),
            Header::LoginResponse(h) => h.encode_fields(bhs),
            Header::TextResponse(h) => h.encode_fields(bhs),
            Header::ScsiDataIn(h) => h.encode_fields(bhs),
            Header::LogoutResponse(h) => h.encode_fields(bhs),
            Header::ReadyToTransfer(h) => h.encode_fields(bhs),
            Header::AsyncMessage(h) => h.encode_fields(bhs),
            Header::Reject(h) => h.encode_fields(bhs),
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Header::NopOut(_) => NopOut::OPCODE,
            Header::ScsiCommand(_) => ScsiCommand::OPCODE,
            Header::TaskManagementRequest(_) => TaskManagementRequest::OPCODE,
            Header::LoginRequest(_) => LoginRequest::OPCODE,
            Header::TextRequest(_) => TextRequest::OPCODE,
            Header::ScsiDataOut(_) => ScsiDataOut::OPCODE,
            Header::LogoutRequest(_) => LogoutRequest::OPCODE,
            Header::SnackRequest(_) => SnackRequest::OPCODE,
            Header::NopIn(_) => NopIn::OPCODE,
            Header::ScsiResponse(_) => ScsiResponse::OPCODE,
            Header::TaskManagementResponse(_) => TaskManagementResponse::OPCODE,
            Header::LoginResponse(_) => LoginResponse::OPCODE,
            Header::TextResponse(_) => TextResponse::OPCODE,
            Header::ScsiDataIn(_) => ScsiDataIn::OPCODE,
            Header::LogoutResponse(_) => LogoutResponse::OPCODE,
            Header::ReadyToTransfer(_) => ReadyToTransfer::OPCODE,
            Header::AsyncMessage(_) => AsyncMessage::OPCODE,
            Header::Reject(_) => Reject::OPCODE,
        }
    }

    pub fn direction(&self) -> Direction {
        self.opcode().direction()
    }

    /// Initiator Task Tag, for every layout that carries one
    ///
    /// `RESERVED_TAG` is returned as-is; interpreting it is up to the caller.
    pub fn initiator_task_tag(&self) -> Option<u32> {
        match self {
            Header::NopOut(h) => Some(h.itt),
            Header::ScsiCommand(h) => Some(h.itt),
            Header::TaskManagementRequest(h) => Some(h.itt),
            Header::LoginRequest(h) => Some(h.itt),
            Header::TextRequest(h) => Some(h.itt),
            Header::ScsiDataOut(h) => Some(h.itt),
            Header::LogoutRequest(h) => Some(h.itt),
            Header::SnackRequest(h) => Some(h.itt),
            Header::NopIn(h) => Some(h.itt),
            Header::ScsiResponse(h) => Some(h.itt),
            Header::TaskManagementResponse(h) => Some(h.itt),
            Header::LoginResponse(h) => Some(h.itt),
            Header::TextResponse(h) => Some(h.itt),
            Header::ScsiDataIn(h) => Some(h.itt),
            Header::LogoutResponse(h) => Some(h.itt),
            Header::ReadyToTransfer(h) => Some(h.itt),
            Header::AsyncMessage(_) | Header::Reject(_) => None,
        }
    }

    /// Logical Unit Number, for layouts whose bytes 8-15 hold one
    pub fn lun(&self) -> Option<u64> {
        match self {
            Header::NopOut(h) => Some(h.lun),
            Header::ScsiCommand(h) => Some(h.lun),
            Header::TaskManagementRequest(h) => Some(h.lun),
            Header::ScsiDataOut(h) => Some(h.lun),
            Header::NopIn(h) => Some(h.lun),
            Header::ScsiDataIn(h) => Some(h.lun),
            Header::ReadyToTransfer(h) => Some(h.lun),
            Header::AsyncMessage(h) => Some(h.lun),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.opcode().name()
    }
}
