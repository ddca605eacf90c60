//! iSCSI opcode registry (RFC 3720 Section 10)
//!
//! Maps the 6-bit opcode value to the header layout it selects and to the
//! direction it travels. The table is built once on first use and is
//! read-only afterwards.

use crate::error::{IscsiError, PduResult};
use crate::field::OPCODE_MASK;
use once_cell::sync::Lazy;

/// Which peer sends a PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    InitiatorToTarget,
    TargetToInitiator,
}

/// Defined iSCSI opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Initiator opcodes (initiator → target)
    NopOut = 0x00,
    ScsiCommand = 0x01,
    TaskManagementRequest = 0x02,
    LoginRequest = 0x03,
    TextRequest = 0x04,
    ScsiDataOut = 0x05,
    LogoutRequest = 0x06,
    SnackRequest = 0x10,

    // Target opcodes (target → initiator)
    NopIn = 0x20,
    ScsiResponse = 0x21,
    TaskManagementResponse = 0x22,
    LoginResponse = 0x23,
    TextResponse = 0x24,
    ScsiDataIn = 0x25,
    LogoutResponse = 0x26,
    ReadyToTransfer = 0x31,
    AsyncMessage = 0x32,
    Reject = 0x3F,
}

const ALL: [Opcode; 18] = [
    Opcode::NopOut,
    Opcode::ScsiCommand,
    Opcode::TaskManagementRequest,
    Opcode::LoginRequest,
    Opcode::TextRequest,
    Opcode::ScsiDataOut,
    Opcode::LogoutRequest,
    Opcode::SnackRequest,
    Opcode::NopIn,
    Opcode::ScsiResponse,
    Opcode::TaskManagementResponse,
    Opcode::LoginResponse,
    Opcode::TextResponse,
    Opcode::ScsiDataIn,
    Opcode::LogoutResponse,
    Opcode::ReadyToTransfer,
    Opcode::AsyncMessage,
    Opcode::Reject,
];

impl Opcode {
    /// Raw 6-bit wire value
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn direction(self) -> Direction {
        // Target opcodes all have bit 5 set
        if self.value() & 0x20 != 0 {
            Direction::TargetToInitiator
        } else {
            Direction::InitiatorToTarget
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::NopOut => "NOP-Out",
            Opcode::ScsiCommand => "SCSI Command",
            Opcode::TaskManagementRequest => "Task Management Request",
            Opcode::LoginRequest => "Login Request",
            Opcode::TextRequest => "Text Request",
            Opcode::ScsiDataOut => "SCSI Data-Out",
            Opcode::LogoutRequest => "Logout Request",
            Opcode::SnackRequest => "SNACK Request",
            Opcode::NopIn => "NOP-In",
            Opcode::ScsiResponse => "SCSI Response",
            Opcode::TaskManagementResponse => "Task Management Response",
            Opcode::LoginResponse => "Login Response",
            Opcode::TextResponse => "Text Response",
            Opcode::ScsiDataIn => "SCSI Data-In",
            Opcode::LogoutResponse => "Logout Response",
            Opcode::ReadyToTransfer => "Ready To Transfer",
            Opcode::AsyncMessage => "Async Message",
            Opcode::Reject => "Reject",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        lookup(value).map(|info| info.opcode)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02x})", self.name(), self.value())
    }
}

/// Registry entry for one defined opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub opcode: Opcode,
    pub direction: Direction,
    pub name: &'static str,
}

static REGISTRY: Lazy<[Option<OpcodeInfo>; 64]> = Lazy::new(|| {
    let mut table = [None; 64];
    for op in ALL {
        table[op.value() as usize] = Some(OpcodeInfo {
            opcode: op,
            direction: op.direction(),
            name: op.name(),
        });
    }
    log::trace!("opcode registry built with {} entries", ALL.len());
    table
});

/// Look up an opcode value
///
/// The retry and immediate bits are masked off first, so a raw byte 0 can be
/// passed directly. Gaps in the opcode space fail with `UnknownOpcode`.
pub fn lookup(value: u8) -> PduResult<&'static OpcodeInfo> {
    let masked = value & OPCODE_MASK;
    REGISTRY[masked as usize]
        .as_ref()
        .ok_or(IscsiError::UnknownOpcode(masked))
}

/// Every defined opcode, in ascending opcode order
pub fn defined() -> impl Iterator<Item = &'static OpcodeInfo> {
    REGISTRY.iter().flatten()
}
