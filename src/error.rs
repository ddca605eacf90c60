//! Error types for iSCSI header decoding and encoding

use thiserror::Error;

/// iSCSI header codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IscsiError {
    #[error("Header too short: {len} bytes, need {need}")]
    TooShort { len: usize, need: usize },

    #[error("Unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),

    #[error("Invalid task attribute: {0}")]
    InvalidAttribute(u8),

    #[error("Unknown task management function: {0}")]
    UnknownFunction(u8),

    #[error("Invalid login stage: {0}")]
    InvalidStage(u8),

    #[error("Unknown logout reason: {0}")]
    UnknownLogoutReason(u8),

    #[error("Unknown logout response: {0}")]
    UnknownLogoutResponse(u8),

    #[error("Unknown SNACK type: {0}")]
    UnknownSnackType(u8),

    #[error("Unknown task management response: 0x{0:02x}")]
    UnknownTaskResponse(u8),

    #[error("Unknown login status class: 0x{0:02x}")]
    UnknownStatusClass(u8),

    #[error("Unknown async event: {0}")]
    UnknownAsyncEvent(u8),

    #[error("Unknown reject reason: 0x{0:02x}")]
    UnknownRejectReason(u8),

    #[error("Value {value} out of range for {field} (max {max})")]
    Range {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Data segment too long: {len} bytes, limit {max}")]
    DataSegmentTooLong { len: u32, max: u32 },

    #[error("AHS too long: {len} words, limit {max}")]
    AhsTooLong { len: u8, max: u8 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for header codec operations
pub type PduResult<T> = Result<T, IscsiError>;
