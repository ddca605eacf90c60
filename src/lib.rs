//! Typed codec for iSCSI Basic Header Segments (RFC 3720)
//!
//! Every iSCSI PDU starts with a 48-byte BHS. This crate turns those bytes
//! into one strongly-typed header per opcode and back again. Transport,
//! session state and digests are left to the caller: the codec reports how
//! many AHS and data bytes follow and never reads them itself.
//!
//! # Example
//!
//! ```
//! use iscsi_bhs::{decode, encode, Bhs, Header};
//! use iscsi_bhs::pdu::{NopOut, RESERVED_TAG};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ping = Bhs::new(Header::NopOut(NopOut {
//!     lun: 0,
//!     itt: 0x1234,
//!     ttt: RESERVED_TAG,
//!     cmd_sn: 1,
//!     exp_stat_sn: 1,
//! }))
//! .with_immediate(true);
//!
//! let wire = encode(&ping)?;
//! let (decoded, lengths) = decode(&wire)?;
//! assert_eq!(decoded, ping);
//! assert_eq!(lengths.total_length(), 48);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod field;
pub mod opcode;
pub mod pdu;

pub use codec::{decode, encode, peek_lengths, Bhs, PduCodec, PduCodecBuilder, SegmentLengths};
pub use error::{IscsiError, PduResult};
pub use opcode::{Direction, Opcode};
pub use pdu::{Header, BHS_SIZE};

/// Version of this library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
