//! Asynchronous Message (RFC 3720 Section 10.9)

use super::{flags, offset, BhsLayout, BHS_SIZE, RESERVED_TAG};
use crate::error::{IscsiError, PduResult};
use crate::field::{get_u16, get_u32, get_u64, put_u16, put_u32, put_u64};
use crate::opcode::Opcode;

/// AsyncEvent code (byte 36)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncEvent {
    ScsiEvent = 0,
    RequestLogout = 1,
    DroppingConnection = 2,
    DroppingAllConnections = 3,
    ParameterNegotiation = 4,
    VendorSpecific = 255,
}

impl TryFrom<u8> for AsyncEvent {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            0 => Ok(AsyncEvent::ScsiEvent),
            1 => Ok(AsyncEvent::RequestLogout),
            2 => Ok(AsyncEvent::DroppingConnection),
            3 => Ok(AsyncEvent::DroppingAllConnections),
            4 => Ok(AsyncEvent::ParameterNegotiation),
            255 => Ok(AsyncEvent::VendorSpecific),
            other => Err(IscsiError::UnknownAsyncEvent(other)),
        }
    }
}

/// Asynchronous Message
///
/// The ITT slot always carries `RESERVED_TAG` on the wire. The meaning of
/// the three parameters depends on `event` (e.g. CID and Time2Wait for
/// `DroppingConnection`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncMessage {
    /// Logical Unit Number (bytes 8-15)
    pub lun: u64,
    /// StatSN (bytes 24-27)
    pub stat_sn: u32,
    /// ExpCmdSN (bytes 28-31)
    pub exp_cmd_sn: u32,
    /// MaxCmdSN (bytes 32-35)
    pub max_cmd_sn: u32,
    /// AsyncEvent (byte 36)
    pub event: AsyncEvent,
    /// AsyncVCode (byte 37)
    pub vendor_code: u8,
    /// Parameter1 (bytes 38-39)
    pub parameter1: u16,
    /// Parameter2 (bytes 40-41)
    pub parameter2: u16,
    /// Parameter3 (bytes 42-43)
    pub parameter3: u16,
}

impl BhsLayout for AsyncMessage {
    const OPCODE: Opcode = Opcode::AsyncMessage;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let event = AsyncEvent::try_from(bhs[36])?;
        Ok(AsyncMessage {
            lun: get_u64(bhs, offset::LUN),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
            event,
            vendor_code: bhs[37],
            parameter1: get_u16(bhs, 38),
            parameter2: get_u16(bhs, offset::WORD40),
            parameter3: get_u16(bhs, 42),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = flags::FINAL;
        put_u64(bhs, offset::LUN, self.lun);
        put_u32(bhs, offset::ITT, RESERVED_TAG);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
        bhs[36] = self.event as u8;
        bhs[37] = self.vendor_code;
        put_u16(bhs, 38, self.parameter1);
        put_u16(bhs, offset::WORD40, self.parameter2);
        put_u16(bhs, 42, self.parameter3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_async_logout_request() {
        let msg = AsyncMessage {
            lun: 0,
            stat_sn: 5,
            exp_cmd_sn: 6,
            max_cmd_sn: 7,
            event: AsyncEvent::RequestLogout,
            vendor_code: 0,
            parameter1: 0,
            parameter2: 0,
            parameter3: 10,
        };
        let mut bhs = [0u8; BHS_SIZE];
        msg.encode_fields(&mut bhs);
        assert_eq!(&bhs[16..20], &[0xFF; 4]);
        assert_eq!(bhs[36], 1);
        assert_eq!(&bhs[42..44], &[0x00, 0x0A]);
        assert!(bhs[44..].iter().all(|&b| b == 0));
        assert_eq!(AsyncMessage::decode_fields(&bhs).unwrap(), msg);
    }

    #[test]
    fn test_async_event_codes() {
        let mut bhs = [0u8; BHS_SIZE];
        bhs[36] = 255;
        assert_eq!(
            AsyncMessage::decode_fields(&bhs).unwrap().event,
            AsyncEvent::VendorSpecific
        );

        bhs[36] = 5;
        assert_eq!(
            AsyncMessage::decode_fields(&bhs),
            Err(IscsiError::UnknownAsyncEvent(5))
        );
    }
}
