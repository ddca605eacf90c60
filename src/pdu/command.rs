//! SCSI Command, Response, Data-Out, Data-In and R2T
//! (RFC 3720 Sections 10.3, 10.4, 10.7, 10.8)

use super::{flags, offset, BhsLayout, BHS_SIZE};
use crate::error::{IscsiError, PduResult};
use crate::field::{flag, get_u32, get_u64, put_u32, put_u64, set_flag};
use crate::opcode::Opcode;

/// SCSI task attribute (low three bits of the command flags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskAttribute {
    Untagged = 0,
    #[default]
    Simple = 1,
    Ordered = 2,
    HeadOfQueue = 3,
    Aca = 4,
}

impl TryFrom<u8> for TaskAttribute {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            0 => Ok(TaskAttribute::Untagged),
            1 => Ok(TaskAttribute::Simple),
            2 => Ok(TaskAttribute::Ordered),
            3 => Ok(TaskAttribute::HeadOfQueue),
            4 => Ok(TaskAttribute::Aca),
            other => Err(IscsiError::InvalidAttribute(other)),
        }
    }
}

/// SCSI Command request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScsiCommand {
    /// Final flag (byte 1, bit 7)
    pub final_flag: bool,
    /// Read flag (byte 1, bit 6)
    pub read: bool,
    /// Write flag (byte 1, bit 5)
    pub write: bool,
    /// Task attribute (byte 1, bits 0-2)
    pub attribute: TaskAttribute,
    /// Logical Unit Number (bytes 8-15)
    pub lun: u64,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Expected Data Transfer Length (bytes 20-23)
    pub expected_data_length: u32,
    /// CmdSN (bytes 24-27)
    pub cmd_sn: u32,
    /// ExpStatSN (bytes 28-31)
    pub exp_stat_sn: u32,
    /// SCSI Command Descriptor Block (bytes 32-47)
    pub cdb: [u8; 16],
}

impl BhsLayout for ScsiCommand {
    const OPCODE: Opcode = Opcode::ScsiCommand;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let f = bhs[offset::FLAGS];
        let attribute = TaskAttribute::try_from(f & flags::ATTR_MASK)?;

        let mut cdb = [0u8; 16];
        cdb.copy_from_slice(&bhs[32..48]);

        Ok(ScsiCommand {
            final_flag: flag(f, flags::FINAL),
            read: flag(f, flags::READ),
            write: flag(f, flags::WRITE),
            attribute,
            lun: get_u64(bhs, offset::LUN),
            itt: get_u32(bhs, offset::ITT),
            expected_data_length: get_u32(bhs, offset::WORD20),
            cmd_sn: get_u32(bhs, offset::WORD24),
            exp_stat_sn: get_u32(bhs, offset::WORD28),
            cdb,
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        let f = set_flag(0, flags::FINAL, self.final_flag);
        let f = set_flag(f, flags::READ, self.read);
        let f = set_flag(f, flags::WRITE, self.write);
        bhs[offset::FLAGS] = f | self.attribute as u8;

        put_u64(bhs, offset::LUN, self.lun);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.expected_data_length);
        put_u32(bhs, offset::WORD24, self.cmd_sn);
        put_u32(bhs, offset::WORD28, self.exp_stat_sn);
        bhs[32..48].copy_from_slice(&self.cdb);
    }
}

/// SCSI Response
///
/// `response` takes values from [`service_response`](super::service_response),
/// `status` from [`scsi_status`](super::scsi_status).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScsiResponse {
    /// Bidirectional read residual overflow (byte 1, bit 4)
    pub bidi_overflow: bool,
    /// Bidirectional read residual underflow (byte 1, bit 3)
    pub bidi_underflow: bool,
    /// Residual overflow (byte 1, bit 2)
    pub overflow: bool,
    /// Residual underflow (byte 1, bit 1)
    pub underflow: bool,
    /// iSCSI service response (byte 2)
    pub response: u8,
    /// SCSI status (byte 3)
    pub status: u8,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// SNACK Tag (bytes 20-23)
    pub snack_tag: u32,
    /// StatSN (bytes 24-27)
    pub stat_sn: u32,
    /// ExpCmdSN (bytes 28-31)
    pub exp_cmd_sn: u32,
    /// MaxCmdSN (bytes 32-35)
    pub max_cmd_sn: u32,
    /// ExpDataSN (bytes 36-39)
    pub exp_data_sn: u32,
    /// Bidirectional Read Residual Count (bytes 40-43)
    pub bidi_read_residual_count: u32,
    /// Residual Count (bytes 44-47)
    pub residual_count: u32,
}

impl BhsLayout for ScsiResponse {
    const OPCODE: Opcode = Opcode::ScsiResponse;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let f = bhs[offset::FLAGS];
        Ok(ScsiResponse {
            bidi_overflow: flag(f, flags::BIDI_OVERFLOW),
            bidi_underflow: flag(f, flags::BIDI_UNDERFLOW),
            overflow: flag(f, flags::OVERFLOW),
            underflow: flag(f, flags::UNDERFLOW),
            response: bhs[offset::BYTE2],
            status: bhs[offset::BYTE3],
            itt: get_u32(bhs, offset::ITT),
            snack_tag: get_u32(bhs, offset::WORD20),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
            exp_data_sn: get_u32(bhs, offset::WORD36),
            bidi_read_residual_count: get_u32(bhs, offset::WORD40),
            residual_count: get_u32(bhs, offset::WORD44),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        let f = set_flag(flags::FINAL, flags::BIDI_OVERFLOW, self.bidi_overflow);
        let f = set_flag(f, flags::BIDI_UNDERFLOW, self.bidi_underflow);
        let f = set_flag(f, flags::OVERFLOW, self.overflow);
        bhs[offset::FLAGS] = set_flag(f, flags::UNDERFLOW, self.underflow);
        bhs[offset::BYTE2] = self.response;
        bhs[offset::BYTE3] = self.status;

        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.snack_tag);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
        put_u32(bhs, offset::WORD36, self.exp_data_sn);
        put_u32(bhs, offset::WORD40, self.bidi_read_residual_count);
        put_u32(bhs, offset::WORD44, self.residual_count);
    }
}

/// SCSI Data-Out (initiator → target)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScsiDataOut {
    /// Final flag (byte 1, bit 7)
    pub final_flag: bool,
    /// Logical Unit Number (bytes 8-15)
    pub lun: u64,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Target Transfer Tag (bytes 20-23)
    pub ttt: u32,
    /// ExpStatSN (bytes 28-31)
    pub exp_stat_sn: u32,
    /// DataSN (bytes 36-39)
    pub data_sn: u32,
    /// Buffer Offset (bytes 40-43)
    pub buffer_offset: u32,
}

impl BhsLayout for ScsiDataOut {
    const OPCODE: Opcode = Opcode::ScsiDataOut;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        Ok(ScsiDataOut {
            final_flag: flag(bhs[offset::FLAGS], flags::FINAL),
            lun: get_u64(bhs, offset::LUN),
            itt: get_u32(bhs, offset::ITT),
            ttt: get_u32(bhs, offset::WORD20),
            exp_stat_sn: get_u32(bhs, offset::WORD28),
            data_sn: get_u32(bhs, offset::WORD36),
            buffer_offset: get_u32(bhs, offset::WORD40),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = set_flag(0, flags::FINAL, self.final_flag);
        put_u64(bhs, offset::LUN, self.lun);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.ttt);
        put_u32(bhs, offset::WORD28, self.exp_stat_sn);
        put_u32(bhs, offset::WORD36, self.data_sn);
        put_u32(bhs, offset::WORD40, self.buffer_offset);
    }
}

/// SCSI Data-In (target → initiator)
///
/// `status` is only carried on the wire when `status_present` (the S bit)
/// is set; otherwise byte 3 is reserved and decodes as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScsiDataIn {
    /// Final flag (byte 1, bit 7)
    pub final_flag: bool,
    /// Acknowledge flag (byte 1, bit 6)
    pub acknowledge: bool,
    /// Residual overflow (byte 1, bit 2)
    pub overflow: bool,
    /// Residual underflow (byte 1, bit 1)
    pub underflow: bool,
    /// SCSI status (byte 3), present only when the S bit (byte 1, bit 0) is set
    pub status: Option<u8>,
    /// Logical Unit Number (bytes 8-15)
    pub lun: u64,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Target Transfer Tag (bytes 20-23)
    pub ttt: u32,
    /// StatSN, valid only with status (bytes 24-27)
    pub stat_sn: u32,
    /// ExpCmdSN (bytes 28-31)
    pub exp_cmd_sn: u32,
    /// MaxCmdSN (bytes 32-35)
    pub max_cmd_sn: u32,
    /// DataSN (bytes 36-39)
    pub data_sn: u32,
    /// Buffer Offset (bytes 40-43)
    pub buffer_offset: u32,
    /// Residual Count (bytes 44-47)
    pub residual_count: u32,
}

impl ScsiDataIn {
    pub fn status_present(&self) -> bool {
        self.status.is_some()
    }
}

impl BhsLayout for ScsiDataIn {
    const OPCODE: Opcode = Opcode::ScsiDataIn;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let f = bhs[offset::FLAGS];
        let status = if flag(f, flags::STATUS) {
            Some(bhs[offset::BYTE3])
        } else {
            None
        };

        Ok(ScsiDataIn {
            final_flag: flag(f, flags::FINAL),
            acknowledge: flag(f, flags::ACKNOWLEDGE),
            overflow: flag(f, flags::OVERFLOW),
            underflow: flag(f, flags::UNDERFLOW),
            status,
            lun: get_u64(bhs, offset::LUN),
            itt: get_u32(bhs, offset::ITT),
            ttt: get_u32(bhs, offset::WORD20),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
            data_sn: get_u32(bhs, offset::WORD36),
            buffer_offset: get_u32(bhs, offset::WORD40),
            residual_count: get_u32(bhs, offset::WORD44),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        let f = set_flag(0, flags::FINAL, self.final_flag);
        let f = set_flag(f, flags::ACKNOWLEDGE, self.acknowledge);
        let f = set_flag(f, flags::OVERFLOW, self.overflow);
        let f = set_flag(f, flags::UNDERFLOW, self.underflow);
        bhs[offset::FLAGS] = set_flag(f, flags::STATUS, self.status_present());
        if let Some(s) = self.status {
            bhs[offset::BYTE3] = s;
        }

        put_u64(bhs, offset::LUN, self.lun);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD20, self.ttt);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
        put_u32(bhs, offset::WORD36, self.data_sn);
        put_u32(bhs, offset::WORD40, self.buffer_offset);
        put_u32(bhs, offset::WORD44, self.residual_count);
    }
}

/// Ready To Transfer (R2T)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyToTransfer {
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
    /// R2TSN (bytes 36-39)
    pub r2t_sn: u32,
    /// Buffer Offset (bytes 40-43)
    pub buffer_offset: u32,
    /// Desired Data Transfer Length (bytes 44-47)
    pub desired_data_length: u32,
}

impl BhsLayout for ReadyToTransfer {
    const OPCODE: Opcode = Opcode::ReadyToTransfer;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        Ok(ReadyToTransfer {
            lun: get_u64(bhs, offset::LUN),
            itt: get_u32(bhs, offset::ITT),
            ttt: get_u32(bhs, offset::WORD20),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
            r2t_sn: get_u32(bhs, offset::WORD36),
            buffer_offset: get_u32(bhs, offset::WORD40),
            desired_data_length: get_u32(bhs, offset::WORD44),
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
        put_u32(bhs, offset::WORD36, self.r2t_sn);
        put_u32(bhs, offset::WORD40, self.buffer_offset);
        put_u32(bhs, offset::WORD44, self.desired_data_length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::{scsi_status, service_response};

    fn read10() -> ScsiCommand {
        let mut cdb = [0u8; 16];
        cdb[0] = 0x28;
        cdb[2..6].copy_from_slice(&0x0000_1000u32.to_be_bytes());
        cdb[7..9].copy_from_slice(&8u16.to_be_bytes());
        ScsiCommand {
            final_flag: true,
            read: true,
            write: false,
            attribute: TaskAttribute::Simple,
            lun: 0,
            itt: 0x10,
            expected_data_length: 4096,
            cmd_sn: 1,
            exp_stat_sn: 1,
            cdb,
        }
    }

    #[test]
    fn test_command_flags_byte() {
        let mut bhs = [0u8; BHS_SIZE];
        read10().encode_fields(&mut bhs);
        assert_eq!(bhs[1], 0xC1);
        assert_eq!(bhs[32], 0x28);
        assert_eq!(&bhs[20..24], &[0x00, 0x00, 0x10, 0x00]);
    }

    #[test]
    fn test_command_decode() {
        let mut bhs = [0u8; BHS_SIZE];
        read10().encode_fields(&mut bhs);
        let cmd = ScsiCommand::decode_fields(&bhs).unwrap();
        assert_eq!(cmd, read10());
    }

    #[test]
    fn test_every_defined_attribute() {
        for (raw, attr) in [
            (0, TaskAttribute::Untagged),
            (1, TaskAttribute::Simple),
            (2, TaskAttribute::Ordered),
            (3, TaskAttribute::HeadOfQueue),
            (4, TaskAttribute::Aca),
        ] {
            let mut bhs = [0u8; BHS_SIZE];
            bhs[1] = 0xA0 | raw;
            let cmd = ScsiCommand::decode_fields(&bhs).unwrap();
            assert_eq!(cmd.attribute, attr);
            assert!(cmd.write);
            assert!(!cmd.read);
        }
    }

    #[test]
    fn test_undefined_attribute_rejected() {
        for raw in 5..=7u8 {
            let mut bhs = [0u8; BHS_SIZE];
            bhs[1] = 0x80 | raw;
            assert_eq!(
                ScsiCommand::decode_fields(&bhs),
                Err(IscsiError::InvalidAttribute(raw))
            );
        }
    }

    #[test]
    fn test_scsi_response_layout() {
        let rsp = ScsiResponse {
            bidi_overflow: false,
            bidi_underflow: false,
            overflow: false,
            underflow: true,
            response: service_response::COMMAND_COMPLETED,
            status: scsi_status::CHECK_CONDITION,
            itt: 0x1234,
            snack_tag: 0,
            stat_sn: 2,
            exp_cmd_sn: 3,
            max_cmd_sn: 4,
            exp_data_sn: 1,
            bidi_read_residual_count: 0,
            residual_count: 512,
        };
        let mut bhs = [0u8; BHS_SIZE];
        rsp.encode_fields(&mut bhs);
        assert_eq!(bhs[1], 0x82);
        assert_eq!(bhs[2], 0x00);
        assert_eq!(bhs[3], 0x02);
        assert_eq!(&bhs[44..48], &[0x00, 0x00, 0x02, 0x00]);
        assert_eq!(ScsiResponse::decode_fields(&bhs).unwrap(), rsp);
    }

    #[test]
    fn test_data_in_status_only_with_s_bit() {
        let mut bhs = [0u8; BHS_SIZE];
        bhs[1] = 0x80;
        bhs[3] = 0x02;
        let din = ScsiDataIn::decode_fields(&bhs).unwrap();
        assert_eq!(din.status, None);

        bhs[1] = 0x81;
        let din = ScsiDataIn::decode_fields(&bhs).unwrap();
        assert_eq!(din.status, Some(0x02));
        assert!(din.final_flag);

        let mut out = [0u8; BHS_SIZE];
        din.encode_fields(&mut out);
        assert_eq!(out[1], 0x81);
        assert_eq!(out[3], 0x02);
    }

    #[test]
    fn test_data_out_reserved_words_zeroed() {
        let dout = ScsiDataOut {
            final_flag: true,
            lun: 0,
            itt: 0x10,
            ttt: 0x20,
            exp_stat_sn: 5,
            data_sn: 0,
            buffer_offset: 8192,
        };
        let mut bhs = [0u8; BHS_SIZE];
        dout.encode_fields(&mut bhs);
        assert_eq!(&bhs[24..28], &[0; 4]);
        assert_eq!(&bhs[32..36], &[0; 4]);
        assert_eq!(&bhs[44..48], &[0; 4]);
        assert_eq!(ScsiDataOut::decode_fields(&bhs).unwrap(), dout);
    }

    #[test]
    fn test_r2t_layout() {
        let r2t = ReadyToTransfer {
            lun: 0,
            itt: 0x10,
            ttt: 0x99,
            stat_sn: 1,
            exp_cmd_sn: 2,
            max_cmd_sn: 3,
            r2t_sn: 0,
            buffer_offset: 65536,
            desired_data_length: 262144,
        };
        let mut bhs = [0u8; BHS_SIZE];
        r2t.encode_fields(&mut bhs);
        assert_eq!(bhs[1], 0x80);
        assert_eq!(&bhs[40..44], &[0x00, 0x01, 0x00, 0x00]);
        assert_eq!(&bhs[44..48], &[0x00, 0x04, 0x00, 0x00]);
        assert_eq!(ReadyToTransfer::decode_fields(&bhs).unwrap(), r2t);
    }
}
