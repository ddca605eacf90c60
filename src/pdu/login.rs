//! Login Request / Login Response (RFC 3720 Sections 10.12, 10.13)

use super::{flags, offset, BhsLayout, BHS_SIZE};
use crate::error::{IscsiError, PduResult};
use crate::field::{flag, get_u16, get_u32, put_u16, put_u32, set_flag, sub_field, with_sub_field};
use crate::opcode::Opcode;

/// Login status codes (RFC 3720 Section 10.13.5)
///
/// Detail codes are given as `class << 8 | detail`.
pub mod login_status {
    pub const SUCCESS: u8 = 0x00;
    pub const REDIRECTION: u8 = 0x01;
    pub const INITIATOR_ERROR: u8 = 0x02;
    pub const TARGET_ERROR: u8 = 0x03;

    pub const SUCCESS_ACCEPT: u16 = 0x0000;
    pub const TARGET_MOVED_TEMPORARILY: u16 = 0x0101;
    pub const TARGET_MOVED_PERMANENTLY: u16 = 0x0102;
    pub const INITIATOR_ERROR_GENERIC: u16 = 0x0200;
    pub const AUTH_FAILURE: u16 = 0x0201;
    pub const AUTHORIZATION_FAILURE: u16 = 0x0202;
    pub const TARGET_NOT_FOUND: u16 = 0x0203;
    pub const TARGET_REMOVED: u16 = 0x0204;
    pub const UNSUPPORTED_VERSION: u16 = 0x0205;
    pub const TOO_MANY_CONNECTIONS: u16 = 0x0206;
    pub const MISSING_PARAMETER: u16 = 0x0207;
    pub const CANT_INCLUDE_IN_SESSION: u16 = 0x0208;
    pub const SESSION_TYPE_NOT_SUPPORTED: u16 = 0x0209;
    pub const SESSION_DOES_NOT_EXIST: u16 = 0x020A;
    pub const INVALID_DURING_LOGIN: u16 = 0x020B;
    pub const TARGET_ERROR_GENERIC: u16 = 0x0300;
    pub const SERVICE_UNAVAILABLE: u16 = 0x0301;
    pub const OUT_OF_RESOURCES: u16 = 0x0302;

    /// Combine a class and detail byte into one code
    pub const fn code(class: u8, detail: u8) -> u16 {
        ((class as u16) << 8) | detail as u16
    }
}

/// Login negotiation stage, as carried in CSG/NSG
///
/// Wire value 2 is unassigned and fails decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoginStage {
    SecurityNegotiation = 0,
    OperationalNegotiation = 1,
    FullFeaturePhase = 3,
}

impl TryFrom<u8> for LoginStage {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            0 => Ok(LoginStage::SecurityNegotiation),
            1 => Ok(LoginStage::OperationalNegotiation),
            3 => Ok(LoginStage::FullFeaturePhase),
            other => Err(IscsiError::InvalidStage(other)),
        }
    }
}

/// Where a connection stands in login before and during negotiation
///
/// `Initial` means no login PDU has been exchanged yet. It has no wire
/// encoding and is never produced by decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPhase {
    #[default]
    Initial,
    Stage(LoginStage),
}

impl LoginPhase {
    pub fn current(&self) -> Option<LoginStage> {
        match self {
            LoginPhase::Initial => None,
            LoginPhase::Stage(stage) => Some(*stage),
        }
    }

    pub fn is_full_feature(&self) -> bool {
        *self == LoginPhase::Stage(LoginStage::FullFeaturePhase)
    }
}

impl From<LoginStage> for LoginPhase {
    fn from(stage: LoginStage) -> Self {
        LoginPhase::Stage(stage)
    }
}

/// Login response status class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatusClass {
    Success = 0,
    Redirection = 1,
    InitiatorError = 2,
    TargetError = 3,
}

impl TryFrom<u8> for LoginStatusClass {
    type Error = IscsiError;

    fn try_from(value: u8) -> PduResult<Self> {
        match value {
            login_status::SUCCESS => Ok(LoginStatusClass::Success),
            login_status::REDIRECTION => Ok(LoginStatusClass::Redirection),
            login_status::INITIATOR_ERROR => Ok(LoginStatusClass::InitiatorError),
            login_status::TARGET_ERROR => Ok(LoginStatusClass::TargetError),
            other => Err(IscsiError::UnknownStatusClass(other)),
        }
    }
}

/// Transit, continue, CSG and NSG as packed into byte 1 of both login PDUs
fn decode_stage_flags(f: u8) -> PduResult<(bool, bool, LoginStage, LoginStage)> {
    let csg = LoginStage::try_from(sub_field(f, flags::CSG_MASK, flags::CSG_SHIFT))?;
    let nsg = LoginStage::try_from(sub_field(f, flags::NSG_MASK, 0))?;
    Ok((flag(f, flags::TRANSIT), flag(f, flags::CONTINUE_LOGIN), csg, nsg))
}

fn encode_stage_flags(transit: bool, cont: bool, csg: LoginStage, nsg: LoginStage) -> u8 {
    let f = set_flag(0, flags::TRANSIT, transit);
    let f = set_flag(f, flags::CONTINUE_LOGIN, cont);
    let f = with_sub_field(f, flags::CSG_MASK, flags::CSG_SHIFT, csg as u8);
    with_sub_field(f, flags::NSG_MASK, 0, nsg as u8)
}

fn read_isid(bhs: &[u8; BHS_SIZE]) -> [u8; 6] {
    let mut isid = [0u8; 6];
    isid.copy_from_slice(&bhs[8..14]);
    isid
}

/// Login Request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Transit flag (byte 1, bit 7)
    pub transit: bool,
    /// Continue flag (byte 1, bit 6)
    pub cont: bool,
    /// Current stage (byte 1, bits 2-3)
    pub csg: LoginStage,
    /// Next stage (byte 1, bits 0-1)
    pub nsg: LoginStage,
    /// Version-max (byte 2)
    pub version_max: u8,
    /// Version-min (byte 3)
    pub version_min: u8,
    /// Initiator Session ID (bytes 8-13)
    pub isid: [u8; 6],
    /// Target Session Identifying Handle (bytes 14-15)
    pub tsih: u16,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Connection ID (bytes 20-21)
    pub cid: u16,
    /// CmdSN (bytes 24-27)
    pub cmd_sn: u32,
    /// ExpStatSN (bytes 28-31)
    pub exp_stat_sn: u32,
}

impl BhsLayout for LoginRequest {
    const OPCODE: Opcode = Opcode::LoginRequest;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let (transit, cont, csg, nsg) = decode_stage_flags(bhs[offset::FLAGS])?;
        Ok(LoginRequest {
            transit,
            cont,
            csg,
            nsg,
            version_max: bhs[offset::BYTE2],
            version_min: bhs[offset::BYTE3],
            isid: read_isid(bhs),
            tsih: get_u16(bhs, 14),
            itt: get_u32(bhs, offset::ITT),
            cid: get_u16(bhs, offset::WORD20),
            cmd_sn: get_u32(bhs, offset::WORD24),
            exp_stat_sn: get_u32(bhs, offset::WORD28),
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = encode_stage_flags(self.transit, self.cont, self.csg, self.nsg);
        bhs[offset::BYTE2] = self.version_max;
        bhs[offset::BYTE3] = self.version_min;
        bhs[8..14].copy_from_slice(&self.isid);
        put_u16(bhs, 14, self.tsih);
        put_u32(bhs, offset::ITT, self.itt);
        put_u16(bhs, offset::WORD20, self.cid);
        put_u32(bhs, offset::WORD24, self.cmd_sn);
        put_u32(bhs, offset::WORD28, self.exp_stat_sn);
    }
}

/// Login Response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Transit flag (byte 1, bit 7)
    pub transit: bool,
    /// Continue flag (byte 1, bit 6)
    pub cont: bool,
    /// Current stage (byte 1, bits 2-3)
    pub csg: LoginStage,
    /// Next stage (byte 1, bits 0-1)
    pub nsg: LoginStage,
    /// Version-max (byte 2)
    pub version_max: u8,
    /// Version-active (byte 3)
    pub version_active: u8,
    /// Initiator Session ID (bytes 8-13)
    pub isid: [u8; 6],
    /// Target Session Identifying Handle (bytes 14-15)
    pub tsih: u16,
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// StatSN (bytes 24-27)
    pub stat_sn: u32,
    /// ExpCmdSN (bytes 28-31)
    pub exp_cmd_sn: u32,
    /// MaxCmdSN (bytes 32-35)
    pub max_cmd_sn: u32,
    /// Status-Class (byte 36)
    pub status_class: LoginStatusClass,
    /// Status-Detail (byte 37)
    pub status_detail: u8,
}

impl LoginResponse {
    /// Human-readable description of this response's status
    pub fn status_message(&self) -> String {
        describe_login_status(self.status_class as u8, self.status_detail)
    }
}

impl BhsLayout for LoginResponse {
    const OPCODE: Opcode = Opcode::LoginResponse;

    fn decode_fields(bhs: &[u8; BHS_SIZE]) -> PduResult<Self> {
        let (transit, cont, csg, nsg) = decode_stage_flags(bhs[offset::FLAGS])?;
        let status_class = LoginStatusClass::try_from(bhs[36])?;
        Ok(LoginResponse {
            transit,
            cont,
            csg,
            nsg,
            version_max: bhs[offset::BYTE2],
            version_active: bhs[offset::BYTE3],
            isid: read_isid(bhs),
            tsih: get_u16(bhs, 14),
            itt: get_u32(bhs, offset::ITT),
            stat_sn: get_u32(bhs, offset::WORD24),
            exp_cmd_sn: get_u32(bhs, offset::WORD28),
            max_cmd_sn: get_u32(bhs, offset::WORD32),
            status_class,
            status_detail: bhs[37],
        })
    }

    fn encode_fields(&self, bhs: &mut [u8; BHS_SIZE]) {
        bhs[offset::FLAGS] = encode_stage_flags(self.transit, self.cont, self.csg, self.nsg);
        bhs[offset::BYTE2] = self.version_max;
        bhs[offset::BYTE3] = self.version_active;
        bhs[8..14].copy_from_slice(&self.isid);
        put_u16(bhs, 14, self.tsih);
        put_u32(bhs, offset::ITT, self.itt);
        put_u32(bhs, offset::WORD24, self.stat_sn);
        put_u32(bhs, offset::WORD28, self.exp_cmd_sn);
        put_u32(bhs, offset::WORD32, self.max_cmd_sn);
        bhs[36] = self.status_class as u8;
        bhs[37] = self.status_detail;
    }
}

/// Describe a login status class/detail pair for operators
///
/// Unknown codes are reported with their hex value.
pub fn describe_login_status(class: u8, detail: u8) -> String {
    use login_status::*;

    let msg = match code(class, detail) {
        SUCCESS_ACCEPT => "Login success",
        TARGET_MOVED_TEMPORARILY => {
            "Target moved temporarily; retry at the portal given in TargetAddress"
        }
        TARGET_MOVED_PERMANENTLY => {
            "Target moved permanently; update the initiator configuration with the new TargetAddress"
        }
        INITIATOR_ERROR_GENERIC => "Initiator error: the target rejected the login request",
        AUTH_FAILURE => "Authentication failed: check the CHAP username and password",
        AUTHORIZATION_FAILURE => {
            "Authorization failure: the initiator is not allowed by the target ACL"
        }
        TARGET_NOT_FOUND => {
            "Target not found: the TargetName doesn't exist; run discovery to list targets"
        }
        TARGET_REMOVED => "Target removed: the target has been removed from service",
        UNSUPPORTED_VERSION => "Unsupported iSCSI version requested",
        TOO_MANY_CONNECTIONS => {
            "Too many connections: the session reached its maximum (MaxConnections)"
        }
        MISSING_PARAMETER => {
            "Missing required login parameter (InitiatorName, TargetName or SessionType)"
        }
        CANT_INCLUDE_IN_SESSION => "Cannot include this connection in the session",
        SESSION_TYPE_NOT_SUPPORTED => {
            "Session type not supported; use discovery (SendTargets) or a normal session"
        }
        SESSION_DOES_NOT_EXIST => "Session does not exist: the TSIH names no session",
        INVALID_DURING_LOGIN => "Invalid request during login",
        TARGET_ERROR_GENERIC => "Target error: the target hit an internal error",
        SERVICE_UNAVAILABLE => "Service unavailable: wait and retry the login later",
        OUT_OF_RESOURCES => "Target out of resources",
        _ => {
            return format!(
                "Unknown login status: class 0x{:02x}, detail 0x{:02x} (RFC 3720 Section 10.13.5)",
                class, detail
            )
        }
    };
    msg.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login() -> LoginRequest {
        LoginRequest {
            transit: true,
            cont: false,
            csg: LoginStage::SecurityNegotiation,
            nsg: LoginStage::OperationalNegotiation,
            version_max: 0,
            version_min: 0,
            isid: [0x00, 0x02, 0x3D, 0x00, 0x00, 0x01],
            tsih: 0,
            itt: 0,
            cid: 1,
            cmd_sn: 1,
            exp_stat_sn: 0,
        }
    }

    #[test]
    fn test_stage_flags_from_wire() {
        let mut bhs = [0u8; BHS_SIZE];
        bhs[1] = 0b1000_1101;
        let req = LoginRequest::decode_fields(&bhs).unwrap();
        assert!(req.transit);
        assert!(!req.cont);
        assert_eq!(req.csg, LoginStage::OperationalNegotiation);
        assert_eq!(req.nsg, LoginStage::OperationalNegotiation);
    }

    #[test]
    fn test_unassigned_stage_rejected() {
        let mut bhs = [0u8; BHS_SIZE];
        bhs[1] = 0x80 | (2 << 2) | 3;
        assert_eq!(LoginRequest::decode_fields(&bhs), Err(IscsiError::InvalidStage(2)));

        bhs[1] = 0x80 | (1 << 2) | 2;
        assert_eq!(LoginResponse::decode_fields(&bhs), Err(IscsiError::InvalidStage(2)));
    }

    #[test]
    fn test_login_request_layout() {
        let mut bhs = [0u8; BHS_SIZE];
        login().encode_fields(&mut bhs);
        assert_eq!(bhs[1], 0x81);
        assert_eq!(&bhs[8..14], &[0x00, 0x02, 0x3D, 0x00, 0x00, 0x01]);
        assert_eq!(&bhs[14..16], &[0, 0]);
        assert_eq!(&bhs[20..22], &[0x00, 0x01]);
        assert_eq!(&bhs[22..24], &[0, 0]);
        assert_eq!(LoginRequest::decode_fields(&bhs).unwrap(), login());
    }

    #[test]
    fn test_login_response_status() {
        let rsp = LoginResponse {
            transit: true,
            cont: false,
            csg: LoginStage::OperationalNegotiation,
            nsg: LoginStage::FullFeaturePhase,
            version_max: 0,
            version_active: 0,
            isid: [0x00, 0x02, 0x3D, 0x00, 0x00, 0x01],
            tsih: 0x0001,
            itt: 0x1234,
            stat_sn: 1,
            exp_cmd_sn: 2,
            max_cmd_sn: 2,
            status_class: LoginStatusClass::InitiatorError,
            status_detail: 0x01,
        };
        let mut bhs = [0u8; BHS_SIZE];
        rsp.encode_fields(&mut bhs);
        assert_eq!(bhs[1], 0x87);
        assert_eq!(bhs[36], 0x02);
        assert_eq!(bhs[37], 0x01);
        assert_eq!(LoginResponse::decode_fields(&bhs).unwrap(), rsp);
        assert!(rsp.status_message().contains("Authentication failed"));
    }

    #[test]
    fn test_unknown_status_class() {
        let mut bhs = [0u8; BHS_SIZE];
        bhs[36] = 0x04;
        assert_eq!(
            LoginResponse::decode_fields(&bhs),
            Err(IscsiError::UnknownStatusClass(0x04))
        );
    }

    #[test]
    fn test_login_phase() {
        let phase = LoginPhase::default();
        assert_eq!(phase, LoginPhase::Initial);
        assert_eq!(phase.current(), None);
        assert!(!phase.is_full_feature());

        let phase = LoginPhase::from(LoginStage::FullFeaturePhase);
        assert_eq!(phase.current(), Some(LoginStage::FullFeaturePhase));
        assert!(phase.is_full_feature());
    }

    #[test]
    fn test_status_code_combine() {
        assert_eq!(login_status::code(0x02, 0x01), login_status::AUTH_FAILURE);
        assert_eq!(login_status::code(0x03, 0x02), login_status::OUT_OF_RESOURCES);
    }
}
