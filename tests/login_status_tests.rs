//! Tests for RFC 3720 login status code coverage
//!
//! These tests verify that:
//! 1. The status description handles all documented codes
//! 2. Login Response headers carry the status pair through the codec
//! 3. Unknown classes are rejected at decode time

use iscsi_bhs::pdu::{
    describe_login_status, login_status, LoginResponse, LoginStage, LoginStatusClass,
};
use iscsi_bhs::{decode, encode, Bhs, Header, IscsiError};

// ============================================================================
// Status Descriptions
// ============================================================================

#[test]
fn test_describe_success() {
    let msg = describe_login_status(0x00, 0x00);
    assert!(msg.contains("success"), "Success message should mention success");
}

#[test]
fn test_describe_target_moved_temporarily() {
    let msg = describe_login_status(0x01, 0x01);
    assert!(msg.contains("moved temporarily"), "Should mention temporary move");
    assert!(msg.contains("portal"), "Should mention portal");
}

#[test]
fn test_describe_target_moved_permanently() {
    let msg = describe_login_status(0x01, 0x02);
    assert!(msg.contains("moved permanently"), "Should mention permanent move");
    assert!(msg.contains("configuration"), "Should suggest config update");
}

#[test]
fn test_describe_auth_failure() {
    let msg = describe_login_status(0x02, 0x01);
    assert!(msg.contains("Authentication failed"), "Should indicate auth failure");
    assert!(msg.contains("username") || msg.contains("password"), "Should mention credentials");
}

#[test]
fn test_describe_authorization_failure() {
    let msg = describe_login_status(0x02, 0x02);
    assert!(msg.contains("Authorization failure"), "Should indicate authz failure");
    assert!(msg.contains("ACL"), "Should mention ACL");
}

#[test]
fn test_describe_target_not_found() {
    let msg = describe_login_status(0x02, 0x03);
    assert!(msg.contains("Target not found"), "Should indicate target not found");
    assert!(msg.contains("discovery"), "Should suggest running discovery");
}

#[test]
fn test_describe_too_many_connections() {
    let msg = describe_login_status(0x02, 0x06);
    assert!(msg.contains("Too many connections"), "Should indicate connection limit");
    assert!(msg.contains("MaxConnections"), "Should mention MaxConnections parameter");
}

#[test]
fn test_describe_missing_parameter() {
    let msg = describe_login_status(0x02, 0x07);
    assert!(msg.contains("Missing"), "Should indicate missing parameter");
    assert!(msg.contains("InitiatorName"), "Should list InitiatorName");
}

#[test]
fn test_describe_service_unavailable() {
    let msg = describe_login_status(0x03, 0x01);
    assert!(msg.contains("unavailable"), "Should indicate unavailable");
    assert!(msg.contains("wait and retry"), "Should suggest retry");
}

#[test]
fn test_describe_unknown_status() {
    let msg = describe_login_status(0xFF, 0xFF);
    assert!(msg.contains("Unknown"), "Should indicate unknown code");
    assert!(msg.contains("0xff"), "Should show the code");
    assert!(msg.contains("RFC 3720"), "Should reference RFC");
}

#[test]
fn test_all_rfc_3720_status_codes_have_messages() {
    let test_cases = vec![
        (0x00, 0x00, "Success"),
        (0x01, 0x01, "Target moved temporarily"),
        (0x01, 0x02, "Target moved permanently"),
        (0x02, 0x00, "Initiator error"),
        (0x02, 0x01, "Authentication failed"),
        (0x02, 0x02, "Authorization failure"),
        (0x02, 0x03, "Target not found"),
        (0x02, 0x04, "Target removed"),
        (0x02, 0x05, "Unsupported version"),
        (0x02, 0x06, "Too many connections"),
        (0x02, 0x07, "Missing parameter"),
        (0x02, 0x08, "Cannot include in session"),
        (0x02, 0x09, "Session type not supported"),
        (0x02, 0x0A, "Session does not exist"),
        (0x02, 0x0B, "Invalid request during login"),
        (0x03, 0x00, "Target error"),
        (0x03, 0x01, "Service unavailable"),
        (0x03, 0x02, "Out of resources"),
    ];

    for (class, detail, description) in test_cases {
        let msg = describe_login_status(class, detail);
        assert!(
            !msg.contains("Unknown"),
            "Status code 0x{:02x}{:02x} ({}) should not return 'Unknown' message, got: {}",
            class,
            detail,
            description,
            msg
        );
    }
}

// ============================================================================
// Status through the codec
// ============================================================================

fn rejected_login(class: LoginStatusClass, detail: u8) -> Bhs {
    Bhs::new(Header::LoginResponse(LoginResponse {
        transit: false,
        cont: false,
        csg: LoginStage::SecurityNegotiation,
        nsg: LoginStage::SecurityNegotiation,
        version_max: 0,
        version_active: 0,
        isid: [0x80, 0x00, 0x00, 0x00, 0x00, 0x01],
        tsih: 0,
        itt: 0x10,
        stat_sn: 0,
        exp_cmd_sn: 1,
        max_cmd_sn: 1,
        status_class: class,
        status_detail: detail,
    }))
}

#[test]
fn test_status_pair_survives_codec() {
    let _ = env_logger::builder().is_test(true).try_init();

    let bhs = rejected_login(LoginStatusClass::InitiatorError, 0x03);
    let wire = encode(&bhs).unwrap();
    assert_eq!(wire[36], login_status::INITIATOR_ERROR);
    assert_eq!(wire[37], 0x03);

    let (decoded, _) = decode(&wire).unwrap();
    match decoded.header {
        Header::LoginResponse(rsp) => {
            assert_eq!(
                login_status::code(rsp.status_class as u8, rsp.status_detail),
                login_status::TARGET_NOT_FOUND
            );
            assert!(rsp.status_message().contains("Target not found"));
        }
        other => panic!("expected Login Response, got {:?}", other),
    }
}

#[test]
fn test_unknown_status_class_fails_decode() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut wire = encode(&rejected_login(LoginStatusClass::TargetError, 0)).unwrap();
    wire[36] = 0x07;
    assert_eq!(decode(&wire).unwrap_err(), IscsiError::UnknownStatusClass(0x07));
}
