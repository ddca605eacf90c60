//! Wire vector tests
//!
//! Known-good and known-bad BHS byte images are kept in `tests/vectors.toml`
//! so they can be compared against captures from real initiators and targets.

use iscsi_bhs::{decode, encode, BHS_SIZE};
use once_cell::sync::Lazy;

// ============================================================================
// Vector loading
// ============================================================================

#[derive(Debug)]
struct Vector {
    name: String,
    bytes: Vec<u8>,
    table: toml::Value,
}

impl Vector {
    fn int(&self, key: &str) -> Option<i64> {
        self.table.get(key).and_then(|v| v.as_integer())
    }

    fn boolean(&self, key: &str) -> bool {
        self.table
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or_else(|| panic!("{}: missing '{}'", self.name, key))
    }

    fn error(&self) -> Option<&str> {
        self.table.get("error").and_then(|v| v.as_str())
    }
}

static VECTORS: Lazy<Vec<Vector>> = Lazy::new(|| {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/vectors.toml");
    let contents = std::fs::read_to_string(path).expect("Failed to read tests/vectors.toml");

    let config = contents
        .parse::<toml::Table>()
        .expect("Failed to parse tests/vectors.toml - invalid TOML syntax");

    let entries = config
        .get("vector")
        .and_then(|v| v.as_array())
        .expect("Missing [[vector]] entries in tests/vectors.toml");

    entries
        .iter()
        .map(|entry| {
            let name = entry
                .get("name")
                .and_then(|n| n.as_str())
                .expect("Vector without a name")
                .to_string();

            let words: Vec<&str> = entry
                .get("words")
                .and_then(|w| w.as_array())
                .unwrap_or_else(|| panic!("{}: missing 'words'", name))
                .iter()
                .map(|w| w.as_str().expect("words must be strings"))
                .collect();

            let bytes = hex::decode(words.concat())
                .unwrap_or_else(|e| panic!("{}: bad hex: {}", name, e));
            assert_eq!(bytes.len(), BHS_SIZE, "{}: vector is not 48 bytes", name);

            Vector {
                name,
                bytes,
                table: entry.clone(),
            }
        })
        .collect()
});

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_vectors_loaded() {
    assert!(VECTORS.len() >= 10);
    assert!(VECTORS.iter().any(|v| v.error().is_some()));
    assert!(VECTORS.iter().any(|v| v.error().is_none()));
}

#[test]
fn test_good_vectors_decode() {
    let _ = env_logger::builder().is_test(true).try_init();

    for v in VECTORS.iter().filter(|v| v.error().is_none()) {
        let (bhs, lengths) = decode(&v.bytes)
            .unwrap_or_else(|e| panic!("{}: decode failed: {}", v.name, e));

        assert_eq!(
            bhs.header.opcode().value() as i64,
            v.int("opcode").expect("opcode"),
            "{}",
            v.name
        );
        assert_eq!(bhs.immediate, v.boolean("immediate"), "{}", v.name);
        assert_eq!(bhs.retry, v.boolean("retry"), "{}", v.name);
        assert_eq!(
            lengths.data_length as i64,
            v.int("data_length").expect("data_length"),
            "{}",
            v.name
        );
        if let Some(itt) = v.int("itt") {
            assert_eq!(bhs.header.initiator_task_tag().map(i64::from), Some(itt), "{}", v.name);
        }
    }
}

#[test]
fn test_canonical_vectors_reencode_exactly() {
    for v in VECTORS.iter().filter(|v| v.error().is_none()) {
        let (bhs, _) = decode(&v.bytes).unwrap();
        let wire = encode(&bhs).unwrap();

        if v.boolean("canonical") {
            assert_eq!(
                hex::encode(wire),
                hex::encode(&v.bytes),
                "{}: re-encode differs",
                v.name
            );
        } else {
            assert_ne!(wire.as_slice(), v.bytes.as_slice(), "{}", v.name);
            // Whatever was dropped was reserved: a second pass is stable
            let (again, _) = decode(&wire).unwrap();
            assert_eq!(again, bhs, "{}", v.name);
        }
    }
}

#[test]
fn test_bad_vectors_fail_with_expected_kind() {
    let _ = env_logger::builder().is_test(true).try_init();

    for v in VECTORS.iter() {
        let Some(expected) = v.error() else { continue };
        let err = decode(&v.bytes).expect_err(&v.name);
        let kind = format!("{:?}", err);
        assert!(
            kind.starts_with(expected),
            "{}: expected {}, got {}",
            v.name,
            expected,
            kind
        );
    }
}
