// SPDX-License-Identifier: Apache-2.0

use flowmine_core::{canonical, sha256_hex, ExitCode, MachineError};
use proptest::prelude::*;
use proptest::test_runner::Config;
use std::collections::BTreeMap;

#[test]
fn sha256_hex_matches_known_vector() {
    assert_eq!(
        sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn stable_json_bytes_sort_object_keys() {
    let mut unordered = serde_json::Map::new();
    unordered.insert("zeta".to_string(), serde_json::json!(1));
    unordered.insert("alpha".to_string(), serde_json::json!({"b": 2, "a": 1}));
    let bytes = canonical::stable_json_bytes(&serde_json::Value::Object(unordered))
        .expect("stable bytes");
    assert_eq!(
        String::from_utf8(bytes).expect("utf-8"),
        r#"{"alpha":{"a":1,"b":2},"zeta":1}"#
    );
}

#[test]
fn stable_json_hash_is_insensitive_to_key_order() {
    let left = serde_json::json!({"a": 1, "b": [{"y": 2, "x": 3}]});
    let right = serde_json::json!({"b": [{"x": 3, "y": 2}], "a": 1});
    assert_eq!(
        canonical::stable_json_hash_hex(&left).expect("hash"),
        canonical::stable_json_hash_hex(&right).expect("hash")
    );
}

#[test]
fn machine_error_envelope_round_trips() {
    let err = MachineError::new("insufficient_data", "need at least 10 events")
        .with_detail("valid_events", "3");
    let encoded = serde_json::to_string(&err).expect("encode");
    let decoded: MachineError = serde_json::from_str(&encoded).expect("decode");
    assert_eq!(decoded, err);
}

#[test]
fn exit_codes_are_stable() {
    assert_eq!(ExitCode::Success as u8, 0);
    assert_eq!(ExitCode::Usage as u8, 2);
    assert_eq!(ExitCode::Validation as u8, 3);
    assert_eq!(ExitCode::DependencyFailure as u8, 4);
    assert_eq!(ExitCode::Internal as u8, 10);
    assert_eq!(ExitCode::Validation.as_str(), "validation");
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn stable_json_bytes_are_reproducible(
        entries in proptest::collection::btree_map("[a-z]{1,8}", 0_u64..1_000_000, 0..16)
    ) {
        let value: BTreeMap<String, u64> = entries;
        let first = canonical::stable_json_bytes(&value).expect("bytes");
        let second = canonical::stable_json_bytes(&value).expect("bytes");
        prop_assert_eq!(first, second);
    }
}
