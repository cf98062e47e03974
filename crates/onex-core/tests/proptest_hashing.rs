// crates/onex-core/tests/proptest_hashing.rs
// ============================================================================
// Module: Canonical Hashing Property Tests
// Description: Metamorphic properties of canonical hashing.
// Purpose: Ensure declaration order and null members never affect digests.
// Dependencies: onex-core, proptest, serde_json
// ============================================================================
//! ## Overview
//! Property coverage for canonicalization: hashing is invariant under key
//! declaration order and under insertion of null-valued members, and equal
//! inputs always produce equal digests across repeated calls.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use onex_core::HashAlgorithm;
use onex_core::hash_canonical_json;
use proptest::prelude::proptest;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// Builds a JSON object from key/value pairs in the given order.
fn object_from(entries: &[(String, i64)]) -> Value {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert(key.clone(), Value::from(*value));
    }
    Value::Object(map)
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn declaration_order_never_changes_the_hash(
        mut entries in proptest::collection::vec(("[a-z]{1,8}", -1000_i64..1000), 0..8)
    ) {
        let forward = object_from(&entries);
        entries.reverse();
        let reversed = object_from(&entries);

        let first = hash_canonical_json(HashAlgorithm::Sha256, &forward).expect("hash");
        let second = hash_canonical_json(HashAlgorithm::Sha256, &reversed).expect("hash");
        assert_eq!(first, second);
    }

    #[test]
    fn null_members_never_change_the_hash(
        entries in proptest::collection::vec(("[a-z]{1,8}", -1000_i64..1000), 0..8),
        null_keys in proptest::collection::vec("[0-9]{1,4}", 0..4)
    ) {
        let clean = object_from(&entries);
        let mut padded = object_from(&entries);
        if let Value::Object(map) = &mut padded {
            // Null keys use a digit alphabet so they cannot collide with
            // the populated keys.
            for key in &null_keys {
                map.insert(key.clone(), Value::Null);
            }
        }

        let first = hash_canonical_json(HashAlgorithm::Sha256, &clean).expect("hash");
        let second = hash_canonical_json(HashAlgorithm::Sha256, &padded).expect("hash");
        assert_eq!(first, second);
    }

    #[test]
    fn repeated_hashing_is_stable(
        entries in proptest::collection::vec(("[a-z]{1,8}", -1000_i64..1000), 0..8)
    ) {
        let value = object_from(&entries);
        let first = hash_canonical_json(HashAlgorithm::Blake3, &value).expect("hash");
        let second = hash_canonical_json(HashAlgorithm::Blake3, &value).expect("hash");
        assert_eq!(first, second);
    }
}
