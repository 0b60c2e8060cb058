//! Property tests for configuration digests.

use std::fs;

use proptest::prelude::*;

use otelstack::domain::value_objects::ContentHash;
use otelstack::ConfigChangeDetector;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: hashing is a pure function of the bytes.
    #[test]
    fn property_digest_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let a = ContentHash::from_bytes(&bytes);
        let b = ContentHash::from_bytes(&bytes);
        prop_assert_eq!(&a, &b);
        prop_assert!(a.as_str().starts_with("sha256:"));
        prop_assert_eq!(a.hex().len(), 64);
    }

    /// PROPERTY: different contents give different digests.
    #[test]
    fn property_distinct_contents_distinct_digests(
        a in proptest::collection::vec(any::<u8>(), 0..512),
        b in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(ContentHash::from_bytes(&a), ContentHash::from_bytes(&b));
    }

    /// PROPERTY: streaming a file hashes the same as hashing its bytes.
    #[test]
    fn property_file_digest_matches_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, &bytes).unwrap();

        let from_file = ConfigChangeDetector::digest(&path).unwrap();
        prop_assert_eq!(from_file, ContentHash::from_bytes(&bytes));
    }

    /// PROPERTY: a single flipped byte changes the digest.
    #[test]
    fn property_single_byte_change_is_detected(
        bytes in proptest::collection::vec(any::<u8>(), 1..1024),
        index in any::<prop::sample::Index>(),
    ) {
        let mut changed = bytes.clone();
        let i = index.index(changed.len());
        changed[i] = changed[i].wrapping_add(1);
        prop_assert_ne!(ContentHash::from_bytes(&bytes), ContentHash::from_bytes(&changed));
    }
}
