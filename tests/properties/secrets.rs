//! Property tests for secret redaction.

use proptest::prelude::*;

use otelstack::domain::value_objects::{PropertyValue, Secret};

proptest! {
    /// PROPERTY: formatting a secret never reveals it.
    #[test]
    fn property_secret_formatting_redacts(value in "[A-Za-z0-9_-]{12,64}") {
        let secret = Secret::new(value.clone());
        let displayed = format!("{}", secret);
        let debugged = format!("{:?}", secret);
        prop_assert!(!displayed.contains(&value));
        prop_assert!(!debugged.contains(&value));
    }

    /// PROPERTY: the fingerprint of a secret input hides the value but still
    /// tracks changes to it.
    #[test]
    fn property_secret_fingerprint_hides_value(
        a in "[A-Za-z0-9_-]{12,64}",
        b in "[A-Za-z0-9_-]{12,64}",
    ) {
        let fa = PropertyValue::from(Secret::new(a.clone())).fingerprint().unwrap();
        prop_assert!(!fa.to_string().contains(&a));

        let fb = PropertyValue::from(Secret::new(b.clone())).fingerprint().unwrap();
        prop_assert_eq!(a == b, fa == fb);
    }
}
