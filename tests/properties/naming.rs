//! Property tests for derived resource names.

use proptest::prelude::*;

use otelstack::domain::services::{auto_name, validate_storage_account_name};

proptest! {
    /// PROPERTY: derived storage account names are always valid, whatever
    /// the stack is called.
    #[test]
    fn property_auto_storage_account_name_is_valid(stack in ".{0,64}") {
        let name = auto_name("otelsa", &stack, "sa");
        prop_assert!(validate_storage_account_name(&name).is_ok(), "invalid: {}", name);
    }

    /// PROPERTY: two stacks never share a derived name.
    #[test]
    fn property_auto_name_is_stack_scoped(
        a in "[a-z0-9-]{1,16}",
        b in "[a-z0-9-]{1,16}",
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(auto_name("otelsa", &a, "sa"), auto_name("otelsa", &b, "sa"));
    }
}
