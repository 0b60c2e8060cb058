//! Physical resource naming
//!
//! Names not set in configuration are derived from the stack and the logical
//! name, so the same stack always maps to the same cloud objects and two
//! stacks never collide.

use crate::domain::value_objects::ContentHash;
use crate::error::{StackError, StackResult};

const SUFFIX_LEN: usize = 8;

/// `<prefix><first 8 hex of sha256("<stack>/<logical>")>`
pub fn auto_name(prefix: &str, stack: &str, logical: &str) -> String {
    let hash = ContentHash::from_bytes(format!("{}/{}", stack, logical).as_bytes());
    format!("{}{}", prefix, hash.short(SUFFIX_LEN))
}

/// Storage accounts: 3-24 characters, lowercase letters and digits only
pub fn validate_storage_account_name(name: &str) -> StackResult<()> {
    let reason = if !(3..=24).contains(&name.len()) {
        Some("must be 3-24 characters long")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        Some("only lowercase letters and digits are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(invalid("storage account", name, reason)),
        None => Ok(()),
    }
}

/// Container apps: 2-32 characters, lowercase alphanumerics and '-', starting
/// with a letter and not ending with '-'
pub fn validate_container_app_name(name: &str) -> StackResult<()> {
    let reason = if !(2..=32).contains(&name.len()) {
        Some("must be 2-32 characters long")
    } else if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        Some("must start with a lowercase letter")
    } else if name.ends_with('-') || name.contains("--") {
        Some("must not end with '-' or contain '--'")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        Some("only lowercase letters, digits and '-' are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(invalid("container app", name, reason)),
        None => Ok(()),
    }
}

/// Stack names become state and lock file names: 1-64 characters of ASCII
/// letters, digits, '-', '_' and '.', not starting with '.'
pub fn validate_stack_name(name: &str) -> StackResult<()> {
    let reason = if !(1..=64).contains(&name.len()) {
        Some("must be 1-64 characters long")
    } else if name.starts_with('.') {
        Some("must not start with '.'")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        Some("only letters, digits, '-', '_' and '.' are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(invalid("stack", name, reason)),
        None => Ok(()),
    }
}

fn invalid(kind: &str, name: &str, reason: &str) -> StackError {
    StackError::InvalidName {
        kind: kind.to_string(),
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
