//! Validation of untrusted identifiers before they reach argument lists,
//! file paths, or process-matching patterns.

use crate::error::LeaseherdError;

/// Linux caps interface names at 15 bytes (IFNAMSIZ minus the trailing NUL).
pub const MAX_INTERFACE_LEN: usize = 15;

/// DNS caps a full hostname at 253 characters.
pub const MAX_HOSTNAME_LEN: usize = 253;

/// Checks that `name` is a plausible interface name.
///
/// Accepts a letter followed by letters, digits, dashes, or underscores, at
/// most [`MAX_INTERFACE_LEN`] characters. Everything outside that allow-list
/// is rejected rather than escaped, since the name is later embedded into
/// subprocess arguments, file paths, and kill patterns.
pub fn validate_interface(name: &str) -> Result<(), LeaseherdError> {
    let mut chars = name.chars();
    let starts_with_letter = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic());
    let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !starts_with_letter || !tail_ok || name.len() > MAX_INTERFACE_LEN {
        return Err(LeaseherdError::InvalidInterface(name.to_string()));
    }
    Ok(())
}

/// Checks that `name` is usable as an advertised hostname.
///
/// The empty string is valid (the hostname option is optional). Non-empty
/// values may contain letters, digits, dots, and dashes, at most
/// [`MAX_HOSTNAME_LEN`] characters. Quotes, whitespace, and semicolons fail.
pub fn validate_hostname(name: &str) -> Result<(), LeaseherdError> {
    if name.is_empty() {
        return Ok(());
    }
    let chars_ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

    if !chars_ok || name.len() > MAX_HOSTNAME_LEN {
        return Err(LeaseherdError::InvalidHostname(name.to_string()));
    }
    Ok(())
}
