//! Validates email candidates harvested from mailto anchor text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anchored address syntax: one local part, one `@`, a dotted domain with
/// an alphabetic top-level label of at least two characters.
static ADDR_SPEC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("Failed to compile email regex pattern. This should not happen.")
});

/// Unwraps the RFC 5322 name-addr form (`Display Name <user@example.com>`)
/// down to the bare mailbox, or returns the trimmed input when no angle
/// brackets are present. `None` when the angle form is unbalanced.
fn addr_spec(candidate: &str) -> Option<&str> {
    let trimmed = candidate.trim();
    match trimmed.find('<') {
        Some(start) if trimmed.ends_with('>') => {
            Some(trimmed[start + 1..trimmed.len() - 1].trim())
        }
        Some(_) => None,
        None => Some(trimmed),
    }
}

/// Judges whether a candidate string is an acceptable email address.
///
/// Accepts both the bare mailbox form (`user@example.com`) and the
/// name-addr form (`Contact Us <user@example.com>`). Every malformed
/// input, including the empty string, is simply `false`; this function
/// never fails.
pub(crate) fn is_valid_email(candidate: &str) -> bool {
    match addr_spec(candidate) {
        Some(addr) => ADDR_SPEC_REGEX.is_match(addr),
        None => false,
    }
}
