//! # Channel Normalizer
//!
//! Canonicalizes destinations before they touch the store. Phone numbers
//! are reduced to `+<digits>`; emails are only checked structurally.

use crate::domain::{Destination, DestinationKind, OtpConfig, OtpError};

/// Canonicalize a raw phone number.
///
/// Keeps ASCII digits and a leading `+` only. Numbers without a leading `+`
/// get `default_country_code` prepended. No plausibility checks beyond
/// requiring at least one digit.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> Result<String, OtpError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(OtpError::validation("phone number is required"));
    }

    let kept: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let has_plus = kept.first() == Some(&'+');
    let digits: String = kept.into_iter().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err(OtpError::validation("phone number contains no digits"));
    }

    if has_plus {
        Ok(format!("+{}", digits))
    } else {
        Ok(format!("{}{}", default_country_code, digits))
    }
}

/// Validate an email address against `[^\s@]+@[^\s@]+\.[^\s@]+`.
///
/// Returns the trimmed address unchanged otherwise.
pub fn validate_email(raw: &str) -> Result<String, OtpError> {
    let addr = raw.trim();
    if !is_structural_email(addr) {
        return Err(OtpError::validation("email address is malformed"));
    }
    Ok(addr.to_string())
}

fn is_structural_email(addr: &str) -> bool {
    if addr.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = addr.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // A dot with at least one character on each side.
    let chars: Vec<char> = domain.chars().collect();
    chars.len() >= 3 && chars[1..chars.len() - 1].contains(&'.')
}

/// Normalize a raw destination of the given kind.
pub fn normalize_destination(
    kind: DestinationKind,
    raw: &str,
    config: &OtpConfig,
) -> Result<Destination, OtpError> {
    match kind {
        DestinationKind::Email => validate_email(raw).map(Destination::Email),
        DestinationKind::Phone => {
            normalize_phone(raw, &config.default_country_code).map(Destination::Phone)
        }
    }
}
