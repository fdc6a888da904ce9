//! # Domain Invariants
//!
//! Business rules for OTP records.

use super::entities::OtpRecord;
use super::errors::OtpError;
use super::value_objects::Destination;
use chrono::{DateTime, Utc};

/// Number of digits in a code.
pub const OTP_CODE_LENGTH: usize = 6;

/// Default validity window (10 minutes).
pub const DEFAULT_OTP_TTL_SECS: u64 = 10 * 60;

/// Default failed-attempt budget per record.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default calling code prepended to phone numbers without a leading `+`.
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

/// Invariant: a code is exactly six ASCII digits.
///
/// Surrounding whitespace is tolerated and stripped; the returned slice is
/// the code to compare against stored records.
pub fn invariant_code_format(code: &str) -> Result<&str, OtpError> {
    let code = code.trim();
    if code.len() != OTP_CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OtpError::validation(format!(
            "code must be exactly {} digits",
            OTP_CODE_LENGTH
        )));
    }
    Ok(code)
}

/// Invariant: at most one live record per destination.
pub fn invariant_single_live_record(
    records: &[OtpRecord],
    destination: &Destination,
    now: DateTime<Utc>,
) -> bool {
    records
        .iter()
        .filter(|r| &r.destination == destination && r.is_live(now))
        .count()
        <= 1
}

/// Invariant: at most one unverified record per destination, regardless of expiry.
///
/// This is what issuance maintains: every new record retires its predecessors.
pub fn invariant_single_pending_record(records: &[OtpRecord], destination: &Destination) -> bool {
    records
        .iter()
        .filter(|r| &r.destination == destination && !r.verified)
        .count()
        <= 1
}
