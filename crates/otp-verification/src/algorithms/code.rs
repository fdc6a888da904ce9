//! # Code Generation
//!
//! Fresh numeric codes, one per issuance.

use crate::domain::{CodeRange, OTP_CODE_LENGTH};
use rand::Rng;

/// Generate a six-digit code in `range` from the thread-local CSPRNG.
pub fn generate_code(range: CodeRange) -> String {
    generate_code_with(&mut rand::thread_rng(), range)
}

/// Generate a code from an explicit RNG.
pub fn generate_code_with<R: Rng + ?Sized>(rng: &mut R, range: CodeRange) -> String {
    let (low, high) = range.bounds();
    let value = rng.gen_range(low..=high);
    format!("{:0width$}", value, width = OTP_CODE_LENGTH)
}
