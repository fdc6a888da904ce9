//! # Domain Value Objects
//!
//! Immutable value types for OTP issuance and verification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of destination an OTP is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinationKind {
    /// Email address.
    Email,
    /// Phone number, delivered by SMS.
    Phone,
}

impl DestinationKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationKind::Email => "email",
            DestinationKind::Phone => "phone",
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, canonical destination.
///
/// Only constructed through the normalizer, so the inner string is either a
/// structurally valid email or a canonical `+<digits>` phone number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Destination {
    /// Email address.
    Email(String),
    /// Canonical phone number.
    Phone(String),
}

impl Destination {
    /// Kind of this destination.
    pub fn kind(&self) -> DestinationKind {
        match self {
            Destination::Email(_) => DestinationKind::Email,
            Destination::Phone(_) => DestinationKind::Phone,
        }
    }

    /// Raw destination string.
    pub fn as_str(&self) -> &str {
        match self {
            Destination::Email(addr) => addr,
            Destination::Phone(number) => number,
        }
    }

    /// Masked form safe for logs.
    pub fn masked(&self) -> String {
        match self {
            Destination::Email(addr) => match addr.split_once('@') {
                Some((local, domain)) => {
                    let first: String = local.chars().take(1).collect();
                    format!("{}***@{}", first, domain)
                }
                None => "***".to_string(),
            },
            Destination::Phone(number) => {
                let chars: Vec<char> = number.chars().collect();
                if chars.len() <= 6 {
                    return "***".to_string();
                }
                let head: String = chars[..2].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{}{}{}", head, "*".repeat(chars.len() - 6), tail)
            }
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Per-record verification state.
///
/// `Pending -> Verified` is the only transition. Invalidation on reissue
/// reuses the `Verified` state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    /// Unverified; live until it expires.
    #[default]
    Pending,
    /// Verified or invalidated.
    Verified,
}

impl RecordState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: RecordState) -> bool {
        matches!((self, next), (Self::Pending, Self::Verified))
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Process-wide deployment mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Pre-production: codes are echoed to the caller.
    Development,
    /// Hardened: codes never leave the notification channel.
    #[default]
    Production,
}

impl DeploymentMode {
    /// Whether generated codes may be returned to the caller.
    pub fn echoes_codes(&self) -> bool {
        matches!(self, DeploymentMode::Development)
    }

    /// Email dispatch policy implied by this mode.
    pub fn default_email_dispatch(&self) -> EmailDispatchPolicy {
        match self {
            DeploymentMode::Development => EmailDispatchPolicy::Permissive,
            DeploymentMode::Production => EmailDispatchPolicy::Strict,
        }
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(DeploymentMode::Development),
            "production" | "prod" => Ok(DeploymentMode::Production),
            other => Err(format!("unknown deployment mode: {}", other)),
        }
    }
}

/// What happens when an email send fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailDispatchPolicy {
    /// Issuance fails with a dispatch error.
    Strict,
    /// Issuance still succeeds; the failure is only logged.
    Permissive,
}

impl FromStr for EmailDispatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(EmailDispatchPolicy::Strict),
            "permissive" => Ok(EmailDispatchPolicy::Permissive),
            other => Err(format!("unknown email dispatch policy: {}", other)),
        }
    }
}

/// Numeric range of generated codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeRange {
    /// "000000" through "999999", zero padded.
    #[default]
    FullSixDigit,
    /// 100000 through 999999 only.
    NoLeadingZero,
}

impl CodeRange {
    /// Inclusive numeric bounds of the range.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            CodeRange::FullSixDigit => (0, 999_999),
            CodeRange::NoLeadingZero => (100_000, 999_999),
        }
    }
}

impl FromStr for CodeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "full_six_digit" => Ok(CodeRange::FullSixDigit),
            "no_leading_zero" | "legacy" => Ok(CodeRange::NoLeadingZero),
            other => Err(format!("unknown code range: {}", other)),
        }
    }
}
