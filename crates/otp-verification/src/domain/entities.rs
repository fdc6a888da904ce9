//! # Domain Entities
//!
//! The OTP record and the query vocabulary the store contract speaks.

use super::errors::OtpError;
use super::value_objects::{Destination, DestinationKind, RecordState};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One issued code bound to a destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Destination the code was sent to.
    pub destination: Destination,
    /// Six ASCII digits.
    pub code: String,
    /// Issuance instant.
    pub issued_at: DateTime<Utc>,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Verified, or invalidated by a later issuance.
    pub verified: bool,
    /// Failed verification attempts recorded against this record.
    pub attempts: u32,
}

impl OtpRecord {
    /// Create a fresh pending record valid for `ttl` from `issued_at`.
    pub fn new(destination: Destination, code: String, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            destination,
            code,
            issued_at,
            expires_at: issued_at + ttl,
            verified: false,
            attempts: 0,
        }
    }

    /// Destination kind of this record.
    pub fn kind(&self) -> DestinationKind {
        self.destination.kind()
    }

    /// Current state.
    pub fn state(&self) -> RecordState {
        if self.verified {
            RecordState::Verified
        } else {
            RecordState::Pending
        }
    }

    /// Expired at `now`. The window is half-open: `expires_at` itself is expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Unverified and not expired.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.verified && !self.is_expired(now)
    }

    /// Whether the attempt budget is used up.
    pub fn attempts_exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }

    /// Transition `Pending -> Verified`.
    pub fn mark_verified(&mut self) -> Result<(), OtpError> {
        if !self.state().can_transition_to(RecordState::Verified) {
            return Err(OtpError::InvalidOrExpired);
        }
        self.verified = true;
        Ok(())
    }

    /// Record one failed attempt.
    pub fn record_failed_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Apply a store patch in place.
    ///
    /// Returns false when the patch does not apply to the current state.
    pub fn apply(&mut self, patch: OtpPatch) -> bool {
        match patch {
            OtpPatch::MarkVerified => self.mark_verified().is_ok(),
            OtpPatch::IncrementAttempts => {
                self.record_failed_attempt();
                true
            }
        }
    }
}

/// Conjunctive record filter. `None` fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OtpFilter {
    /// Exact record id.
    pub id: Option<Uuid>,
    /// Destination, which also fixes the kind.
    pub destination: Option<Destination>,
    /// Exact code.
    pub code: Option<String>,
    /// Verified flag.
    pub verified: Option<bool>,
    /// Only records with `expires_at` strictly after this instant.
    pub expires_after: Option<DateTime<Utc>>,
}

impl OtpFilter {
    /// All records for a destination.
    pub fn for_destination(destination: &Destination) -> Self {
        Self {
            destination: Some(destination.clone()),
            ..Default::default()
        }
    }

    /// A single record by id.
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Restrict to a code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Restrict to unverified records.
    pub fn unverified(mut self) -> Self {
        self.verified = Some(false);
        self
    }

    /// Restrict to records not yet expired at `now`.
    pub fn live_at(mut self, now: DateTime<Utc>) -> Self {
        self.expires_after = Some(now);
        self
    }

    /// Check a record against every set field.
    pub fn matches(&self, record: &OtpRecord) -> bool {
        if let Some(id) = self.id {
            if record.id != id {
                return false;
            }
        }
        if let Some(destination) = &self.destination {
            if &record.destination != destination {
                return false;
            }
        }
        if let Some(code) = &self.code {
            if &record.code != code {
                return false;
            }
        }
        if let Some(verified) = self.verified {
            if record.verified != verified {
                return false;
            }
        }
        if let Some(after) = self.expires_after {
            if record.expires_at <= after {
                return false;
            }
        }
        true
    }
}

/// Mutation applied by a conditional update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpPatch {
    /// Set `verified = true`.
    MarkVerified,
    /// Increase `attempts` by exactly one.
    IncrementAttempts,
}

/// Ordering for single-record lookups, by issuance time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryOrder {
    /// Most recently issued first.
    #[default]
    NewestFirst,
}

/// What happened to the notification during issuance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// Channel accepted the message.
    Sent,
    /// No email channel configured; send skipped.
    Skipped,
    /// Email send failed but the permissive policy tolerated it.
    Failed,
}

/// Result of a successful issuance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueOutcome {
    /// Canonical destination the code is bound to.
    pub destination: Destination,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Delivery outcome.
    pub dispatch: DispatchStatus,
    /// The code itself; only populated in development mode.
    pub code: Option<String>,
}

impl IssueOutcome {
    /// Human-readable summary for the caller.
    pub fn message(&self) -> String {
        let target = match self.destination.kind() {
            DestinationKind::Email => "email",
            DestinationKind::Phone => "phone",
        };
        match self.dispatch {
            DispatchStatus::Sent => format!("Verification code sent to your {}", target),
            DispatchStatus::Skipped | DispatchStatus::Failed => {
                format!("Verification code generated for your {}", target)
            }
        }
    }
}

/// Result of a successful verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Always true on success.
    pub verified: bool,
}
