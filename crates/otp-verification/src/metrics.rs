//! Metrics hooks and the non-critical failure channel
//!
//! Best-effort steps (recording a failed attempt, tolerated email failures)
//! never change the result of an operation. Their failures are reported
//! here instead, so operators can alert on them and tests can assert them.
//!
//! ## Usage
//!
//! ```ignore
//! use otp_verification::metrics::Metrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let service = OtpService::new(store, config).with_metrics(metrics.clone());
//!
//! // ... later
//! let snapshot = metrics.snapshot();
//! ```

use crate::domain::{DestinationKind, OtpErrorKind};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Failure of a best-effort step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NonCriticalEvent {
    /// No email channel configured; the send was skipped.
    EmailChannelMissing,
    /// Email send failed and the permissive policy tolerated it.
    EmailDispatchFailed { reason: String },
    /// Looking up the record to charge a failed attempt against failed.
    AttemptLookupFailed { reason: String },
    /// Incrementing the attempt counter failed.
    AttemptNotRecorded { reason: String },
}

impl NonCriticalEvent {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            NonCriticalEvent::EmailChannelMissing => "email_channel_missing",
            NonCriticalEvent::EmailDispatchFailed { .. } => "email_dispatch_failed",
            NonCriticalEvent::AttemptLookupFailed { .. } => "attempt_lookup_failed",
            NonCriticalEvent::AttemptNotRecorded { .. } => "attempt_not_recorded",
        }
    }
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to forward to Prometheus or another backend.
pub trait MetricsRecorder: Send + Sync {
    /// A code was issued and persisted.
    fn record_issued(&self, kind: DestinationKind);

    /// A code was verified.
    fn record_verified(&self, kind: DestinationKind);

    /// An operation was rejected with `reason`.
    fn record_rejected(&self, kind: DestinationKind, reason: OtpErrorKind);

    /// A best-effort step failed.
    fn record_non_critical(&self, event: NonCriticalEvent);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_issued(&self, _: DestinationKind) {}
    fn record_verified(&self, _: DestinationKind) {}
    fn record_rejected(&self, _: DestinationKind, _: OtpErrorKind) {}
    fn record_non_critical(&self, _: NonCriticalEvent) {}
}

/// In-process metrics collector
///
/// Thread-safe counters plus the retained list of non-critical events.
#[derive(Default)]
pub struct Metrics {
    pub email_issued: AtomicU64,
    pub phone_issued: AtomicU64,
    pub verified: AtomicU64,
    pub rejected_validation: AtomicU64,
    pub rejected_invalid_or_expired: AtomicU64,
    pub rejected_max_attempts: AtomicU64,
    pub rejected_other: AtomicU64,
    non_critical: Mutex<Vec<NonCriticalEvent>>,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-critical events recorded so far, oldest first.
    pub fn non_critical_events(&self) -> Vec<NonCriticalEvent> {
        self.non_critical.lock().clone()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            email_issued: self.email_issued.load(Ordering::Relaxed),
            phone_issued: self.phone_issued.load(Ordering::Relaxed),
            verified: self.verified.load(Ordering::Relaxed),
            rejected_validation: self.rejected_validation.load(Ordering::Relaxed),
            rejected_invalid_or_expired: self.rejected_invalid_or_expired.load(Ordering::Relaxed),
            rejected_max_attempts: self.rejected_max_attempts.load(Ordering::Relaxed),
            rejected_other: self.rejected_other.load(Ordering::Relaxed),
            non_critical: self.non_critical.lock().len() as u64,
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.email_issued.store(0, Ordering::Relaxed);
        self.phone_issued.store(0, Ordering::Relaxed);
        self.verified.store(0, Ordering::Relaxed);
        self.rejected_validation.store(0, Ordering::Relaxed);
        self.rejected_invalid_or_expired.store(0, Ordering::Relaxed);
        self.rejected_max_attempts.store(0, Ordering::Relaxed);
        self.rejected_other.store(0, Ordering::Relaxed);
        self.non_critical.lock().clear();
    }
}

impl MetricsRecorder for Metrics {
    fn record_issued(&self, kind: DestinationKind) {
        match kind {
            DestinationKind::Email => self.email_issued.fetch_add(1, Ordering::Relaxed),
            DestinationKind::Phone => self.phone_issued.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn record_verified(&self, _kind: DestinationKind) {
        self.verified.fetch_add(1, Ordering::Relaxed);
    }

    fn record_rejected(&self, _kind: DestinationKind, reason: OtpErrorKind) {
        let counter = match reason {
            OtpErrorKind::ValidationError => &self.rejected_validation,
            OtpErrorKind::InvalidOrExpired => &self.rejected_invalid_or_expired,
            OtpErrorKind::MaxAttemptsExceeded => &self.rejected_max_attempts,
            OtpErrorKind::ConfigurationError
            | OtpErrorKind::StorageError
            | OtpErrorKind::DispatchError => &self.rejected_other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_non_critical(&self, event: NonCriticalEvent) {
        self.non_critical.lock().push(event);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub email_issued: u64,
    pub phone_issued: u64,
    pub verified: u64,
    pub rejected_validation: u64,
    pub rejected_invalid_or_expired: u64,
    pub rejected_max_attempts: u64,
    pub rejected_other: u64,
    pub non_critical: u64,
}
