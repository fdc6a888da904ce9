//! # OTP Verification
//!
//! One-time passcode issuance and verification for email addresses and
//! phone numbers.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Prove that a user controls a destination before onboarding continues:
//! - 6-digit numeric codes with a bounded lifetime
//! - At most one pending code per destination
//! - Single-use verification with a failed-attempt budget
//!
//! ## Guarantees
//!
//! | Guarantee | Enforced by |
//! |-----------|-------------|
//! | Latest code wins | `OtpStore::replace_pending` |
//! | Single use | conditional `MarkVerified` update |
//! | Attempt budget | `OtpRecord::attempts_exhausted` |
//! | Expiry | `OtpFilter::live_at` (`expires_at <= now` is expired) |
//! | Codes never logged | destinations are masked, codes never reach tracing |
//!
//! ## Module Structure
//!
//! ```text
//! otp-verification/
//! ├── domain/          # OtpRecord, Destination, config, errors, wire types
//! ├── algorithms/      # Code generation, normalization, message rendering
//! ├── ports/           # OtpApi, OtpStore, EmailChannel, SmsChannel, Clock, CodeSource
//! ├── adapters/        # In-memory store, log/recording channels, clocks, code sources
//! ├── service/         # OtpService
//! └── metrics.rs       # MetricsRecorder and the in-process collector
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    FaultyStore, InMemoryOtpStore, LogEmailChannel, LogSmsChannel, ManualClock, RandomCodeSource,
    RecordingEmailChannel, RecordingSmsChannel, ScriptedCodeSource, SpyStore, SystemClock,
};
pub use algorithms::{
    generate_code, normalize_destination, normalize_phone, render_email, render_sms,
    validate_email,
};
pub use domain::{
    invariant_code_format, ApiResponse, CodeRange, DeploymentMode, Destination, DestinationKind,
    DispatchError, DispatchStatus, EmailDispatchPolicy, ErrorResponse, IssueOutcome, IssueRequest,
    IssueResponse, OtpConfig, OtpConfigBuilder, OtpError, OtpErrorKind, OtpFilter, OtpPatch,
    OtpRecord, QueryOrder, StoreError, VerifyOutcome, VerifyRequest, VerifyResponse,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_OTP_TTL_SECS, OTP_CODE_LENGTH,
};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics, NonCriticalEvent};
pub use ports::{Clock, CodeSource, EmailChannel, OtpApi, OtpStore, SmsChannel};
pub use service::OtpService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
