//! # Inbound Ports
//!
//! API trait defining what the OTP subsystem can do.

use crate::domain::{DestinationKind, IssueOutcome, OtpError, VerifyOutcome};
use async_trait::async_trait;

/// OTP API - inbound port.
#[async_trait]
pub trait OtpApi: Send + Sync {
    /// Issue a fresh code to a destination, retiring any pending one.
    async fn issue(
        &self,
        kind: DestinationKind,
        destination: &str,
    ) -> Result<IssueOutcome, OtpError>;

    /// Verify a submitted code against the destination's live record.
    async fn verify(
        &self,
        kind: DestinationKind,
        destination: &str,
        code: &str,
    ) -> Result<VerifyOutcome, OtpError>;
}
