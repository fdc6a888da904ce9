//! OTP Service
//!
//! Orchestrates issuance and verification over the store, channel and clock
//! ports.
//!
//! ## Issuance
//!
//! ```text
//! normalize ─→ channel check ─→ generate ─→ replace_pending ─→ dispatch
//!     │              │                            │                │
//! Validation   Configuration                   Storage          Dispatch
//! ```
//!
//! ## Verification
//!
//! ```text
//! code format ─→ normalize ─→ query live match ─┬─ none ─→ charge attempt ─→ InvalidOrExpired
//!                                               └─ some ─→ budget check ─→ mark verified
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::adapters::{RandomCodeSource, SystemClock};
use crate::algorithms::{normalize_destination, render_email, render_sms};
use crate::domain::{
    invariant_code_format, ApiResponse, Destination, DestinationKind, DispatchStatus,
    EmailDispatchPolicy, ErrorResponse, IssueOutcome, IssueRequest, IssueResponse, OtpConfig,
    OtpError, OtpFilter, OtpPatch, OtpRecord, QueryOrder, VerifyOutcome, VerifyRequest,
    VerifyResponse,
};
use crate::metrics::{MetricsRecorder, NonCriticalEvent, NoOpMetrics};
use crate::ports::{Clock, CodeSource, EmailChannel, OtpApi, OtpStore, SmsChannel};

/// OTP service implementation
///
/// Implements the `OtpApi` port using injected dependencies. Holds no
/// per-request state; concurrent calls only share the store.
pub struct OtpService<S: OtpStore> {
    /// Record store (driven port)
    store: Arc<S>,
    /// Optional email sender; issuance skips the send without one
    email_channel: Option<Arc<dyn EmailChannel>>,
    /// SMS sender; phone issuance fails without one
    sms_channel: Option<Arc<dyn SmsChannel>>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeSource>,
    metrics: Arc<dyn MetricsRecorder>,
    config: OtpConfig,
}

impl<S: OtpStore> OtpService<S> {
    /// Create a service with no channels, the system clock, random codes,
    /// and no metrics.
    pub fn new(store: Arc<S>, config: OtpConfig) -> Self {
        Self {
            store,
            email_channel: None,
            sms_channel: None,
            clock: Arc::new(SystemClock),
            codes: Arc::new(RandomCodeSource),
            metrics: Arc::new(NoOpMetrics),
            config,
        }
    }

    pub fn with_email_channel(mut self, channel: Arc<dyn EmailChannel>) -> Self {
        self.email_channel = Some(channel);
        self
    }

    pub fn with_sms_channel(mut self, channel: Arc<dyn SmsChannel>) -> Self {
        self.sms_channel = Some(channel);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = codes;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Issue and map the result to the wire shape.
    pub async fn handle_issue(&self, request: &IssueRequest) -> ApiResponse<IssueResponse> {
        match self.issue(request.destination_kind, &request.destination).await {
            Ok(outcome) => ApiResponse::Ok(IssueResponse::from(outcome)),
            Err(e) => ApiResponse::Err(ErrorResponse::from(&e)),
        }
    }

    /// Verify and map the result to the wire shape.
    pub async fn handle_verify(&self, request: &VerifyRequest) -> ApiResponse<VerifyResponse> {
        match self
            .verify(request.destination_kind, &request.destination, &request.code)
            .await
        {
            Ok(outcome) => ApiResponse::Ok(VerifyResponse {
                success: true,
                verified: outcome.verified,
            }),
            Err(e) => ApiResponse::Err(ErrorResponse::from(&e)),
        }
    }

    fn reject(&self, kind: DestinationKind, err: OtpError) -> OtpError {
        self.metrics.record_rejected(kind, err.kind());
        err
    }

    async fn issue_inner(
        &self,
        kind: DestinationKind,
        raw_destination: &str,
    ) -> Result<IssueOutcome, OtpError> {
        let destination = normalize_destination(kind, raw_destination, &self.config)?;

        if matches!(destination, Destination::Phone(_)) && self.sms_channel.is_none() {
            return Err(OtpError::Configuration(
                "SMS channel is not configured".to_string(),
            ));
        }

        let now = self.clock.now();
        let code = self.codes.next_code(self.config.code_range);
        let record = OtpRecord::new(destination.clone(), code.clone(), now, self.config.ttl());
        let expires_at = record.expires_at;

        let retired = self.store.replace_pending(record).await.map_err(|e| {
            error!(destination = %destination, "[otp] Failed to persist code: {}", e);
            OtpError::Storage(e)
        })?;
        debug!(
            destination = %destination,
            retired,
            "[otp] Stored new code, retired {} pending predecessors",
            retired
        );

        let dispatch = match &destination {
            Destination::Email(address) => self.dispatch_email(address, &code).await?,
            Destination::Phone(number) => self.dispatch_sms(number, &code).await?,
        };

        self.metrics.record_issued(kind);
        info!(
            destination = %destination,
            kind = %kind,
            ?dispatch,
            "[otp] Issued verification code"
        );

        Ok(IssueOutcome {
            destination,
            expires_at,
            dispatch,
            code: self.config.deployment_mode.echoes_codes().then_some(code),
        })
    }

    async fn dispatch_email(&self, address: &str, code: &str) -> Result<DispatchStatus, OtpError> {
        let masked = Destination::Email(address.to_string()).masked();

        let Some(channel) = &self.email_channel else {
            warn!(to = %masked, "[otp] No email channel configured, skipping send");
            self.metrics
                .record_non_critical(NonCriticalEvent::EmailChannelMissing);
            return Ok(DispatchStatus::Skipped);
        };

        let message = render_email(&self.config.platform_name, code, self.config.ttl());
        match channel.send(address, &message.subject, &message.html_body).await {
            Ok(()) => Ok(DispatchStatus::Sent),
            Err(e) => match self.config.email_dispatch {
                EmailDispatchPolicy::Strict => {
                    error!(to = %masked, "[otp] Email dispatch failed: {}", e);
                    Err(OtpError::Dispatch(e))
                }
                EmailDispatchPolicy::Permissive => {
                    warn!(to = %masked, "[otp] Email dispatch failed, tolerated: {}", e);
                    self.metrics
                        .record_non_critical(NonCriticalEvent::EmailDispatchFailed {
                            reason: e.to_string(),
                        });
                    Ok(DispatchStatus::Failed)
                }
            },
        }
    }

    async fn dispatch_sms(&self, number: &str, code: &str) -> Result<DispatchStatus, OtpError> {
        let channel = self.sms_channel.as_ref().ok_or_else(|| {
            OtpError::Configuration("SMS channel is not configured".to_string())
        })?;
        let masked = Destination::Phone(number.to_string()).masked();

        let body = render_sms(&self.config.platform_name, code, self.config.ttl());
        match channel.send(number, &body).await {
            Ok(message_id) => {
                debug!(to = %masked, %message_id, "[otp] SMS accepted by provider");
                Ok(DispatchStatus::Sent)
            }
            Err(e) => {
                error!(to = %masked, "[otp] SMS dispatch failed: {}", e);
                Err(OtpError::Dispatch(e))
            }
        }
    }

    async fn verify_inner(
        &self,
        kind: DestinationKind,
        raw_destination: &str,
        submitted_code: &str,
    ) -> Result<VerifyOutcome, OtpError> {
        let code = invariant_code_format(submitted_code)?;
        let destination = normalize_destination(kind, raw_destination, &self.config)?;
        let now = self.clock.now();

        let filter = OtpFilter::for_destination(&destination)
            .with_code(code)
            .unverified()
            .live_at(now);
        let matched = self.store.query_one(&filter, QueryOrder::NewestFirst).await?;

        let Some(record) = matched else {
            self.charge_failed_attempt(&destination).await;
            debug!(destination = %destination, "[otp] No live record matched submitted code");
            return Err(OtpError::InvalidOrExpired);
        };

        if record.attempts_exhausted(self.config.max_attempts) {
            warn!(
                destination = %destination,
                attempts = record.attempts,
                "[otp] Attempt budget exhausted"
            );
            return Err(OtpError::MaxAttemptsExceeded {
                max: self.config.max_attempts,
            });
        }

        let updated = self
            .store
            .update_where(&OtpFilter::by_id(record.id).unverified(), OtpPatch::MarkVerified)
            .await?;
        if updated == 0 {
            // Retired or verified by a concurrent request since the lookup.
            return Err(OtpError::InvalidOrExpired);
        }

        self.metrics.record_verified(kind);
        info!(destination = %destination, "[otp] Code verified");
        Ok(VerifyOutcome { verified: true })
    }

    /// Charge one failed attempt to the newest pending record, if any.
    ///
    /// Best effort: failures go to the non-critical channel only.
    async fn charge_failed_attempt(&self, destination: &Destination) {
        let filter = OtpFilter::for_destination(destination).unverified();
        let latest = match self.store.query_one(&filter, QueryOrder::NewestFirst).await {
            Ok(latest) => latest,
            Err(e) => {
                warn!(destination = %destination, "[otp] Could not look up pending record: {}", e);
                self.metrics
                    .record_non_critical(NonCriticalEvent::AttemptLookupFailed {
                        reason: e.to_string(),
                    });
                return;
            }
        };

        let Some(latest) = latest else {
            return;
        };

        let by_id = OtpFilter::by_id(latest.id).unverified();
        if let Err(e) = self
            .store
            .update_where(&by_id, OtpPatch::IncrementAttempts)
            .await
        {
            warn!(destination = %destination, "[otp] Could not record failed attempt: {}", e);
            self.metrics
                .record_non_critical(NonCriticalEvent::AttemptNotRecorded {
                    reason: e.to_string(),
                });
        }
    }
}

#[async_trait]
impl<S: OtpStore> OtpApi for OtpService<S> {
    async fn issue(
        &self,
        kind: DestinationKind,
        destination: &str,
    ) -> Result<IssueOutcome, OtpError> {
        self.issue_inner(kind, destination)
            .await
            .map_err(|e| self.reject(kind, e))
    }

    async fn verify(
        &self,
        kind: DestinationKind,
        destination: &str,
        code: &str,
    ) -> Result<VerifyOutcome, OtpError> {
        self.verify_inner(kind, destination, code)
            .await
            .map_err(|e| self.reject(kind, e))
    }
}
