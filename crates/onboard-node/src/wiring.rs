//! # Service Wiring
//!
//! Builds the OTP service from configuration and owns the background
//! maintenance task.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use onboard_telemetry::{log_event, TelemetryConfig};
use otp_verification::{
    Clock, InMemoryOtpStore, LogEmailChannel, LogSmsChannel, MetricsRecorder, OtpConfig,
    OtpService, SystemClock,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default interval between purges of retired records.
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 300;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// OTP policy.
    pub otp: OtpConfig,
    /// Logging and metrics.
    pub telemetry: TelemetryConfig,
    /// Purge cadence for the in-memory store; `None` disables purging.
    pub purge_interval: Option<Duration>,
}

impl NodeConfig {
    /// Load from the process environment.
    ///
    /// `ONBOARD_PURGE_INTERVAL_SECS` sets the purge cadence; `0` disables it.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let otp = OtpConfig::from_lookup(&lookup).context("invalid OTP configuration")?;
        let telemetry = TelemetryConfig::from_lookup(&lookup);

        let purge_secs = match lookup("ONBOARD_PURGE_INTERVAL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("ONBOARD_PURGE_INTERVAL_SECS={:?} is not a number", raw))?,
            None => DEFAULT_PURGE_INTERVAL_SECS,
        };

        Ok(Self {
            otp,
            telemetry,
            purge_interval: (purge_secs > 0).then(|| Duration::from_secs(purge_secs)),
        })
    }
}

/// Build the service over the in-memory store and log-only channels.
pub fn build_service(
    config: &OtpConfig,
    store: Arc<InMemoryOtpStore>,
    metrics: Arc<dyn MetricsRecorder>,
) -> OtpService<InMemoryOtpStore> {
    log_event!(
        info,
        "wiring",
        "Building OTP service",
        mode = ?config.deployment_mode,
        email_dispatch = ?config.email_dispatch,
        ttl_secs = config.ttl_secs,
        max_attempts = config.max_attempts
    );

    OtpService::new(store, config.clone())
        .with_email_channel(Arc::new(LogEmailChannel))
        .with_sms_channel(Arc::new(LogSmsChannel::new()))
        .with_metrics(metrics)
}

/// Periodically drop retired records until `shutdown` flips to `true`.
pub fn spawn_purge_task(
    store: Arc<InMemoryOtpStore>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let clock = SystemClock;
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = store.purge_expired(clock.now());
                    if purged > 0 {
                        log_event!(
                            info,
                            "purge",
                            "Purged retired records",
                            purged = purged,
                            remaining = store.len()
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        log_event!(debug, "purge", "Purge task stopping");
                        break;
                    }
                }
            }
        }
    })
}
