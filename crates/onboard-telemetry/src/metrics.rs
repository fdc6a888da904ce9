//! Prometheus metrics for the OTP subsystem.
//!
//! All metrics follow the naming convention: `onboard_otp_<metric>_<unit>`.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::time::Instant;

use crate::TelemetryError;

lazy_static! {
    /// Registry holding every onboard metric
    pub static ref REGISTRY: Registry = Registry::new();

    /// Codes issued and persisted, by destination kind
    pub static ref OTP_CODES_ISSUED: IntCounterVec = IntCounterVec::new(
        Opts::new("onboard_otp_codes_issued_total", "Verification codes issued"),
        &["kind"]  // kind: email/phone
    ).expect("metric creation failed");

    /// Successful verifications, by destination kind
    pub static ref OTP_VERIFICATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("onboard_otp_verifications_total", "Verification codes accepted"),
        &["kind"]
    ).expect("metric creation failed");

    /// Rejected operations, by destination kind and error kind
    pub static ref OTP_REJECTIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("onboard_otp_rejections_total", "Issue or verify requests rejected"),
        &["kind", "reason"]
    ).expect("metric creation failed");

    /// Best-effort steps that failed without failing the request
    pub static ref OTP_NON_CRITICAL: IntCounterVec = IntCounterVec::new(
        Opts::new("onboard_otp_non_critical_total", "Tolerated failures"),
        &["event"]
    ).expect("metric creation failed");

    /// Request handling latency
    pub static ref OTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "onboard_otp_request_duration_seconds",
            "Time spent handling issue and verify requests"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("bucket layout")),
        &["operation"]  // operation: issue/verify
    ).expect("metric creation failed");
}

/// Register all metrics with [`REGISTRY`].
///
/// Registering twice returns `MetricsInit`.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(OTP_CODES_ISSUED.clone()),
        Box::new(OTP_VERIFICATIONS.clone()),
        Box::new(OTP_REJECTIONS.clone()),
        Box::new(OTP_NON_CRITICAL.clone()),
        Box::new(OTP_REQUEST_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Observes the elapsed time into [`OTP_REQUEST_DURATION`] on drop.
pub struct RequestTimer {
    operation: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        OTP_REQUEST_DURATION
            .with_label_values(&[self.operation])
            .observe(self.start.elapsed().as_secs_f64());
    }
}
