//! Forwards OTP service metrics to the Prometheus registry.

use onboard_telemetry::{
    log_event, metric_inc, OTP_CODES_ISSUED, OTP_NON_CRITICAL, OTP_REJECTIONS, OTP_VERIFICATIONS,
};
use otp_verification::{DestinationKind, MetricsRecorder, NonCriticalEvent, OtpErrorKind};

/// `MetricsRecorder` backed by the onboard Prometheus counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrometheusMetrics;

impl MetricsRecorder for PrometheusMetrics {
    fn record_issued(&self, kind: DestinationKind) {
        metric_inc!(OTP_CODES_ISSUED, &[label(kind)]);
    }

    fn record_verified(&self, kind: DestinationKind) {
        metric_inc!(OTP_VERIFICATIONS, &[label(kind)]);
    }

    fn record_rejected(&self, kind: DestinationKind, reason: OtpErrorKind) {
        metric_inc!(OTP_REJECTIONS, &[label(kind), reason.as_str()]);
    }

    fn record_non_critical(&self, event: NonCriticalEvent) {
        log_event!(debug, "metrics", "Non-critical failure recorded", event = event.label());
        metric_inc!(OTP_NON_CRITICAL, &[event.label()]);
    }
}

fn label(kind: DestinationKind) -> &'static str {
    match kind {
        DestinationKind::Email => "email",
        DestinationKind::Phone => "phone",
    }
}
