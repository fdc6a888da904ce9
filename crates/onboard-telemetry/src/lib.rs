//! # Onboard Telemetry
//!
//! Logging and metrics shared by the Onboard services.
//!
//! ## Components
//!
//! - **Logging**: `tracing` subscriber with text or JSON output
//! - **Metrics**: Prometheus counters and histograms in a crate registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use onboard_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ONBOARD_SERVICE_NAME` | `onboard` | Service name in logs |
//! | `ONBOARD_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `ONBOARD_JSON_LOGS` | `false` (`true` in containers) | JSON log output |
//! | `ONBOARD_LOG_TARGET` | `true` | Include module targets |
//! | `ONBOARD_ENVIRONMENT` | deployment mode, else `production` | Environment label |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};
pub use metrics::{
    encode_metrics, register_metrics, RequestTimer, OTP_CODES_ISSUED, OTP_NON_CRITICAL,
    OTP_REJECTIONS, OTP_REQUEST_DURATION, OTP_VERIFICATIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the global log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)?;
    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        "Telemetry initialized"
    );
    Ok(())
}

/// Increment a counter, optionally selecting labels.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
