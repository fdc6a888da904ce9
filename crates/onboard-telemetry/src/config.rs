//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or a full directive)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to include span/target information in text logs
    pub with_target: bool,

    /// Deployment environment label (development, staging, production)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "onboard".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_target: true,
            environment: "production".to_string(),
        }
    }
}

fn truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Environment label for a deployment mode value, folding the short aliases.
fn environment_label(mode: &str) -> String {
    match mode.trim().to_lowercase().as_str() {
        "dev" | "development" => "development".to_string(),
        "prod" | "production" => "production".to_string(),
        other => other.to_string(),
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ONBOARD_SERVICE_NAME`: Service name (default: onboard)
    /// - `ONBOARD_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `ONBOARD_JSON_LOGS`: Enable JSON logs (default: true in containers)
    /// - `ONBOARD_LOG_TARGET`: Include module targets (default: true)
    /// - `ONBOARD_ENVIRONMENT`: Environment label (default: follows
    ///   `ONBOARD_DEPLOYMENT_MODE`, else production)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("ONBOARD_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("ONBOARD_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("ONBOARD_JSON_LOGS")
                .map(|v| truthy(&v))
                .unwrap_or(is_container),

            with_target: lookup("ONBOARD_LOG_TARGET")
                .map(|v| truthy(&v))
                .unwrap_or(defaults.with_target),

            environment: lookup("ONBOARD_ENVIRONMENT")
                .or_else(|| lookup("ONBOARD_DEPLOYMENT_MODE").map(|m| environment_label(&m)))
                .unwrap_or(defaults.environment),
        }
    }
}
