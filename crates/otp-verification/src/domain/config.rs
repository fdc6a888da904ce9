//! OTP subsystem configuration and validation
//!
//! Built once at startup and injected into the service.
//!
//! # Example
//!
//! ```ignore
//! use otp_verification::domain::{DeploymentMode, OtpConfigBuilder};
//!
//! let config = OtpConfigBuilder::new()
//!     .deployment_mode(DeploymentMode::Development)
//!     .default_country_code("+44")
//!     .build()
//!     .expect("Valid config");
//! ```

use super::errors::OtpError;
use super::invariants::{DEFAULT_COUNTRY_CODE, DEFAULT_MAX_ATTEMPTS, DEFAULT_OTP_TTL_SECS};
use super::value_objects::{CodeRange, DeploymentMode, EmailDispatchPolicy};
use serde::{Deserialize, Serialize};
use std::env;

/// OTP subsystem configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Development echoes codes; production never does
    pub deployment_mode: DeploymentMode,
    /// Whether an email send failure aborts issuance
    pub email_dispatch: EmailDispatchPolicy,
    /// Validity window in seconds
    pub ttl_secs: u64,
    /// Failed attempts allowed per record
    pub max_attempts: u32,
    /// Calling code for phone numbers without a leading `+`
    pub default_country_code: String,
    /// Name embedded in outbound messages
    pub platform_name: String,
    /// Numeric range of generated codes
    pub code_range: CodeRange,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            deployment_mode: DeploymentMode::Production,
            email_dispatch: EmailDispatchPolicy::Strict,
            ttl_secs: DEFAULT_OTP_TTL_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            platform_name: "Onboard".to_string(),
            code_range: CodeRange::FullSixDigit,
        }
    }
}

impl OtpConfig {
    /// Development-mode configuration with permissive email dispatch.
    pub fn development() -> Self {
        Self {
            deployment_mode: DeploymentMode::Development,
            email_dispatch: EmailDispatchPolicy::Permissive,
            ..Default::default()
        }
    }

    /// Validity window as a duration.
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs as i64)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), OtpError> {
        // Anything above a day is not a one-time passcode anymore
        if self.ttl_secs == 0 || self.ttl_secs > 86_400 {
            return Err(OtpError::Configuration(format!(
                "ttl_secs must be between 1 and 86400, got {}",
                self.ttl_secs
            )));
        }

        if self.max_attempts == 0 {
            return Err(OtpError::Configuration(
                "max_attempts cannot be 0".to_string(),
            ));
        }

        let digits = self.default_country_code.strip_prefix('+').unwrap_or("");
        if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpError::Configuration(format!(
                "default_country_code must look like +<1-3 digits>, got {:?}",
                self.default_country_code
            )));
        }

        if self.platform_name.trim().is_empty() {
            return Err(OtpError::Configuration(
                "platform_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ONBOARD_DEPLOYMENT_MODE`: development | production (default: production)
    /// - `ONBOARD_EMAIL_DISPATCH`: strict | permissive (default: derived from mode)
    /// - `ONBOARD_OTP_TTL_SECS`: validity window (default: 600)
    /// - `ONBOARD_OTP_MAX_ATTEMPTS`: attempt budget (default: 5)
    /// - `ONBOARD_DEFAULT_COUNTRY_CODE`: calling code (default: +1)
    /// - `ONBOARD_PLATFORM_NAME`: name used in messages (default: Onboard)
    /// - `ONBOARD_CODE_RANGE`: full | no_leading_zero (default: full)
    pub fn from_env() -> Result<Self, OtpError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`OtpConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OtpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = OtpConfigBuilder::new();

        if let Some(mode) = lookup("ONBOARD_DEPLOYMENT_MODE") {
            builder = builder.deployment_mode(mode.parse().map_err(OtpError::Configuration)?);
        }
        if let Some(policy) = lookup("ONBOARD_EMAIL_DISPATCH") {
            builder = builder.email_dispatch(policy.parse().map_err(OtpError::Configuration)?);
        }
        if let Some(ttl) = lookup("ONBOARD_OTP_TTL_SECS") {
            builder = builder.ttl_secs(parse_number("ONBOARD_OTP_TTL_SECS", &ttl)?);
        }
        if let Some(max) = lookup("ONBOARD_OTP_MAX_ATTEMPTS") {
            builder = builder.max_attempts(parse_number("ONBOARD_OTP_MAX_ATTEMPTS", &max)?);
        }
        if let Some(code) = lookup("ONBOARD_DEFAULT_COUNTRY_CODE") {
            builder = builder.default_country_code(code.trim());
        }
        if let Some(name) = lookup("ONBOARD_PLATFORM_NAME") {
            builder = builder.platform_name(name);
        }
        if let Some(range) = lookup("ONBOARD_CODE_RANGE") {
            builder = builder.code_range(range.parse().map_err(OtpError::Configuration)?);
        }

        builder.build()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, OtpError> {
    value
        .trim()
        .parse()
        .map_err(|_| OtpError::Configuration(format!("{} is not a valid number: {:?}", key, value)))
}

/// Builder for OtpConfig with validation
///
/// The email dispatch policy follows the deployment mode unless set
/// explicitly.
#[derive(Default)]
pub struct OtpConfigBuilder {
    deployment_mode: Option<DeploymentMode>,
    email_dispatch: Option<EmailDispatchPolicy>,
    ttl_secs: Option<u64>,
    max_attempts: Option<u32>,
    default_country_code: Option<String>,
    platform_name: Option<String>,
    code_range: Option<CodeRange>,
}

impl OtpConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deployment_mode(mut self, mode: DeploymentMode) -> Self {
        self.deployment_mode = Some(mode);
        self
    }

    pub fn email_dispatch(mut self, policy: EmailDispatchPolicy) -> Self {
        self.email_dispatch = Some(policy);
        self
    }

    pub fn ttl_secs(mut self, secs: u64) -> Self {
        self.ttl_secs = Some(secs);
        self
    }

    pub fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    pub fn default_country_code(mut self, code: impl Into<String>) -> Self {
        self.default_country_code = Some(code.into());
        self
    }

    pub fn platform_name(mut self, name: impl Into<String>) -> Self {
        self.platform_name = Some(name.into());
        self
    }

    pub fn code_range(mut self, range: CodeRange) -> Self {
        self.code_range = Some(range);
        self
    }

    /// Build the OtpConfig, validating all parameters
    pub fn build(self) -> Result<OtpConfig, OtpError> {
        let defaults = OtpConfig::default();
        let deployment_mode = self.deployment_mode.unwrap_or(defaults.deployment_mode);

        let config = OtpConfig {
            deployment_mode,
            email_dispatch: self
                .email_dispatch
                .unwrap_or_else(|| deployment_mode.default_email_dispatch()),
            ttl_secs: self.ttl_secs.unwrap_or(defaults.ttl_secs),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            default_country_code: self
                .default_country_code
                .unwrap_or(defaults.default_country_code),
            platform_name: self.platform_name.unwrap_or(defaults.platform_name),
            code_range: self.code_range.unwrap_or(defaults.code_range),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = OtpConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ttl(), chrono::Duration::minutes(10));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.deployment_mode, DeploymentMode::Production);
    }

    #[test]
    fn test_development_config() {
        let config = OtpConfig::development();
        assert!(config.deployment_mode.echoes_codes());
        assert_eq!(config.email_dispatch, EmailDispatchPolicy::Permissive);
    }

    #[test]
    fn test_validation_rejects_zero_ttl() {
        let config = OtpConfig {
            ttl_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(OtpError::Configuration(_))));
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let config = OtpConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_country_code() {
        for code in ["1", "+", "+12a", "+1234"] {
            let config = OtpConfig {
                default_country_code: code.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted {:?}", code);
        }
    }

    #[test]
    fn test_builder_derives_dispatch_from_mode() {
        let config = OtpConfigBuilder::new()
            .deployment_mode(DeploymentMode::Development)
            .build()
            .unwrap();
        assert_eq!(config.email_dispatch, EmailDispatchPolicy::Permissive);

        let config = OtpConfigBuilder::new()
            .deployment_mode(DeploymentMode::Development)
            .email_dispatch(EmailDispatchPolicy::Strict)
            .build()
            .unwrap();
        assert_eq!(config.email_dispatch, EmailDispatchPolicy::Strict);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = OtpConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, OtpConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = OtpConfig::from_lookup(lookup_from(&[
            ("ONBOARD_DEPLOYMENT_MODE", "development"),
            ("ONBOARD_OTP_TTL_SECS", "300"),
            ("ONBOARD_OTP_MAX_ATTEMPTS", "3"),
            ("ONBOARD_DEFAULT_COUNTRY_CODE", "+44"),
            ("ONBOARD_PLATFORM_NAME", "Acme Invest"),
            ("ONBOARD_CODE_RANGE", "no_leading_zero"),
        ]))
        .unwrap();

        assert_eq!(config.deployment_mode, DeploymentMode::Development);
        assert_eq!(config.email_dispatch, EmailDispatchPolicy::Permissive);
        assert_eq!(config.ttl_secs, 300);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.default_country_code, "+44");
        assert_eq!(config.platform_name, "Acme Invest");
        assert_eq!(config.code_range, CodeRange::NoLeadingZero);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = OtpConfig::from_lookup(lookup_from(&[("ONBOARD_OTP_TTL_SECS", "ten")]));
        assert!(matches!(result, Err(OtpError::Configuration(_))));

        let result = OtpConfig::from_lookup(lookup_from(&[("ONBOARD_DEPLOYMENT_MODE", "qa")]));
        assert!(matches!(result, Err(OtpError::Configuration(_))));
    }
}
