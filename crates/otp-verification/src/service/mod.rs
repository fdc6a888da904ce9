//! # Service Layer
//!
//! Application service implementing the inbound `OtpApi` port.

mod otp_service;

pub use otp_service::OtpService;
