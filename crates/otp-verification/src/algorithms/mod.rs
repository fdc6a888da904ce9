//! # Algorithms Module
//!
//! Pure functions: code generation, destination normalization, message
//! rendering. No I/O.

pub mod code;
pub mod message;
pub mod normalize;

pub use code::{generate_code, generate_code_with};
pub use message::{render_email, render_sms, EmailMessage};
pub use normalize::{normalize_destination, normalize_phone, validate_email};
