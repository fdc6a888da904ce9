//! # Domain Module
//!
//! Core domain types for OTP issuance and verification.

pub mod config;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;
pub mod wire;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
pub use wire::*;
