//! Cross-module integration tests.

pub mod concurrency;
pub mod flows;
pub mod wire;
