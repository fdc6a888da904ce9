//! # Onboard Test Suite
//!
//! Unified test crate for flows that cross module boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # Issue/verify lifecycles through the public API
//!     ├── concurrency.rs  # Racing issuers and verifiers on one store
//!     └── wire.rs         # JSON-lines driver end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p onboard-tests
//!
//! # Benchmarks
//! cargo bench -p onboard-tests
//! ```

pub mod integration;
