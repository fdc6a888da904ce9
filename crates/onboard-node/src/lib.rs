//! # Onboard Node
//!
//! Hosts the OTP verification service behind a JSON-lines interface.
//!
//! ## Modular Structure
//!
//! - `wiring` - Configuration loading, service construction, purge task
//! - `driver` - JSON-lines request loop
//! - `prometheus_metrics` - `MetricsRecorder` over the Prometheus registry
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize logging and metrics
//! 3. Build the service over the in-memory store
//! 4. Start the purge task
//! 5. Serve stdin until end of input or Ctrl+C

pub mod driver;
pub mod prometheus_metrics;
pub mod wiring;

pub use driver::{handle_line, run_session, Command, SessionStats};
pub use prometheus_metrics::PrometheusMetrics;
pub use wiring::{build_service, spawn_purge_task, NodeConfig, DEFAULT_PURGE_INTERVAL_SECS};
