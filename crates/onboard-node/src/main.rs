//! Onboard node entry point.
//!
//! stdout carries protocol responses only; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use onboard_node::{build_service, run_session, spawn_purge_task, NodeConfig, PrometheusMetrics};
use onboard_telemetry::{encode_metrics, init_telemetry, log_event};
use otp_verification::InMemoryOtpStore;
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env()?;
    init_telemetry(&config.telemetry).context("initializing telemetry")?;

    let store = Arc::new(InMemoryOtpStore::new());
    let service = build_service(&config.otp, store.clone(), Arc::new(PrometheusMetrics));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let purge = config
        .purge_interval
        .map(|interval| spawn_purge_task(store.clone(), interval, shutdown_rx));

    log_event!(
        info,
        "node",
        "Onboard node ready, reading requests from stdin",
        service = %config.telemetry.service_name,
        version = otp_verification::VERSION
    );

    tokio::select! {
        result = run_session(&service, BufReader::new(stdin()), stdout()) => {
            let stats = result?;
            log_event!(info, "node", "Input closed", handled = stats.handled, failed = stats.failed);
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl+C")?;
            log_event!(warn, "node", "Interrupted, shutting down");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(handle) = purge {
        handle.await.context("purge task panicked")?;
    }

    match encode_metrics() {
        Ok(text) => log_event!(info, "node", "Final metrics", records = store.len(), metrics = %text),
        Err(e) => log_event!(warn, "node", "Could not encode metrics", error = %e),
    }
    Ok(())
}
