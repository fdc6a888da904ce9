//! # JSON-Lines Driver
//!
//! One request object per input line, one response object per output line.
//!
//! ```text
//! {"op":"issue","destinationKind":"EMAIL","destination":"a@b.com"}
//! {"op":"verify","destinationKind":"EMAIL","destination":"a@b.com","code":"042137"}
//! ```

use anyhow::{Context, Result};
use onboard_telemetry::{log_event, RequestTimer};
use otp_verification::{
    ErrorResponse, IssueRequest, OtpError, OtpService, OtpStore, VerifyRequest,
};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// A request line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Command {
    Issue(IssueRequest),
    Verify(VerifyRequest),
}

/// Per-session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub handled: u64,
    pub failed: u64,
}

/// Handle one request line; returns the response line and whether it succeeded.
pub async fn handle_line<S: OtpStore>(service: &OtpService<S>, line: &str) -> Result<(String, bool)> {
    let command = match serde_json::from_str::<Command>(line) {
        Ok(command) => command,
        Err(e) => {
            log_event!(warn, "driver", "Rejected malformed request line", error = %e);
            let err = OtpError::validation(format!("malformed request: {}", e));
            let body = serde_json::to_string(&ErrorResponse::from(&err))?;
            return Ok((body, false));
        }
    };

    match command {
        Command::Issue(request) => {
            let _timer = RequestTimer::start("issue");
            let response = service.handle_issue(&request).await;
            Ok((serde_json::to_string(&response)?, response.is_ok()))
        }
        Command::Verify(request) => {
            let _timer = RequestTimer::start("verify");
            let response = service.handle_verify(&request).await;
            Ok((serde_json::to_string(&response)?, response.is_ok()))
        }
    }
}

/// Serve requests from `reader` until end of input.
pub async fn run_session<S, R, W>(
    service: &OtpService<S>,
    reader: R,
    mut writer: W,
) -> Result<SessionStats>
where
    S: OtpStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = SessionStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("reading request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (response, ok) = handle_line(service, line).await?;
        stats.handled += 1;
        if !ok {
            stats.failed += 1;
        }

        writer
            .write_all(response.as_bytes())
            .await
            .context("writing response")?;
        writer.write_all(b"\n").await.context("writing response")?;
        writer.flush().await.context("flushing response")?;
    }

    log_event!(
        debug,
        "driver",
        "Session ended",
        handled = stats.handled,
        failed = stats.failed
    );
    Ok(stats)
}
