//! Notification Channel Adapters
//!
//! Implements `EmailChannel` and `SmsChannel` for local development
//! (tracing-only senders) and for tests (recording senders with failure
//! injection). Real providers live outside this crate.

use crate::domain::{Destination, DispatchError};
use crate::ports::outbound::{EmailChannel, MessageId, SmsChannel};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::info;

/// Email that went through a [`RecordingEmailChannel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// SMS that went through a [`RecordingSmsChannel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
    pub message_id: MessageId,
}

/// Email channel that keeps every message in memory.
#[derive(Default)]
pub struct RecordingEmailChannel {
    sent: Mutex<Vec<SentEmail>>,
    fail: AtomicBool,
}

impl RecordingEmailChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel whose sends fail until told otherwise.
    pub fn failing() -> Self {
        let channel = Self::default();
        channel.set_failing(true);
        channel
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().clone()
    }

    /// Most recent message accepted.
    pub fn last(&self) -> Option<SentEmail> {
        self.sent.lock().last().cloned()
    }
}

#[async_trait]
impl EmailChannel for RecordingEmailChannel {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), DispatchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::Unavailable("mock email failure".to_string()));
        }
        self.sent.lock().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// SMS channel that keeps every message in memory.
#[derive(Default)]
pub struct RecordingSmsChannel {
    sent: Mutex<Vec<SentSms>>,
    fail: AtomicBool,
    next_id: AtomicU64,
}

impl RecordingSmsChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel whose sends fail until told otherwise.
    pub fn failing() -> Self {
        let channel = Self::default();
        channel.set_failing(true);
        channel
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().clone()
    }

    pub fn last(&self) -> Option<SentSms> {
        self.sent.lock().last().cloned()
    }
}

#[async_trait]
impl SmsChannel for RecordingSmsChannel {
    async fn send(&self, to_e164: &str, body: &str) -> Result<MessageId, DispatchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::Unavailable("mock sms failure".to_string()));
        }
        let message_id = format!("SM{:08}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().push(SentSms {
            to: to_e164.to_string(),
            body: body.to_string(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }
}

/// Email channel that only logs the masked recipient.
///
/// The message body carries the code and is never logged.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogEmailChannel;

#[async_trait]
impl EmailChannel for LogEmailChannel {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), DispatchError> {
        let masked = Destination::Email(to.to_string()).masked();
        info!(to = %masked, subject, "[otp] Email dispatched to log channel");
        Ok(())
    }
}

/// SMS channel that only logs the masked recipient.
#[derive(Debug, Default)]
pub struct LogSmsChannel {
    next_id: AtomicU64,
}

impl LogSmsChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SmsChannel for LogSmsChannel {
    async fn send(&self, to_e164: &str, _body: &str) -> Result<MessageId, DispatchError> {
        let message_id = format!("LOG{:08}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let masked = Destination::Phone(to_e164.to_string()).masked();
        info!(to = %masked, %message_id, "[otp] SMS dispatched to log channel");
        Ok(message_id)
    }
}
