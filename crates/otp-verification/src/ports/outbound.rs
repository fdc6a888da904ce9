//! # Outbound Ports
//!
//! Traits for external dependencies: the record store, the two
//! notification channels, the clock, and the code source.

use crate::domain::{
    CodeRange, DispatchError, OtpFilter, OtpPatch, OtpRecord, QueryOrder, StoreError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Provider-assigned identifier of a sent SMS.
pub type MessageId = String;

/// OTP record store - outbound port.
///
/// Each method must be atomic on its own. Nothing here spans calls except
/// [`OtpStore::replace_pending`], which backends should override when they
/// can run it as one transaction.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Insert a new record.
    async fn insert(&self, record: OtpRecord) -> Result<OtpRecord, StoreError>;

    /// Apply `patch` to every record matching `filter`. Returns the count updated.
    async fn update_where(&self, filter: &OtpFilter, patch: OtpPatch) -> Result<u64, StoreError>;

    /// First record matching `filter` under `order` (limit 1).
    async fn query_one(
        &self,
        filter: &OtpFilter,
        order: QueryOrder,
    ) -> Result<Option<OtpRecord>, StoreError>;

    /// Retire every pending record for the destination, then insert `record`.
    ///
    /// Returns how many predecessors were retired. The default runs the two
    /// steps back to back and is racy under concurrent issuance for the same
    /// destination.
    async fn replace_pending(&self, record: OtpRecord) -> Result<u64, StoreError> {
        let filter = OtpFilter::for_destination(&record.destination).unverified();
        let retired = self.update_where(&filter, OtpPatch::MarkVerified).await?;
        self.insert(record).await?;
        Ok(retired)
    }
}

/// Email sender - outbound port.
#[async_trait]
pub trait EmailChannel: Send + Sync {
    /// Send an HTML email.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), DispatchError>;
}

/// SMS sender - outbound port.
#[async_trait]
pub trait SmsChannel: Send + Sync {
    /// Send a text message to an E.164 number.
    async fn send(&self, to_e164: &str, body: &str) -> Result<MessageId, DispatchError>;
}

/// Time source - outbound port.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh codes - outbound port.
pub trait CodeSource: Send + Sync {
    /// A six-digit code inside `range`.
    fn next_code(&self, range: CodeRange) -> String;
}
