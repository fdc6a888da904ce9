//! In-Memory OTP Store Adapter
//!
//! Implements `OtpStore` over a locked vector. Used by the node in
//! development and by every test in the workspace.

use crate::domain::{OtpFilter, OtpPatch, OtpRecord, QueryOrder, StoreError};
use crate::ports::outbound::OtpStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

/// In-memory OTP store.
///
/// `replace_pending` runs under a single write lock, so concurrent issuance
/// for one destination can never leave two pending records behind.
#[derive(Default)]
pub struct InMemoryOtpStore {
    /// Records in insertion order.
    records: RwLock<Vec<OtpRecord>>,
}

impl InMemoryOtpStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record, in insertion order.
    pub fn records(&self) -> Vec<OtpRecord> {
        self.records.read().clone()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Drop records that are verified or expired at `now`. Returns how many went.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.is_live(now));
        let purged = before - records.len();
        debug!("[otp] Purged {} retired records", purged);
        purged
    }

    fn apply_locked(records: &mut [OtpRecord], filter: &OtpFilter, patch: OtpPatch) -> u64 {
        let mut updated = 0;
        for record in records.iter_mut().filter(|r| filter.matches(r)) {
            if record.apply(patch) {
                updated += 1;
            }
        }
        updated
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn insert(&self, record: OtpRecord) -> Result<OtpRecord, StoreError> {
        let mut records = self.records.write();
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Conflict(format!("duplicate record id {}", record.id)));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn update_where(&self, filter: &OtpFilter, patch: OtpPatch) -> Result<u64, StoreError> {
        let mut records = self.records.write();
        Ok(Self::apply_locked(&mut records, filter, patch))
    }

    async fn query_one(
        &self,
        filter: &OtpFilter,
        order: QueryOrder,
    ) -> Result<Option<OtpRecord>, StoreError> {
        let records = self.records.read();
        // Insertion index breaks ties between records issued in the same instant.
        let candidates = records
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(r));
        let found = match order {
            QueryOrder::NewestFirst => candidates.max_by_key(|(i, r)| (r.issued_at, *i)),
        };
        Ok(found.map(|(_, r)| r.clone()))
    }

    async fn replace_pending(&self, record: OtpRecord) -> Result<u64, StoreError> {
        let mut records = self.records.write();
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Conflict(format!("duplicate record id {}", record.id)));
        }
        let filter = OtpFilter::for_destination(&record.destination).unverified();
        let retired = Self::apply_locked(&mut records, &filter, OtpPatch::MarkVerified);
        records.push(record);
        Ok(retired)
    }
}
