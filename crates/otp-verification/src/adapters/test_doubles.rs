//! Store Wrappers for Testing
//!
//! `SpyStore` counts calls; `FaultyStore` fails selected operations.
//! Both wrap any other `OtpStore`.

use crate::domain::{OtpFilter, OtpPatch, OtpRecord, QueryOrder, StoreError};
use crate::ports::outbound::OtpStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Call counts observed by a [`SpyStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub insert: u64,
    pub update_where: u64,
    pub query_one: u64,
    pub replace_pending: u64,
}

impl StoreCalls {
    /// Total calls of any kind.
    pub fn total(&self) -> u64 {
        self.insert + self.update_where + self.query_one + self.replace_pending
    }
}

/// Store that counts every call before forwarding it.
pub struct SpyStore<S: OtpStore> {
    inner: Arc<S>,
    insert: AtomicU64,
    update_where: AtomicU64,
    query_one: AtomicU64,
    replace_pending: AtomicU64,
}

impl<S: OtpStore> SpyStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            insert: AtomicU64::new(0),
            update_where: AtomicU64::new(0),
            query_one: AtomicU64::new(0),
            replace_pending: AtomicU64::new(0),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    /// Calls observed so far.
    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            insert: self.insert.load(Ordering::SeqCst),
            update_where: self.update_where.load(Ordering::SeqCst),
            query_one: self.query_one.load(Ordering::SeqCst),
            replace_pending: self.replace_pending.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl<S: OtpStore> OtpStore for SpyStore<S> {
    async fn insert(&self, record: OtpRecord) -> Result<OtpRecord, StoreError> {
        self.insert.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(record).await
    }

    async fn update_where(&self, filter: &OtpFilter, patch: OtpPatch) -> Result<u64, StoreError> {
        self.update_where.fetch_add(1, Ordering::SeqCst);
        self.inner.update_where(filter, patch).await
    }

    async fn query_one(
        &self,
        filter: &OtpFilter,
        order: QueryOrder,
    ) -> Result<Option<OtpRecord>, StoreError> {
        self.query_one.fetch_add(1, Ordering::SeqCst);
        self.inner.query_one(filter, order).await
    }

    async fn replace_pending(&self, record: OtpRecord) -> Result<u64, StoreError> {
        self.replace_pending.fetch_add(1, Ordering::SeqCst);
        self.inner.replace_pending(record).await
    }
}

/// Store that fails the operations it is told to fail.
///
/// `replace_pending` is not overridden, so it runs through the faulty
/// `update_where` and `insert` below.
pub struct FaultyStore<S: OtpStore> {
    inner: Arc<S>,
    fail_insert: AtomicBool,
    fail_mark_verified: AtomicBool,
    fail_increment: AtomicBool,
    fail_query: AtomicBool,
    fail_attempt_lookup: AtomicBool,
}

impl<S: OtpStore> FaultyStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            fail_insert: AtomicBool::new(false),
            fail_mark_verified: AtomicBool::new(false),
            fail_increment: AtomicBool::new(false),
            fail_query: AtomicBool::new(false),
            fail_attempt_lookup: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    pub fn fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    /// Fail `update_where` with `MarkVerified` (invalidation and verification).
    pub fn fail_mark_verified(&self, fail: bool) {
        self.fail_mark_verified.store(fail, Ordering::SeqCst);
    }

    /// Fail `update_where` with `IncrementAttempts`.
    pub fn fail_increment(&self, fail: bool) {
        self.fail_increment.store(fail, Ordering::SeqCst);
    }

    pub fn fail_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    /// Fail only `query_one` calls whose filter carries no code, so a code
    /// match still succeeds while the pending-record lookup does not.
    pub fn fail_attempt_lookup(&self, fail: bool) {
        self.fail_attempt_lookup.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: OtpStore> OtpStore for FaultyStore<S> {
    async fn insert(&self, record: OtpRecord) -> Result<OtpRecord, StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected insert failure".to_string()));
        }
        self.inner.insert(record).await
    }

    async fn update_where(&self, filter: &OtpFilter, patch: OtpPatch) -> Result<u64, StoreError> {
        let fail = match patch {
            OtpPatch::MarkVerified => self.fail_mark_verified.load(Ordering::SeqCst),
            OtpPatch::IncrementAttempts => self.fail_increment.load(Ordering::SeqCst),
        };
        if fail {
            return Err(StoreError::Unavailable(format!(
                "injected {:?} failure",
                patch
            )));
        }
        self.inner.update_where(filter, patch).await
    }

    async fn query_one(
        &self,
        filter: &OtpFilter,
        order: QueryOrder,
    ) -> Result<Option<OtpRecord>, StoreError> {
        let fail = self.fail_query.load(Ordering::SeqCst)
            || (filter.code.is_none() && self.fail_attempt_lookup.load(Ordering::SeqCst));
        if fail {
            return Err(StoreError::Unavailable("injected query failure".to_string()));
        }
        self.inner.query_one(filter, order).await
    }
}
