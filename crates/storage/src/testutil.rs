//! Shared test utilities for record store testing.
//!
//! This module provides fixtures, a fault-injecting store, and assertion
//! macros for [`StorageResult`] values. It is feature-gated behind `testutil`
//! to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! pases-storage = { path = "../storage", features = ["testutil"] }
//! ```
//!
//! Then import helpers:
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use pases_storage::testutil::{FailingRecordStore, sample_new_record};
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;

use crate::{
    error::{StorageError, StorageResult},
    records::{Branch, MemoryRecordStore, NewRecord, Record, RecordStore},
    types::RecordId,
};

/// Creates an international [`NewRecord`] with the given booking reference.
///
/// All other fields are fixed so two calls with the same booking collide on
/// the `(booking, container)` uniqueness constraint.
#[must_use]
pub fn sample_new_record(booking: &str) -> NewRecord {
    let at = Utc.with_ymd_and_hms(2026, 2, 9, 12, 0, 0).single().unwrap_or_else(Utc::now);
    NewRecord {
        emitted_at: at,
        vessel: "NAVE 1".into(),
        voyage: "VJ1".into(),
        client: "CLIENTE 1".into(),
        booking: booking.into(),
        branch: Branch::Internacional,
        container: "ABCU1234567".into(),
        discharge_port: "Balboa".into(),
        retention_free_until: NaiveDate::from_ymd_opt(2026, 2, 12).unwrap_or_default(),
        free_days: 3,
        carrier: None,
        terminal_title: "TERMINAL PACIFICO - BALBOA".into(),
        signing_user: "tester".into(),
        created_at: at,
    }
}

/// Factory for the error a [`FailingRecordStore`] should return.
pub type ErrorFactory = Arc<dyn Fn() -> StorageError + Send + Sync>;

/// Record store wrapper that injects failures and latency.
///
/// Wraps a [`MemoryRecordStore`]. When an insert error is configured, every
/// insert fails with a fresh error from the factory and nothing is stored.
/// A configured delay is applied before every operation, which makes the
/// store useful for exercising cancellation and timeouts.
#[derive(Clone, Default)]
pub struct FailingRecordStore {
    inner: MemoryRecordStore,
    insert_error: Arc<Mutex<Option<ErrorFactory>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    insert_calls: Arc<AtomicUsize>,
}

impl FailingRecordStore {
    /// Creates a store that behaves like an empty [`MemoryRecordStore`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert fail with the error produced by `factory`.
    pub fn fail_inserts_with(&self, factory: impl Fn() -> StorageError + Send + Sync + 'static) {
        *self.insert_error.lock() = Some(Arc::new(factory));
    }

    /// Delays every subsequent operation by `delay`.
    pub fn delay_operations(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Returns how many times `insert` has been called.
    #[must_use]
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Returns the wrapped in-memory store.
    #[must_use]
    pub fn inner(&self) -> &MemoryRecordStore {
        &self.inner
    }

    async fn apply_delay(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn insert(&self, record: &NewRecord) -> StorageResult<RecordId> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;
        let factory = self.insert_error.lock().clone();
        if let Some(factory) = factory {
            return Err(factory());
        }
        self.inner.insert(record).await
    }

    async fn find_by_id(&self, id: RecordId) -> StorageResult<Record> {
        self.apply_delay().await;
        self.inner.find_by_id(id).await
    }
}

/// Assert that a [`StorageResult`] is a [`StorageError::Conflict`].
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use pases_storage::assert_conflict;
/// use pases_storage::error::{StorageError, StorageResult};
///
/// let result: StorageResult<()> = Err(StorageError::conflict("unique"));
/// assert_conflict!(result);
/// ```
#[macro_export]
macro_rules! assert_conflict {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::Conflict { .. })),
            "expected StorageError::Conflict, got: {:?}",
            $result,
        );
    };
    ($result:expr, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::Conflict { .. })),
            "{}: expected StorageError::Conflict, got: {:?}",
            $msg,
            $result,
        );
    };
}

/// Assert that a [`StorageResult`] is a [`StorageError::NotFound`].
#[macro_export]
macro_rules! assert_not_found {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::NotFound { .. })),
            "expected StorageError::NotFound, got: {:?}",
            $result,
        );
    };
    ($result:expr, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::NotFound { .. })),
            "{}: expected StorageError::NotFound, got: {:?}",
            $msg,
            $result,
        );
    };
}

/// Assert that a [`StorageResult`] is `Ok`, returning the inner value.
#[macro_export]
macro_rules! assert_storage_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got StorageError: {e:?}"),
        }
    };
}
