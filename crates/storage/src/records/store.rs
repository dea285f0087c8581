//! Storage trait for record persistence.
//!
//! This module provides the [`RecordStore`] trait that abstracts persistence
//! of normalized records. Implementations can use different backends (SQL for
//! production, in-memory for testing).
//!
//! # Usage
//!
//! ```no_run
//! // Demonstrates the trait interface; requires a concrete store implementation.
//! use pases_storage::records::{NewRecord, RecordStore};
//! use pases_storage::{RecordId, StorageError};
//!
//! async fn persist<S: RecordStore>(store: &S, record: &NewRecord) -> Result<RecordId, StorageError> {
//!     store.insert(record).await
//! }
//! ```

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    error::{StorageError, StorageResult},
    records::{NewRecord, Record},
    types::RecordId,
};

/// Name of the uniqueness constraint enforced by [`MemoryRecordStore`].
pub const BOOKING_CONTAINER_CONSTRAINT: &str = "records_booking_container";

/// Persistence layer for records.
///
/// Records are insert-only: there is no update or delete operation. Each
/// insert is a single atomic store operation, so a cancelled or failed insert
/// never leaves a partial record behind.
///
/// # Error Handling
///
/// - A uniqueness violation must surface as [`StorageError::Conflict`] so the
///   caller can distinguish it from other failures.
/// - A missing record must surface as [`StorageError::NotFound`].
///
/// Implementations do not retry internally; retry policy for transient
/// failures (see [`StorageError::is_transient`]) belongs to the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists a new record and returns its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A uniqueness constraint is violated ([`StorageError::Conflict`])
    /// - The storage backend is unavailable
    async fn insert(&self, record: &NewRecord) -> StorageResult<RecordId>;

    /// Retrieves a record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no record has this identifier.
    async fn find_by_id(&self, id: RecordId) -> StorageResult<Record>;
}

#[derive(Debug)]
struct Inner {
    next_id: i64,
    records: HashMap<RecordId, Record>,
    booking_container: HashSet<(String, String)>,
}

impl Default for Inner {
    fn default() -> Self {
        Self { next_id: 1, records: HashMap::new(), booking_container: HashSet::new() }
    }
}

/// In-memory implementation of [`RecordStore`] for testing and development.
///
/// Identifiers are assigned sequentially starting at 1. The pair
/// `(booking, container)` is unique across all records.
///
/// # Cloning
///
/// Clones share the same underlying data.
///
/// # Examples
///
/// ```
/// use pases_storage::records::{MemoryRecordStore, RecordStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRecordStore::new();
///     assert!(store.is_empty());
///     Ok(())
/// }
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRecordStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Returns `true` if no record has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    #[tracing::instrument(skip(self, record), fields(booking = %record.booking))]
    async fn insert(&self, record: &NewRecord) -> StorageResult<RecordId> {
        let mut inner = self.inner.write();

        let unique_key = (record.booking.clone(), record.container.clone());
        if inner.booking_container.contains(&unique_key) {
            return Err(StorageError::conflict(BOOKING_CONTAINER_CONSTRAINT));
        }

        let id = RecordId::new(inner.next_id)
            .ok_or_else(|| StorageError::internal("record identifier space exhausted"))?;
        inner.next_id = inner.next_id.saturating_add(1);
        inner.booking_container.insert(unique_key);
        inner.records.insert(id, record.clone().into_record(id));

        tracing::debug!(record_id = %id, "record inserted");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: RecordId) -> StorageResult<Record> {
        self.inner
            .read()
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(id.to_string()))
    }
}
