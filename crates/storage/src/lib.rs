//! Record persistence contract for the pass validation service.
//!
//! This crate provides the [`RecordStore`](records::RecordStore) trait and
//! the types that flow through it. The record service depends only on this
//! contract; concrete backends live behind it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Service Layer                            │
//! │        (login, record creation, record confirmation)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    pases-storage                            │
//! │              RecordStore trait                              │
//! │              (insert, find_by_id)                           │
//! ├──────────────────────┬──────────────────────────────────────┤
//! │  MemoryRecordStore   │        SQL-backed store              │
//! │      (testing)       │   (provided by the host service)     │
//! └──────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use pases_storage::records::{MemoryRecordStore, RecordStore};
//! use pases_storage::{RecordId, StorageError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryRecordStore::new();
//!     let id = RecordId::new(1).expect("positive id");
//!
//!     // Nothing has been inserted yet
//!     let result = store.find_by_id(id).await;
//!     assert!(matches!(result, Err(StorageError::NotFound { .. })));
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`]. Backends map uniqueness
//! violations to [`StorageError::Conflict`] and missing records to
//! [`StorageError::NotFound`].
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with fixtures, a
//!   fault-injecting store and assertion macros.

#![deny(unsafe_code)]

pub mod error;
pub mod records;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod types;

pub use error::{BoxError, StorageError, StorageResult};
pub use types::RecordId;
