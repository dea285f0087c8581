//! Record types and the persistence contract consumed by the record service.
//!
//! # Lifecycle
//!
//! ```text
//! ┌─────────────┐  insert   ┌─────────────┐  find_by_id  ┌─────────────┐
//! │  NewRecord  │──────────►│   Record    │─────────────►│  read-only  │
//! │ (no id yet) │           │ (id = n)    │              │ confirmation│
//! └─────────────┘           └─────────────┘              └─────────────┘
//! ```
//!
//! Records are never updated or deleted after insertion.

mod record;
mod store;

pub use record::{Branch, NewRecord, Record, UnknownBranch};
pub use store::{BOOKING_CONTAINER_CONSTRAINT, MemoryRecordStore, RecordStore};
