//! # Pass Validation Records
//!
//! Turns raw record-creation requests into persisted, policy-compliant
//! records and confirms them later from compact QR tokens.
//!
//! This crate provides:
//! - **Request parsing**: [`CreateRecordRequest`], the JSON wire shape, with
//!   length, format and date-contract checks
//! - **Normalization**: [`normalize`], a pure function applying the
//!   branch rules and deriving computed fields
//! - **Service**: [`RecordService`], which persists through a
//!   [`RecordStore`](pases_storage::records::RecordStore) under a timeout or
//!   cancellation token and confirms QR tokens
//!
//! ## Flow
//!
//! ```text
//! CreateRecordRequest ──into_input──► CreateRecordInput ──normalize──► NewRecord
//!                                                                         │
//!                                                                   store.insert
//!                                                                         ▼
//!   QR token ◄──mint_qr_token── Record ◄──────────────────────────── RecordId
//!      │
//!   confirm ──verify──► RecordId ──find_by_id──► Record
//! ```
//!
//! Every failure is a [`RecordError`]; [`RecordError::outcome`] gives the
//! fixed public description for each kind.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Record error types.
pub mod error;
/// Untrusted creation input.
pub mod input;
/// Validation and normalization rules.
pub mod normalize;
/// Service policy.
pub mod policy;
/// JSON request shape.
pub mod request;
/// Record creation and confirmation service.
pub mod service;
/// Terminal title lookup.
pub mod terminal;
/// Shared test utilities.
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;

pub use error::{RecordError, Result};
pub use input::CreateRecordInput;
pub use normalize::normalize;
pub use policy::{DEFAULT_STORE_TIMEOUT, DateContract, RecordPolicy};
pub use request::{CreateRecordRequest, MAX_FREE_DAYS};
pub use service::RecordService;
pub use terminal::terminal_title;
