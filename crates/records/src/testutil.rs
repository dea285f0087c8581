//! Shared test utilities for record service testing.
//!
//! This module provides input fixtures, a service constructor wired to a
//! manual clock, and an assertion macro for
//! [`RecordError`](crate::error::RecordError) variants. It is feature-gated
//! behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use pases_records::testutil::{sample_input, test_service};
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use pases_authn::{
    QrVerifier,
    testutil::{ManualClock, test_config},
};
use pases_storage::records::RecordStore;

use crate::{input::CreateRecordInput, policy::RecordPolicy, service::RecordService};

/// An international input: serial `ABCU1234567`, real date 2026-02-09,
/// three free days, discharged at Balboa.
#[must_use]
pub fn sample_input() -> CreateRecordInput {
    CreateRecordInput {
        vessel: "NAVE 1".into(),
        voyage: "VJ1".into(),
        client: "CLIENTE 1".into(),
        booking: "BK1".into(),
        branch: "internacional".into(),
        container_serial: "ABCU1234567".into(),
        iso_code: String::new(),
        real_date: NaiveDate::from_ymd_opt(2026, 2, 9).unwrap_or_default(),
        free_days: Some(3),
        carrier: String::new(),
        discharge_port: "Balboa".into(),
    }
}

/// A domestic input: ISO code `22G1`, carrier `TRANSPORTE SA`.
#[must_use]
pub fn sample_nacional_input() -> CreateRecordInput {
    CreateRecordInput {
        branch: "nacional".into(),
        container_serial: String::new(),
        iso_code: "22G1".into(),
        carrier: "TRANSPORTE SA".into(),
        ..sample_input()
    }
}

/// Builds a service over `store` with the test QR secret, `clock` and the
/// default policy.
#[must_use]
pub fn test_service(store: Arc<dyn RecordStore>, clock: &ManualClock) -> RecordService {
    let config = test_config();
    RecordService::builder()
        .store(store)
        .qr(QrVerifier::from_config(&config, clock.shared()))
        .clock(clock.shared())
        .policy(RecordPolicy::default())
        .qr_token_ttl(config.qr_token_ttl())
        .build()
}

/// Assert that a result is an `Err` with the given
/// [`RecordError`](crate::error::RecordError) variant.
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use pases_records::{RecordError, assert_record_error};
///
/// let result: Result<(), RecordError> = Err(RecordError::Cancelled);
/// assert_record_error!(result, Cancelled);
/// ```
#[macro_export]
macro_rules! assert_record_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::error::RecordError::$variant { .. })),
            "expected RecordError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
    ($result:expr, $variant:ident, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::RecordError::$variant { .. })),
            "{}: expected RecordError::{}, got: {:?}",
            $msg,
            stringify!($variant),
            $result,
        );
    };
}
