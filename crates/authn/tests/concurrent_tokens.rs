//! Concurrent token tests.
//!
//! Issuers, validators and QR verifiers are shared across tasks with no
//! locking of their own. These tests drive them from many tasks at once and
//! check that every result matches what a single caller would see.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::{sync::Arc, time::Duration};

use pases_authn::{
    AuthError, BearerIssuer, BearerValidator, QrTokenError, QrVerifier,
    testutil::{ManualClock, test_config},
};
use pases_storage::RecordId;
use tokio::task::JoinSet;

/// Number of concurrent tasks for each test.
const CONCURRENCY: usize = 16;

/// Number of operations each task performs.
const OPS_PER_TASK: usize = 40;

const QR_TTL: Duration = Duration::from_secs(900);

// ---------------------------------------------------------------------------
// Test: Bearer tokens issued in parallel all validate to their own subject
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_issue_and_parse_keep_subjects_apart() {
    let clock = ManualClock::default();
    let config = test_config();
    let issuer = Arc::new(BearerIssuer::new(&config, clock.shared()).expect("issuer"));
    let validator = Arc::new(BearerValidator::new(&config, clock.shared()).expect("validator"));

    let mut set = JoinSet::new();
    for task_id in 0..CONCURRENCY {
        let issuer = Arc::clone(&issuer);
        let validator = Arc::clone(&validator);
        set.spawn(async move {
            for i in 0..OPS_PER_TASK {
                let subject = format!("user-{task_id}-{i}");
                let issued = issuer.issue(&subject).expect("issue");
                let claims = validator.parse(&issued.access_token).expect("parse");
                assert_eq!(claims.sub, subject);
                tokio::task::yield_now().await;
            }
        });
    }

    while let Some(joined) = set.join_next().await {
        joined.expect("task panicked");
    }
}

// ---------------------------------------------------------------------------
// Test: QR tokens minted in parallel verify to the identifier they carry
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_qr_mint_and_verify_round_trip() {
    let clock = ManualClock::default();
    let verifier = QrVerifier::from_config(&test_config(), clock.shared());
    assert!(verifier.is_available());

    let mut set = JoinSet::new();
    for task_id in 0..CONCURRENCY {
        let verifier = verifier.clone();
        set.spawn(async move {
            for i in 0..OPS_PER_TASK {
                let raw = i64::try_from(task_id * OPS_PER_TASK + i + 1).unwrap();
                let id = RecordId::new(raw).unwrap();
                let token = verifier.mint(id, QR_TTL).expect("mint");
                assert_eq!(verifier.verify(&token).expect("verify"), id);
                tokio::task::yield_now().await;
            }
        });
    }

    while let Some(joined) = set.join_next().await {
        joined.expect("task panicked");
    }
}

// ---------------------------------------------------------------------------
// Test: A clock change is seen by every concurrent verifier
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn expiry_is_consistent_across_tasks() {
    let clock = ManualClock::default();
    let config = test_config();
    let issuer = BearerIssuer::new(&config, clock.shared()).expect("issuer");
    let validator = Arc::new(BearerValidator::new(&config, clock.shared()).expect("validator"));
    let verifier = QrVerifier::from_config(&config, clock.shared());

    let bearer = Arc::new(issuer.issue("tester").expect("issue").access_token);
    let qr = Arc::new(verifier.mint(RecordId::new(7).unwrap(), QR_TTL).expect("mint"));

    // Past both the bearer lifetime plus skew and the QR lifetime.
    clock.advance(chrono::TimeDelta::hours(2));

    let mut set = JoinSet::new();
    for _ in 0..CONCURRENCY {
        let validator = Arc::clone(&validator);
        let verifier = verifier.clone();
        let bearer = Arc::clone(&bearer);
        let qr = Arc::clone(&qr);
        set.spawn(async move {
            let bearer_result = validator.parse(&bearer);
            assert!(
                matches!(bearer_result, Err(AuthError::TokenExpired)),
                "expected TokenExpired, got {bearer_result:?}"
            );
            let qr_result = verifier.verify(&qr);
            assert!(
                matches!(qr_result, Err(QrTokenError::Expired)),
                "expected Expired, got {qr_result:?}"
            );
        });
    }

    while let Some(joined) = set.join_next().await {
        joined.expect("task panicked");
    }
}
