//! Record creation and confirmation.
//!
//! [`RecordService`] ties the normalization rules to a [`RecordStore`] and a
//! [`QrVerifier`]. The store call is the only suspension point: it is bounded
//! by [`RecordPolicy::store_timeout`] and, through
//! [`RecordService::create_with_cancellation`], by a caller-held
//! [`CancellationToken`]. Nothing is retried here.

use std::{future::Future, sync::Arc, time::Duration};

use pases_authn::{AuthConfig, QrVerifier, SharedClock, config::DEFAULT_QR_TOKEN_TTL};
use pases_storage::{
    RecordId, StorageError, StorageResult,
    records::{Record, RecordStore},
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{RecordError, Result},
    input::CreateRecordInput,
    normalize::normalize,
    policy::RecordPolicy,
};

/// Creates records and confirms them from QR tokens.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use pases_authn::{AuthConfig, QrVerifier, SystemClock};
/// use pases_records::{CreateRecordInput, RecordService};
/// use pases_storage::records::MemoryRecordStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AuthConfig::builder().qr_secret("qr-secret").build()?;
///     let clock = SystemClock::shared();
///     let service = RecordService::builder()
///         .store(Arc::new(MemoryRecordStore::new()))
///         .qr(QrVerifier::from_config(&config, clock.clone()))
///         .clock(clock)
///         .build();
///
///     let input = CreateRecordInput {
///         vessel: "NAVE 1".into(),
///         voyage: "VJ1".into(),
///         client: "CLIENTE 1".into(),
///         booking: "BK1".into(),
///         branch: "internacional".into(),
///         container_serial: "ABCU1234567".into(),
///         real_date: NaiveDate::from_ymd_opt(2026, 2, 9).ok_or("bad date")?,
///         free_days: Some(3),
///         discharge_port: "Balboa".into(),
///         ..Default::default()
///     };
///
///     let record = service.create(&input, "ops").await?;
///     let token = service.mint_qr_token(record.id)?;
///     assert_eq!(service.confirm(&token).await?.id, record.id);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    qr: QrVerifier,
    clock: SharedClock,
    policy: RecordPolicy,
    qr_token_ttl: Duration,
}

#[bon::bon]
impl RecordService {
    /// Creates a new service.
    ///
    /// # Optional Fields
    ///
    /// * `policy` - Date contract and store timeout (default:
    ///   [`RecordPolicy::default`]).
    /// * `qr_token_ttl` - Lifetime of minted QR tokens (default: 15 minutes).
    #[builder]
    pub fn new(
        store: Arc<dyn RecordStore>,
        qr: QrVerifier,
        clock: SharedClock,
        #[builder(default)] policy: RecordPolicy,
        #[builder(default = DEFAULT_QR_TOKEN_TTL)] qr_token_ttl: Duration,
    ) -> Self {
        Self { store, qr, clock, policy, qr_token_ttl }
    }

    /// Creates a service whose QR capability and TTL come from `config`.
    #[must_use]
    pub fn from_config(
        config: &AuthConfig,
        store: Arc<dyn RecordStore>,
        clock: SharedClock,
        policy: RecordPolicy,
    ) -> Self {
        Self {
            store,
            qr: QrVerifier::from_config(config, Arc::clone(&clock)),
            clock,
            policy,
            qr_token_ttl: config.qr_token_ttl(),
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> &RecordPolicy {
        &self.policy
    }

    /// Validates, normalizes and persists a record.
    ///
    /// The store call is bounded by the policy's store timeout.
    ///
    /// # Errors
    ///
    /// - [`RecordError::Unauthorized`] if `acting_subject` is blank
    /// - [`RecordError::InvalidInput`] if any rule rejects the input; the
    ///   store is not called
    /// - [`RecordError::Conflict`] if the store reports a uniqueness violation
    /// - [`RecordError::Storage`] for any other store failure, including
    ///   [`StorageError::Timeout`]
    #[tracing::instrument(skip(self, input), fields(booking = %input.booking.trim()))]
    pub async fn create(&self, input: &CreateRecordInput, acting_subject: &str) -> Result<Record> {
        let record = normalize(input, acting_subject, self.clock.now())?;
        let id = self.bounded(self.store.insert(&record)).await.map_err(|err| {
            log_store_failure("insert", &err);
            RecordError::from(err)
        })?;
        tracing::info!(record_id = %id, "record created");
        Ok(record.into_record(id))
    }

    /// Like [`create`](Self::create), but gives up with
    /// [`RecordError::Cancelled`] as soon as `cancel` fires.
    ///
    /// Validation runs before the race, so an invalid input reports
    /// `InvalidInput` even when `cancel` has already fired. A cancelled
    /// insert is dropped before completing; stores insert atomically, so no
    /// partial record remains.
    ///
    /// # Errors
    ///
    /// Everything [`create`](Self::create) returns, plus
    /// [`RecordError::Cancelled`].
    #[tracing::instrument(skip(self, input, cancel), fields(booking = %input.booking.trim()))]
    pub async fn create_with_cancellation(
        &self,
        input: &CreateRecordInput,
        acting_subject: &str,
        cancel: &CancellationToken,
    ) -> Result<Record> {
        let record = normalize(input, acting_subject, self.clock.now())?;
        let id = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("record creation cancelled");
                return Err(RecordError::Cancelled);
            }
            result = self.bounded(self.store.insert(&record)) => result.map_err(|err| {
                log_store_failure("insert", &err);
                RecordError::from(err)
            })?,
        };
        tracing::info!(record_id = %id, "record created");
        Ok(record.into_record(id))
    }

    /// Mints a QR token for `id` using the configured QR TTL.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::VerifierUnavailable`] if no QR secret is
    /// configured.
    pub fn mint_qr_token(&self, id: RecordId) -> Result<String> {
        Ok(self.qr.mint(id, self.qr_token_ttl)?)
    }

    /// Verifies a QR token and loads the record it names.
    ///
    /// # Errors
    ///
    /// - [`RecordError::VerifierUnavailable`] if QR verification is off
    /// - [`RecordError::InvalidToken`] or [`RecordError::ExpiredToken`] if the
    ///   token is rejected; the store is not called
    /// - [`RecordError::NotFound`] if the token is valid but the record is gone
    /// - [`RecordError::Storage`] for any other store failure
    #[tracing::instrument(skip(self, token), fields(record_id = tracing::field::Empty))]
    pub async fn confirm(&self, token: &str) -> Result<Record> {
        let id = self.qr.verify(token).inspect_err(|err| {
            tracing::debug!(error = %err, "qr token rejected");
        })?;
        tracing::Span::current().record("record_id", id.get());

        match self.bounded(self.store.find_by_id(id)).await {
            Ok(record) => Ok(record),
            Err(StorageError::NotFound { .. }) => Err(RecordError::NotFound),
            Err(err) => {
                log_store_failure("find_by_id", &err);
                Err(RecordError::from(err))
            },
        }
    }

    /// Applies the store timeout to `call`. A zero timeout leaves it unbounded.
    async fn bounded<T>(&self, call: impl Future<Output = StorageResult<T>>) -> StorageResult<T> {
        let limit = self.policy.store_timeout;
        if limit.is_zero() {
            return call.await;
        }
        tokio::time::timeout(limit, call).await.unwrap_or_else(|_| Err(StorageError::timeout()))
    }
}

fn log_store_failure(operation: &'static str, err: &StorageError) {
    if err.is_conflict() {
        tracing::debug!(operation, error = %err, "store rejected duplicate record");
    } else {
        tracing::warn!(operation, error = %err, transient = err.is_transient(), "store call failed");
    }
}

impl std::fmt::Debug for RecordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordService")
            .field("qr", &self.qr)
            .field("policy", &self.policy)
            .field("qr_token_ttl", &self.qr_token_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};
    use pases_authn::{
        Clock,
        testutil::{ManualClock, test_config},
    };
    use pases_storage::{
        records::{Branch, MemoryRecordStore},
        testutil::FailingRecordStore,
    };

    use super::*;
    use crate::{
        assert_record_error,
        testutil::{sample_input, sample_nacional_input, test_service},
    };

    #[tokio::test]
    async fn test_create_internacional() {
        let store = MemoryRecordStore::new();
        let service = test_service(Arc::new(store.clone()), &ManualClock::default());

        let record = service.create(&sample_input(), "tester").await.unwrap();

        assert_eq!(record.id.get(), 1);
        assert_eq!(record.container, "ABCU1234567");
        assert_eq!(record.retention_free_until, NaiveDate::from_ymd_opt(2026, 2, 12).unwrap());
        assert!(record.carrier.is_none());
        assert_eq!(store.find_by_id(record.id).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_create_nacional() {
        let service =
            test_service(Arc::new(MemoryRecordStore::new()), &ManualClock::default());

        let record = service.create(&sample_nacional_input(), "tester").await.unwrap();

        assert_eq!(record.branch, Branch::Nacional);
        assert_eq!(record.container, "1 X 22G1");
        assert_eq!(record.carrier.as_deref(), Some("TRANSPORTE SA"));
    }

    #[tokio::test]
    async fn test_timestamps_come_from_clock() {
        let clock = ManualClock::default();
        let service = test_service(Arc::new(MemoryRecordStore::new()), &clock);

        let record = service.create(&sample_input(), "tester").await.unwrap();
        assert_eq!(record.emitted_at, clock.now());
        assert_eq!(record.created_at, clock.now());
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let service =
            test_service(Arc::new(MemoryRecordStore::new()), &ManualClock::default());

        service.create(&sample_input(), "tester").await.unwrap();
        assert_record_error!(service.create(&sample_input(), "tester").await, Conflict);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let store = FailingRecordStore::new();
        let service = test_service(Arc::new(store.clone()), &ManualClock::default());

        let input = CreateRecordInput { client: " ".into(), ..sample_input() };
        assert_record_error!(service.create(&input, "tester").await, InvalidInput);
        assert_record_error!(service.create(&sample_input(), "").await, Unauthorized);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_storage_errors_pass_through() {
        let store = FailingRecordStore::new();
        store.fail_inserts_with(|| StorageError::connection("db down"));
        let service = test_service(Arc::new(store), &ManualClock::default());

        let err = service.create(&sample_input(), "tester").await.unwrap_err();
        assert!(matches!(err, RecordError::Storage(StorageError::Connection { .. })));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_store_conflict_is_translated() {
        let store = FailingRecordStore::new();
        store.fail_inserts_with(|| StorageError::conflict("uq_booking"));
        let service = test_service(Arc::new(store), &ManualClock::default());

        assert_record_error!(service.create(&sample_input(), "tester").await, Conflict);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_timeout() {
        let store = FailingRecordStore::new();
        store.delay_operations(Duration::from_secs(60));
        let service = RecordService::builder()
            .store(Arc::new(store.clone()))
            .qr(QrVerifier::Unavailable)
            .clock(ManualClock::default().shared())
            .policy(RecordPolicy::builder().store_timeout(Duration::from_secs(1)).build())
            .build();

        let err = service.create(&sample_input(), "tester").await.unwrap_err();
        assert!(matches!(err, RecordError::Storage(StorageError::Timeout)), "got {err:?}");
        assert!(store.inner().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_is_unbounded() {
        let store = FailingRecordStore::new();
        store.delay_operations(Duration::from_secs(600));
        let service = RecordService::builder()
            .store(Arc::new(store))
            .qr(QrVerifier::Unavailable)
            .clock(ManualClock::default().shared())
            .policy(RecordPolicy::builder().store_timeout(Duration::ZERO).build())
            .build();

        assert!(service.create(&sample_input(), "tester").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_drops_insert() {
        let store = FailingRecordStore::new();
        store.delay_operations(Duration::from_secs(5));
        let service = test_service(Arc::new(store.clone()), &ManualClock::default());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result = service.create_with_cancellation(&sample_input(), "tester", &cancel).await;
        assert_record_error!(result, Cancelled);
        assert!(store.inner().is_empty());
    }

    #[tokio::test]
    async fn test_already_cancelled_still_validates_first() {
        let service =
            test_service(Arc::new(MemoryRecordStore::new()), &ManualClock::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let input = CreateRecordInput { vessel: String::new(), ..sample_input() };
        assert_record_error!(
            service.create_with_cancellation(&input, "tester", &cancel).await,
            InvalidInput
        );
        assert_record_error!(
            service.create_with_cancellation(&sample_input(), "tester", &cancel).await,
            Cancelled
        );
    }

    #[tokio::test]
    async fn test_uncancelled_create_succeeds() {
        let service =
            test_service(Arc::new(MemoryRecordStore::new()), &ManualClock::default());
        let cancel = CancellationToken::new();

        let record =
            service.create_with_cancellation(&sample_input(), "tester", &cancel).await.unwrap();
        assert_eq!(record.id.get(), 1);
    }

    #[tokio::test]
    async fn test_confirm_round_trip() {
        let service =
            test_service(Arc::new(MemoryRecordStore::new()), &ManualClock::default());
        let record = service.create(&sample_input(), "tester").await.unwrap();

        let token = service.mint_qr_token(record.id).unwrap();
        assert_eq!(service.confirm(&token).await.unwrap(), record);
        assert_eq!(service.confirm(&token).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_confirm_missing_record() {
        let service =
            test_service(Arc::new(MemoryRecordStore::new()), &ManualClock::default());
        let token = service.mint_qr_token(RecordId::new(99).unwrap()).unwrap();

        assert_record_error!(service.confirm(&token).await, NotFound);
    }

    #[tokio::test]
    async fn test_confirm_expired_and_invalid() {
        let clock = ManualClock::default();
        let service = test_service(Arc::new(MemoryRecordStore::new()), &clock);
        let record = service.create(&sample_input(), "tester").await.unwrap();
        let token = service.mint_qr_token(record.id).unwrap();

        assert_record_error!(service.confirm("v1.1.2.abc").await, InvalidToken);

        clock.advance(TimeDelta::seconds(900));
        assert!(service.confirm(&token).await.is_ok());
        clock.advance(TimeDelta::seconds(1));
        assert_record_error!(service.confirm(&token).await, ExpiredToken);
    }

    #[tokio::test]
    async fn test_verifier_unavailable() {
        let service = RecordService::builder()
            .store(Arc::new(MemoryRecordStore::new()))
            .qr(QrVerifier::Unavailable)
            .clock(ManualClock::default().shared())
            .build();

        assert_record_error!(service.mint_qr_token(RecordId::new(1).unwrap()), VerifierUnavailable);
        assert_record_error!(service.confirm("v1.1.2.abc").await, VerifierUnavailable);
    }

    #[tokio::test]
    async fn test_from_config_uses_qr_ttl() {
        let clock = ManualClock::default();
        let service = RecordService::from_config(
            &test_config(),
            Arc::new(MemoryRecordStore::new()),
            clock.shared(),
            RecordPolicy::default(),
        );
        let token = service.mint_qr_token(RecordId::new(1).unwrap()).unwrap();

        let expiry: i64 = token.split('.').nth(2).unwrap().parse().unwrap();
        assert_eq!(expiry, clock.now().timestamp() + 900);
    }
}
