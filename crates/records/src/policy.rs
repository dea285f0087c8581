//! Record service policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(8);

/// Which request shape establishes the real arrival date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateContract {
    /// `fecha_real` must be present.
    #[default]
    RealDateRequired,
    /// `fecha_real` may be omitted when `libre_retencion_hasta` is given; the
    /// real date is then derived by subtracting `dias_libre` from it.
    ///
    /// Compatibility mode for older clients only.
    LegacyRetentionDate,
}

/// Policy applied by the record service.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pases_records::{DateContract, RecordPolicy};
///
/// let policy = RecordPolicy::builder()
///     .date_contract(DateContract::LegacyRetentionDate)
///     .store_timeout(Duration::from_secs(2))
///     .build();
///
/// assert_eq!(policy.store_timeout, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, bon::Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordPolicy {
    /// Accepted date contract.
    #[serde(default)]
    #[builder(default)]
    pub date_contract: DateContract,

    /// Upper bound on each store call. Zero disables the bound.
    #[serde(with = "humantime_serde", default = "default_store_timeout")]
    #[builder(default = default_store_timeout())]
    pub store_timeout: Duration,
}

fn default_store_timeout() -> Duration {
    DEFAULT_STORE_TIMEOUT
}

impl Default for RecordPolicy {
    fn default() -> Self {
        Self { date_contract: DateContract::default(), store_timeout: default_store_timeout() }
    }
}
