//! Shared test utilities for authentication testing.
//!
//! This module provides a controllable clock, a ready-made configuration,
//! helpers for crafting raw JWT strings (for attack testing), and an
//! assertion macro for [`AuthError`](crate::error::AuthError) variants. It is
//! feature-gated behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! pases-authn = { path = "../authn", features = ["testutil"] }
//! ```
//!
//! Then import helpers:
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use pases_authn::testutil::{ManualClock, test_config};
//! ```

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;

use crate::{
    clock::{Clock, SharedClock},
    config::{AuthConfig, parse_principals},
};

/// Bearer signing secret used by [`test_config`].
pub const TEST_SIGNING_SECRET: &str = "test-bearer-signing-secret";

/// QR secret used by [`test_config`].
pub const TEST_QR_SECRET: &str = "test-qr-signing-secret";

/// Principal configured by [`test_config`].
pub const TEST_USERNAME: &str = "tester";

/// Password of [`TEST_USERNAME`].
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// Default start time of [`ManualClock`]: 2026-02-09T12:00:00Z.
pub const TEST_EPOCH_UNIX: i64 = 1_770_638_400;

/// Returns a fully configured [`AuthConfig`] with default TTLs and skew.
///
/// # Panics
///
/// Panics if the configuration fails validation (should not happen).
#[must_use]
pub fn test_config() -> AuthConfig {
    AuthConfig::builder()
        .signing_secret(TEST_SIGNING_SECRET)
        .qr_secret(TEST_QR_SECRET)
        .principals(parse_principals(&format!("{TEST_USERNAME}:{TEST_PASSWORD}")))
        .build()
        .expect("test config is valid")
}

/// A clock that only moves when told to.
///
/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(now)) }
    }

    /// Creates a clock frozen at the given Unix timestamp.
    ///
    /// # Panics
    ///
    /// Panics if the timestamp is out of range.
    #[must_use]
    pub fn at_unix(seconds: i64) -> Self {
        Self::new(DateTime::from_timestamp(seconds, 0).expect("timestamp in range"))
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Moves the clock by `delta`, which may be negative.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock();
        *now += delta;
    }

    /// Returns a [`SharedClock`] handle that follows this clock.
    #[must_use]
    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_unix(TEST_EPOCH_UNIX)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Encodes arbitrary claims as an HS256 JWT with the given secret.
///
/// # Panics
///
/// Panics if encoding fails.
pub fn encode_hs256(secret: &[u8], claims: &serde_json::Value) -> String {
    encode_with_header(&Header::new(Algorithm::HS256), secret, claims)
}

/// Encodes arbitrary claims with an arbitrary HMAC header.
///
/// # Panics
///
/// Panics if encoding fails, e.g. for a non-HMAC algorithm.
pub fn encode_with_header(header: &Header, secret: &[u8], claims: &serde_json::Value) -> String {
    jsonwebtoken::encode(header, claims, &EncodingKey::from_secret(secret))
        .expect("Failed to encode test JWT")
}

/// Creates a raw JWT string from arbitrary header and payload JSON.
///
/// The resulting JWT has the structure `{header_b64}.{payload_b64}.`
/// with an empty signature. This is useful for testing rejection of
/// malformed or attack JWTs (e.g., `alg: "none"`).
///
/// # Panics
///
/// Panics if JSON serialization fails.
pub fn craft_raw_jwt(header_json: &serde_json::Value, payload_json: &serde_json::Value) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header_json).expect("header json"));
    let payload_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload_json).expect("payload json"));
    format!("{header_b64}.{payload_b64}.")
}

/// Asserts that a [`Result<T, AuthError>`] is an `Err` matching the given
/// [`AuthError`](crate::error::AuthError) variant.
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use pases_authn::assert_auth_error;
/// use pases_authn::error::AuthError;
///
/// let result: Result<(), AuthError> = Err(AuthError::token_expired());
/// assert_auth_error!(result, TokenExpired);
/// ```
#[macro_export]
macro_rules! assert_auth_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "expected AuthError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
    ($result:expr, $variant:ident, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "{}: expected AuthError::{}, got: {:?}",
            $msg,
            stringify!($variant),
            $result,
        );
    };
}
