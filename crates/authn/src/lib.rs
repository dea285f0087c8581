//! # Pass Validation Authentication
//!
//! Token and credential handling for the pass validation service.
//!
//! This crate provides:
//! - **Bearer tokens**: HS256 issuing and validation with issuer, audience
//!   and clock-skew checks
//! - **Login**: constant-time principal verification feeding the issuer
//! - **QR tokens**: stateless `v1.<id>.<exp>.<sig>` verification tokens
//! - **Algorithm validation**: header `alg` policy checks
//!
//! All secrets and policy arrive through one [`AuthConfig`]; time comes from
//! an injected [`Clock`]. Capabilities that lack their secret are explicit
//! `Unavailable` variants ([`LoginGate`], [`QrVerifier`]) rather than
//! runtime surprises.
//!
//! ## Example
//!
//! ```
//! use pases_authn::{AuthConfig, LoginGate, QrVerifier, SystemClock, parse_principals};
//! use pases_authn::jwt::BearerValidator;
//! use pases_storage::RecordId;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::builder()
//!     .signing_secret("bearer-secret")
//!     .qr_secret("qr-secret")
//!     .principals(parse_principals("ops:hunter2"))
//!     .build()?;
//!
//! let login = LoginGate::from_config(&config, SystemClock::shared());
//! let validator = BearerValidator::new(&config, SystemClock::shared())?;
//! let qr = QrVerifier::from_config(&config, SystemClock::shared());
//!
//! let issued = login.login("ops", "hunter2")?;
//! let claims = validator.parse(&issued.access_token)?;
//! assert_eq!(claims.sub, "ops");
//!
//! let id = RecordId::new(42).ok_or("bad id")?;
//! let token = qr.mint(id, Duration::from_secs(900))?;
//! assert_eq!(qr.verify(&token)?, id);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Injectable time source.
pub mod clock;
/// Token and login configuration.
pub mod config;
/// Constant-time principal verification.
pub mod credentials;
/// Authentication error types.
pub mod error;
/// Bearer token claims, issuing and validation.
pub mod jwt;
/// Login flow.
pub mod login;
/// Compact QR verification tokens.
pub mod qr;
/// Shared test utilities.
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;
/// Algorithm validation.
pub mod validation;

// Re-export key types for convenience
pub use clock::{Clock, SharedClock, SystemClock};
pub use config::{AuthConfig, Secret, SigningAlgorithm, parse_principals};
pub use credentials::CredentialStore;
pub use error::{AuthError, QrTokenError, Result};
pub use jwt::{BearerIssuer, BearerValidator, Claims, IssuedToken, SCOPE_RECORDS_WRITE};
pub use login::LoginGate;
pub use qr::{QrTokenCodec, QrVerifier};
pub use validation::{ACCEPTED_ALGORITHMS, FORBIDDEN_ALGORITHMS, validate_algorithm};
