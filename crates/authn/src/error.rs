//! Authentication error types.
//!
//! This module defines errors that can occur while issuing or validating
//! bearer tokens, running the login flow, and verifying compact QR tokens.

use thiserror::Error;

/// Authentication and authorization errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`; new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Malformed JWT - cannot be decoded.
    #[error("Invalid token format: {0}")]
    InvalidTokenFormat(String),

    /// Token has expired, skew included.
    #[error("Token expired")]
    TokenExpired,

    /// Token not yet valid (nbf claim in future, skew included).
    #[error("Token not yet valid")]
    TokenNotYetValid,

    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Issuer doesn't match the configured value.
    #[error("Invalid issuer: {0}")]
    InvalidIssuer(String),

    /// Audience doesn't match the configured value.
    #[error("Invalid audience: {0}")]
    InvalidAudience(String),

    /// Required claim is missing or empty.
    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// Algorithm not supported by the active configuration.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Invalid configuration detected at construction time.
    #[error("Invalid auth configuration: {0}")]
    Config(String),

    /// Token encoding failed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Login rejected. Never reveals which field was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Login subsystem was disabled at startup.
    #[error("Token service is not configured")]
    ServiceNotConfigured,
}

impl AuthError {
    /// Creates an `InvalidTokenFormat` error.
    #[must_use]
    pub fn invalid_token_format(message: impl Into<String>) -> Self {
        Self::InvalidTokenFormat(message.into())
    }

    /// Creates a `TokenExpired` error.
    #[must_use]
    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    /// Creates a `TokenNotYetValid` error.
    #[must_use]
    pub fn token_not_yet_valid() -> Self {
        Self::TokenNotYetValid
    }

    /// Creates an `InvalidSignature` error.
    #[must_use]
    pub fn invalid_signature() -> Self {
        Self::InvalidSignature
    }

    /// Creates an `InvalidIssuer` error.
    #[must_use]
    pub fn invalid_issuer(message: impl Into<String>) -> Self {
        Self::InvalidIssuer(message.into())
    }

    /// Creates an `InvalidAudience` error.
    #[must_use]
    pub fn invalid_audience(message: impl Into<String>) -> Self {
        Self::InvalidAudience(message.into())
    }

    /// Creates a `MissingClaim` error.
    #[must_use]
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim(claim.into())
    }

    /// Creates an `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(message.into())
    }

    /// Creates a `Config` error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an `InvalidCredentials` error.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    /// Creates a `ServiceNotConfigured` error.
    #[must_use]
    pub fn service_not_configured() -> Self {
        Self::ServiceNotConfigured
    }

    /// Returns `true` for errors that reject a presented bearer token.
    ///
    /// All of these surface as the same unauthorized outcome at the service
    /// boundary; the specific variant is kept for logging.
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidTokenFormat(_)
                | Self::TokenExpired
                | Self::TokenNotYetValid
                | Self::InvalidSignature
                | Self::InvalidIssuer(_)
                | Self::InvalidAudience(_)
                | Self::MissingClaim(_)
                | Self::UnsupportedAlgorithm(_)
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidToken => AuthError::invalid_token_format("Invalid JWT structure"),
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            ErrorKind::InvalidAudience => {
                AuthError::invalid_audience("Audience validation failed")
            },
            ErrorKind::InvalidIssuer => AuthError::invalid_issuer("Issuer validation failed"),
            ErrorKind::InvalidAlgorithm => {
                AuthError::unsupported_algorithm("Algorithm not supported")
            },
            ErrorKind::MissingRequiredClaim(claim) => AuthError::missing_claim(claim.clone()),
            _ => AuthError::invalid_token_format(format!("JWT error: {}", err)),
        }
    }
}

/// Errors produced by the compact QR token codec.
///
/// `Invalid` and `Expired` stay distinct so callers can tell a forged or
/// mangled token from one that was genuine but is past its expiry, even if
/// the public response treats them alike. `Unavailable` means the feature is
/// switched off and is never reported as a bad token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QrTokenError {
    /// Token is malformed or its signature does not match.
    #[error("invalid qr token: {reason}")]
    Invalid {
        /// Which check rejected the token.
        reason: &'static str,
    },

    /// Token is authentic but past its expiry.
    #[error("expired qr token")]
    Expired,

    /// No QR secret is configured.
    #[error("qr verifier unavailable")]
    Unavailable,
}

impl QrTokenError {
    /// Creates an `Invalid` error.
    #[must_use]
    pub fn invalid(reason: &'static str) -> Self {
        Self::Invalid { reason }
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_token_format("test");
        assert_eq!(err.to_string(), "Invalid token format: test");

        let err = AuthError::token_expired();
        assert_eq!(err.to_string(), "Token expired");

        let err = AuthError::missing_claim("sub");
        assert_eq!(err.to_string(), "Missing claim: sub");

        let err = AuthError::service_not_configured();
        assert_eq!(err.to_string(), "Token service is not configured");
    }

    #[test]
    fn test_error_from_jsonwebtoken() {
        let jwt_err =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidSignature);
        let auth_err: AuthError = jwt_err.into();
        assert!(matches!(auth_err, AuthError::InvalidSignature));

        let jwt_err =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidIssuer);
        assert!(matches!(AuthError::from(jwt_err), AuthError::InvalidIssuer(_)));

        let jwt_err =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidAlgorithm);
        assert!(matches!(AuthError::from(jwt_err), AuthError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_authentication_failure_classification() {
        assert!(AuthError::token_expired().is_authentication_failure());
        assert!(AuthError::invalid_signature().is_authentication_failure());
        assert!(AuthError::missing_claim("sub").is_authentication_failure());
        assert!(!AuthError::invalid_credentials().is_authentication_failure());
        assert!(!AuthError::service_not_configured().is_authentication_failure());
        assert!(!AuthError::config("x").is_authentication_failure());
    }

    #[test]
    fn test_qr_errors_distinct() {
        assert_ne!(QrTokenError::invalid("signature mismatch"), QrTokenError::Expired);
        assert_ne!(QrTokenError::Unavailable, QrTokenError::Expired);
        assert_eq!(
            QrTokenError::invalid("bad version").to_string(),
            "invalid qr token: bad version"
        );
    }
}
