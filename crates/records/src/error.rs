//! Record service error types.
//!
//! [`RecordError`] is the single error kind surfaced by record creation and
//! confirmation. Each variant maps to one fixed public description through
//! [`RecordError::outcome`], so callers never have to format internal
//! details for end users.

use pases_authn::QrTokenError;
use pases_storage::StorageError;
use thiserror::Error;

/// Result type alias for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;

/// Errors produced while creating or confirming records.
///
/// `InvalidToken` and `ExpiredToken` stay distinct here even though
/// [`RecordError::outcome`] presents them with the same text.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`. Downstream match expressions must
/// include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    /// No acting principal was supplied.
    #[error("unauthorized")]
    Unauthorized,

    /// The request failed validation or a business rule.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Which rule rejected the request.
        reason: String,
    },

    /// The store rejected the insert on a uniqueness constraint.
    #[error("record already exists ({constraint})")]
    Conflict {
        /// Name of the violated constraint.
        constraint: String,
    },

    /// The QR token is malformed or its signature does not match.
    #[error("invalid qr token: {reason}")]
    InvalidToken {
        /// Which check rejected the token.
        reason: &'static str,
    },

    /// The QR token is authentic but expired.
    #[error("expired qr token")]
    ExpiredToken,

    /// QR verification is not configured.
    #[error("qr verifier unavailable")]
    VerifierUnavailable,

    /// A verified QR token points at a record that does not exist.
    #[error("record not found")]
    NotFound,

    /// The caller cancelled the operation before the store answered.
    #[error("request cancelled")]
    Cancelled,

    /// Any other storage failure, passed through unchanged.
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),
}

impl RecordError {
    /// Creates an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    /// Returns the fixed, user-visible description for this error kind.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidInput { .. } => "invalid input",
            Self::Conflict { .. } => "record already exists",
            Self::InvalidToken { .. } | Self::ExpiredToken => "invalid or expired token",
            Self::VerifierUnavailable => "qr verifier unavailable",
            Self::NotFound => "record not found",
            Self::Cancelled => "request cancelled",
            Self::Storage(_) => "internal error",
        }
    }

    /// Returns `true` if retrying the same call might succeed.
    ///
    /// Only transient storage failures qualify; validation and token errors
    /// never change on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_transient())
    }
}

impl From<QrTokenError> for RecordError {
    fn from(err: QrTokenError) -> Self {
        match err {
            QrTokenError::Invalid { reason } => Self::InvalidToken { reason },
            QrTokenError::Expired => Self::ExpiredToken,
            QrTokenError::Unavailable => Self::VerifierUnavailable,
            _ => Self::InvalidToken { reason: "unrecognized qr token error" },
        }
    }
}

impl From<StorageError> for RecordError {
    /// Translates uniqueness violations into [`RecordError::Conflict`]; every
    /// other storage error is wrapped unchanged.
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { constraint } => Self::Conflict { constraint },
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_conflict_translated() {
        let err = RecordError::from(StorageError::conflict("records_booking_container"));
        assert!(
            matches!(&err, RecordError::Conflict { constraint } if constraint == "records_booking_container")
        );
        assert_eq!(err.outcome(), "record already exists");
    }

    #[test]
    fn test_other_storage_errors_pass_through() {
        let err = RecordError::from(StorageError::not_found("9"));
        assert!(matches!(err, RecordError::Storage(StorageError::NotFound { .. })));

        let err = RecordError::from(StorageError::connection("db down"));
        assert!(matches!(err, RecordError::Storage(StorageError::Connection { .. })));
        assert_eq!(err.outcome(), "internal error");
    }

    #[test]
    fn test_qr_errors_keep_kind() {
        assert!(matches!(
            RecordError::from(QrTokenError::invalid("bad signature")),
            RecordError::InvalidToken { reason: "bad signature" }
        ));
        assert!(matches!(RecordError::from(QrTokenError::Expired), RecordError::ExpiredToken));
        assert!(matches!(
            RecordError::from(QrTokenError::Unavailable),
            RecordError::VerifierUnavailable
        ));
    }

    #[test]
    fn test_invalid_and_expired_share_outcome() {
        let invalid = RecordError::InvalidToken { reason: "x" };
        let expired = RecordError::ExpiredToken;
        assert_eq!(invalid.outcome(), expired.outcome());
        assert_ne!(RecordError::VerifierUnavailable.outcome(), invalid.outcome());
    }

    #[test]
    fn test_retryable_only_for_transient_storage() {
        assert!(RecordError::from(StorageError::timeout()).is_retryable());
        assert!(!RecordError::invalid_input("vessel is required").is_retryable());
        assert!(!RecordError::from(StorageError::conflict("c")).is_retryable());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let err = RecordError::from(StorageError::internal("boom"));
        assert!(err.source().is_some());
    }
}
