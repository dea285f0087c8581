//! Bearer token algorithm policy.
//!
//! Exactly one symmetric algorithm is active. The header `alg` of every
//! presented token is checked against this policy before any signature work,
//! which blocks algorithm substitution (`none`, a different HMAC size, or an
//! asymmetric algorithm whose public key could be confused for the secret).

use crate::error::AuthError;

/// Algorithms that are never accepted.
pub const FORBIDDEN_ALGORITHMS: &[&str] = &["none", "HS384", "HS512"];

/// Algorithms with a construction mode that is reserved but disabled.
pub const RESERVED_ALGORITHMS: &[&str] = &["RS256"];

/// Accepted bearer token algorithms.
pub const ACCEPTED_ALGORITHMS: &[&str] = &["HS256"];

/// Validate a bearer token `alg` header value.
///
/// # Errors
///
/// Returns [`AuthError::UnsupportedAlgorithm`] if the algorithm is
/// forbidden, reserved, or not in [`ACCEPTED_ALGORITHMS`].
///
/// # Examples
///
/// ```
/// use pases_authn::validation::validate_algorithm;
///
/// assert!(validate_algorithm("HS256").is_ok());
/// assert!(validate_algorithm("RS256").is_err());
/// assert!(validate_algorithm("none").is_err());
/// ```
pub fn validate_algorithm(alg: &str) -> Result<(), AuthError> {
    if FORBIDDEN_ALGORITHMS.contains(&alg) {
        return Err(AuthError::UnsupportedAlgorithm(format!(
            "Algorithm '{}' is not allowed for security reasons",
            alg
        )));
    }

    if RESERVED_ALGORITHMS.contains(&alg) {
        return Err(AuthError::UnsupportedAlgorithm(format!(
            "Algorithm '{}' is temporarily disabled",
            alg
        )));
    }

    if !ACCEPTED_ALGORITHMS.contains(&alg) {
        return Err(AuthError::UnsupportedAlgorithm(format!(
            "Algorithm '{}' is not in accepted list (only HS256 is supported)",
            alg
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_algorithm_hs256_accepted() {
        assert!(validate_algorithm("HS256").is_ok());
    }

    #[test]
    fn test_validate_algorithm_rs256_reserved() {
        let result = validate_algorithm("RS256");
        assert!(
            matches!(result, Err(AuthError::UnsupportedAlgorithm(ref msg)) if msg.contains("temporarily disabled"))
        );
    }

    #[test]
    fn test_forbidden_algorithms_each_rejected_with_security_message() {
        for alg in FORBIDDEN_ALGORITHMS {
            let result = validate_algorithm(alg);
            assert!(
                matches!(result, Err(AuthError::UnsupportedAlgorithm(ref msg)) if msg.contains("not allowed for security reasons")),
                "Expected security rejection for forbidden algorithm '{alg}'"
            );
        }
    }

    #[test]
    fn test_validate_algorithm_not_in_list() {
        for alg in ["EdDSA", "ES256", "PS256", "hs256", ""] {
            let result = validate_algorithm(alg);
            assert!(
                matches!(result, Err(AuthError::UnsupportedAlgorithm(ref msg)) if msg.contains("not in accepted list")),
                "Expected rejection for '{alg}'"
            );
        }
    }

    #[test]
    fn test_policy_lists_are_disjoint() {
        for alg in ACCEPTED_ALGORITHMS {
            assert!(!FORBIDDEN_ALGORITHMS.contains(alg));
            assert!(!RESERVED_ALGORITHMS.contains(alg));
        }
    }
}
