//! Username/password login producing bearer tokens.

use crate::{
    clock::SharedClock,
    config::AuthConfig,
    credentials::CredentialStore,
    error::{AuthError, Result},
    jwt::{BearerIssuer, IssuedToken},
};

/// Login capability, fixed at startup.
///
/// The gate is [`Unavailable`](Self::Unavailable) when no principals are
/// configured or the bearer issuer cannot be constructed; every login then
/// fails with [`AuthError::ServiceNotConfigured`].
#[derive(Debug)]
pub enum LoginGate {
    /// Credentials and issuer are both available.
    Configured {
        /// Principal verification.
        credentials: CredentialStore,
        /// Token minting.
        issuer: BearerIssuer,
    },
    /// Login is disabled for the lifetime of the process.
    Unavailable,
}

impl LoginGate {
    /// Builds the gate from configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig, clock: SharedClock) -> Self {
        let credentials = CredentialStore::from_config(config);
        if credentials.is_empty() {
            tracing::info!("no login principals configured; login unavailable");
            return Self::Unavailable;
        }

        match BearerIssuer::new(config, clock) {
            Ok(issuer) => Self::Configured { credentials, issuer },
            Err(e) => {
                tracing::info!(error = %e, "bearer issuer unavailable; login unavailable");
                Self::Unavailable
            },
        }
    }

    /// Returns `true` if login is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Configured { .. })
    }

    /// Authenticates a principal and issues a bearer token for it.
    ///
    /// The token subject is the trimmed username.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ServiceNotConfigured`] if the gate is unavailable
    /// - [`AuthError::InvalidCredentials`] if either field is blank or the
    ///   pair does not match; the error never says which
    /// - [`AuthError::Signing`] if token encoding fails
    #[tracing::instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken> {
        let Self::Configured { credentials, issuer } = self else {
            return Err(AuthError::service_not_configured());
        };

        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            tracing::warn!("login rejected: blank credentials");
            return Err(AuthError::invalid_credentials());
        }

        if !credentials.validate(username, password) {
            tracing::warn!(username, "login rejected");
            return Err(AuthError::invalid_credentials());
        }

        issuer.issue(username)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::{
        assert_auth_error,
        config::parse_principals,
        jwt::{BearerValidator, SCOPE_RECORDS_WRITE},
        testutil::{ManualClock, TEST_PASSWORD, TEST_SIGNING_SECRET, TEST_USERNAME, test_config},
    };

    #[test]
    fn test_login_issues_token_for_trimmed_username() {
        let clock = ManualClock::default();
        let config = test_config();
        let gate = LoginGate::from_config(&config, clock.shared());
        assert!(gate.is_available());

        let issued = gate.login(&format!("  {TEST_USERNAME} "), TEST_PASSWORD).unwrap();
        assert_eq!(issued.token_type, "Bearer");

        let validator = BearerValidator::new(&config, clock.shared()).unwrap();
        let claims = validator.parse(&issued.access_token).unwrap();
        assert_eq!(claims.sub, TEST_USERNAME);
        assert!(claims.has_scope(SCOPE_RECORDS_WRITE));
    }

    #[test]
    fn test_blank_fields_are_invalid_credentials() {
        let gate = LoginGate::from_config(&test_config(), ManualClock::default().shared());
        assert_auth_error!(gate.login("", TEST_PASSWORD), InvalidCredentials);
        assert_auth_error!(gate.login("   ", TEST_PASSWORD), InvalidCredentials);
        assert_auth_error!(gate.login(TEST_USERNAME, ""), InvalidCredentials);
        assert_auth_error!(gate.login(TEST_USERNAME, " \t"), InvalidCredentials);
    }

    #[test]
    fn test_wrong_password_and_unknown_user_look_identical() {
        let gate = LoginGate::from_config(&test_config(), ManualClock::default().shared());
        let wrong_password = gate.login(TEST_USERNAME, "nope").unwrap_err();
        let unknown_user = gate.login("mallory", TEST_PASSWORD).unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_password_is_not_trimmed() {
        let gate = LoginGate::from_config(&test_config(), ManualClock::default().shared());
        assert_auth_error!(gate.login(TEST_USERNAME, &format!(" {TEST_PASSWORD}")), InvalidCredentials);
    }

    #[test]
    fn test_unavailable_without_principals() {
        let config = AuthConfig::builder().signing_secret(TEST_SIGNING_SECRET).build().unwrap();
        let gate = LoginGate::from_config(&config, ManualClock::default().shared());
        assert!(!gate.is_available());
        assert_auth_error!(gate.login(TEST_USERNAME, TEST_PASSWORD), ServiceNotConfigured);
    }

    #[test]
    fn test_unavailable_without_signing_secret() {
        let config = AuthConfig::builder()
            .principals(parse_principals(&format!("{TEST_USERNAME}:{TEST_PASSWORD}")))
            .build()
            .unwrap();
        let gate = LoginGate::from_config(&config, ManualClock::default().shared());
        assert!(!gate.is_available());
        // Not configured takes precedence over blank input.
        assert_auth_error!(gate.login("", ""), ServiceNotConfigured);
    }
}
