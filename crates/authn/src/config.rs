//! Authentication configuration.
//!
//! [`AuthConfig`] is the single, explicit carrier of process-wide secrets and
//! token policy. It is built once at startup (through the builder or by
//! deserializing) and handed to the issuer, validator, login gate and QR
//! codec constructors. Nothing in this crate reads the environment.

use std::{collections::BTreeMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{AuthError, Result};

/// Default issuer claim.
pub const DEFAULT_ISSUER: &str = "https://issuer.example.com";

/// Default audience claim.
pub const DEFAULT_AUDIENCE: &str = "validacion-pases";

/// Default tolerated clock skew (30 seconds).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(30);

/// Upper bound on the configurable clock skew (5 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Default bearer token lifetime (1 hour).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Default QR token lifetime (15 minutes).
pub const DEFAULT_QR_TOKEN_TTL: Duration = Duration::from_secs(900);

/// Bearer token signing algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC-SHA256 with a shared secret. The only active mode.
    #[default]
    #[serde(rename = "HS256")]
    Hs256,
    /// RSA-SHA256 against a JWKS endpoint. Reserved; fails at construction.
    #[serde(rename = "RS256")]
    Rs256,
}

impl SigningAlgorithm {
    /// Returns the JOSE algorithm name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Rs256 => "RS256",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret string that is scrubbed on drop and never printed.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Returns the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `true` if the secret is empty after trimming whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Parses a `user:secret,user2:secret2` principal list.
///
/// Entries are split at the first `:`; both halves are trimmed. Entries with
/// no `:` or with an empty half are skipped. A later entry for the same user
/// replaces an earlier one.
///
/// # Examples
///
/// ```
/// use pases_authn::config::parse_principals;
///
/// let principals = parse_principals(" alice : s3cret ,broken, bob:pa:ss ,:x");
/// assert_eq!(principals.len(), 2);
/// assert_eq!(principals["alice"].expose(), "s3cret");
/// assert_eq!(principals["bob"].expose(), "pa:ss");
/// ```
#[must_use]
pub fn parse_principals(raw: &str) -> BTreeMap<String, Secret> {
    raw.split(',')
        .filter_map(|entry| {
            let (user, secret) = entry.split_once(':')?;
            let (user, secret) = (user.trim(), secret.trim());
            (!user.is_empty() && !secret.is_empty())
                .then(|| (user.to_string(), Secret::new(secret)))
        })
        .collect()
}

/// Token and login configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pases_authn::config::{AuthConfig, parse_principals};
///
/// let config = AuthConfig::builder()
///     .signing_secret("bearer-secret")
///     .qr_secret("qr-secret")
///     .principals(parse_principals("ops:hunter2"))
///     .token_ttl(Duration::from_secs(600))
///     .build()?;
///
/// assert_eq!(config.audience(), "validacion-pases");
/// assert_eq!(config.clock_skew(), Duration::from_secs(30));
/// # Ok::<(), pases_authn::AuthError>(())
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Bearer signing algorithm.
    #[serde(default)]
    pub(crate) algorithm: SigningAlgorithm,

    /// HS256 shared secret.
    #[serde(default)]
    pub(crate) signing_secret: Option<Secret>,

    /// JWKS endpoint for the reserved RS256 mode.
    #[serde(default)]
    pub(crate) jwks_url: Option<String>,

    /// Expected and issued `iss` claim.
    #[serde(default = "default_issuer")]
    pub(crate) issuer: String,

    /// Expected and issued `aud` claim.
    #[serde(default = "default_audience")]
    pub(crate) audience: String,

    /// Tolerance applied to `nbf` and `exp`.
    #[serde(with = "humantime_serde", default = "default_clock_skew")]
    pub(crate) clock_skew: Duration,

    /// Bearer token lifetime.
    #[serde(with = "humantime_serde", default = "default_token_ttl")]
    pub(crate) token_ttl: Duration,

    /// Compact QR token secret.
    #[serde(default)]
    pub(crate) qr_secret: Option<Secret>,

    /// Compact QR token lifetime.
    #[serde(with = "humantime_serde", default = "default_qr_token_ttl")]
    pub(crate) qr_token_ttl: Duration,

    /// Login principals, username to secret.
    #[serde(default)]
    pub(crate) principals: BTreeMap<String, Secret>,
}

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_string()
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

fn default_clock_skew() -> Duration {
    DEFAULT_CLOCK_SKEW
}

fn default_token_ttl() -> Duration {
    DEFAULT_TOKEN_TTL
}

fn default_qr_token_ttl() -> Duration {
    DEFAULT_QR_TOKEN_TTL
}

#[bon::bon]
impl AuthConfig {
    /// Creates a new configuration, validating all fields.
    ///
    /// # Optional Fields
    ///
    /// * `algorithm` - Bearer algorithm (default: HS256).
    /// * `signing_secret` - HS256 secret. Without it, issuing is disabled and
    ///   the HS256 validator cannot be constructed.
    /// * `issuer` / `audience` - Claim values (defaults: [`DEFAULT_ISSUER`],
    ///   [`DEFAULT_AUDIENCE`]).
    /// * `clock_skew` - Validation tolerance (default: 30 seconds, max 5 minutes).
    /// * `token_ttl` - Bearer lifetime (default: 1 hour).
    /// * `qr_secret` - QR secret. Without it, QR verification is unavailable.
    /// * `qr_token_ttl` - QR lifetime (default: 15 minutes).
    /// * `principals` - Login principals. Empty disables the login flow.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if validation fails; see
    /// [`validate`](Self::validate).
    #[builder]
    pub fn new(
        #[builder(default)] algorithm: SigningAlgorithm,
        #[builder(into)] signing_secret: Option<Secret>,
        #[builder(into)] jwks_url: Option<String>,
        #[builder(into, default = default_issuer())] issuer: String,
        #[builder(into, default = default_audience())] audience: String,
        #[builder(default = DEFAULT_CLOCK_SKEW)] clock_skew: Duration,
        #[builder(default = DEFAULT_TOKEN_TTL)] token_ttl: Duration,
        #[builder(into)] qr_secret: Option<Secret>,
        #[builder(default = DEFAULT_QR_TOKEN_TTL)] qr_token_ttl: Duration,
        #[builder(default)] principals: BTreeMap<String, Secret>,
    ) -> Result<Self> {
        let config = Self {
            algorithm,
            signing_secret,
            jwks_url,
            issuer,
            audience,
            clock_skew,
            token_ttl,
            qr_secret,
            qr_token_ttl,
            principals,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// The builder calls this automatically; call it after deserializing.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if:
    /// - `issuer` or `audience` is blank
    /// - `clock_skew` exceeds [`MAX_CLOCK_SKEW`]
    /// - `token_ttl` or `qr_token_ttl` is zero
    /// - a principal username is blank
    pub fn validate(&self) -> Result<()> {
        if self.issuer.trim().is_empty() {
            return Err(AuthError::config("issuer cannot be empty"));
        }
        if self.audience.trim().is_empty() {
            return Err(AuthError::config("audience cannot be empty"));
        }
        if self.clock_skew > MAX_CLOCK_SKEW {
            return Err(AuthError::config(format!(
                "clock_skew {:?} exceeds maximum {:?}",
                self.clock_skew, MAX_CLOCK_SKEW
            )));
        }
        if self.token_ttl.is_zero() {
            return Err(AuthError::config("token_ttl must be greater than zero"));
        }
        if self.qr_token_ttl.is_zero() {
            return Err(AuthError::config("qr_token_ttl must be greater than zero"));
        }
        if self.principals.keys().any(|user| user.trim().is_empty()) {
            return Err(AuthError::config("principal usernames cannot be blank"));
        }
        Ok(())
    }

    /// Returns the bearer signing algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Returns the HS256 secret, if configured and not blank.
    #[must_use]
    pub fn signing_secret(&self) -> Option<&Secret> {
        self.signing_secret.as_ref().filter(|secret| !secret.is_blank())
    }

    /// Returns the JWKS URL, if configured and not blank.
    #[must_use]
    pub fn jwks_url(&self) -> Option<&str> {
        self.jwks_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }

    /// Returns the issuer claim value.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the audience claim value.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Returns the clock skew tolerance.
    #[must_use]
    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// Returns the bearer token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Returns the QR secret, if configured and not blank.
    #[must_use]
    pub fn qr_secret(&self) -> Option<&Secret> {
        self.qr_secret.as_ref().filter(|secret| !secret.is_blank())
    }

    /// Returns the QR token lifetime.
    #[must_use]
    pub fn qr_token_ttl(&self) -> Duration {
        self.qr_token_ttl
    }

    /// Returns the login principals.
    #[must_use]
    pub fn principals(&self) -> &BTreeMap<String, Secret> {
        &self.principals
    }
}
