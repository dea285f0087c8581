//! Bearer token claims, issuing and validation.
//!
//! Bearer tokens are HS256 JWTs whose payload carries `sub`, `scopes`, `iss`,
//! `aud`, `iat`, `nbf` and `exp`:
//!
//! ```json
//! {
//!   "sub": "ops",
//!   "scopes": ["records:write"],
//!   "iss": "https://issuer.example.com",
//!   "aud": ["validacion-pases"],
//!   "iat": 1770638400,
//!   "nbf": 1770638400,
//!   "exp": 1770642000
//! }
//! ```
//!
//! Signature, algorithm, issuer and audience are checked by `jsonwebtoken`.
//! The time window is checked here against the injected [`Clock`] so the
//! skew rule `now ∈ [nbf - skew, exp + skew]` holds exactly.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pases_authn::{AuthConfig, SystemClock};
//! use pases_authn::jwt::{BearerIssuer, BearerValidator, SCOPE_RECORDS_WRITE};
//!
//! # fn example() -> Result<(), pases_authn::AuthError> {
//! let config = AuthConfig::builder().signing_secret("bearer-secret").build()?;
//! let issuer = BearerIssuer::new(&config, SystemClock::shared())?;
//! let validator = BearerValidator::new(&config, SystemClock::shared())?;
//!
//! let issued = issuer.issue("ops")?;
//! let claims = validator.parse(&issued.access_token)?;
//! assert_eq!(claims.sub, "ops");
//! assert!(claims.has_scope(SCOPE_RECORDS_WRITE));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::fmt;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    clock::SharedClock,
    config::{AuthConfig, SigningAlgorithm},
    error::{AuthError, Result},
    validation::validate_algorithm,
};

/// Scope granted to every issued token; required to create records.
pub const SCOPE_RECORDS_WRITE: &str = "records:write";

/// `token_type` value of every issued token.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Bearer token claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the authenticated principal.
    pub sub: String,
    /// Granted scopes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Issuer.
    pub iss: String,
    /// Audience. Accepts a single string or an array when decoding.
    #[serde(deserialize_with = "one_or_many")]
    pub aud: Vec<String>,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Not before (seconds since epoch).
    pub nbf: i64,
    /// Expiration time (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns `true` if the token grants `scope`.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|granted| granted == scope)
    }

    /// Returns the expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// A freshly issued bearer token, in the shape returned to login clients.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The signed JWT.
    pub access_token: String,
    /// Always [`TOKEN_TYPE_BEARER`].
    pub token_type: String,
    /// Expiry, serialized as RFC 3339.
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("access_token", &"***")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn secs_i64(duration: std::time::Duration, field: &str) -> Result<i64> {
    i64::try_from(duration.as_secs())
        .map_err(|_| AuthError::config(format!("{field} is out of range")))
}

/// Mints HS256 bearer tokens.
pub struct BearerIssuer {
    key: EncodingKey,
    issuer: String,
    audience: String,
    ttl: TimeDelta,
    clock: SharedClock,
}

impl BearerIssuer {
    /// Creates an issuer.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UnsupportedAlgorithm`] if the configured algorithm is not HS256
    /// - [`AuthError::Config`] if no signing secret is configured
    pub fn new(config: &AuthConfig, clock: SharedClock) -> Result<Self> {
        if config.algorithm() != SigningAlgorithm::Hs256 {
            return Err(AuthError::unsupported_algorithm(format!(
                "token issuing requires HS256, configured {}",
                config.algorithm()
            )));
        }
        let secret = config
            .signing_secret()
            .ok_or_else(|| AuthError::config("token issuing requires a signing secret"))?;
        let ttl = TimeDelta::try_seconds(secs_i64(config.token_ttl(), "token_ttl")?)
            .ok_or_else(|| AuthError::config("token_ttl is out of range"))?;

        Ok(Self {
            key: EncodingKey::from_secret(secret.expose().as_bytes()),
            issuer: config.issuer().to_string(),
            audience: config.audience().to_string(),
            ttl,
            clock,
        })
    }

    /// Issues a token for `subject`.
    ///
    /// `iat` and `nbf` are the current time; `exp` is `now + ttl`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingClaim`] if `subject` is blank
    /// - [`AuthError::Signing`] if encoding fails
    #[tracing::instrument(skip(self))]
    pub fn issue(&self, subject: &str) -> Result<IssuedToken> {
        if subject.trim().is_empty() {
            return Err(AuthError::missing_claim("sub"));
        }

        let now = self.clock.now();
        // Claims carry whole seconds; the reported expiry matches `exp`.
        let expires_at = now
            .trunc_subsecs(0)
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Signing("token expiry overflows".into()))?;

        let claims = Claims {
            sub: subject.to_string(),
            scopes: vec![SCOPE_RECORDS_WRITE.to_string()],
            iss: self.issuer.clone(),
            aud: vec![self.audience.clone()],
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        tracing::debug!(subject, expires_at = %expires_at, "bearer token issued");

        Ok(IssuedToken {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_at,
        })
    }
}

impl fmt::Debug for BearerIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Verification mode, fixed at construction.
enum ValidatorMode {
    Hs256 { key: DecodingKey },
}

/// Validates presented bearer tokens.
pub struct BearerValidator {
    mode: ValidatorMode,
    issuer: String,
    audience: String,
    skew_secs: i64,
    clock: SharedClock,
}

impl BearerValidator {
    /// Creates a validator for the configured algorithm.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Config`] if HS256 is configured without a secret, or
    ///   RS256 without a JWKS URL
    /// - [`AuthError::UnsupportedAlgorithm`] for RS256, which is reserved and
    ///   disabled
    pub fn new(config: &AuthConfig, clock: SharedClock) -> Result<Self> {
        let mode = match config.algorithm() {
            SigningAlgorithm::Hs256 => {
                let secret = config
                    .signing_secret()
                    .ok_or_else(|| AuthError::config("HS256 validation requires a signing secret"))?;
                ValidatorMode::Hs256 { key: DecodingKey::from_secret(secret.expose().as_bytes()) }
            },
            SigningAlgorithm::Rs256 => {
                if config.jwks_url().is_none() {
                    return Err(AuthError::config("RS256 validation requires a jwks_url"));
                }
                return Err(AuthError::unsupported_algorithm(
                    "RS256 validation is temporarily disabled",
                ));
            },
        };

        Ok(Self {
            mode,
            issuer: config.issuer().to_string(),
            audience: config.audience().to_string(),
            skew_secs: secs_i64(config.clock_skew(), "clock_skew")?,
            clock,
        })
    }

    /// Parses and validates a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error for which [`AuthError::is_authentication_failure`]
    /// holds if:
    /// - The token is malformed or uses an algorithm other than HS256
    /// - The signature does not verify
    /// - `iss` or `aud` do not match the configuration
    /// - `now` is outside `[nbf - skew, exp + skew]`
    /// - `sub` is empty
    #[tracing::instrument(skip(self, token))]
    pub fn parse(&self, token: &str) -> Result<Claims> {
        self.parse_inner(token).inspect_err(|e| {
            tracing::warn!(error = %e, "bearer token rejected");
        })
    }

    fn parse_inner(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).map_err(|e| {
            AuthError::invalid_token_format(format!("Failed to decode JWT header: {}", e))
        })?;
        validate_algorithm(&format!("{:?}", header.alg))?;

        let claims = match &self.mode {
            ValidatorMode::Hs256 { key } => {
                let mut validation = Validation::new(Algorithm::HS256);
                validation.validate_exp = false;
                validation.validate_nbf = false;
                validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
                validation.set_issuer(&[&self.issuer]);
                validation.set_audience(&[&self.audience]);
                decode::<Claims>(token, key, &validation)?.claims
            },
        };

        let now = self.clock.now().timestamp();
        if now < claims.nbf.saturating_sub(self.skew_secs) {
            return Err(AuthError::token_not_yet_valid());
        }
        if now > claims.exp.saturating_add(self.skew_secs) {
            return Err(AuthError::token_expired());
        }
        if claims.sub.trim().is_empty() {
            return Err(AuthError::missing_claim("sub"));
        }

        Ok(claims)
    }

    /// Parses an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidTokenFormat`] if the header is empty, lacks
    /// the `Bearer ` prefix or carries an empty token; otherwise the errors of
    /// [`parse`](Self::parse).
    pub fn parse_authorization_header(&self, header: &str) -> Result<Claims> {
        let token = header
            .trim()
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::invalid_token_format("missing or invalid bearer token"))?;
        self.parse(token)
    }
}

impl fmt::Debug for BearerValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            ValidatorMode::Hs256 { .. } => "HS256",
        };
        f.debug_struct("BearerValidator")
            .field("mode", &mode)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("skew_secs", &self.skew_secs)
            .finish_non_exhaustive()
    }
}
