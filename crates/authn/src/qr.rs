//! Compact QR verification tokens.
//!
//! A QR token binds a record identifier to an expiry without any server-side
//! state:
//!
//! ```text
//! v1.<record id>.<expiry unix seconds>.<signature>
//!
//! signature = base64url_nopad(HMAC-SHA256(secret, "v1|<id>|<expiry>")[..16])
//! ```
//!
//! Verification checks, in order: four segments, the `v1` version, positive
//! integer id and expiry, the signature (constant time), and only then the
//! expiry. A token that fails any structural or signature check is
//! [`QrTokenError::Invalid`], never [`QrTokenError::Expired`].

use std::{fmt, time::Duration};

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use hmac::{Hmac, Mac};
use pases_storage::RecordId;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{
    clock::SharedClock,
    config::AuthConfig,
    error::QrTokenError,
};

type HmacSha256 = Hmac<Sha256>;

/// Version prefix of every token.
pub const QR_TOKEN_VERSION: &str = "v1";

/// Length in bytes of the truncated signature.
pub const QR_SIGNATURE_LEN: usize = 16;

/// Unpadded base64url on encode; padding optional on decode.
const SIGNATURE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Mints and verifies compact QR tokens with a shared secret.
#[derive(Clone)]
pub struct QrTokenCodec {
    mac: HmacSha256,
    clock: SharedClock,
}

impl QrTokenCodec {
    /// Creates a codec. The secret is trimmed before use.
    ///
    /// # Errors
    ///
    /// Returns [`QrTokenError::Unavailable`] if the secret is blank.
    pub fn new(secret: &str, clock: SharedClock) -> Result<Self, QrTokenError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(QrTokenError::Unavailable);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| QrTokenError::Unavailable)?;
        Ok(Self { mac, clock })
    }

    fn sign(&self, id: i64, expiry: i64) -> [u8; QR_SIGNATURE_LEN] {
        let mut mac = self.mac.clone();
        mac.update(format!("{QR_TOKEN_VERSION}|{id}|{expiry}").as_bytes());
        let digest = mac.finalize().into_bytes();

        let mut signature = [0u8; QR_SIGNATURE_LEN];
        signature.copy_from_slice(&digest[..QR_SIGNATURE_LEN]);
        signature
    }

    /// Mints a token for `id` that expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`QrTokenError::Invalid`] if the expiry cannot be represented
    /// as a positive Unix timestamp.
    #[tracing::instrument(skip(self, id), fields(record_id = %id))]
    pub fn mint(&self, id: RecordId, ttl: Duration) -> Result<String, QrTokenError> {
        let expiry = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|ttl| self.clock.now().timestamp().checked_add(ttl))
            .filter(|expiry| *expiry > 0)
            .ok_or_else(|| QrTokenError::invalid("expiry out of range"))?;

        let signature = SIGNATURE_ENGINE.encode(self.sign(id.get(), expiry));
        tracing::debug!(expiry, "qr token minted");
        Ok(format!("{QR_TOKEN_VERSION}.{id}.{expiry}.{signature}"))
    }

    /// Verifies a token and returns the record identifier it carries.
    ///
    /// Verification has no side effects; the same token always yields the
    /// same result at the same instant.
    ///
    /// # Errors
    ///
    /// - [`QrTokenError::Invalid`] for structural, version, number or
    ///   signature failures
    /// - [`QrTokenError::Expired`] if the token is authentic and
    ///   `now > expiry`
    #[tracing::instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<RecordId, QrTokenError> {
        let result = self.verify_inner(token);
        if let Err(ref e) = result {
            tracing::warn!(error = %e, "qr token rejected");
        }
        result
    }

    fn verify_inner(&self, token: &str) -> Result<RecordId, QrTokenError> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        let [version, id, expiry, signature] = parts.as_slice() else {
            return Err(QrTokenError::invalid("expected four segments"));
        };

        if *version != QR_TOKEN_VERSION {
            return Err(QrTokenError::invalid("unsupported version"));
        }

        let id = id
            .parse::<i64>()
            .ok()
            .and_then(RecordId::new)
            .ok_or_else(|| QrTokenError::invalid("record id is not a positive integer"))?;

        let expiry = expiry
            .parse::<i64>()
            .ok()
            .filter(|expiry| *expiry > 0)
            .ok_or_else(|| QrTokenError::invalid("expiry is not a positive integer"))?;

        if signature.trim().is_empty() {
            return Err(QrTokenError::invalid("empty signature"));
        }
        let provided = SIGNATURE_ENGINE
            .decode(signature)
            .map_err(|_| QrTokenError::invalid("signature is not base64url"))?;

        let expected = self.sign(id.get(), expiry);
        if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            return Err(QrTokenError::invalid("signature mismatch"));
        }

        if self.clock.now().timestamp() > expiry {
            return Err(QrTokenError::Expired);
        }

        Ok(id)
    }
}

impl fmt::Debug for QrTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QrTokenCodec").finish_non_exhaustive()
    }
}

/// QR verification capability, fixed at startup.
#[derive(Debug, Clone)]
pub enum QrVerifier {
    /// A secret is configured.
    Configured(QrTokenCodec),
    /// No secret is configured; every call fails with
    /// [`QrTokenError::Unavailable`].
    Unavailable,
}

impl QrVerifier {
    /// Builds the verifier from the configured QR secret.
    #[must_use]
    pub fn from_config(config: &AuthConfig, clock: SharedClock) -> Self {
        match config.qr_secret().map(|secret| QrTokenCodec::new(secret.expose(), clock)) {
            Some(Ok(codec)) => Self::Configured(codec),
            Some(Err(_)) | None => {
                tracing::info!("qr secret not configured; qr verification unavailable");
                Self::Unavailable
            },
        }
    }

    /// Returns `true` if a codec is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// Mints a token; see [`QrTokenCodec::mint`].
    ///
    /// # Errors
    ///
    /// Returns [`QrTokenError::Unavailable`] when unconfigured, otherwise the
    /// errors of [`QrTokenCodec::mint`].
    pub fn mint(&self, id: RecordId, ttl: Duration) -> Result<String, QrTokenError> {
        match self {
            Self::Configured(codec) => codec.mint(id, ttl),
            Self::Unavailable => Err(QrTokenError::Unavailable),
        }
    }

    /// Verifies a token; see [`QrTokenCodec::verify`].
    ///
    /// # Errors
    ///
    /// Returns [`QrTokenError::Unavailable`] when unconfigured, otherwise the
    /// errors of [`QrTokenCodec::verify`].
    pub fn verify(&self, token: &str) -> Result<RecordId, QrTokenError> {
        match self {
            Self::Configured(codec) => codec.verify(token),
            Self::Unavailable => Err(QrTokenError::Unavailable),
        }
    }
}
