//! Login principal verification.
//!
//! Secrets are reduced to SHA-256 digests at construction and compared with
//! [`subtle::ConstantTimeEq`], so the comparison cost does not depend on
//! where (or whether) the presented password diverges from the stored one.
//! Unknown usernames are compared against a fixed dummy digest and take the
//! same path as known ones.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

use crate::config::{AuthConfig, Secret};

type SecretDigest = Zeroizing<[u8; 32]>;

const UNKNOWN_PRINCIPAL_MARKER: &[u8] = b"pases-authn/unknown-principal";

fn digest(bytes: &[u8]) -> SecretDigest {
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

/// Read-only username to secret mapping.
///
/// Usernames are case-sensitive and trimmed, both when loaded and when looked
/// up. Entries with a blank username or blank secret are ignored.
pub struct CredentialStore {
    principals: HashMap<String, SecretDigest>,
    dummy: SecretDigest,
}

impl CredentialStore {
    /// Builds a store from `(username, secret)` pairs.
    pub fn new<I, U>(principals: I) -> Self
    where
        I: IntoIterator<Item = (U, Secret)>,
        U: AsRef<str>,
    {
        let principals = principals
            .into_iter()
            .filter_map(|(user, secret)| {
                let user = user.as_ref().trim();
                if user.is_empty() || secret.is_blank() {
                    return None;
                }
                Some((user.to_string(), digest(secret.expose().as_bytes())))
            })
            .collect();

        Self { principals, dummy: digest(UNKNOWN_PRINCIPAL_MARKER) }
    }

    /// Builds a store from the configured principals.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.principals().iter().map(|(user, secret)| (user, secret.clone())))
    }

    /// Returns the number of loaded principals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    /// Returns `true` if no principal is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }

    /// Checks a username/password pair.
    ///
    /// Returns `false` for unknown usernames without signalling the reason.
    #[must_use]
    pub fn validate(&self, username: &str, password: &str) -> bool {
        let presented = digest(password.as_bytes());
        let (expected, known) = match self.principals.get(username.trim()) {
            Some(stored) => (stored, Choice::from(1)),
            None => (&self.dummy, Choice::from(0)),
        };

        bool::from(presented.as_slice().ct_eq(expected.as_slice()) & known)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("principals", &self.principals.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
