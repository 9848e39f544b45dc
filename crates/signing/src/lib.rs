#![deny(clippy::pedantic, unsafe_code)]

//! HMAC-SHA256 signing of integrity manifests
//!
//! The key is always the SHA-256 of some key material: either a fixed
//! prefix joined with the manifest's build version, or an externally
//! supplied secret. The signature is the lowercase hex HMAC of the signed
//! payload, which is the manifest file's bytes (or their compact form).

use esmc_errors::{Error, SigningError};
use esmc_types::SignaturePayload;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm label written next to generated signatures
pub const ALGORITHM: &str = "hmac-sha256";

/// Where the HMAC key material comes from
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Fixed prefix combined with the manifest's build version
    Derived { prefix: String },
    /// Externally supplied passphrase
    Secret(String),
}

impl KeySource {
    /// Secret wins over the derived prefix when present
    #[must_use]
    pub fn from_parts(prefix: &str, secret: Option<&str>) -> Self {
        match secret {
            Some(secret) => Self::Secret(secret.to_string()),
            None => Self::Derived {
                prefix: prefix.to_string(),
            },
        }
    }

    /// Resolve the key for a given manifest build version
    ///
    /// # Errors
    /// Returns an error if a secret override is empty.
    pub fn key_for(&self, build_version: &str) -> Result<SigningKey, Error> {
        match self {
            Self::Derived { prefix } => Ok(SigningKey::derive(prefix, build_version)),
            Self::Secret(secret) => SigningKey::from_secret(secret),
        }
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Derived { prefix } => f.debug_struct("Derived").field("prefix", prefix).finish(),
            Self::Secret(_) => f.debug_tuple("Secret").field(&"[REDACTED]").finish(),
        }
    }
}

/// 32-byte HMAC key
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    bytes: [u8; 32],
}

impl SigningKey {
    /// Key from the fixed prefix and a build version
    #[must_use]
    pub fn derive(prefix: &str, build_version: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(prefix.as_bytes());
        hasher.update(build_version.as_bytes());
        Self {
            bytes: hasher.finalize().into(),
        }
    }

    /// Key from an override secret, hashed once
    ///
    /// # Errors
    /// Returns an error if the secret is empty.
    pub fn from_secret(secret: &str) -> Result<Self, Error> {
        if secret.is_empty() {
            return Err(SigningError::EmptyKey.into());
        }
        Ok(Self {
            bytes: Sha256::digest(secret.as_bytes()).into(),
        })
    }

    /// Hex HMAC-SHA256 of `payload`
    ///
    /// # Panics
    /// Never in practice: HMAC accepts keys of any length.
    #[must_use]
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.bytes).expect("HMAC can take key of any size");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Whether `signature` is exactly the hex HMAC of `payload`
    #[must_use]
    pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
        self.sign(payload) == signature
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Select the bytes a signature covers
///
/// # Errors
/// Returns an error in compact mode if the manifest is not valid JSON.
pub fn signing_payload(manifest_bytes: &[u8], mode: SignaturePayload) -> Result<Cow<'_, [u8]>, Error> {
    match mode {
        SignaturePayload::Raw => Ok(Cow::Borrowed(manifest_bytes)),
        SignaturePayload::Compact => {
            let value: serde_json::Value = serde_json::from_slice(manifest_bytes)
                .map_err(|e| SigningError::InvalidPayload(e.to_string()))?;
            let compact = serde_json::to_vec(&value)
                .map_err(|e| SigningError::InvalidPayload(e.to_string()))?;
            Ok(Cow::Owned(compact))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_stable_lowercase_hex() {
        let key = SigningKey::derive("esmc-integrity:", "1.0.0");
        let first = key.sign(b"payload");
        let second = key.sign(b"payload");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_build_version_changes_key() {
        let a = SigningKey::derive("esmc-integrity:", "1.0.0");
        let b = SigningKey::derive("esmc-integrity:", "1.0.1");
        assert_ne!(a.sign(b"x"), b.sign(b"x"));
    }

    #[test]
    fn test_secret_is_hashed_once() {
        let key = SigningKey::from_secret("hunter2").unwrap();
        let expected: [u8; 32] = Sha256::digest(b"hunter2").into();
        assert_eq!(key.bytes, expected);
    }

    #[test]
    fn test_secret_source_ignores_build_version() {
        let source = KeySource::from_parts("esmc-integrity:", Some("hunter2"));
        let a = source.key_for("1.0.0").unwrap();
        let b = source.key_for("9.9.9").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SigningKey::from_secret(""),
            Err(Error::Signing(SigningError::EmptyKey))
        ));
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let source = KeySource::Secret("hunter2".into());
        assert!(!format!("{source:?}").contains("hunter2"));
        let key = source.key_for("1").unwrap();
        assert!(format!("{key:?}").contains("[REDACTED]"));
    }
}
