//! Integrity verifier configuration

use crate::constants::DEFAULT_KEY_PREFIX;
use esmc_types::SignaturePayload;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Settings for the package integrity verifier and manifest generator
#[derive(Clone, Serialize, Deserialize)]
pub struct IntegrityConfig {
    /// Fixed prefix combined with the build version to derive the HMAC key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Replaces the derived passphrase; never written back out
    #[serde(default, skip_serializing)]
    pub secret: Option<String>,
    #[serde(default)]
    pub signature_payload: SignaturePayload,
    /// Per-file read deadline in seconds
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl IntegrityConfig {
    #[must_use]
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            secret: None,
            signature_payload: SignaturePayload::Raw,
            io_timeout_secs: default_io_timeout_secs(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl fmt::Debug for IntegrityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrityConfig")
            .field("key_prefix", &self.key_prefix)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("signature_payload", &self.signature_payload)
            .field("io_timeout_secs", &self.io_timeout_secs)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_io_timeout_secs() -> u64 {
    30
}

fn default_max_concurrency() -> usize {
    8
}
