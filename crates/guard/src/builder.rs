//! Builder pattern for `IntegrityVerifier`

use esmc_config::constants::{DEFAULT_KEY_PREFIX, DEFAULT_MARKER_DIR};
use esmc_config::Config;
use esmc_errors::{Error, IntegrityError};
use esmc_events::EventSender;
use esmc_hash::{FileHasher, FileHasherConfig};
use esmc_signing::KeySource;
use esmc_types::SignaturePayload;
use std::path::PathBuf;
use std::time::Duration;

use crate::verifier::IntegrityVerifier;

/// Builder for `IntegrityVerifier`
#[derive(Debug, Clone)]
pub struct IntegrityVerifierBuilder {
    root: Option<PathBuf>,
    marker: String,
    keys: KeySource,
    payload: SignaturePayload,
    timeout: Option<Duration>,
    max_concurrency: usize,
    tx: Option<EventSender>,
}

impl IntegrityVerifierBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            marker: DEFAULT_MARKER_DIR.to_string(),
            keys: KeySource::Derived {
                prefix: DEFAULT_KEY_PREFIX.to_string(),
            },
            payload: SignaturePayload::default(),
            timeout: None,
            max_concurrency: FileHasherConfig::default().max_concurrency,
            tx: None,
        }
    }

    /// Take marker, key source, payload, deadline and concurrency from config
    ///
    /// An explicit `paths.root` also sets the package root.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        if let Some(root) = &config.paths.root {
            self.root = Some(root.clone());
        }
        self.marker.clone_from(&config.paths.marker_dir);
        self.keys = KeySource::from_parts(
            &config.integrity.key_prefix,
            config.integrity.secret.as_deref(),
        );
        self.payload = config.integrity.signature_payload;
        self.timeout = Some(config.integrity.io_timeout());
        self.max_concurrency = config.integrity.max_concurrency;
        self
    }

    /// Set the package root
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the marker directory name
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set where the HMAC key comes from
    #[must_use]
    pub fn with_key_source(mut self, keys: KeySource) -> Self {
        self.keys = keys;
        self
    }

    /// Set which byte form of the manifest is signed
    #[must_use]
    pub fn with_payload(mut self, payload: SignaturePayload) -> Self {
        self.payload = payload;
        self
    }

    /// Set the per-file read deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Build the verifier
    ///
    /// # Errors
    ///
    /// Returns an error if no root was given or a setting is out of range.
    pub fn build(self) -> Result<IntegrityVerifier, Error> {
        let root = self.root.ok_or_else(|| IntegrityError::ConfigurationError {
            field: "root".to_string(),
            reason: "package root not set".to_string(),
        })?;

        if self.marker.is_empty() {
            return Err(IntegrityError::ConfigurationError {
                field: "marker".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.max_concurrency == 0 {
            return Err(IntegrityError::ConfigurationError {
                field: "max_concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        let hasher = FileHasher::new(FileHasherConfig {
            max_concurrency: self.max_concurrency,
            timeout: self.timeout,
        });

        Ok(IntegrityVerifier::new(
            root,
            self.marker,
            self.keys,
            self.payload,
            hasher,
            self.tx,
        ))
    }
}

impl Default for IntegrityVerifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
