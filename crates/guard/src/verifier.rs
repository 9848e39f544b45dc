//! Package integrity verifier

use esmc_config::constants::{MANIFEST_FILE, SIGNATURE_FILE};
use esmc_errors::{Error, UserFacingError};
use esmc_events::{EventEmitter, EventSender, IntegrityEvent};
use esmc_hash::{FileHashResult, FileHasher};
use esmc_signing::{signing_payload, KeySource, ALGORITHM};
use esmc_types::{
    FileVerdict, IntegrityManifest, IntegrityOutcome, IntegrityReport, PackageSignature,
    SignaturePayload,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;

use crate::builder::IntegrityVerifierBuilder;

/// Verifies a package against its signed integrity manifest
///
/// Verification is read-only. The signature is checked before any listed
/// file is hashed; a mismatch stops verification.
#[derive(Debug, Clone)]
pub struct IntegrityVerifier {
    root: PathBuf,
    marker: String,
    keys: KeySource,
    payload: SignaturePayload,
    hasher: FileHasher,
    tx: Option<EventSender>,
}

impl EventEmitter for IntegrityVerifier {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl IntegrityVerifier {
    pub(crate) fn new(
        root: PathBuf,
        marker: String,
        keys: KeySource,
        payload: SignaturePayload,
        hasher: FileHasher,
        tx: Option<EventSender>,
    ) -> Self {
        Self {
            root,
            marker,
            keys,
            payload,
            hasher,
            tx,
        }
    }

    /// Create a builder
    #[must_use]
    pub fn builder() -> IntegrityVerifierBuilder {
        IntegrityVerifierBuilder::new()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.marker).join(MANIFEST_FILE)
    }

    #[must_use]
    pub fn signature_path(&self) -> PathBuf {
        self.root.join(SIGNATURE_FILE)
    }

    /// Verify the package
    ///
    /// Missing, malformed or mis-signed manifests and changed files are all
    /// reported through the returned [`IntegrityReport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest or signature exists but cannot be
    /// read, if the signing key cannot be resolved, or if the hashing
    /// workers fail.
    pub async fn verify_package(&self) -> Result<IntegrityReport, Error> {
        let started = Instant::now();
        self.emit_integrity(IntegrityEvent::Started {
            root: self.root.display().to_string(),
        });

        let report = match self.run(started).await {
            Ok(report) => report,
            Err(e) => {
                self.emit_operation_failed("verify package", &e);
                return Err(e);
            }
        };

        tracing::debug!(
            outcome = ?report.outcome,
            verified = report.verified.len(),
            modified = report.modified.len(),
            missing = report.missing.len(),
            "package verification finished"
        );
        self.emit_integrity(IntegrityEvent::Completed {
            passed: report.is_safe(),
            verified: report.verified.len(),
            modified: report.modified.len(),
            missing: report.missing.len(),
            duration_ms: report.duration_ms,
        });
        Ok(report)
    }

    async fn run(&self, started: Instant) -> Result<IntegrityReport, Error> {
        let Some(manifest_bytes) = read_if_present(&self.manifest_path()).await? else {
            return Ok(IntegrityReport::aborted(
                IntegrityOutcome::ManifestMissing,
                elapsed_ms(started),
            ));
        };
        let Some(signature_bytes) = read_if_present(&self.signature_path()).await? else {
            return Ok(IntegrityReport::aborted(
                IntegrityOutcome::SignatureMissing,
                elapsed_ms(started),
            ));
        };

        let manifest: IntegrityManifest = match serde_json::from_slice(&manifest_bytes) {
            Ok(manifest) => manifest,
            Err(e) => return Ok(malformed(MANIFEST_FILE, &e, started)),
        };
        let signature: PackageSignature = match serde_json::from_slice(&signature_bytes) {
            Ok(signature) => signature,
            Err(e) => return Ok(malformed(SIGNATURE_FILE, &e, started)),
        };

        // Informational only; the signature is always checked as HMAC-SHA256
        if let Some(algorithm) = signature.algorithm.as_deref() {
            if algorithm != ALGORITHM {
                self.emit_warning_with_context(
                    "signature declares an unexpected algorithm",
                    format!("{algorithm} (verifying as {ALGORITHM})"),
                );
            }
        }

        let key = self.keys.key_for(&manifest.build_version)?;
        let payload = signing_payload(&manifest_bytes, self.payload)?;
        if !key.verify(&payload, &signature.signature) {
            tracing::debug!(build_version = %manifest.build_version, "manifest signature mismatch");
            self.emit_integrity(IntegrityEvent::SignatureMismatch {
                build_version: manifest.build_version.clone(),
            });
            let mut report =
                IntegrityReport::aborted(IntegrityOutcome::SignatureMismatch, elapsed_ms(started));
            report.build_version = Some(manifest.build_version);
            return Ok(report);
        }
        self.emit_integrity(IntegrityEvent::SignatureVerified {
            build_version: manifest.build_version.clone(),
        });

        if !manifest.count_matches() {
            self.emit_integrity(IntegrityEvent::ManifestCountMismatch {
                declared: manifest.total_files,
                actual: manifest.checksums.len() as u64,
            });
        }

        self.check_files(manifest, started).await
    }

    /// Hash every listed file and sort the findings
    async fn check_files(
        &self,
        manifest: IntegrityManifest,
        started: Instant,
    ) -> Result<IntegrityReport, Error> {
        let outcomes = self
            .hasher
            .hash_each(&self.root, manifest.checksums.keys().cloned())
            .await?;

        let mut report = IntegrityReport {
            outcome: IntegrityOutcome::Passed,
            build_version: Some(manifest.build_version.clone()),
            total: manifest.checksums.len(),
            verified: Vec::new(),
            modified: Vec::new(),
            missing: Vec::new(),
            duration_ms: 0,
        };

        for (path, outcome) in outcomes {
            let expected = manifest
                .checksums
                .get(&path)
                .map_or("", String::as_str);
            match classify(expected, outcome) {
                FileVerdict::Verified => {
                    self.emit_integrity(IntegrityEvent::FileVerified { path: path.clone() });
                    report.verified.push(path);
                }
                FileVerdict::Modified { expected, actual } => {
                    self.emit_integrity(IntegrityEvent::FileModified {
                        path: path.clone(),
                        expected,
                        actual,
                    });
                    report.modified.push(path);
                }
                FileVerdict::Missing { reason } => {
                    self.emit_integrity(IntegrityEvent::FileMissing {
                        path: path.clone(),
                        reason,
                    });
                    report.missing.push(path);
                }
            }
        }

        if !report.modified.is_empty() || !report.missing.is_empty() {
            report.outcome = IntegrityOutcome::FilesChanged;
        }
        report.duration_ms = elapsed_ms(started);
        Ok(report)
    }
}

/// Verdict for one entry; any read failure counts as missing
fn classify(expected: &str, outcome: Result<FileHashResult, Error>) -> FileVerdict {
    match outcome {
        Ok(result) => {
            let actual = result.hash.to_hex();
            if actual == expected {
                FileVerdict::Verified
            } else {
                FileVerdict::Modified {
                    expected: expected.to_string(),
                    actual,
                }
            }
        }
        Err(e) => FileVerdict::Missing {
            reason: e.user_message().into_owned(),
        },
    }
}

fn malformed(file: &str, err: &serde_json::Error, started: Instant) -> IntegrityReport {
    tracing::debug!(file, error = %err, "malformed integrity file");
    IntegrityReport::aborted(
        IntegrityOutcome::Malformed {
            file: file.to_string(),
            message: err.to_string(),
        },
        elapsed_ms(started),
    )
}

async fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>, Error> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use esmc_errors::StorageError;
    use esmc_hash::Hash;

    fn hashed(data: &[u8]) -> FileHashResult {
        FileHashResult {
            relative_path: "a".into(),
            hash: Hash::from_data(data),
            size: data.len() as u64,
        }
    }

    #[test]
    fn test_classify_exact_match() {
        let expected = Hash::from_data(b"abc").to_hex();
        assert_eq!(classify(&expected, Ok(hashed(b"abc"))), FileVerdict::Verified);
    }

    #[test]
    fn test_classify_uppercase_expected_is_modified() {
        let expected = Hash::from_data(b"abc").to_hex().to_uppercase();
        assert!(matches!(
            classify(&expected, Ok(hashed(b"abc"))),
            FileVerdict::Modified { .. }
        ));
    }

    #[test]
    fn test_classify_error_is_missing() {
        let err = StorageError::PathNotFound {
            path: "a".into(),
        };
        assert!(matches!(
            classify("00", Err(err.into())),
            FileVerdict::Missing { .. }
        ));
    }
}
