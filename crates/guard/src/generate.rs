//! Manifest and signature generation

use chrono::Utc;
use esmc_config::constants::{MANIFEST_FILE, SIGNATURE_FILE};
use esmc_errors::{Error, IntegrityError};
use esmc_hash::{FileHashResult, FileHasher, FileHasherConfig};
use esmc_signing::{signing_payload, KeySource, ALGORITHM};
use esmc_types::{IntegrityManifest, PackageSignature, SignaturePayload};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Build description written into a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub build_version: String,
    pub build_date: String,
    pub architecture: String,
}

/// Writes a signed integrity manifest for a package
#[derive(Debug, Clone)]
pub struct ManifestGenerator {
    root: PathBuf,
    marker: String,
    keys: KeySource,
    payload: SignaturePayload,
    hasher: FileHasher,
}

impl ManifestGenerator {
    pub fn new(root: impl Into<PathBuf>, marker: impl Into<String>, keys: KeySource) -> Self {
        Self {
            root: root.into(),
            marker: marker.into(),
            keys,
            payload: SignaturePayload::default(),
            hasher: FileHasher::new(FileHasherConfig::default()),
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: SignaturePayload) -> Self {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: FileHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Hash `files` (package-relative) and write manifest plus signature
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be hashed, the signing key is
    /// unusable, or either output file cannot be written.
    pub async fn generate<I, S>(&self, info: &BuildInfo, files: I) -> Result<IntegrityManifest, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hashed = self.hasher.hash_files(&self.root, files).await?;
        self.write(info, hashed).await
    }

    /// Manifest every file under the root except the marker directory and
    /// the signature itself
    ///
    /// # Errors
    ///
    /// Returns an error if traversal, hashing, signing or writing fails.
    pub async fn generate_all(&self, info: &BuildInfo) -> Result<IntegrityManifest, Error> {
        let hashed = self
            .hasher
            .hash_directory(&self.root, &[self.marker.as_str(), SIGNATURE_FILE])
            .await?;
        self.write(info, hashed).await
    }

    async fn write(
        &self,
        info: &BuildInfo,
        hashed: Vec<FileHashResult>,
    ) -> Result<IntegrityManifest, Error> {
        let bytes: u64 = hashed.iter().map(|result| result.size).sum();
        let checksums: BTreeMap<String, String> = hashed
            .into_iter()
            .map(|result| (result.relative_path, result.hash.to_hex()))
            .collect();

        let manifest = IntegrityManifest {
            build_version: info.build_version.clone(),
            build_date: info.build_date.clone(),
            architecture: info.architecture.clone(),
            total_files: Some(checksums.len() as u64),
            checksums,
        };

        let manifest_bytes = pretty_json(&manifest)?;
        let key = self.keys.key_for(&manifest.build_version)?;
        let payload = signing_payload(&manifest_bytes, self.payload)?;
        let signature = PackageSignature {
            signature: key.sign(&payload),
            algorithm: Some(ALGORITHM.to_string()),
            signed_at: Some(Utc::now().to_rfc3339()),
        };

        let marker_dir = self.root.join(&self.marker);
        fs::create_dir_all(&marker_dir)
            .await
            .map_err(|e| write_failed(&marker_dir, &e))?;
        write_file(&marker_dir.join(MANIFEST_FILE), &manifest_bytes).await?;
        write_file(&self.root.join(SIGNATURE_FILE), &pretty_json(&signature)?).await?;

        tracing::debug!(
            build_version = %manifest.build_version,
            files = manifest.checksums.len(),
            bytes,
            "wrote signed integrity manifest"
        );
        Ok(manifest)
    }
}

fn pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    fs::write(path, bytes)
        .await
        .map_err(|e| write_failed(path, &e))
}

fn write_failed(path: &Path, err: &std::io::Error) -> Error {
    IntegrityError::WriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}
