//! Integrity manifest, package signature and verification report types

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Expected build description (`.integrity-manifest.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityManifest {
    pub build_version: String,
    pub build_date: String,
    pub architecture: String,
    /// Declared entry count; `None` when absent or not a non-negative integer
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_files: Option<u64>,
    /// Package-relative path to expected SHA-256 hex digest
    pub checksums: BTreeMap<String, String>,
}

impl IntegrityManifest {
    /// Whether the declared `totalFiles` agrees with the checksum table
    #[must_use]
    pub fn count_matches(&self) -> bool {
        self.total_files == u64::try_from(self.checksums.len()).ok()
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Exact(u64),
        Other(IgnoredAny),
    }

    Ok(match Count::deserialize(deserializer)? {
        Count::Exact(n) => Some(n),
        Count::Other(_) => None,
    })
}

/// HMAC over the manifest (`.package-signature`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSignature {
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<String>,
}

/// Which byte form of the manifest the signature covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignaturePayload {
    /// The manifest file exactly as stored on disk
    #[default]
    Raw,
    /// Compact re-serialisation of the parsed JSON, key order preserved
    Compact,
}

/// Verdict for one manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileVerdict {
    Verified,
    Modified { expected: String, actual: String },
    Missing { reason: String },
}

/// Overall outcome of a package verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityOutcome {
    /// Signature matched and every listed file verified
    Passed,
    ManifestMissing,
    SignatureMissing,
    /// Manifest or signature present but unreadable as JSON
    Malformed { file: String, message: String },
    /// Manifest was edited after signing (or signed with another key)
    SignatureMismatch,
    /// Signature matched but at least one file is modified or missing
    FilesChanged,
}

impl IntegrityOutcome {
    /// Short human description used in reports
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Passed => "package verified, safe to deploy".to_string(),
            Self::ManifestMissing => "manifest not found".to_string(),
            Self::SignatureMissing => "signature not found".to_string(),
            Self::Malformed { file, message } => format!("{file} is malformed: {message}"),
            Self::SignatureMismatch => {
                "signature verification failed, package may be tampered".to_string()
            }
            Self::FilesChanged => "checksum verification failed".to_string(),
        }
    }
}

/// Result of `verify_package`
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub outcome: IntegrityOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_version: Option<String>,
    /// Number of entries in the manifest's checksum table
    pub total: usize,
    pub verified: Vec<String>,
    pub modified: Vec<String>,
    pub missing: Vec<String>,
    pub duration_ms: u64,
}

impl IntegrityReport {
    /// Report for a verification that stopped before the checksum pass
    #[must_use]
    pub fn aborted(outcome: IntegrityOutcome, duration_ms: u64) -> Self {
        Self {
            outcome,
            build_version: None,
            total: 0,
            verified: Vec::new(),
            modified: Vec::new(),
            missing: Vec::new(),
            duration_ms,
        }
    }

    /// Whether the package may be deployed
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.outcome == IntegrityOutcome::Passed
    }

    /// Process exit code for CLI callers
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_safe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_uses_camel_case_keys() {
        let json = r#"{
            "buildVersion": "3.1.0",
            "buildDate": "2025-01-01T00:00:00Z",
            "architecture": "x64",
            "totalFiles": 1,
            "checksums": { "lib/index.js": "00" }
        }"#;
        let manifest: IntegrityManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.build_version, "3.1.0");
        assert_eq!(manifest.checksums.len(), 1);
        assert!(manifest.count_matches());
    }

    #[test]
    fn test_odd_total_files_is_tolerated() {
        for total in [r#""1""#, "-3", "1.5", "null"] {
            let json = format!(
                r#"{{"buildVersion":"1","buildDate":"d","architecture":"a",
                    "totalFiles":{total},"checksums":{{"a":"00"}}}}"#
            );
            let manifest: IntegrityManifest = serde_json::from_str(&json).unwrap();
            assert_eq!(manifest.total_files, None, "input: {total}");
            assert!(!manifest.count_matches());
        }
    }

    #[test]
    fn test_signature_extra_fields_optional() {
        let sig: PackageSignature = serde_json::from_str(r#"{"signature":"ab"}"#).unwrap();
        assert_eq!(sig.signature, "ab");
        assert!(sig.algorithm.is_none());
    }

    #[test]
    fn test_aborted_report_is_unsafe() {
        let report = IntegrityReport::aborted(IntegrityOutcome::SignatureMissing, 3);
        assert!(!report.is_safe());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.outcome.describe(), "signature not found");
    }
}
