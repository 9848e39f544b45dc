use serde::{Deserialize, Serialize};

/// Package integrity verification events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrityEvent {
    Started {
        root: String,
    },

    SignatureVerified {
        build_version: String,
    },

    SignatureMismatch {
        build_version: String,
    },

    /// Declared `totalFiles` disagrees with the checksum table
    ManifestCountMismatch {
        declared: Option<u64>,
        actual: u64,
    },

    FileVerified {
        path: String,
    },

    FileModified {
        path: String,
        expected: String,
        actual: String,
    },

    FileMissing {
        path: String,
        reason: String,
    },

    Completed {
        passed: bool,
        verified: usize,
        modified: usize,
        missing: usize,
        duration_ms: u64,
    },
}
