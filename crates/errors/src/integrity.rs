//! Package integrity error types

use thiserror::Error;

/// Errors emitted by the package integrity subsystem.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum IntegrityError {
    /// Writing the manifest or signature failed.
    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    /// Invalid verifier configuration.
    #[error("invalid verifier configuration for {field}: {reason}")]
    ConfigurationError { field: String, reason: String },
}

impl IntegrityError {
    #[must_use]
    pub fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::WriteFailed { .. } => Some("Ensure the package root is writable and retry."),
            Self::ConfigurationError { .. } => Some("Fix the [integrity] configuration section."),
        }
    }

    #[must_use]
    pub fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::WriteFailed { .. } => "integrity.write_failed",
            Self::ConfigurationError { .. } => "integrity.configuration",
        };
        Some(code)
    }
}
