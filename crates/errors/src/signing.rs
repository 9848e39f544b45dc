//! Signing error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SigningError {
    #[error("signing key is empty")]
    EmptyKey,

    #[error("invalid signing payload: {0}")]
    InvalidPayload(String),
}

impl SigningError {
    #[must_use]
    pub fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyKey => Some("Set a non-empty ESMC_SIGNING_SECRET or key prefix."),
            Self::InvalidPayload(_) => Some("The manifest must be a valid JSON document."),
        }
    }

    #[must_use]
    pub fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::EmptyKey => "signing.empty_key",
            Self::InvalidPayload(_) => "signing.invalid_payload",
        };
        Some(code)
    }
}
