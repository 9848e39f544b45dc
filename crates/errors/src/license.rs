//! License validation error types
//!
//! These cover failures outside the tagged validation result. A license
//! file that cannot be read at all surfaces as [`crate::Error::Io`].

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum LicenseError {
    #[error("license record is invalid: {message}")]
    InvalidRecord { message: String },
}

impl LicenseError {
    #[must_use]
    pub fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidRecord { .. } => "license.invalid_record",
        };
        Some(code)
    }
}
