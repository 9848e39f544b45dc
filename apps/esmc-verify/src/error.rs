//! CLI error handling

use std::fmt;

use esmc_errors::UserFacingError;
use serde_json::json;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(esmc_errors::Error),
    /// Verification could not run to completion
    Verify(esmc_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = match self {
            CliError::Io(e) => return write!(f, "I/O error: {e}"),
            CliError::Config(e) => {
                write!(f, "Configuration error: ")?;
                e
            }
            CliError::Verify(e) => e,
        };

        write!(f, "{}", e.user_message())?;
        if let Some(code) = e.user_code() {
            write!(f, "\n  Code: {code}")?;
        }
        if let Some(hint) = e.user_hint() {
            write!(f, "\n  Hint: {hint}")?;
        }
        if e.is_retryable() {
            write!(f, "\n  Retry: safe to retry this operation.")?;
        }
        Ok(())
    }
}

impl CliError {
    /// Error object printed on stdout in `--json` mode
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CliError::Config(e) | CliError::Verify(e) => json!({
                "error": e.user_message(),
                "code": e.user_code(),
                "hint": e.user_hint(),
                "retryable": e.is_retryable(),
            }),
            CliError::Io(e) => json!({
                "error": e.to_string(),
                "code": "error.io",
                "hint": null,
                "retryable": false,
            }),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Verify(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<esmc_errors::Error> for CliError {
    fn from(e: esmc_errors::Error) -> Self {
        match e {
            esmc_errors::Error::Config(_) => CliError::Config(e),
            other => CliError::Verify(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
