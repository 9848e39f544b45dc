use serde::{Deserialize, Serialize};

use esmc_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(str::to_string),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(str::to_string),
            retryable: error.is_retryable(),
        }
    }
}

pub mod general;
pub mod integrity;
pub mod license;

pub use general::*;
pub use integrity::*;
pub use license::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings and operation failures
    General(GeneralEvent),

    /// License validation events
    License(LicenseEvent),

    /// Package integrity verification events
    Integrity(IntegrityEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::OperationFailed { .. })
            | Self::Integrity(IntegrityEvent::SignatureMismatch { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::License(
                LicenseEvent::BlessingDegraded { .. } | LicenseEvent::EndDateUnreadable { .. },
            )
            | Self::Integrity(
                IntegrityEvent::FileModified { .. }
                | IntegrityEvent::FileMissing { .. }
                | IntegrityEvent::ManifestCountMismatch { .. },
            ) => Level::WARN,

            Self::Integrity(IntegrityEvent::FileVerified { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "esmc::events::general",
            Self::License(_) => "esmc::events::license",
            Self::Integrity(_) => "esmc::events::integrity",
        }
    }

    /// Whether the event is a diagnostic the CLI should only show when verbose
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        self.log_level() == tracing::Level::WARN
    }
}
