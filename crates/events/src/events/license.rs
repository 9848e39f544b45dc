use serde::{Deserialize, Serialize};

/// License validation events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LicenseEvent {
    /// Validation of a license file began
    ValidationStarted { path: String },

    /// Blessing file was present but unusable; validation continued without it
    BlessingDegraded { reason: String },

    /// Subscription end date could not be parsed and was treated as open ended
    EndDateUnreadable { value: String },

    /// Validation produced a result
    ValidationCompleted {
        valid: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        tier: Option<String>,
        expired: bool,
    },
}
