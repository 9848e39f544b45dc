//! Facts rendered by the `status` command

use chrono::{DateTime, Utc};
use esmc_types::{parse_end_date, EvaluatedLicense, LicenseFailure, LicenseRecord};
use serde::Serialize;
use std::fmt;

use crate::validator::Expiry;

const SECS_PER_DAY: i64 = 86_400;

/// Human-facing subscription state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LicenseState {
    Active,
    ActiveUntil { days_left: i64 },
    Expired,
}

impl fmt::Display for LicenseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::ActiveUntil { days_left } => write!(f, "Active ({days_left} days left)"),
            Self::Expired => write!(f, "Expired (downgraded to FREE)"),
        }
    }
}

/// Everything `status` reports about the local license
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub valid: bool,
    /// Display name, falling back to the email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<LicenseState>,
    /// Subscription end date, `None` means it never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    pub blessed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LicenseFailure>,
}

impl StatusReport {
    /// Combine a validation result with the record it came from
    ///
    /// `record` is only consulted when `evaluated` is valid.
    #[must_use]
    pub fn from_license(
        record: Option<&LicenseRecord>,
        evaluated: &EvaluatedLicense,
        now: DateTime<Utc>,
    ) -> Self {
        let record = record.filter(|_| evaluated.valid);
        let Some(record) = record else {
            return Self {
                valid: evaluated.valid,
                name: None,
                email: None,
                tier: evaluated.tier.clone(),
                state: None,
                expires: None,
                blessed: false,
                issued: None,
                error: evaluated.error.clone(),
            };
        };

        let state = if evaluated.expired {
            LicenseState::Expired
        } else {
            match Expiry::of(record.subscription_end_date.as_deref(), now) {
                Expiry::Until(end) => LicenseState::ActiveUntil {
                    days_left: days_until(end, now),
                },
                _ => LicenseState::Active,
            }
        };

        Self {
            valid: true,
            name: record
                .display_name
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| record.email().map(str::to_string)),
            email: record.email().map(str::to_string),
            tier: evaluated.tier.clone(),
            state: Some(state),
            expires: record
                .subscription_end_date
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(format_date),
            blessed: record.blessing().is_some(),
            issued: record.issued_at.as_deref().map(format_date),
            error: None,
        }
    }
}

/// Whole days remaining, rounded up
fn days_until(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (end - now).num_seconds().max(0);
    (secs + SECS_PER_DAY - 1) / SECS_PER_DAY
}

fn format_date(raw: &str) -> String {
    parse_end_date(raw).map_or_else(
        || raw.to_string(),
        |date| date.format("%Y-%m-%d").to_string(),
    )
}
