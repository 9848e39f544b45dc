//! License and blessing records

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Tier every expired license is downgraded to
pub const FREE_TIER: &str = "FREE";

/// Local license record (`.esmc-license.json`)
///
/// `email` and `tier` are required by validation, but are modelled as
/// optional here so that a record missing them is reported as an invalid
/// format rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    /// Token present only when the license was endorsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blessing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vercel_checksum: Option<String>,
    /// Absent means the subscription never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_end_date: Option<String>,
    /// Display only; a value of the wrong type reads as absent
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub issued_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

impl LicenseRecord {
    /// Email, treating an empty string as absent
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|s| !s.is_empty())
    }

    /// Stored tier, treating an empty string as absent
    #[must_use]
    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref().filter(|s| !s.is_empty())
    }

    /// Blessing token, treating an empty string as absent
    #[must_use]
    pub fn blessing(&self) -> Option<&str> {
        self.blessing.as_deref().filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn vercel_checksum(&self) -> Option<&str> {
        self.vercel_checksum.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether both required fields carry a value
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        self.email().is_some() && self.tier().is_some()
    }
}

/// Separately stored blessing (`.esmc-guardian-blessing.json`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlessingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vercel_checksum: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Plain(String),
        Other(IgnoredAny),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::Plain(s) => Some(s),
        Text::Other(_) => None,
    })
}

impl BlessingRecord {
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn vercel_checksum(&self) -> Option<&str> {
        self.vercel_checksum.as_deref().filter(|s| !s.is_empty())
    }
}

/// Parse an ISO-8601 date or timestamp
///
/// Accepts RFC 3339 timestamps, naive timestamps (read as UTC) and plain
/// `YYYY-MM-DD` dates (midnight UTC).
#[must_use]
pub fn parse_end_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reason a license evaluated as invalid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseFailure {
    /// No license file; a legitimate unauthenticated state
    NotConfigured,
    /// License file is not valid JSON
    ParseError(String),
    /// Required `email` or `tier` missing
    InvalidFormat,
    /// Blessing token differs from the license's blessing
    BlessingMismatch,
    /// Both records carry a checksum and they differ
    ChecksumMismatch,
}

impl fmt::Display for LicenseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Not configured"),
            Self::ParseError(message) => write!(f, "Parse error: {message}"),
            Self::InvalidFormat => write!(f, "Invalid license format (missing email or tier)"),
            Self::BlessingMismatch => {
                write!(f, "Blessing validation failed (tampered license detected)")
            }
            Self::ChecksumMismatch => write!(
                f,
                "Checksum validation failed (license authenticity check failed)"
            ),
        }
    }
}

impl Serialize for LicenseFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Result of a single validation call; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluatedLicense {
    pub valid: bool,
    pub tier: Option<String>,
    pub expired: bool,
    pub error: Option<LicenseFailure>,
}

impl EvaluatedLicense {
    #[must_use]
    pub fn invalid(failure: LicenseFailure) -> Self {
        Self {
            valid: false,
            tier: None,
            expired: false,
            error: Some(failure),
        }
    }

    #[must_use]
    pub fn active(tier: impl Into<String>) -> Self {
        Self {
            valid: true,
            tier: Some(tier.into()),
            expired: false,
            error: None,
        }
    }

    /// Valid and untampered, but past its end date: downgraded to FREE
    #[must_use]
    pub fn expired() -> Self {
        Self {
            valid: true,
            tier: Some(FREE_TIER.to_string()),
            expired: true,
            error: None,
        }
    }

    /// Process exit code for CLI callers
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.valid)
    }
}
