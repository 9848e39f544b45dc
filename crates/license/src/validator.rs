//! License validator

use chrono::{DateTime, Utc};
use esmc_config::constants::{BLESSING_FILE, LICENSE_FILE};
use esmc_errors::{Error, LicenseError};
use esmc_events::{EventEmitter, EventSender, LicenseEvent};
use esmc_types::{parse_end_date, BlessingRecord, EvaluatedLicense, LicenseFailure, LicenseRecord};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::status::StatusReport;

/// Validates the license stored under `<root>/<marker>/`
#[derive(Debug, Clone)]
pub struct LicenseValidator {
    marker_path: PathBuf,
    tx: Option<EventSender>,
}

/// How a subscription end date relates to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expiry {
    Open,
    Until(DateTime<Utc>),
    Lapsed,
    Unreadable,
}

impl Expiry {
    pub(crate) fn of(end_date: Option<&str>, now: DateTime<Utc>) -> Self {
        match end_date.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::Open,
            Some(raw) => match parse_end_date(raw) {
                Some(end) if end < now => Self::Lapsed,
                Some(end) => Self::Until(end),
                None => Self::Unreadable,
            },
        }
    }
}

impl EventEmitter for LicenseValidator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl LicenseValidator {
    /// Create a validator for an explicit project root
    pub fn new(root: impl AsRef<Path>, marker: &str) -> Self {
        Self {
            marker_path: root.as_ref().join(marker),
            tx: None,
        }
    }

    /// Report degraded checks and other diagnostics through `tx`
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn license_path(&self) -> PathBuf {
        self.marker_path.join(LICENSE_FILE)
    }

    #[must_use]
    pub fn blessing_path(&self) -> PathBuf {
        self.marker_path.join(BLESSING_FILE)
    }

    /// Validate against the current time
    ///
    /// # Errors
    ///
    /// Returns an error only when the license file exists but cannot be
    /// read (for example permission denied).
    pub async fn validate(&self) -> Result<EvaluatedLicense, Error> {
        self.validate_at(Utc::now()).await
    }

    /// Validate against an explicit instant
    ///
    /// # Errors
    ///
    /// Returns an error only when the license file exists but cannot be read.
    pub async fn validate_at(&self, now: DateTime<Utc>) -> Result<EvaluatedLicense, Error> {
        let path = self.license_path();
        let Some(bytes) = read_if_present(&path).await? else {
            tracing::debug!(path = %path.display(), "no license file");
            return Ok(EvaluatedLicense::invalid(LicenseFailure::NotConfigured));
        };

        self.emit_license(LicenseEvent::ValidationStarted {
            path: path.display().to_string(),
        });
        let evaluated = self.evaluate(&bytes, now).await;
        self.emit_license(LicenseEvent::ValidationCompleted {
            valid: evaluated.valid,
            tier: evaluated.tier.clone(),
            expired: evaluated.expired,
        });
        Ok(evaluated)
    }

    /// Load the license record without validating it
    ///
    /// Returns `None` when no license file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a license record.
    pub async fn load_record(&self) -> Result<Option<LicenseRecord>, Error> {
        let path = self.license_path();
        let Some(bytes) = read_if_present(&path).await? else {
            return Ok(None);
        };
        let record = serde_json::from_slice(&bytes).map_err(|e| LicenseError::InvalidRecord {
            message: e.to_string(),
        })?;
        Ok(Some(record))
    }

    /// Validate and collect the facts shown by `status`
    ///
    /// # Errors
    ///
    /// Returns an error only when the license file exists but cannot be read.
    pub async fn status_at(&self, now: DateTime<Utc>) -> Result<StatusReport, Error> {
        let evaluated = self.validate_at(now).await?;
        // A record that fails to load is already described by `evaluated`
        let record = if evaluated.valid {
            self.load_record().await.ok().flatten()
        } else {
            None
        };
        Ok(StatusReport::from_license(record.as_ref(), &evaluated, now))
    }

    async fn evaluate(&self, bytes: &[u8], now: DateTime<Utc>) -> EvaluatedLicense {
        let record = match parse_record(bytes) {
            Ok(record) => record,
            Err(failure) => return EvaluatedLicense::invalid(failure),
        };

        if !record.has_required_fields() {
            return EvaluatedLicense::invalid(LicenseFailure::InvalidFormat);
        }

        if let Some(token) = record.blessing() {
            if let Some(failure) = self.check_blessing(&record, token).await {
                return EvaluatedLicense::invalid(failure);
            }
        }

        let tier = record.tier().unwrap_or_default();
        match Expiry::of(record.subscription_end_date.as_deref(), now) {
            Expiry::Lapsed => {
                tracing::debug!(tier, "subscription lapsed, downgrading");
                EvaluatedLicense::expired()
            }
            Expiry::Unreadable => {
                let value = record.subscription_end_date.clone().unwrap_or_default();
                tracing::debug!(%value, "unparseable subscription end date");
                self.emit_license(LicenseEvent::EndDateUnreadable { value });
                EvaluatedLicense::active(tier)
            }
            Expiry::Open | Expiry::Until(_) => EvaluatedLicense::active(tier),
        }
    }

    /// Cross-check the blessing record. Only a mismatch is a failure.
    async fn check_blessing(&self, record: &LicenseRecord, token: &str) -> Option<LicenseFailure> {
        let path = self.blessing_path();
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.degraded("blessing file not found");
                return None;
            }
            Err(e) => {
                self.degraded(format!("blessing file unreadable: {e}"));
                return None;
            }
        };

        let blessing: BlessingRecord = match serde_json::from_slice(&bytes) {
            Ok(blessing) => blessing,
            Err(e) => {
                self.degraded(format!("blessing file corrupt: {e}"));
                return None;
            }
        };

        if blessing.token() != Some(token) {
            return Some(LicenseFailure::BlessingMismatch);
        }

        match (record.vercel_checksum(), blessing.vercel_checksum()) {
            (Some(ours), Some(theirs)) if ours != theirs => Some(LicenseFailure::ChecksumMismatch),
            _ => None,
        }
    }

    fn degraded(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::debug!(%reason, "blessing check degraded");
        self.emit_license(LicenseEvent::BlessingDegraded { reason });
    }
}

async fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>, Error> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

fn parse_record(bytes: &[u8]) -> Result<LicenseRecord, LicenseFailure> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| LicenseFailure::ParseError(e.to_string()))?;
    if !value.is_object() {
        return Err(LicenseFailure::InvalidFormat);
    }
    serde_json::from_value(value).map_err(|e| LicenseFailure::ParseError(e.to_string()))
}
