#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the esmc license and integrity tools
//!
//! This crate provides the on-disk records (license, blessing, manifest,
//! signature) and the derived results produced by the verifiers.

pub mod integrity;
pub mod license;

// Re-export commonly used types
pub use integrity::{
    FileVerdict, IntegrityManifest, IntegrityOutcome, IntegrityReport, PackageSignature,
    SignaturePayload,
};
pub use license::{
    parse_end_date, BlessingRecord, EvaluatedLicense, LicenseFailure, LicenseRecord,
    FREE_TIER,
};

use serde::{Deserialize, Serialize};

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}
