#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Local license validation for esmc
//!
//! Reads the license record from the marker directory of a project root,
//! cross-checks the optional blessing record and applies the expiry policy.
//! Every expected outcome is an [`EvaluatedLicense`]; only unexpected I/O
//! surfaces as an error.

mod status;
mod validator;

pub use status::{LicenseState, StatusReport};
pub use validator::LicenseValidator;

pub use esmc_types::{EvaluatedLicense, LicenseFailure, LicenseRecord};
