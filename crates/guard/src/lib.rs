#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package integrity verification for esmc
//!
//! A package ships an integrity manifest (relative path to SHA-256) inside
//! its marker directory and an HMAC signature over that manifest at its
//! root. [`IntegrityVerifier`] checks the signature first and only then
//! re-hashes every listed file. [`ManifestGenerator`] produces both files.

mod builder;
mod generate;
mod verifier;

pub use builder::IntegrityVerifierBuilder;
pub use generate::{BuildInfo, ManifestGenerator};
pub use verifier::IntegrityVerifier;

pub use esmc_signing::KeySource;
pub use esmc_types::{FileVerdict, IntegrityOutcome, IntegrityReport};
