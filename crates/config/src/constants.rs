//! Fixed file names and environment variables
//!
//! File names are not configurable: other tools write these files and the
//! verifiers must find them where those tools put them.

/// Default marker directory used to locate a project or package root
pub const DEFAULT_MARKER_DIR: &str = ".esmc";

/// Fixed prefix joined with the build version to derive the signing key
pub const DEFAULT_KEY_PREFIX: &str = "esmc-integrity:";

/// License record, inside the marker directory
pub const LICENSE_FILE: &str = ".esmc-license.json";
/// Blessing record, inside the marker directory
pub const BLESSING_FILE: &str = ".esmc-guardian-blessing.json";
/// Integrity manifest, inside the marker directory
pub const MANIFEST_FILE: &str = ".integrity-manifest.json";
/// Package signature, at the package root
pub const SIGNATURE_FILE: &str = ".package-signature";

pub const ENV_VERBOSE: &str = "ESMC_VERBOSE";
pub const ENV_SIGNING_SECRET: &str = "ESMC_SIGNING_SECRET";
pub const ENV_ROOT: &str = "ESMC_ROOT";
pub const ENV_IO_TIMEOUT: &str = "ESMC_IO_TIMEOUT";
pub const ENV_COLOR: &str = "ESMC_COLOR";
