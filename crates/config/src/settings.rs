//! General and path settings

use esmc_types::ColorChoice;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::DEFAULT_MARKER_DIR;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Show non-essential warnings (degraded blessing, manifest notes)
    #[serde(default)]
    pub verbose: bool,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            color: ColorChoice::Auto,
        }
    }
}

/// Root discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_marker_dir")]
    pub marker_dir: String,
    #[serde(default = "default_max_root_hops")]
    pub max_root_hops: usize,
    /// Explicit root; skips upward discovery when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            marker_dir: DEFAULT_MARKER_DIR.to_string(),
            max_root_hops: 10,
            root: None,
        }
    }
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_marker_dir() -> String {
    DEFAULT_MARKER_DIR.to_string()
}

fn default_max_root_hops() -> usize {
    10
}
