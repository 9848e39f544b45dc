//! Command line interface definition

use clap::Parser;
use esmc_types::ColorChoice;
use std::path::PathBuf;

/// esmc-verify - check a package against its signed integrity manifest
#[derive(Parser)]
#[command(name = "esmc-verify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify package integrity before deployment")]
pub struct Cli {
    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,

    /// Show per-file details and manifest warnings
    #[arg(short, long)]
    pub verbose: bool,

    /// Color output control
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Package root (defaults to discovery from the executable's directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}
