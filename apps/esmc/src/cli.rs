//! Command line interface definition

use clap::{CommandFactory, Parser, Subcommand};
use esmc_types::ColorChoice;
use std::path::PathBuf;

/// esmc - local license status
#[derive(Parser)]
#[command(name = "esmc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Local license status for esmc")]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Show non-essential warnings
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root (skips upward discovery)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Print the effective license tier, or "Not configured" when there is none
    Tier,

    /// Print a license status report
    Status,

    /// Print usage
    Help,
}

/// Print the full usage text to stdout
pub fn print_usage() {
    println!("{}", Cli::command().render_help());
}
