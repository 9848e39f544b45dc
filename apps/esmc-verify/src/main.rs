//! esmc-verify - package integrity verification
//!
//! Checks the manifest signature and every listed checksum, then exits 0
//! only when the package is safe to deploy.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::Cli;
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::logging::init_tracing;
use clap::error::ErrorKind;
use clap::Parser;
use esmc_config::Config;
use esmc_events::EventReceiver;
use esmc_guard::{IntegrityReport, IntegrityVerifier};
use std::path::{Path, PathBuf};
use std::process;
use tokio::select;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            process::exit(code);
        }
    };
    let json_mode = cli.json;

    init_tracing(json_mode, cli.debug);

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            if json_mode {
                println!("{}", e.to_json());
            } else {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic, returning the process exit code
async fn run(cli: Cli) -> Result<i32, CliError> {
    info!("Starting esmc-verify v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_or_default(cli.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli);

    let root = package_root(&config)?;
    tracing::debug!(root = %root.display(), "resolved package root");

    let (event_sender, event_receiver) = esmc_events::channel();
    let verifier = IntegrityVerifier::builder()
        .with_config(&config)
        .with_root(&root)
        .with_event_sender(event_sender)
        .build()?;

    let renderer = OutputRenderer::new(cli.json, config.general.color);
    let mut event_handler =
        EventHandler::new(renderer.colors_enabled(), config.general.verbose, cli.json);

    let report = verify_with_events(verifier, event_receiver, &mut event_handler).await?;

    renderer.render_report(&root, &report)?;
    Ok(report.exit_code())
}

fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(color) = cli.color {
        config.general.color = color;
    }
    if cli.verbose {
        config.general.verbose = true;
    }
    if let Some(root) = &cli.root {
        config.paths.root = Some(root.clone());
    }
}

/// Explicit root, or discovery upward from the executable's directory
fn package_root(config: &Config) -> Result<PathBuf, CliError> {
    if config.paths.root.is_some() {
        return Ok(config.resolve_root(Path::new(".")));
    }
    let exe = std::env::current_exe()?;
    let start = exe.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok(config.resolve_root(&start))
}

/// Run verification with concurrent event handling
async fn verify_with_events(
    verifier: IntegrityVerifier,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<IntegrityReport, CliError> {
    let mut verify_future = Box::pin(async move { verifier.verify_package().await });

    loop {
        select! {
            result = &mut verify_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result.map_err(CliError::from);
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for verification to finish */ }
                }
            }
        }
    }
}
