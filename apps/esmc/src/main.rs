//! esmc - local license status
//!
//! Thin CLI over the license validator. Every command exits 0 when the
//! license is valid and 1 otherwise, so it can be scripted on the exit
//! code alone.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{print_usage, Cli, Commands};
use crate::display::{CommandOutput, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::logging::init_tracing;
use chrono::Utc;
use clap::error::ErrorKind;
use clap::Parser;
use esmc_config::Config;
use esmc_events::EventReceiver;
use esmc_license::LicenseValidator;
use std::process;
use tokio::select;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => process::exit(report_parse_error(&e)),
    };
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

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

/// Print a clap error and pick the exit code
///
/// `--help` and `--version` succeed; anything clap rejects, including an
/// unknown command, exits 1.
fn report_parse_error(e: &clap::Error) -> i32 {
    let _ = e.print();
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Main application logic, returning the process exit code
async fn run(cli: Cli) -> Result<i32, CliError> {
    let command = match cli.command {
        None | Some(Commands::Help) => {
            print_usage();
            return Ok(1);
        }
        Some(command) => command,
    };

    info!("Starting esmc v{}", env!("CARGO_PKG_VERSION"));

    // defaults -> file -> environment -> flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);

    let cwd = std::env::current_dir()?;
    let root = config.resolve_root(&cwd);
    tracing::debug!(root = %root.display(), "resolved project root");

    let (event_sender, event_receiver) = esmc_events::channel();
    let validator =
        LicenseValidator::new(&root, &config.paths.marker_dir).with_event_sender(event_sender);

    let renderer = OutputRenderer::new(cli.global.json, config.general.color);
    let mut event_handler = EventHandler::new(
        renderer.colors_enabled(),
        config.general.verbose,
        cli.global.json,
    );

    let output =
        execute_command_with_events(command, validator, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&output)?;
    Ok(output.exit_code())
}

fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if global.verbose {
        config.general.verbose = true;
    }
    if let Some(root) = &global.root {
        config.paths.root = Some(root.clone());
    }
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    validator: LicenseValidator,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandOutput, CliError> {
    let mut command_future = Box::pin(execute_command(command, validator));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

async fn execute_command(
    command: Commands,
    validator: LicenseValidator,
) -> Result<CommandOutput, CliError> {
    match command {
        Commands::Tier => Ok(CommandOutput::Tier(validator.validate().await?)),
        Commands::Status => Ok(CommandOutput::Status(validator.status_at(Utc::now()).await?)),
        Commands::Help => Ok(CommandOutput::Usage),
    }
}
