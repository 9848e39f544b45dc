//! Tracing setup and structured logging of events

use esmc_events::AppEvent;
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;

/// Initialise the global subscriber
///
/// `RUST_LOG` always wins. Otherwise only warnings reach stderr, or debug
/// output for esmc crates with `--debug`. Events are printed by the event
/// handler, so their log records stay hidden outside debug mode. JSON mode
/// keeps stderr free of log lines unless `RUST_LOG` asks for them.
pub fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if json_mode {
        "off"
    } else if debug_enabled {
        "warn,esmc=debug,esmc_license=debug,esmc_config=debug"
    } else {
        "warn,esmc::events=off"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(debug_enabled);

    if json_mode {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Record an event at its own level
pub fn log_event_with_tracing(event: &AppEvent) {
    let domain = event.log_target();
    let level = event.log_level();
    if level == Level::ERROR {
        error!(target: "esmc::events", domain, payload = ?event, "event");
    } else if level == Level::WARN {
        warn!(target: "esmc::events", domain, payload = ?event, "event");
    } else if level == Level::INFO {
        info!(target: "esmc::events", domain, payload = ?event, "event");
    } else if level == Level::DEBUG {
        debug!(target: "esmc::events", domain, payload = ?event, "event");
    } else {
        trace!(target: "esmc::events", domain, payload = ?event, "event");
    }
}
