//! Tracing setup and structured logging of events

use esmc_events::AppEvent;
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;

/// Initialise the global subscriber
///
/// Same policy as the license CLI: `RUST_LOG` wins, event records only
/// show in debug mode, JSON mode is silent by default.
pub fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if json_mode {
        "off"
    } else if debug_enabled {
        "warn,esmc=debug,esmc_guard=debug,esmc_hash=debug,esmc_config=debug"
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
