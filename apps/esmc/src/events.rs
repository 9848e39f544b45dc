//! Event handling and user feedback

use console::Style;
use esmc_events::{AppEvent, GeneralEvent, LicenseEvent};

use crate::logging::log_event_with_tracing;

/// Prints diagnostics from the validator while it runs
pub struct EventHandler {
    warn_style: Style,
    /// Warnings are non-essential and only shown when verbose
    verbose: bool,
    json_mode: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, verbose: bool, json_mode: bool) -> Self {
        Self {
            warn_style: Style::new().yellow().force_styling(colors_enabled),
            verbose,
            json_mode,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);

        if self.json_mode || !self.verbose || !event.is_diagnostic() {
            return;
        }
        if let Some(message) = describe(&event) {
            eprintln!("{} {message}", self.warn_style.apply_to("Warning:"));
        }
    }
}

fn describe(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::License(LicenseEvent::BlessingDegraded { reason }) => {
            Some(format!("{reason}, continuing without blessing verification"))
        }
        AppEvent::License(LicenseEvent::EndDateUnreadable { value }) => Some(format!(
            "subscription end date '{value}' is not a date, treating license as non-expiring"
        )),
        AppEvent::General(GeneralEvent::Warning { message, context }) => Some(match context {
            Some(context) => format!("{message} ({context})"),
            None => message.clone(),
        }),
        _ => None,
    }
}
