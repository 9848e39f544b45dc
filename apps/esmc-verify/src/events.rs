//! Event handling and user feedback

use console::Style;
use esmc_events::{AppEvent, GeneralEvent, IntegrityEvent};

use crate::logging::log_event_with_tracing;

/// Prints verifier diagnostics while verification runs
pub struct EventHandler {
    warn_style: Style,
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
        AppEvent::Integrity(IntegrityEvent::FileModified {
            path,
            expected,
            actual,
        }) => Some(format!(
            "{path} modified\n         Expected: {expected}\n         Actual:   {actual}"
        )),
        AppEvent::Integrity(IntegrityEvent::FileMissing { path, reason }) => {
            Some(format!("{path} missing: {reason}"))
        }
        AppEvent::Integrity(IntegrityEvent::ManifestCountMismatch { declared, actual }) => {
            Some(match declared {
                Some(declared) => format!(
                    "manifest declares {declared} files but lists {actual} checksums"
                ),
                None => format!("manifest totalFiles is unreadable, {actual} checksums listed"),
            })
        }
        AppEvent::General(GeneralEvent::Warning { message, context }) => Some(match context {
            Some(context) => format!("{message} ({context})"),
            None => message.clone(),
        }),
        _ => None,
    }
}
