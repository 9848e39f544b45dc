//! Output rendering and formatting

use crate::cli::print_usage;
use console::{Style, Term};
use esmc_license::{EvaluatedLicense, LicenseFailure, LicenseState, StatusReport};
use esmc_types::ColorChoice;
use std::io;

/// Result of a command, rendered once the command finishes
#[derive(Debug)]
pub enum CommandOutput {
    Tier(EvaluatedLicense),
    Status(StatusReport),
    Usage,
}

impl CommandOutput {
    /// 0 when the license is valid, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandOutput::Tier(evaluated) => evaluated.exit_code(),
            CommandOutput::Status(report) => i32::from(!report.valid),
            CommandOutput::Usage => 1,
        }
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        let colors_enabled = match color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => Term::stdout().features().colors_supported(),
        };
        Self {
            json_output,
            colors_enabled,
        }
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors_enabled
    }

    /// Render command output
    pub fn render_result(&self, output: &CommandOutput) -> io::Result<()> {
        match output {
            CommandOutput::Tier(evaluated) if self.json_output => Self::render_json(evaluated)?,
            CommandOutput::Status(report) if self.json_output => Self::render_json(report)?,
            CommandOutput::Tier(evaluated) => Self::render_tier(evaluated),
            CommandOutput::Status(report) => self.render_status(report),
            CommandOutput::Usage => print_usage(),
        }
        Ok(())
    }

    fn render_json<T: serde::Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.colors_enabled)
    }

    /// Stdout carries only the tier or `Not configured`; the reason a
    /// license was rejected goes to stderr
    fn render_tier(evaluated: &EvaluatedLicense) {
        match (&evaluated.tier, &evaluated.error) {
            (Some(tier), _) if evaluated.valid => println!("{tier}"),
            (_, Some(failure)) if *failure != LicenseFailure::NotConfigured => {
                println!("Not configured");
                eprintln!("{failure}");
            }
            _ => println!("Not configured"),
        }
    }

    fn render_status(&self, report: &StatusReport) {
        let bold = self.style(Style::new().bold());
        let label = self.style(Style::new().dim());

        println!("{}", bold.apply_to("License status"));

        if !report.valid {
            let red = self.style(Style::new().red());
            let reason = report
                .error
                .as_ref()
                .map_or_else(|| "Not configured".to_string(), ToString::to_string);
            println!("  {} {}", label.apply_to("Status: "), red.apply_to(reason));
            return;
        }

        let row = |name: &str, value: &str| {
            println!("  {} {value}", label.apply_to(format!("{name:<8}")));
        };

        if let Some(name) = &report.name {
            row("Name:", name);
        }
        if let Some(email) = report.email.as_ref().filter(|e| Some(*e) != report.name.as_ref()) {
            row("Email:", email);
        }
        row("Tier:", report.tier.as_deref().unwrap_or("-"));

        if let Some(state) = &report.state {
            let state_style = match state {
                LicenseState::Expired => self.style(Style::new().yellow()),
                _ => self.style(Style::new().green()),
            };
            println!(
                "  {} {}",
                label.apply_to(format!("{:<8}", "Status:")),
                state_style.apply_to(state)
            );
        }

        row("Expires:", report.expires.as_deref().unwrap_or("Never"));
        row("Blessed:", if report.blessed { "yes" } else { "no" });
        row("Issued:", report.issued.as_deref().unwrap_or("unknown"));
    }
}
