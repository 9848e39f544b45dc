//! Output rendering and formatting

use console::{Style, Term};
use esmc_guard::IntegrityReport;
use esmc_types::ColorChoice;
use std::io;
use std::path::Path;

/// Output renderer for verification reports
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

    /// Render the final report
    pub fn render_report(&self, root: &Path, report: &IntegrityReport) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        let bold = Style::new().bold().force_styling(self.colors_enabled);
        let red = Style::new().red().force_styling(self.colors_enabled);
        let green = Style::new().green().force_styling(self.colors_enabled);

        println!("{}", bold.apply_to("Package integrity check"));
        println!("  Root:  {}", root.display());
        if let Some(version) = &report.build_version {
            println!("  Build: {version}");
        }

        for path in &report.modified {
            println!("  {} {path} (modified)", red.apply_to("[FAIL]"));
        }
        for path in &report.missing {
            println!("  {} {path} (missing)", red.apply_to("[FAIL]"));
        }

        if report.total > 0 || !report.verified.is_empty() {
            println!(
                "  {} verified, {} modified, {} missing of {} files ({} ms)",
                report.verified.len(),
                report.modified.len(),
                report.missing.len(),
                report.total,
                report.duration_ms
            );
        }

        if report.is_safe() {
            println!("{} {}", green.apply_to("PASS:"), report.outcome.describe());
        } else {
            println!("{} {}", red.apply_to("FAIL:"), report.outcome.describe());
            println!("Do not deploy this package.");
        }
        Ok(())
    }
}
