//! Text output formatter for human-readable display
//!
//! One aligned line per component, followed by the rendered files and a
//! one-line summary.

use crate::domain::{ComponentUpdate, RunSummary, UpdateStatus};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn dry_run_prefix(&self, dry_run: bool) -> String {
        match (dry_run, self.color) {
            (false, _) => String::new(),
            (true, true) => format!("{} ", "(dry-run)".cyan()),
            (true, false) => "(dry-run) ".to_string(),
        }
    }

    fn status_label(&self, status: UpdateStatus) -> String {
        let label = status.to_string();
        if !self.color {
            return label;
        }
        match status {
            UpdateStatus::Updated => label.green().to_string(),
            UpdateStatus::Unchanged => label.dimmed().to_string(),
            UpdateStatus::Downgraded => label.yellow().to_string(),
        }
    }

    fn format_component_line(
        &self,
        component: &ComponentUpdate,
        name_width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let date = component
            .date
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        let name = format!("{:width$}", component.name, width = name_width);
        let status = self.status_label(component.status);

        if !self.color {
            return writeln!(
                writer,
                "  {} {} -> {} [{}]{}",
                name, component.current, component.latest, status, date
            );
        }

        let latest = component.latest.to_string();
        let latest = if component.is_update() {
            latest.bright_white().bold().to_string()
        } else {
            latest
        };
        writeln!(
            writer,
            "  {} {} {} {} [{}]{}",
            name,
            component.current.to_string().dimmed(),
            "→".dimmed(),
            latest,
            status,
            date.dimmed()
        )
    }

    fn format_summary_line(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix(summary.dry_run);
        let count = summary.update_count();
        let noun = if count == 1 { "update" } else { "updates" };

        if count == 0 {
            let message = "All components are up to date";
            if self.color {
                writeln!(writer, "{}{}", prefix, message.green())
            } else {
                writeln!(writer, "{}{}", prefix, message)
            }
        } else if self.color {
            writeln!(writer, "{}{} {}", prefix, count.to_string().green().bold(), noun)
        } else {
            writeln!(writer, "{}{} {}", prefix, count, noun)
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary_line(summary, writer);
        }

        let name_width = summary
            .components
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0);

        for component in &summary.components {
            // Unchanged components only in verbose mode
            if self.verbosity == Verbosity::Verbose || component.status != UpdateStatus::Unchanged {
                self.format_component_line(component, name_width, writer)?;
            }
        }

        if !summary.rendered.is_empty() {
            writeln!(writer)?;
            for path in &summary.rendered {
                if self.color {
                    writeln!(writer, "  {} {}", "wrote".dimmed(), path.display())?;
                } else {
                    writeln!(writer, "  wrote {}", path.display())?;
                }
            }
        }

        writeln!(writer)?;
        self.format_summary_line(summary, writer)
    }
}
