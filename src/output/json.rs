//! JSON output formatter for machine processing

use crate::domain::{ComponentUpdate, RunSummary};
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Whether this was a dry-run
    dry_run: bool,
    /// Number of components moving to a newer version
    updates: usize,
    /// Per-component results, runtime first
    components: &'a [ComponentUpdate],
    /// Files written by the renderer
    rendered: &'a [PathBuf],
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            dry_run: summary.dry_run,
            updates: summary.update_count(),
            components: &summary.components,
            rendered: &summary.rendered,
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
