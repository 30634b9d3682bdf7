//! Output formatting for the line echo and the exit summary
//!
//! The final report flows through [`OutputWriter`], which handles text vs JSON.
//! Per-line output is produced by [`ConsoleObserver`], hooked into the reaction loop.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use logdrop_core::event::{BlockEvent, EnforcementOutcome};
use logdrop_log_pipeline::{ActionLedger, LedgerEntry, LineObserver, StopReason};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Callers use `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to an arbitrary writer.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        w.flush()?;
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Exit summary: the last action taken against every address seen.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    /// Why the loop stopped (`end_of_input`, `interrupted`, `error`).
    pub stopped_by: &'static str,
    /// Lines read from the log.
    pub lines_seen: u64,
    /// Lines that matched the block grammar.
    pub events_matched: u64,
    /// Distinct addresses acted upon.
    pub addresses: usize,
    /// Per-address last action, in first-seen order.
    pub entries: Vec<LedgerEntry>,
}

impl SummaryReport {
    /// Build a report from the ledger and loop counters.
    pub fn new(
        stop: Option<StopReason>,
        lines_seen: u64,
        events_matched: u64,
        ledger: &ActionLedger,
    ) -> Self {
        let stopped_by = match stop {
            Some(StopReason::EndOfInput) => "end_of_input",
            Some(StopReason::Interrupted) => "interrupted",
            None => "error",
        };
        Self {
            stopped_by,
            lines_seen,
            events_matched,
            addresses: ledger.size(),
            entries: ledger.summary().to_vec(),
        }
    }
}

impl Render for SummaryReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.entries.is_empty() {
            return Ok(());
        }

        writeln!(w)?;
        writeln!(w, "{} lines filtered.", self.addresses)?;
        writeln!(w)?;
        for entry in &self.entries {
            let status = if entry.succeeded { "success" } else { "failure" };
            writeln!(w, "{} ({}, {})", entry.attacker, entry.action, status)?;
        }
        Ok(())
    }
}

/// Echoes every line and prints a SUCCESS/FAILURE marker per address.
///
/// In JSON mode the observer stays silent so stdout holds only the summary.
pub struct ConsoleObserver<W: Write + Send> {
    out: W,
    echo: bool,
}

impl ConsoleObserver<std::io::Stdout> {
    /// Observer writing to stdout.
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write + Send> ConsoleObserver<W> {
    /// Observer writing to `out`.
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            echo: format == OutputFormat::Text,
        }
    }

    /// Consume the observer and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        // stdout 쓰기 실패는 루프를 멈추지 않음
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::debug!(error = %e, "failed to write console output");
        }
    }
}

impl<W: Write + Send> LineObserver for ConsoleObserver<W> {
    fn on_line(&mut self, line: &str) {
        if self.echo {
            self.emit(line);
        }
    }

    fn on_outcome(&mut self, event: &BlockEvent, outcome: &EnforcementOutcome) {
        if !self.echo {
            return;
        }
        let marker = if outcome.succeeded() {
            "SUCCESS".green().bold()
        } else {
            "FAILURE".red().bold()
        };
        self.emit(&format!("\t{} {}\n\n", event.attacker, marker));
    }
}
