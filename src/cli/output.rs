//! How botaniq commands print their results
//!
//! Text mode is for people: confirmations after a care action and aligned
//! `label: value` rows for `show`, `stats` and `config`. JSON mode prints
//! each plant record, stats object or health change as one compact line on
//! stdout, so `--format json` output can be piped into other tools.
//! Diagnostics always go to stderr.

use serde::Serialize;

/// Widest row label ("scan_interval_secs:") plus one space
const LABEL_WIDTH: usize = 20;

/// `--format` choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Printer for one CLI invocation
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Confirmation after a change to the collection, such as
    /// "Watered Fern (p-…). Next watering: …"
    ///
    /// Text only. In JSON mode the command prints the changed record instead.
    pub fn confirm(&self, message: &str) {
        if self.format == OutputFormat::Text {
            println!("{}", message);
        }
    }

    /// One JSON line for a plant, a list of plants, stats or a health change
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to encode command output: {}", e),
        }
    }

    /// An aligned `Label: value` row in text mode
    pub fn row(&self, label: &str, value: impl std::fmt::Display) {
        if self.format == OutputFormat::Text {
            println!("{:<width$}{}", format!("{}:", label), value, width = LABEL_WIDTH);
        }
    }

    /// Separates row groups in text mode
    pub fn blank(&self) {
        if self.format == OutputFormat::Text {
            println!();
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// `[verbose] …` on stderr with `--verbose`
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// `[verbose:<step>] …` on stderr with `--verbose`, where `step` names
    /// the stage of the command (`garden`, `store`, `scan`, …)
    pub fn verbose_ctx(&self, step: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", step, message);
        }
    }
}
