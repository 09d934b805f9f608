//! Terminal output for the CLI.
//!
//! In `--json` mode only [`Output::json`] and errors are printed, so stdout
//! stays machine-readable.

use std::fmt::Display;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    fn out(&self, line: impl Display) {
        if !self.json {
            println!("{}", line);
        }
    }

    fn err(&self, line: impl Display) {
        if !self.json {
            eprintln!("{}", line);
        }
    }

    pub fn info(&self, msg: &str) {
        self.out(format_args!("{} {}", style("ℹ").blue(), msg));
    }

    pub fn success(&self, msg: &str) {
        self.out(format_args!("{} {}", style("✓").green(), msg));
    }

    pub fn warn(&self, msg: &str) {
        self.err(format_args!("{} {}", style("⚠").yellow(), msg));
    }

    /// Errors are printed in both modes; JSON mode emits `{"error": ...}`.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            eprintln!("{} {}", style("✗").red(), style(msg).red());
        }
    }

    /// Only shown with `--verbose`.
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            self.err(format_args!("{} {}", style("→").dim(), style(msg).dim()));
        }
    }

    pub fn header(&self, msg: &str) {
        self.out(format_args!("\n{}", style(msg).bold().underlined()));
    }

    pub fn step(&self, num: usize, total: usize, msg: &str) {
        self.out(format_args!("{} {}", style(format!("[{}/{}]", num, total)).dim(), msg));
    }

    pub fn kv(&self, key: &str, value: &str) {
        self.out(format_args!("  {}: {}", style(key).dim(), value));
    }

    pub fn list_item(&self, item: &str) {
        self.out(format_args!("  {} {}", style("•").dim(), item));
    }

    /// Print columns padded to `widths`. A width of 0 leaves the column as is.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        let row: Vec<String> = cols
            .iter()
            .zip(widths)
            .map(|(col, width)| format!("{:width$}", col, width = *width))
            .collect();
        self.out(format_args!("  {}", row.join("  ")));
    }

    /// Pretty-print a value. This is the only stdout output in JSON mode.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Progress bar; hidden in JSON mode.
    pub fn progress(&self, len: u64, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len);
        if let Ok(template) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        ) {
            bar.set_style(template.progress_chars("#>-"));
        }
        bar.set_message(msg.to_string());
        bar
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Colored HTTP status for result tables; `---` when no response arrived.
pub fn status_badge(status: Option<u16>) -> String {
    match status {
        Some(code @ 200..=299) => style(code).green().to_string(),
        Some(code @ 300..=399) => style(code).yellow().to_string(),
        Some(code) => style(code).red().to_string(),
        None => style("---").red().to_string(),
    }
}

/// Format a byte count with binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}
