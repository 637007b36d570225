//! Astral-style CLI output formatting.
//!
//! Human output is indented, symbol-prefixed and colored when the terminal
//! supports it (or `--color` forces it). In JSON mode every call becomes
//! one JSON line on stdout and commands emit a final summary object. Quiet
//! mode suppresses everything except warnings and errors.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};
use serde_json::json;

use super::command::ColorChoice;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

fn regular_output_suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!(
        "{}",
        json!({
            "type": kind,
            "payload": payload,
        })
    );
}

/// Apply output settings from global CLI flags.
///
/// Call this early in the CLI entry point, before anything is printed.
pub fn configure(config: OutputConfig, color: ColorChoice) {
    write_config(config);
    match color {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    let config = read_config();
    if config.json {
        emit_json_line(
            "header",
            json!({
                "app": "pgkeep",
                "version": version,
            }),
        );
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!(
        "{} {}",
        "pgkeep".if_supports_color(Stream::Stdout, |t| t.bold()),
        version.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();

    if config.json {
        emit_json_line(
            "field",
            json!({
                "label": label,
                "value": value,
            }),
        );
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!(
        "  {:<12} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {} {}", "✓".if_supports_color(Stream::Stdout, |t| t.green()), message);
}

/// Print a warning line. Shown even in quiet mode.
pub fn warning(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }

    println!("  {} {}", "⚠".if_supports_color(Stream::Stdout, |t| t.yellow()), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    let config = read_config();

    if config.json {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }

    eprintln!("  {} {}", "×".if_supports_color(Stream::Stderr, |t| t.red()), message);
}

/// Print a section header.
pub fn section(title: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a dimmed note.
pub fn note(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {}", message.if_supports_color(Stream::Stdout, |t| t.dimmed()));
}

/// Print a hint with "hint:" prefix (Astral-style).
pub fn hint(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("hint", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!(
        "  {}: {}",
        "hint".if_supports_color(Stream::Stdout, |t| t.cyan()),
        message.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
}

/// Print an action in progress ("Sending...").
pub fn action(verb: &str, target: &str) {
    let config = read_config();

    if config.json {
        emit_json_line(
            "action",
            json!({
                "verb": verb,
                "target": target,
                "status": "in_progress",
            }),
        );
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!(
        "  {} {}...",
        verb.if_supports_color(Stream::Stdout, |t| t.cyan()),
        target
    );
}

/// Print a completed action ("✓ Sent ...").
pub fn action_done(verb: &str, target: &str) {
    let config = read_config();

    if config.json {
        emit_json_line(
            "action",
            json!({
                "verb": verb,
                "target": target,
                "status": "done",
            }),
        );
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!(
        "  {} {} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        verb.if_supports_color(Stream::Stdout, |t| t.green()),
        target
    );
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("lines", json!({ "content": content }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit a JSON value directly (command summaries in `--json` mode).
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

/// Braille spinner animation frames (Astral-style).
const BRAILLE_SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Create and start a progress spinner.
///
/// Returns a hidden progress bar in JSON or quiet mode.
pub fn spinner(message: &str) -> indicatif::ProgressBar {
    let config = read_config();
    if config.json || config.quiet {
        let pb = indicatif::ProgressBar::hidden();
        pb.set_message(message.to_string());
        return pb;
    }

    let style = indicatif::ProgressStyle::default_spinner()
        .tick_strings(BRAILLE_SPINNER)
        .template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner());
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Finish a spinner with a success checkmark.
pub fn spinner_success(pb: &indicatif::ProgressBar, message: &str) {
    let config = read_config();
    if config.json || config.quiet {
        pb.finish_and_clear();
        return;
    }

    pb.finish_with_message(format!(
        "{} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        message
    ));
}

/// Finish a spinner with a failure mark.
pub fn spinner_fail(pb: &indicatif::ProgressBar, message: &str) {
    let config = read_config();
    if config.json || config.quiet {
        pb.finish_and_clear();
        return;
    }

    pb.finish_with_message(format!(
        "{} {}",
        "×".if_supports_color(Stream::Stdout, |t| t.red()),
        message
    ));
}

/// Print a table header row. The first column is left-aligned.
pub fn table_header(columns: &[(&str, usize)]) {
    let config = read_config();

    if config.json {
        let cols: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        emit_json_line("table_header", json!({ "columns": cols }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    let cells: Vec<String> = columns.iter().map(|(name, _)| (*name).to_string()).collect();
    let widths: Vec<usize> = columns.iter().map(|(_, width)| *width).collect();
    let line = render_row(&cells, &widths);
    println!("{}", line.if_supports_color(Stream::Stdout, |t| t.dimmed()));
}

/// Print a table separator line.
pub fn table_separator(widths: &[usize]) {
    let config = read_config();

    if config.json || regular_output_suppressed(config) {
        return;
    }

    let mut line = String::from("  ");
    for width in widths {
        line.push_str(&"─".repeat(*width));
        line.push(' ');
    }
    println!("{}", line.if_supports_color(Stream::Stdout, |t| t.dimmed()));
}

/// Print a table data row.
pub fn table_row(cells: &[String], widths: &[usize]) {
    let config = read_config();

    if config.json {
        emit_json_line("table_row", json!({ "cells": cells }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("{}", render_row(cells, widths));
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("  ");
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        if i == 0 {
            line.push_str(&format!("{cell:<width$} "));
        } else {
            line.push_str(&format!("{cell:>width$} "));
        }
    }
    line.trim_end().to_string()
}
