//! Colored console output and progress reporting
//!
//! Uses owo-colors for terminal colors and indicatif for download progress.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::Write;
use std::time::Duration;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const TICK_INTERVAL_MS: u64 = 80;

/// Print a phase banner
/// Example: "[PREPARE]"
pub fn phase(name: &str) {
    println!("{}", format!("[{}]", name).blue().bold());
}

/// Print a per-dependency header
/// Example: "build xapian :"
pub fn dependency_header(phase: &str, name: &str) {
    println!("{} {} :", phase, name.bold());
}

/// Start a step status line without a newline.
/// Example: "  configure xapian: "
pub fn step_begin(step: &str, dependency: &str) {
    print!("  {} {}: ", step, dependency);
    std::io::stdout().flush().ok();
}

pub fn step_ok() {
    println!("{}", "OK".green());
}

pub fn step_skip() {
    println!("{}", "SKIP".dimmed());
}

pub fn step_error() {
    println!("{}", "ERROR".red().bold());
}

/// Print a captured step log verbatim.
pub fn dump_log(content: &str) {
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
}

/// Print the notice shown when a step failure halts the run.
pub fn stop_notice() {
    println!("{}", "Stopping build due to errors".red().bold());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a detail line (dimmed)
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Create a download spinner; call [`upgrade_to_bytes`] once the size is known.
pub fn download_progress(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("     {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    pb
}

/// Switch a spinner to a byte progress bar.
pub fn upgrade_to_bytes(pb: &ProgressBar, total_bytes: u64) {
    pb.set_length(total_bytes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸━"),
    );
}
