//! Shared CLI helpers — path expansion, banner, turn formatting.

use std::path::PathBuf;

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Format a successful turn.
pub fn format_answer(answer: &str) -> String {
    format!("{} {answer}", "Agent:".cyan().bold())
}

/// Format a failed turn.
pub fn format_error(message: &str) -> String {
    format!("{} {message}", "⚠️ Error:".red().bold())
}

/// Print the banner shown at REPL start.
pub fn print_banner(agent_name: &str, model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}  {}",
        format!("🤖 {agent_name}").cyan().bold(),
        version.dimmed(),
        format!("({model})").dimmed()
    );
    println!("{}", "Type a message, or \"exit\" to quit.".dimmed());
    println!();
}

/// Print a "thinking" placeholder while the agent works.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
