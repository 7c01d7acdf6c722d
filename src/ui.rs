use colored::Colorize;
use declarative::{Diagnostic, Severity};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print one validation finding
pub fn diagnostic(d: &Diagnostic) {
    let symbol = match d.severity {
        Severity::Error => "✗".red(),
        Severity::Warning => "⚠".yellow(),
    };
    let at = d
        .path
        .as_ref()
        .map(|p| format!(" ({p})").dimmed().to_string())
        .unwrap_or_default();
    println!("  {} {}: {}{}", symbol, d.summary.bold(), d.detail, at);
}
