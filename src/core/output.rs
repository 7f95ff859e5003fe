//! Colored output for source-prep
//!
//! Uses owo-colors for terminal colors. Progress bars live in
//! `helpers::progress`.

use owo_colors::OwoColorize;

/// Print an action header (blue, bold)
/// Example: "==> Preparing sources in /src/spectatord"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a sub-action with artifact counter
/// Example: "  -> (1/3) flat_hash_map"
pub fn sub_action_numbered(current: usize, total: usize, name: &str) {
    println!(
        "  {} {} {}",
        "->".cyan(),
        format!("({}/{})", current, total).cyan(),
        name
    );
}

/// Print a detail line (dimmed)
/// Example: "     verifying sha256 of flat_hash_map-2c46.zip"
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Print a skip message (dimmed)
/// Example: "==> internal mode disabled, skipping internal bundles"
pub fn skip(message: &str) {
    println!("{} {}", "==>".dimmed(), message.dimmed());
}

/// Print one row of a two-column listing
pub fn list_item(name: &str, status: &str) {
    println!("  {} {}", name.green(), status.dimmed());
}
