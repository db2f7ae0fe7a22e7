//! Terminal output helpers for consistent styling.

/// ANSI color codes using true color (24-bit)
pub mod colors {
    pub const HEADER: &str = "\x1b[38;2;255;210;120m";
    pub const OK: &str = "\x1b[38;2;120;255;120m";
    pub const ERR: &str = "\x1b[38;2;255;100;100m";
    pub const WARN: &str = "\x1b[38;2;255;200;100m";
    pub const DIM: &str = "\x1b[38;2;140;140;140m";
    pub const RESET: &str = "\x1b[0m";
}

/// Horizontal rule
pub const HR: &str =
    "──────────────────────────────────────────────────────────────────────────────";

/// Print a styled header with version
pub fn print_header(name: &str, version: &str) {
    println!();
    println!("{}{} v{}{}", colors::HEADER, name, version, colors::RESET);
    println!("{}{}{}", colors::DIM, HR, colors::RESET);
}

/// Print a footer with horizontal rule
pub fn print_footer() {
    println!("{}{}{}", colors::DIM, HR, colors::RESET);
    println!();
}

/// Print an error line
pub fn print_err(message: &str) {
    println!("  {}{}{}", colors::ERR, message, colors::RESET);
}

/// Print a key-value pair with alignment
pub fn print_kv(key: &str, value: &str, key_width: usize) {
    println!("  {:width$} {}", key, value, width = key_width);
}

/// Print a narrative line, colored by its outcome marker
pub fn print_narrative(line: &str) {
    match narrative_color(line) {
        Some(color) => println!("  {}{}{}", color, line, colors::RESET),
        None => println!("  {}", line),
    }
}

/// Color for a narrative line based on its `[OK]`/`[FAIL]`/`[WARN]` marker
pub fn narrative_color(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("[OK]") {
        Some(colors::OK)
    } else if trimmed.starts_with("[FAIL]") {
        Some(colors::ERR)
    } else if trimmed.starts_with("[WARN]") {
        Some(colors::WARN)
    } else {
        None
    }
}
