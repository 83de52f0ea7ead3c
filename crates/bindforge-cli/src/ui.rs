//! Terminal output helpers for the bindforge CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const NEON_GREEN: Color = Color::Color256(82);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const DOT: &str = "\u{00B7}"; // ·
}

/// Print a success message
pub fn success(msg: &str) {
    eprintln!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::NEON_GREEN),
        msg
    );
}

/// Print an error header line
pub fn error(msg: &str) {
    eprintln!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA),
        style(msg).fg(colors::MAGENTA)
    );
}

/// Print a dim/secondary message
pub fn dim(msg: &str) {
    eprintln!("  {}", style(msg).fg(colors::DIM));
}

/// One written output file.
pub fn output_line(path: &str) {
    eprintln!(
        "  {} {}",
        style(symbols::TRIANGLE).fg(colors::CYAN),
        style(path).fg(colors::CYAN)
    );
}

/// Progress over input files; hidden when stderr is not a terminal.
pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("     {bar:32.cyan/dim} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("\u{25B0}\u{25B0}\u{25B1}"); // ▰▰▱
    pb.set_style(style);
    pb
}

/// Print timing information
pub fn timing(label: &str, duration_ms: u128) {
    eprintln!(
        "  {} {} in {}ms",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        label,
        duration_ms
    );
}
