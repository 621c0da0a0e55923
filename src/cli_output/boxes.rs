//! Simple line-based CLI output utilities.

use std::io::{self, Write};

use crate::state::{Notice, NoticeLevel};

/// Line width for separators.
pub const LINE_WIDTH: usize = 60;

/// Print the main header.
///
/// ```text
/// FBOT
/// ════════════════════════════════════════════════════════════
/// ```
pub fn print_header(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "═".repeat(LINE_WIDTH));
    println!();
}

/// Print a thin separator between transcript turns.
pub fn print_separator() {
    println!("{}", "─".repeat(LINE_WIDTH));
}

/// Print a status line.
///
/// ```text
///   ✓ Conversation deleted.
/// ```
pub fn print_status_line(icon: &str, message: &str) {
    println!("  {} {}", icon, message);
}

/// Print the interactive prompt without a newline.
pub fn print_prompt(prompt: &str) {
    print!("{}", prompt);
    io::stdout().flush().ok();
}

/// Icon for a notice level.
pub fn notice_icon(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => icons::INFO,
        NoticeLevel::Success => icons::SUCCESS,
        NoticeLevel::Warning => icons::WARNING,
        NoticeLevel::Error => icons::FAILURE,
    }
}

/// Print notices to stderr, errors and warnings included.
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("  {} {}", notice_icon(notice.level), notice.message);
    }
}

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const INFO: &str = "•";
}
