//! Terminal output formatting for the safari CLI.
//!
//! Status lines go to stderr with a right-aligned coloured verb; stdout is
//! reserved for machine-readable output such as `gallery list --json`.

use std::io::{self, IsTerminal, Write};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width for right-aligned verb column.
const VERB_WIDTH: usize = 12;

/// Terminal-aware status printer.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// Printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// e.g. "  Compositing IMG_2041.jpg"
    pub fn status(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.print_line(CYAN, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.print_line(YELLOW, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.print_line(RED, verb, message);
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    /// On/off label for a feature flag.
    pub fn flag(&self, on: bool) -> String {
        if on {
            self.paint(GREEN, "on")
        } else {
            self.paint(RED, "off")
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn print_line(&self, color: &str, verb: &str, message: &str) {
        let mut stderr = io::stderr().lock();
        if self.color {
            let _ = writeln!(stderr, "{BOLD}{color}{verb:>VERB_WIDTH$}{RESET} {message}");
        } else {
            let _ = writeln!(stderr, "{verb:>VERB_WIDTH$} {message}");
        }
    }
}

/// Pluralize a count: `plural(1, "photo", "photos")` → "1 photo".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Human-readable byte size.
pub fn human_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

/// Return a relative display path when possible, absolute otherwise.
pub fn display_path(path: &std::path::Path) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            let s = relative.display().to_string();
            if s.is_empty() {
                return ".".to_string();
            }
            return s;
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "photo", "photos"), "1 photo");
        assert_eq!(plural(0, "photo", "photos"), "0 photos");
        assert_eq!(plural(3, "photo", "photos"), "3 photos");
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.0 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024 + 512 * 1024), "3.5 MiB");
    }

    #[test]
    fn test_plain_printer_has_no_escapes() {
        let printer = Printer::plain();
        assert_eq!(printer.flag(true), "on");
        assert_eq!(printer.bold("x"), "x");
    }

    #[test]
    fn test_display_path_absolute() {
        use std::path::Path;
        let p = Path::new("/nonexistent/path/to/photo.jpg");
        assert_eq!(display_path(p), "/nonexistent/path/to/photo.jpg");
    }
}
