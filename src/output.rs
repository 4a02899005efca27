//! Progress and summary lines for the respack CLI.
//!
//! Lines look like `cargo`'s: a bold verb padded to a fixed column, then the
//! message. Everything goes to stderr so stdout stays free for completions.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Column the verbs are right-aligned to.
const VERB_WIDTH: usize = 12;

/// Colour of a line's verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Green,
    Cyan,
    Yellow,
    Red,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Green => "\x1b[32m",
            Tone::Cyan => "\x1b[36m",
            Tone::Yellow => "\x1b[33m",
            Tone::Red => "\x1b[31m",
        }
    }
}

/// Writes build progress to stderr.
///
/// ANSI colour is used only when stderr is a terminal. The quiet printer
/// backs `--quiet` and the tests.
pub struct Printer {
    color: bool,
    quiet: bool,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
            quiet: false,
        }
    }

    /// A printer that drops every line.
    pub fn quiet() -> Self {
        Self {
            color: false,
            quiet: true,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Progress or completion, e.g. `     Packing format 34 (1.21)`.
    pub fn status(&self, verb: &str, message: &str) {
        self.line(Tone::Green, verb, message);
    }

    /// Configuration and statistics lines.
    pub fn info(&self, verb: &str, message: &str) {
        self.line(Tone::Cyan, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.line(Tone::Yellow, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.line(Tone::Red, verb, message);
    }

    /// `text` dimmed, for help hints under a diagnostic.
    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    /// A `warning` or `error` label in its tone.
    pub fn severity(&self, label: &str, is_error: bool) -> String {
        let tone = if is_error { Tone::Red } else { Tone::Yellow };
        self.paint(&format!("{BOLD}{}", tone.ansi()), label)
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn line(&self, tone: Tone, verb: &str, message: &str) {
        if self.quiet {
            return;
        }
        let verb = format!("{verb:>VERB_WIDTH$}");
        let verb = self.paint(&format!("{BOLD}{}", tone.ansi()), &verb);
        let _ = writeln!(io::stderr().lock(), "{verb} {message}");
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

/// `n` followed by the singular or plural noun.
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { pluralized })
}

/// `path` relative to the working directory when it lies inside it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));

    match relative {
        Some(p) if p.as_os_str().is_empty() => ".".to_string(),
        Some(p) => p.display().to_string(),
        None => path.display().to_string(),
    }
}
