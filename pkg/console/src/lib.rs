//! Terminal output: tracing setup, the `[WAIT]` spinner, and done/fail lines.

pub mod logging;
pub mod spinner;

use std::io::Write;
use std::sync::{Arc, Mutex};

use crossterm::style::Stylize;

pub use logging::init_logging;
pub use spinner::Spinner;

pub(crate) type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Handle to the user-facing output stream.
///
/// Cheap to clone; every clone writes to the same stream. Components receive
/// one through their constructor instead of reaching for a global.
#[derive(Clone)]
pub struct Console {
    out: SharedWriter,
    color: bool,
}

impl Console {
    pub fn stdout() -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(std::io::stdout()))),
            color: true,
        }
    }

    /// Discards everything; used by tests and non-interactive callers.
    pub fn sink() -> Self {
        Self::with_writer(std::io::sink())
    }

    /// Uncolored output into an arbitrary writer.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
            color: false,
        }
    }

    /// Show `message` with a spinner until the returned guard is stopped or dropped.
    pub fn start_wait(&self, message: &str) -> Spinner {
        Spinner::start(self.out.clone(), message, self.color)
    }

    pub fn done(&self, message: &str) {
        let tag = if self.color {
            "[DONE] √".green().to_string()
        } else {
            "[DONE] √".to_string()
        };
        self.line(&tag, message);
    }

    pub fn fail(&self, message: &str) {
        let tag = if self.color {
            "[FAIL] X".red().to_string()
        } else {
            "[FAIL] X".to_string()
        };
        self.line(&tag, message);
    }

    fn line(&self, tag: &str, message: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = writeln!(out, "{} {}", tag, message);
        let _ = out.flush();
    }
}
