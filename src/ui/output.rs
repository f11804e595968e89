//! ui::output
//!
//! Command output.
//!
//! Results go to stdout and are suppressed by `--quiet`; errors always go to
//! stderr. Transient progress (e.g. request retries) goes to a [`StatusLine`] that
//! rewrites itself in place instead of accumulating lines.

use std::fmt::Display;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How much a command prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    /// `--debug`; also enables debug logging
    Debug,
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a result line unless quiet.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Report a fatal error on stderr.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Single stderr line that is overwritten on every update.
///
/// Clones share the same line.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    enabled: bool,
    dirty: Arc<AtomicBool>,
}

impl StatusLine {
    /// A status line on stderr, silent when `verbosity` is quiet.
    pub fn stderr(verbosity: Verbosity) -> Self {
        Self {
            enabled: verbosity != Verbosity::Quiet,
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the current line with `message`.
    pub fn update(&self, message: &str) {
        if !self.enabled {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        // \r + erase-line keeps the status on a single row
        let _ = write!(stderr, "\r\x1b[2K{}", message);
        let _ = stderr.flush();
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Erase the line if anything was written.
    pub fn clear(&self) {
        if self.enabled && self.dirty.swap(false, Ordering::Relaxed) {
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "\r\x1b[2K");
            let _ = stderr.flush();
        }
    }

    /// Whether an update is currently displayed.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn status_line_tracks_dirty_state() {
        let status = StatusLine::stderr(Verbosity::Normal);
        assert!(!status.is_dirty());
        status.update("retrying…");
        assert!(status.clone().is_dirty());
        status.clear();
        assert!(!status.is_dirty());
    }

    #[test]
    fn quiet_status_line_writes_nothing() {
        let status = StatusLine::stderr(Verbosity::Quiet);
        status.update("retrying…");
        assert!(!status.is_dirty());
    }
}
