use std::cell::RefCell;
use std::fmt;

use camino::Utf8PathBuf;
use modwalk_metadata::ImportLevels;
use tracing::Level;

use crate::name::ModuleName;

/// Where a module that failed to load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOrigin {
    /// A candidate found while expanding a package.
    Discovered,
    /// A module or callback named by the user.
    Explicit,
}

/// A non-fatal condition encountered while walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    AlreadyVisited {
        name: ModuleName,
    },
    ImportFailed {
        name: String,
        origin: ImportOrigin,
        cause: String,
    },
    UnknownEntry {
        path: Utf8PathBuf,
    },
    UnreadableDirectory {
        path: Utf8PathBuf,
        error: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyVisited { name } => write!(f, "module \"{name}\" already visited (skipping)"),
            Self::ImportFailed { name, .. } => write!(f, "unable to load \"{name}\" (skipping)"),
            Self::UnknownEntry { path } => write!(f, "\"{path}\" is of unknown type (skipping)"),
            Self::UnreadableDirectory { path, .. } => {
                write!(f, "unable to list \"{path}\" (skipping)")
            }
        }
    }
}

pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Reports diagnostics as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    levels: ImportLevels,
}

impl TracingSink {
    pub const fn new(levels: ImportLevels) -> Self {
        Self { levels }
    }

    fn level(&self, diagnostic: &Diagnostic) -> Level {
        match diagnostic {
            Diagnostic::AlreadyVisited { .. } => Level::WARN,
            Diagnostic::ImportFailed {
                origin: ImportOrigin::Discovered,
                ..
            } => self.levels.discovered,
            Diagnostic::ImportFailed {
                origin: ImportOrigin::Explicit,
                ..
            } => self.levels.explicit,
            Diagnostic::UnknownEntry { .. } | Diagnostic::UnreadableDirectory { .. } => {
                Level::DEBUG
            }
        }
    }
}

// `tracing` macros need the level as a constant.
macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            _ => tracing::trace!($($arg)+),
        }
    };
}

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        let level = self.level(&diagnostic);

        match &diagnostic {
            Diagnostic::ImportFailed { cause, .. } if tracing::enabled!(Level::DEBUG) => {
                event_at!(level, cause = %cause, "{diagnostic}");
            }
            Diagnostic::UnreadableDirectory { error, .. } => {
                event_at!(level, error = %error, "{diagnostic}");
            }
            _ => event_at!(level, "{diagnostic}"),
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}
