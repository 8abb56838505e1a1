use camino::Utf8PathBuf;
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    pub(crate) search_paths: Vec<Utf8PathBuf>,
    pub(crate) callbacks: Vec<String>,
    pub(crate) ignore_import_errors: bool,
    pub(crate) import_levels: ImportLevels,
}

impl ProjectSettings {
    pub fn search_paths(&self) -> &[Utf8PathBuf] {
        &self.search_paths
    }

    pub fn callbacks(&self) -> &[String] {
        &self.callbacks
    }

    pub const fn ignore_import_errors(&self) -> bool {
        self.ignore_import_errors
    }

    pub const fn import_levels(&self) -> ImportLevels {
        self.import_levels
    }
}

/// Severities for "unable to load" diagnostics.
///
/// Discovery failures are swallowed, so they default to a quieter level than
/// failures of explicitly named modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLevels {
    pub discovered: Level,
    pub explicit: Level,
}

impl Default for ImportLevels {
    fn default() -> Self {
        Self {
            discovered: Level::INFO,
            explicit: Level::ERROR,
        }
    }
}
