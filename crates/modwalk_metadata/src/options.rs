use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{ImportLevels, ProjectSettings};

/// The options of a `modwalk.toml` file or a `[tool.modwalk]` table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Options {
    /// Directories searched, in order, for top-level modules.
    ///
    /// Relative entries are resolved against the directory containing the configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_paths: Option<Vec<String>>,

    /// Callbacks invoked for each module when none are given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<Vec<String>>,

    /// Skip explicitly named modules and callbacks that fail to load instead of aborting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_import_errors: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<LogOptions>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LogOptions {
    /// Severity used when a sub-module found during discovery fails to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered_import_level: Option<LogLevel>,

    /// Severity used when an explicitly named module or callback fails to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit_import_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

impl Options {
    pub fn from_toml_str(content: &str) -> Result<Self, ModwalkTomlError> {
        let options = toml::from_str(content)?;
        Ok(options)
    }

    /// Merges `other` into `self`; values already set on `self` win.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        let log = match (self.log, other.log) {
            (Some(log), Some(other)) => Some(LogOptions {
                discovered_import_level: log
                    .discovered_import_level
                    .or(other.discovered_import_level),
                explicit_import_level: log.explicit_import_level.or(other.explicit_import_level),
            }),
            (log, other) => log.or(other),
        };

        Self {
            search_paths: self.search_paths.or(other.search_paths),
            callbacks: self.callbacks.or(other.callbacks),
            ignore_import_errors: self.ignore_import_errors.or(other.ignore_import_errors),
            log,
        }
    }

    /// Resolves relative `search-paths` against `directory`.
    #[must_use]
    pub fn relative_to(mut self, directory: &Utf8Path) -> Self {
        if let Some(paths) = &mut self.search_paths {
            for path in paths.iter_mut() {
                *path = modwalk_system::path::absolute(&*path, directory).into_string();
            }
        }
        self
    }

    /// Resolves the options into settings for a project rooted at `root`.
    ///
    /// Without configured search paths, top-level modules are looked up in `cwd`.
    pub fn to_settings(
        &self,
        root: &Utf8Path,
        cwd: &Utf8Path,
    ) -> Result<ProjectSettings, ToSettingsError> {
        let search_paths = match &self.search_paths {
            Some(paths) if paths.is_empty() => return Err(ToSettingsError::EmptySearchPaths),
            Some(paths) => paths
                .iter()
                .map(|path| modwalk_system::path::absolute(path, root))
                .collect(),
            None => vec![cwd.to_path_buf()],
        };

        let callbacks = self
            .callbacks
            .clone()
            .unwrap_or_else(|| vec!["print".to_string()]);

        let log = self.log.clone().unwrap_or_default();
        let defaults = ImportLevels::default();
        let import_levels = ImportLevels {
            discovered: log
                .discovered_import_level
                .map_or(defaults.discovered, Into::into),
            explicit: log
                .explicit_import_level
                .map_or(defaults.explicit, Into::into),
        };

        Ok(ProjectSettings {
            search_paths,
            callbacks,
            ignore_import_errors: self.ignore_import_errors.unwrap_or(false),
            import_levels,
        })
    }
}

/// Command-line values that take precedence over any configuration file.
#[derive(Debug, Default, Clone)]
pub struct ProjectOptionsOverrides {
    pub config_file_override: Option<Utf8PathBuf>,
    pub options: Options,
}

impl ProjectOptionsOverrides {
    pub const fn new(config_file_override: Option<Utf8PathBuf>, options: Options) -> Self {
        Self {
            config_file_override,
            options,
        }
    }

    pub(crate) fn apply_to(&self, options: Options) -> Options {
        self.options.clone().combine(options)
    }
}

#[derive(Debug, Error)]
pub enum ModwalkTomlError {
    #[error(transparent)]
    TomlSyntax(#[from] toml::de::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToSettingsError {
    #[error("`search-paths` must contain at least one directory")]
    EmptySearchPaths,
}
