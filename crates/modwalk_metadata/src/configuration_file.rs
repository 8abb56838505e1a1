use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use modwalk_static::MODWALK_CONFIG_FILE_NAME;
use modwalk_system::System;
use thiserror::Error;

use crate::options::{ModwalkTomlError, Options};
use crate::pyproject::{PyProject, PyProjectError};

/// How a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationOrigin {
    /// Named by `--config-file` or `MODWALK_CONFIG_FILE`.
    Explicit,
    /// A `modwalk.toml` in the working directory or one of its ancestors.
    Project,
    /// The `[tool.modwalk]` table of a `pyproject.toml`.
    PyProject,
    /// The `modwalk.toml` in the user's configuration directory.
    User,
}

impl fmt::Display for ConfigurationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Explicit => "configuration file",
            Self::Project => "project configuration",
            Self::PyProject => "`tool.modwalk` table",
            Self::User => "user configuration",
        })
    }
}

/// Options read from one file.
///
/// Relative `search-paths` belong to the file's directory, so they are resolved as soon as
/// the file is loaded. Options from several files can then be combined freely.
#[derive(Debug)]
pub struct ConfigurationFile {
    path: Utf8PathBuf,
    origin: ConfigurationOrigin,
    options: Options,
}

impl ConfigurationFile {
    /// Reads the `modwalk.toml` at `path`.
    pub(crate) fn modwalk_toml(
        path: Utf8PathBuf,
        origin: ConfigurationOrigin,
        system: &dyn System,
    ) -> Result<Self, ConfigurationFileError> {
        let content = read(&path, origin, system)?;

        match Options::from_toml_str(&content) {
            Ok(options) => Ok(Self::new(path, origin, options)),
            Err(source) => Err(ConfigurationFileError::InvalidModwalkToml {
                origin,
                path,
                source: Box::new(source),
            }),
        }
    }

    /// Reads the `[tool.modwalk]` table of the `pyproject.toml` at `path`.
    ///
    /// Returns `None` if the file cannot be read or has no such table.
    pub(crate) fn pyproject(
        path: Utf8PathBuf,
        system: &dyn System,
    ) -> Result<Option<Self>, ConfigurationFileError> {
        let Ok(content) = system.read_to_string(&path) else {
            return Ok(None);
        };

        let pyproject = PyProject::from_toml_str(&content).map_err(|source| {
            ConfigurationFileError::InvalidPyProject {
                path: path.clone(),
                source: Box::new(source),
            }
        })?;

        Ok(pyproject
            .into_modwalk()
            .map(|options| Self::new(path, ConfigurationOrigin::PyProject, options)))
    }

    /// Reads the user-level `modwalk.toml`.
    ///
    /// Returns `None` if the file does not exist or `system` has no user configuration
    /// directory.
    pub(crate) fn user(system: &dyn System) -> Result<Option<Self>, ConfigurationFileError> {
        let Some(directory) = system.user_config_directory() else {
            return Ok(None);
        };

        let path = directory.join("modwalk").join(MODWALK_CONFIG_FILE_NAME);

        tracing::debug!("Searching for a user-level configuration at `{path}`");

        if !system.is_file(&path) {
            return Ok(None);
        }

        Self::modwalk_toml(path, ConfigurationOrigin::User, system).map(Some)
    }

    fn new(path: Utf8PathBuf, origin: ConfigurationOrigin, options: Options) -> Self {
        let options = match path.parent() {
            Some(directory) => options.relative_to(directory),
            None => options,
        };

        Self {
            path,
            origin,
            options,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub const fn origin(&self) -> ConfigurationOrigin {
        self.origin
    }

    /// The directory relative `search-paths` were resolved against.
    pub fn directory(&self) -> Option<&Utf8Path> {
        self.path.parent()
    }

    pub(crate) fn into_options(self) -> Options {
        self.options
    }
}

fn read(
    path: &Utf8Path,
    origin: ConfigurationOrigin,
    system: &dyn System,
) -> Result<String, ConfigurationFileError> {
    system
        .read_to_string(path)
        .map_err(|source| ConfigurationFileError::Read {
            origin,
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Error)]
pub enum ConfigurationFileError {
    #[error("Failed to read the {origin} at `{path}`")]
    Read {
        origin: ConfigurationOrigin,
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("The {origin} at `{path}` is not a valid `modwalk.toml`")]
    InvalidModwalkToml {
        origin: ConfigurationOrigin,
        path: Utf8PathBuf,
        source: Box<ModwalkTomlError>,
    },

    #[error("`{path}` is not a valid `pyproject.toml`")]
    InvalidPyProject {
        path: Utf8PathBuf,
        source: Box<PyProjectError>,
    },
}

impl ConfigurationFileError {
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Read { path, .. }
            | Self::InvalidModwalkToml { path, .. }
            | Self::InvalidPyProject { path, .. } => path,
        }
    }
}
