use camino::{Utf8Path, Utf8PathBuf};
use modwalk_static::MODWALK_CONFIG_FILE_NAME;
use modwalk_system::System;
use thiserror::Error;

mod configuration_file;
mod options;
mod pyproject;
mod settings;

pub use self::{
    configuration_file::{ConfigurationFile, ConfigurationFileError, ConfigurationOrigin},
    options::{
        LogLevel, LogOptions, ModwalkTomlError, Options, ProjectOptionsOverrides, ToSettingsError,
    },
    pyproject::{PyProject, PyProjectError},
    settings::{ImportLevels, ProjectSettings},
};

#[derive(Default, Debug, Clone)]
pub struct ProjectMetadata {
    pub(crate) root: Utf8PathBuf,

    /// Raw options
    pub(crate) options: Options,

    /// The file the options were read from, if any.
    pub(crate) config_file: Option<Utf8PathBuf>,
}

impl ProjectMetadata {
    /// Creates a project with the given root that uses the default options.
    pub fn new(root: Utf8PathBuf) -> Self {
        Self {
            root,
            options: Options::default(),
            config_file: None,
        }
    }

    /// Loads the project from an explicitly named configuration file.
    ///
    /// The project root is the directory containing the file.
    pub fn from_config_file(
        path: Utf8PathBuf,
        system: &dyn System,
    ) -> Result<Self, ProjectMetadataError> {
        tracing::debug!("Using overridden configuration file at '{path}'");

        let config_file =
            ConfigurationFile::modwalk_toml(path, ConfigurationOrigin::Explicit, system)?;
        let root = config_file
            .directory()
            .map_or_else(|| system.current_directory().to_path_buf(), Utf8Path::to_path_buf);

        Ok(Self::from_configuration(root, config_file))
    }

    /// Discovers the closest project at `path` and returns its metadata.
    ///
    /// The algorithm traverses upwards in the `path`'s ancestor chain and stops at the
    /// first directory containing either a `modwalk.toml` or a `pyproject.toml` with a
    /// `[tool.modwalk]` table. A `modwalk.toml` takes precedence over a `pyproject.toml`
    /// in the same directory.
    ///
    /// The user-level configuration supplies any value the project leaves unset. Without
    /// any configuration, `path` becomes the root and the defaults are used.
    pub fn discover(path: &Utf8Path, system: &dyn System) -> Result<Self, ProjectMetadataError> {
        tracing::debug!("Searching for a project in '{path}'");

        if !system.is_directory(path) {
            return Err(ProjectMetadataError::NotADirectory(path.to_path_buf()));
        }

        let user = ConfigurationFile::user(system)?;

        let mut metadata = Self::discover_project(path, system)?.unwrap_or_else(|| {
            tracing::debug!(
                "The ancestor directories contain no modwalk configuration. Falling back to the defaults."
            );
            Self::new(path.to_path_buf())
        });

        if let Some(user) = user {
            tracing::debug!("Applying user-level configuration from '{}'", user.path());
            metadata.options = std::mem::take(&mut metadata.options).combine(user.into_options());
        }

        Ok(metadata)
    }

    fn discover_project(
        path: &Utf8Path,
        system: &dyn System,
    ) -> Result<Option<Self>, ProjectMetadataError> {
        for project_root in path.ancestors() {
            let modwalk_toml_path = project_root.join(MODWALK_CONFIG_FILE_NAME);
            let pyproject_path = project_root.join("pyproject.toml");

            if system.is_file(&modwalk_toml_path) {
                let config_file = ConfigurationFile::modwalk_toml(
                    modwalk_toml_path,
                    ConfigurationOrigin::Project,
                    system,
                )?;

                if let Ok(Some(shadowed)) = ConfigurationFile::pyproject(pyproject_path, system) {
                    tracing::warn!(
                        "Ignoring the `tool.modwalk` section in `{}` because `{}` takes precedence.",
                        shadowed.path(),
                        config_file.path(),
                    );
                }

                tracing::debug!("Found project at '{}'", project_root);
                return Ok(Some(Self::from_configuration(
                    project_root.to_path_buf(),
                    config_file,
                )));
            }

            if let Some(config_file) = ConfigurationFile::pyproject(pyproject_path, system)? {
                tracing::debug!("Found project at '{}'", project_root);
                return Ok(Some(Self::from_configuration(
                    project_root.to_path_buf(),
                    config_file,
                )));
            }
        }

        Ok(None)
    }

    fn from_configuration(root: Utf8PathBuf, config_file: ConfigurationFile) -> Self {
        Self {
            root,
            config_file: Some(config_file.path().to_path_buf()),
            options: config_file.into_options(),
        }
    }

    pub const fn root(&self) -> &Utf8PathBuf {
        &self.root
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub fn config_file(&self) -> Option<&Utf8Path> {
        self.config_file.as_deref()
    }

    pub fn apply_overrides(&mut self, overrides: &ProjectOptionsOverrides) {
        self.options = overrides.apply_to(std::mem::take(&mut self.options));
    }

    /// Resolves the settings, looking up top-level modules relative to the system's
    /// working directory when no search paths are configured.
    pub fn to_settings(&self, system: &dyn System) -> Result<ProjectSettings, ToSettingsError> {
        self.options
            .to_settings(&self.root, system.current_directory())
    }
}

#[derive(Debug, Error)]
pub enum ProjectMetadataError {
    #[error("project path '{0}' is not a directory")]
    NotADirectory(Utf8PathBuf),

    #[error(transparent)]
    ConfigurationFile(#[from] ConfigurationFileError),
}
