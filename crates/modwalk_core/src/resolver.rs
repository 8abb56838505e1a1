use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use modwalk_static::{MODULE_EXTENSIONS, PACKAGE_INITIALIZER};
use modwalk_system::System;
use thiserror::Error;

use crate::cache::ModuleCache;
use crate::module::{Module, ModuleSource, ModuleSummary};
use crate::name::{InvalidModuleName, ModuleName};

/// Turns a qualified module name into a loaded module.
pub trait Resolver {
    fn resolve(&self, name: &ModuleName) -> Result<Arc<Module>, ResolutionError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, name: &ModuleName) -> Result<Arc<Module>, ResolutionError> {
        (**self).resolve(name)
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no module named `{name}`")]
    NotFound { name: ModuleName },

    #[error("`{parent}` is not a package, so `{name}` cannot be imported from it")]
    NotAPackage {
        name: ModuleName,
        parent: ModuleName,
    },

    #[error("failed to read `{path}` for module `{name}`")]
    Io {
        name: ModuleName,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("module `{name}` at `{path}` has invalid syntax: {message}")]
    Syntax {
        name: ModuleName,
        path: Utf8PathBuf,
        message: String,
    },

    #[error(transparent)]
    InvalidName(#[from] InvalidModuleName),
}

/// Resolves modules against directories on disk, Python-style.
///
/// Top-level names are looked up in each search path in order. Sub-module names are
/// looked up inside the directory of their (resolved) parent package. A package
/// directory wins over a module file of the same name.
#[derive(Debug)]
pub struct FileResolver<'a> {
    system: &'a dyn System,
    search_paths: Vec<Utf8PathBuf>,
    cache: ModuleCache,
}

impl<'a> FileResolver<'a> {
    pub fn new(system: &'a dyn System, search_paths: Vec<Utf8PathBuf>, cache: ModuleCache) -> Self {
        Self {
            system,
            search_paths,
            cache,
        }
    }

    /// Finds the file backing `component` inside `directory`.
    fn locate(&self, directory: &Utf8Path, component: &str) -> Option<Utf8PathBuf> {
        let package_directory = directory.join(component);

        if self.system.is_directory(&package_directory) {
            let initializer = MODULE_EXTENSIONS.iter().find_map(|extension| {
                let path = package_directory.join(format!("{PACKAGE_INITIALIZER}.{extension}"));
                self.system.is_file(&path).then_some(path)
            });

            if initializer.is_some() {
                return initializer;
            }
        }

        MODULE_EXTENSIONS.iter().find_map(|extension| {
            let path = directory.join(format!("{component}.{extension}"));
            self.system.is_file(&path).then_some(path)
        })
    }

    fn load(&self, name: &ModuleName, path: Utf8PathBuf) -> Result<Module, ResolutionError> {
        if path.extension() != Some("py") {
            return Ok(Module::new(
                name.clone(),
                path,
                ModuleSource::Binary,
                ModuleSummary::default(),
            ));
        }

        let source = self
            .system
            .read_to_string(&path)
            .map_err(|source| ResolutionError::Io {
                name: name.clone(),
                path: path.clone(),
                source,
            })?;

        let summary =
            ModuleSummary::from_source(&source).map_err(|error| ResolutionError::Syntax {
                name: name.clone(),
                path: path.clone(),
                message: error.to_string(),
            })?;

        Ok(Module::new(name.clone(), path, ModuleSource::Source, summary))
    }
}

impl Resolver for FileResolver<'_> {
    fn resolve(&self, name: &ModuleName) -> Result<Arc<Module>, ResolutionError> {
        if let Some(module) = self.cache.get(name) {
            return Ok(module);
        }

        let path = if let Some(parent_name) = name.parent() {
            let parent = self.resolve(&parent_name)?;

            if !parent.is_package() {
                return Err(ResolutionError::NotAPackage {
                    name: name.clone(),
                    parent: parent_name,
                });
            }

            self.locate(parent.directory(), name.last())
        } else {
            self.search_paths
                .iter()
                .find_map(|search_path| self.locate(search_path, name.last()))
        };

        let Some(path) = path else {
            return Err(ResolutionError::NotFound { name: name.clone() });
        };

        tracing::trace!("Loading `{name}` from `{path}`");

        let module = self.load(name, path)?;

        Ok(self.cache.insert(module))
    }
}
