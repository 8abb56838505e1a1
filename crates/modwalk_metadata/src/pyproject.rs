use serde::Deserialize;
use thiserror::Error;

use crate::options::Options;

/// The subset of a `pyproject.toml` that modwalk reads.
#[derive(Debug, Default, Deserialize)]
pub struct PyProject {
    pub tool: Option<Tool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Tool {
    pub modwalk: Option<Options>,
}

impl PyProject {
    pub fn from_toml_str(content: &str) -> Result<Self, PyProjectError> {
        toml::from_str(content).map_err(PyProjectError::TomlSyntax)
    }

    pub fn into_modwalk(self) -> Option<Options> {
        self.tool.and_then(|tool| tool.modwalk)
    }
}

#[derive(Debug, Error)]
pub enum PyProjectError {
    #[error(transparent)]
    TomlSyntax(#[from] toml::de::Error),
}
