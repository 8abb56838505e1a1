use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Returns `true` if `name` is an ASCII identifier: a letter or underscore followed by
/// letters, digits and underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A fully qualified, dotted module name such as `pkg.sub.mod`.
///
/// Every component is an identifier (see [`is_identifier`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(name: &str) -> Result<Self, InvalidModuleName> {
        if name.split('.').all(is_identifier) {
            Ok(Self(name.to_string()))
        } else {
            Err(InvalidModuleName(name.to_string()))
        }
    }

    /// Appends `component` to this name.
    pub fn child(&self, component: &str) -> Result<Self, InvalidModuleName> {
        if is_identifier(component) {
            Ok(Self(format!("{}.{component}", self.0)))
        } else {
            Err(InvalidModuleName(format!("{}.{component}", self.0)))
        }
    }

    /// The name of the enclosing package, or `None` for a top-level module.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| Self(parent.to_string()))
    }

    pub fn components(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.split('.')
    }

    pub fn last(&self) -> &str {
        self.components().next_back().unwrap_or_default()
    }

    /// Private modules have a last component starting with an underscore.
    pub fn is_private(&self) -> bool {
        self.last().starts_with('_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModuleName {
    type Err = InvalidModuleName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("`{0}` is not a valid module name")]
pub struct InvalidModuleName(pub String);
