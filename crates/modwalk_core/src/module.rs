use camino::{Utf8Path, Utf8PathBuf};
use modwalk_static::PACKAGE_INITIALIZER;
use ruff_python_ast::{self as ast, Expr, Stmt};
use ruff_python_parser::ParseError;
use serde::Serialize;

use crate::name::ModuleName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Backed by a package initializer; may contain child modules.
    Package,
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSource {
    /// Python source that was parsed when the module was loaded.
    Source,
    /// Compiled bytecode or an extension module; never parsed.
    Binary,
}

/// Top-level facts extracted from a module's source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub docstring: Option<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
}

impl ModuleSummary {
    /// Parses `source` and collects its docstring and top-level definitions.
    pub fn from_source(source: &str) -> Result<Self, ParseError> {
        let parsed = ruff_python_parser::parse_module(source)?;
        let body = &parsed.syntax().body;

        let docstring = body.first().and_then(|stmt| {
            let Stmt::Expr(ast::StmtExpr { value, .. }) = stmt else {
                return None;
            };
            let Expr::StringLiteral(ast::ExprStringLiteral { value, .. }) = &**value else {
                return None;
            };
            Some(value.to_str().to_string())
        });

        let mut summary = Self {
            docstring,
            ..Self::default()
        };

        for stmt in body {
            match stmt {
                Stmt::FunctionDef(function_def) => {
                    summary.functions.push(function_def.name.to_string());
                }
                Stmt::ClassDef(class_def) => {
                    summary.classes.push(class_def.name.to_string());
                }
                _ => {}
            }
        }

        Ok(summary)
    }

    /// The first non-blank line of the docstring.
    pub fn docstring_summary(&self) -> Option<&str> {
        self.docstring
            .as_deref()
            .and_then(|docstring| docstring.lines().map(str::trim).find(|line| !line.is_empty()))
    }
}

/// A loaded module.
///
/// Handles are owned by the [`ModuleCache`](crate::ModuleCache) and shared as `Arc<Module>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    name: ModuleName,
    path: Utf8PathBuf,
    kind: ModuleKind,
    source: ModuleSource,
    #[serde(flatten)]
    summary: ModuleSummary,
}

impl Module {
    pub fn new(
        name: ModuleName,
        path: Utf8PathBuf,
        source: ModuleSource,
        summary: ModuleSummary,
    ) -> Self {
        let kind = if path.file_stem() == Some(PACKAGE_INITIALIZER) {
            ModuleKind::Package
        } else {
            ModuleKind::Module
        };

        Self {
            name,
            path,
            kind,
            source,
            summary,
        }
    }

    pub const fn name(&self) -> &ModuleName {
        &self.name
    }

    /// The file the module was loaded from.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The directory containing [`Self::path`]. For a package, this is the package directory.
    pub fn directory(&self) -> &Utf8Path {
        self.path.parent().unwrap_or(&self.path)
    }

    pub const fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub const fn is_package(&self) -> bool {
        matches!(self.kind, ModuleKind::Package)
    }

    pub const fn source(&self) -> ModuleSource {
        self.source
    }

    pub const fn summary(&self) -> &ModuleSummary {
        &self.summary
    }
}
