use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;

use crate::module::{Module, ModuleKind};

/// What the chain should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Skip the remaining callbacks for this module. The walk itself goes on.
    Filter,
}

pub trait Callback: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn call(&self, module: &Module, out: &mut dyn Write) -> anyhow::Result<Flow>;
}

#[derive(Debug)]
struct Print;

impl Callback for Print {
    fn name(&self) -> &str {
        "print"
    }

    fn call(&self, module: &Module, out: &mut dyn Write) -> anyhow::Result<Flow> {
        writeln!(out, "{}", module.name())?;
        Ok(Flow::Continue)
    }
}

#[derive(Debug)]
struct Path;

impl Callback for Path {
    fn name(&self) -> &str {
        "path"
    }

    fn call(&self, module: &Module, out: &mut dyn Write) -> anyhow::Result<Flow> {
        writeln!(out, "{}", module.path())?;
        Ok(Flow::Continue)
    }
}

#[derive(Debug)]
struct Doc;

impl Callback for Doc {
    fn name(&self) -> &str {
        "doc"
    }

    fn call(&self, module: &Module, out: &mut dyn Write) -> anyhow::Result<Flow> {
        match module.summary().docstring_summary() {
            Some(summary) => writeln!(out, "{}: {summary}", module.name())?,
            None => writeln!(out, "{}", module.name())?,
        }
        Ok(Flow::Continue)
    }
}

#[derive(Debug)]
struct Members;

impl Callback for Members {
    fn name(&self) -> &str {
        "members"
    }

    fn call(&self, module: &Module, out: &mut dyn Write) -> anyhow::Result<Flow> {
        let summary = module.summary();
        let members: Vec<&str> = summary
            .functions
            .iter()
            .chain(&summary.classes)
            .map(String::as_str)
            .collect();

        if members.is_empty() {
            writeln!(out, "{}", module.name())?;
        } else {
            writeln!(out, "{}: {}", module.name(), members.join(", "))?;
        }
        Ok(Flow::Continue)
    }
}

#[derive(Debug)]
struct Json;

impl Callback for Json {
    fn name(&self) -> &str {
        "json"
    }

    fn call(&self, module: &Module, out: &mut dyn Write) -> anyhow::Result<Flow> {
        serde_json::to_writer(&mut *out, module)?;
        writeln!(out)?;
        Ok(Flow::Continue)
    }
}

#[derive(Debug)]
struct SkipPrivate;

impl Callback for SkipPrivate {
    fn name(&self) -> &str {
        "skip_private"
    }

    fn call(&self, module: &Module, _out: &mut dyn Write) -> anyhow::Result<Flow> {
        if module.name().is_private() {
            Ok(Flow::Filter)
        } else {
            Ok(Flow::Continue)
        }
    }
}

/// Lets through only modules of one kind.
#[derive(Debug)]
struct OnlyKind {
    name: &'static str,
    kind: ModuleKind,
}

impl Callback for OnlyKind {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, module: &Module, _out: &mut dyn Write) -> anyhow::Result<Flow> {
        if module.kind() == self.kind {
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Filter)
        }
    }
}

/// An ordered list of callbacks run on every module.
#[derive(Debug, Clone, Default)]
pub struct CallbackChain {
    callbacks: Vec<Arc<dyn Callback>>,
}

impl CallbackChain {
    pub fn new(callbacks: Vec<Arc<dyn Callback>>) -> Self {
        Self { callbacks }
    }

    pub fn push(&mut self, callback: Arc<dyn Callback>) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.callbacks.iter().map(|callback| callback.name())
    }

    /// Runs the callbacks in order until one of them returns [`Flow::Filter`].
    pub fn run(&self, module: &Module, out: &mut dyn Write) -> anyhow::Result<Flow> {
        for callback in &self.callbacks {
            let flow = callback.call(module, out).with_context(|| {
                format!(
                    "Callback `{}` failed for module `{}`",
                    callback.name(),
                    module.name()
                )
            })?;

            if flow == Flow::Filter {
                tracing::trace!("`{}` filtered `{}`", callback.name(), module.name());
                return Ok(Flow::Filter);
            }
        }

        Ok(Flow::Continue)
    }
}

impl FromIterator<Arc<dyn Callback>> for CallbackChain {
    fn from_iter<T: IntoIterator<Item = Arc<dyn Callback>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackError {
    #[error("unknown callback `{name}` (available: {available})")]
    UnknownCallback { name: String, available: String },
}

/// Looks up callbacks by name.
#[derive(Debug, Clone)]
pub struct CallbackRegistry {
    callbacks: BTreeMap<String, Arc<dyn Callback>>,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CallbackRegistry {
    /// A registry without any callbacks.
    pub fn empty() -> Self {
        Self {
            callbacks: BTreeMap::new(),
        }
    }

    /// A registry holding the callbacks shipped with modwalk.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Arc::new(Print))
            .register(Arc::new(Path))
            .register(Arc::new(Doc))
            .register(Arc::new(Members))
            .register(Arc::new(Json))
            .register(Arc::new(SkipPrivate))
            .register(Arc::new(OnlyKind {
                name: "packages_only",
                kind: ModuleKind::Package,
            }))
            .register(Arc::new(OnlyKind {
                name: "modules_only",
                kind: ModuleKind::Module,
            }));
        registry
    }

    /// Adds `callback`, replacing any callback of the same name.
    pub fn register(&mut self, callback: Arc<dyn Callback>) -> &mut Self {
        self.callbacks.insert(callback.name().to_string(), callback);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.callbacks.keys().map(String::as_str)
    }

    /// Finds the callback called `name`.
    ///
    /// `modwalk.print` and `.print` both name the `print` callback; any other dotted
    /// prefix is unknown.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Callback>, CallbackError> {
        let short = match name.rsplit_once('.') {
            Some(("modwalk" | "", short)) => short,
            Some(_) => return Err(self.unknown(name)),
            None => name,
        };

        self.callbacks
            .get(short)
            .cloned()
            .ok_or_else(|| self.unknown(name))
    }

    fn unknown(&self, name: &str) -> CallbackError {
        CallbackError::UnknownCallback {
            name: name.to_string(),
            available: self.names().collect::<Vec<_>>().join(", "),
        }
    }
}
