use std::io::Write;

use modwalk_system::System;

pub mod cache;
pub mod callback;
pub mod diagnostic;
pub mod module;
pub mod name;
pub mod resolver;
pub mod walker;

pub use cache::ModuleCache;
pub use callback::{Callback, CallbackChain, CallbackError, CallbackRegistry, Flow};
pub use diagnostic::{Diagnostic, DiagnosticSink, ImportOrigin, RecordingSink, TracingSink};
pub use module::{Module, ModuleKind, ModuleSource, ModuleSummary};
pub use name::{InvalidModuleName, ModuleName};
pub use resolver::{FileResolver, ResolutionError, Resolver};
pub use walker::{ModuleSpec, ModuleWalker, modgen};

use crate::walker::error_chain;

/// A module named by the user, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRequest {
    pub name: String,
    pub recurse: bool,
    /// Whether a failure to load this module is skipped, or `None` to use the
    /// configured policy.
    pub ignore_errors: Option<bool>,
}

impl RootRequest {
    pub fn new(name: impl Into<String>, recurse: bool) -> Self {
        Self {
            name: name.into(),
            recurse,
            ignore_errors: None,
        }
    }

    #[must_use]
    pub const fn with_ignore_errors(mut self, ignore_errors: Option<bool>) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }
}

/// A callback named by the user or by the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRequest {
    pub name: String,
    /// Whether an unknown callback is skipped, or `None` to use the configured policy.
    pub ignore_errors: Option<bool>,
}

impl CallbackRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ignore_errors: None,
        }
    }

    #[must_use]
    pub const fn with_ignore_errors(mut self, ignore_errors: Option<bool>) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }
}

/// Loads the explicitly requested modules, in order.
///
/// The first failure is returned unless the request is marked as ignoring errors, in
/// which case the module is reported as an explicit import failure and left out.
/// `ignore_errors` applies to requests without a policy of their own.
pub fn resolve_roots(
    requests: &[RootRequest],
    resolver: &impl Resolver,
    ignore_errors: bool,
    sink: &impl DiagnosticSink,
) -> Result<Vec<ModuleSpec>, ResolutionError> {
    let mut specs = Vec::with_capacity(requests.len());

    for request in requests {
        let resolved = ModuleName::new(&request.name)
            .map_err(ResolutionError::from)
            .and_then(|name| resolver.resolve(&name));

        match resolved {
            Ok(module) => specs.push(ModuleSpec::new(module, request.recurse)),
            Err(error) if request.ignore_errors.unwrap_or(ignore_errors) => {
                sink.report(Diagnostic::ImportFailed {
                    name: request.name.clone(),
                    origin: ImportOrigin::Explicit,
                    cause: error_chain(&error),
                });
            }
            Err(error) => return Err(error),
        }
    }

    Ok(specs)
}

/// Builds the callback chain from callback names, in order.
///
/// Unknown names follow the same policy as [`resolve_roots`].
pub fn resolve_callbacks(
    requests: &[CallbackRequest],
    registry: &CallbackRegistry,
    ignore_errors: bool,
    sink: &impl DiagnosticSink,
) -> Result<CallbackChain, CallbackError> {
    let mut chain = CallbackChain::default();

    for request in requests {
        match registry.resolve(&request.name) {
            Ok(callback) => chain.push(callback),
            Err(error) if request.ignore_errors.unwrap_or(ignore_errors) => {
                sink.report(Diagnostic::ImportFailed {
                    name: request.name.clone(),
                    origin: ImportOrigin::Explicit,
                    cause: error.to_string(),
                });
            }
            Err(error) => return Err(error),
        }
    }

    Ok(chain)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Modules yielded by the walker.
    pub visited: usize,
    /// Modules for which a callback stopped the chain.
    pub filtered: usize,
}

/// Walks `specs` and runs `chain` on every module.
///
/// A failing callback aborts the walk.
pub fn modwalk<R, S>(
    specs: Vec<ModuleSpec>,
    chain: &CallbackChain,
    resolver: R,
    system: &dyn System,
    sink: S,
    out: &mut dyn Write,
) -> anyhow::Result<WalkOutcome>
where
    R: Resolver,
    S: DiagnosticSink,
{
    let mut outcome = WalkOutcome::default();

    for module in modgen(specs, resolver, system, sink) {
        outcome.visited += 1;

        if chain.run(&module, out)? == Flow::Filter {
            outcome.filtered += 1;
        }
    }

    tracing::debug!(
        "Visited {} modules ({} filtered)",
        outcome.visited,
        outcome.filtered
    );

    Ok(outcome)
}
