use std::collections::{BTreeSet, HashSet, VecDeque};
use std::error::Error;
use std::sync::Arc;

use camino::Utf8Path;
use modwalk_static::{MODULE_EXTENSIONS, PACKAGE_INITIALIZER};
use modwalk_system::{DirectoryEntry, FileType, System};

use crate::diagnostic::{Diagnostic, DiagnosticSink, ImportOrigin};
use crate::module::Module;
use crate::name::{ModuleName, is_identifier};
use crate::resolver::Resolver;

/// A module waiting to be visited, and whether its sub-modules should be discovered.
#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub module: Arc<Module>,
    pub recurse: bool,
}

impl ModuleSpec {
    pub const fn new(module: Arc<Module>, recurse: bool) -> Self {
        Self { module, recurse }
    }
}

/// Lazily yields every module reachable from a set of roots.
///
/// Each module is yielded at most once and always before its sub-modules. A yielded
/// package is only expanded when the next module is requested, so stopping early
/// never loads the children of the last module seen.
///
/// Sub-modules that fail to load are reported to the sink and dropped.
pub struct ModuleWalker<'a, R, S> {
    queue: VecDeque<ModuleSpec>,
    seen: HashSet<ModuleName>,
    pending: Option<ModuleSpec>,
    resolver: R,
    system: &'a dyn System,
    sink: S,
}

/// Walks `specs` in order. See [`ModuleWalker`].
pub fn modgen<'a, R, S>(
    specs: impl IntoIterator<Item = ModuleSpec>,
    resolver: R,
    system: &'a dyn System,
    sink: S,
) -> ModuleWalker<'a, R, S>
where
    R: Resolver,
    S: DiagnosticSink,
{
    ModuleWalker::new(specs, resolver, system, sink)
}

impl<'a, R, S> ModuleWalker<'a, R, S>
where
    R: Resolver,
    S: DiagnosticSink,
{
    pub fn new(
        specs: impl IntoIterator<Item = ModuleSpec>,
        resolver: R,
        system: &'a dyn System,
        sink: S,
    ) -> Self {
        Self {
            queue: specs.into_iter().collect(),
            seen: HashSet::new(),
            pending: None,
            resolver,
            system,
            sink,
        }
    }

    /// Queues the loadable sub-modules of `spec` ahead of everything else.
    fn expand(&mut self, spec: &ModuleSpec) {
        let parent = &spec.module;
        let mut children = VecDeque::new();

        for candidate in self.candidates(parent.directory()).iter().rev() {
            let child = match parent.name().child(candidate) {
                Ok(child) => child,
                Err(error) => {
                    self.report_import_failure(error.0.clone(), &error);
                    continue;
                }
            };

            match self.resolver.resolve(&child) {
                Ok(module) => children.push_front(ModuleSpec::new(module, spec.recurse)),
                Err(error) => self.report_import_failure(child.to_string(), &error),
            }
        }

        tracing::trace!("Discovered {} sub-modules of `{}`", children.len(), parent.name());

        while let Some(child) = children.pop_back() {
            self.queue.push_front(child);
        }
    }

    /// Names in `directory` that could be sub-modules, without duplicates.
    fn candidates(&self, directory: &Utf8Path) -> BTreeSet<String> {
        let mut candidates = BTreeSet::new();

        let entries = match self.system.read_directory(directory) {
            Ok(entries) => entries,
            Err(error) => {
                self.sink.report(Diagnostic::UnreadableDirectory {
                    path: directory.to_path_buf(),
                    error: error.to_string(),
                });
                return candidates;
            }
        };

        for entry in entries {
            match entry {
                Ok(entry) => {
                    if let Some(candidate) = self.candidate(&entry) {
                        candidates.insert(candidate.to_string());
                    }
                }
                Err(error) => self.sink.report(Diagnostic::UnreadableDirectory {
                    path: directory.to_path_buf(),
                    error: error.to_string(),
                }),
            }
        }

        candidates
    }

    fn candidate<'e>(&self, entry: &'e DirectoryEntry) -> Option<&'e str> {
        match entry.file_type() {
            FileType::Directory => entry.file_name().filter(|name| is_identifier(name)),
            FileType::File => {
                let path = entry.path();
                let extension = path.extension()?;
                let stem = path.file_stem()?;

                (MODULE_EXTENSIONS.contains(&extension)
                    && stem != PACKAGE_INITIALIZER
                    && is_identifier(stem))
                .then_some(stem)
            }
            FileType::Symlink | FileType::Other => {
                self.sink.report(Diagnostic::UnknownEntry {
                    path: entry.path().to_path_buf(),
                });
                None
            }
        }
    }

    fn report_import_failure(&self, name: String, error: &dyn Error) {
        self.sink.report(Diagnostic::ImportFailed {
            name,
            origin: ImportOrigin::Discovered,
            cause: error_chain(error),
        });
    }
}

impl<R, S> Iterator for ModuleWalker<'_, R, S>
where
    R: Resolver,
    S: DiagnosticSink,
{
    type Item = Arc<Module>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(spec) = self.pending.take() {
            self.expand(&spec);
        }

        loop {
            let spec = self.queue.pop_front()?;

            if !self.seen.insert(spec.module.name().clone()) {
                self.sink.report(Diagnostic::AlreadyVisited {
                    name: spec.module.name().clone(),
                });
                continue;
            }

            let module = Arc::clone(&spec.module);

            if spec.recurse && module.is_package() {
                self.pending = Some(spec);
            }

            return Some(module);
        }
    }
}

/// Renders `error` and its sources as `error: source: source`.
pub(crate) fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }

    rendered
}
