use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::module::Module;
use crate::name::ModuleName;

/// A shared, append-only store of loaded modules keyed by their qualified name.
///
/// Clones share the same storage. Once a name is present its handle never changes, so
/// repeated requests for a module return the handle created by the first load.
#[derive(Debug, Clone, Default)]
pub struct ModuleCache {
    modules: Arc<RwLock<HashMap<ModuleName, Arc<Module>>>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &ModuleName) -> Option<Arc<Module>> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &ModuleName) -> bool {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Stores `module` unless its name is already present, and returns the stored handle.
    pub fn insert(&self, module: Module) -> Arc<Module> {
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);

        Arc::clone(
            modules
                .entry(module.name().clone())
                .or_insert_with(|| Arc::new(module)),
        )
    }

    pub fn len(&self) -> usize {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
