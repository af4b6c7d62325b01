//! Host loader contract.
//!
//! The host application owns the module registry. This crate only needs two
//! things from it: the list of currently loaded modules, and type lookup by
//! fully-qualified name inside one of those modules.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::TypeDescriptor;

/// A module currently loaded by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedModule {
    /// Module name as registered with the host
    pub name: String,
    /// Module version
    pub version: semver::Version,
}

impl LoadedModule {
    pub fn new(name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

/// Module registry provided by the host application.
pub trait HostLoader: Send + Sync {
    /// Enumerate modules that are loaded right now.
    fn loaded_modules(&self) -> Vec<LoadedModule>;

    /// Resolve a type by fully-qualified name within a loaded module.
    fn resolve_type(&self, module: &str, full_name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Look up a loaded module by name.
    fn find_module(&self, name: &str) -> Option<LoadedModule> {
        self.loaded_modules().into_iter().find(|m| m.name == name)
    }
}

/// Type alias for a shared host loader.
pub type DynHostLoader = Arc<dyn HostLoader>;
