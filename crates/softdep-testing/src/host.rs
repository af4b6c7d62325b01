//! In-memory host loader.
//!
//! Modules can be loaded and unloaded while consumers hold bindings, which is
//! how tests exercise late loading and provider removal.

use std::sync::Arc;

use parking_lot::RwLock;
use softdep_core::{HostLoader, LoadedModule, TypeDescriptor};

use crate::provider::SimulatedAlarmClock;

struct SimulatedModule {
    info: LoadedModule,
    types: Vec<Arc<TypeDescriptor>>,
}

/// Host whose module registry is driven by the test.
#[derive(Default)]
pub struct SimulatedHost {
    modules: RwLock<Vec<SimulatedModule>>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with the given alarm clock already loaded.
    pub fn with_alarm_clock(clock: &SimulatedAlarmClock) -> Arc<Self> {
        let host = Arc::new(Self::new());
        host.install(clock);
        host
    }

    /// Load a module, replacing any module of the same name.
    pub fn load_module(
        &self,
        name: impl Into<String>,
        version: semver::Version,
        types: Vec<Arc<TypeDescriptor>>,
    ) {
        let info = LoadedModule::new(name, version);
        tracing::debug!(module = %info.name, version = %info.version, "Loading simulated module");

        let mut modules = self.modules.write();
        modules.retain(|m| m.info.name != info.name);
        modules.push(SimulatedModule { info, types });
    }

    /// Load the alarm clock's module and types.
    pub fn install(&self, clock: &SimulatedAlarmClock) {
        self.load_module(
            clock.module_name(),
            clock.version().clone(),
            vec![Arc::clone(clock.main_type()), Arc::clone(clock.record_type())],
        );
    }

    /// Unload a module. Returns whether it was loaded.
    pub fn unload_module(&self, name: &str) -> bool {
        let mut modules = self.modules.write();
        let before = modules.len();
        modules.retain(|m| m.info.name != name);
        before != modules.len()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.modules.read().iter().any(|m| m.info.name == name)
    }
}

impl HostLoader for SimulatedHost {
    fn loaded_modules(&self) -> Vec<LoadedModule> {
        self.modules.read().iter().map(|m| m.info.clone()).collect()
    }

    fn resolve_type(&self, module: &str, full_name: &str) -> Option<Arc<TypeDescriptor>> {
        let modules = self.modules.read();
        modules
            .iter()
            .find(|m| m.info.name == module)?
            .types
            .iter()
            .find(|t| t.full_name() == full_name)
            .cloned()
    }
}
