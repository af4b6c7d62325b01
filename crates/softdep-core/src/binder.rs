//! Module binder.
//!
//! Locates a named module among the host's loaded modules, resolves its main
//! type and exposes the readiness flag and static members of that type.
//!
//! An absent provider is a normal operating mode. [`ModuleHandle::discover`]
//! never fails; a handle created before the provider is loaded simply reports
//! "not loaded" and retries discovery the next time it is used.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::descriptor::TypeDescriptor;
use crate::error::{BindingError, Result};
use crate::host::{DynHostLoader, LoadedModule};
use crate::value::DynValue;

/// Default name of the provider's static readiness flag.
pub const DEFAULT_READY_MEMBER: &str = "APIReady";

#[derive(Clone)]
struct Binding {
    module: LoadedModule,
    main_type: Arc<TypeDescriptor>,
}

/// Handle to an optional external module.
pub struct ModuleHandle {
    loader: DynHostLoader,
    module_name: String,
    main_type_name: String,
    ready_member: String,
    binding: RwLock<Option<Binding>>,
}

impl ModuleHandle {
    /// Scan the host for `module_name` and resolve `main_type_name` inside it.
    pub fn discover(
        loader: DynHostLoader,
        module_name: impl Into<String>,
        main_type_name: impl Into<String>,
    ) -> Self {
        let handle = Self {
            loader,
            module_name: module_name.into(),
            main_type_name: main_type_name.into(),
            ready_member: DEFAULT_READY_MEMBER.to_string(),
            binding: RwLock::new(None),
        };

        if handle.binding().is_none() {
            tracing::debug!(
                module = %handle.module_name,
                "Module not present, binding deferred"
            );
        }
        handle
    }

    /// Use a different static member as the readiness flag.
    pub fn with_ready_member(mut self, name: impl Into<String>) -> Self {
        self.ready_member = name.into();
        self
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn main_type_name(&self) -> &str {
        &self.main_type_name
    }

    pub fn ready_member(&self) -> &str {
        &self.ready_member
    }

    /// Whether the module is loaded and its main type resolved.
    pub fn is_loaded(&self) -> bool {
        self.binding().is_some()
    }

    /// Version reported by the host for the bound module.
    pub fn version(&self) -> Option<semver::Version> {
        self.binding().map(|b| b.module.version)
    }

    pub fn main_type(&self) -> Option<Arc<TypeDescriptor>> {
        self.binding().map(|b| b.main_type)
    }

    /// Read the provider's own readiness flag.
    ///
    /// The flag is read from the provider on every call. Anything other than a
    /// boolean `true` counts as not ready.
    pub fn is_ready(&self) -> bool {
        match self.static_member(&self.ready_member) {
            Ok(DynValue::Boolean(ready)) => ready,
            Ok(other) => {
                tracing::debug!(
                    module = %self.module_name,
                    member = %self.ready_member,
                    kind = %other.kind(),
                    "Readiness flag is not a boolean"
                );
                false
            }
            Err(e) => {
                tracing::trace!(module = %self.module_name, "Readiness check failed: {}", e);
                false
            }
        }
    }

    /// Current value of a static field or property on the main type.
    pub fn static_member(&self, name: &str) -> Result<DynValue> {
        self.require_binding()?.main_type.static_value(name)
    }

    /// Invoke a static method on the main type.
    pub fn invoke_static(&self, name: &str, args: &[DynValue]) -> Result<DynValue> {
        let binding = self.require_binding()?;
        tracing::trace!(module = %self.module_name, method = name, "Invoking static method");
        binding.main_type.invoke(name, args)
    }

    /// Resolve another type from the same module.
    pub fn resolve_type(&self, full_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.binding()?;
        self.loader.resolve_type(&self.module_name, full_name)
    }

    fn require_binding(&self) -> Result<Binding> {
        if let Some(binding) = self.binding.read().as_ref() {
            return Ok(binding.clone());
        }

        let binding = self.try_bind()?;
        *self.binding.write() = Some(binding.clone());
        Ok(binding)
    }

    fn binding(&self) -> Option<Binding> {
        self.require_binding().ok()
    }

    fn try_bind(&self) -> Result<Binding> {
        let module = self
            .loader
            .find_module(&self.module_name)
            .ok_or_else(|| BindingError::ModuleNotLoaded(self.module_name.clone()))?;

        let Some(main_type) = self
            .loader
            .resolve_type(&self.module_name, &self.main_type_name)
        else {
            let err = BindingError::TypeNotFound {
                module: self.module_name.clone(),
                type_name: self.main_type_name.clone(),
            };
            tracing::warn!("Module is loaded but its main type could not be resolved: {}", err);
            return Err(err);
        };

        tracing::info!(
            module = %module.name,
            version = %module.version,
            "Successfully connected to module"
        );
        Ok(Binding { module, main_type })
    }
}

impl std::fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("module_name", &self.module_name)
            .field("main_type_name", &self.main_type_name)
            .field("bound", &self.binding.read().is_some())
            .finish()
    }
}
