//! Core binding layer for optional add-on modules.
//!
//! A host application loads add-ons independently. This crate lets one add-on
//! (the consumer) discover another (the provider) at runtime and read or write
//! the provider's live objects through introspected member handles, without
//! any compile-time interface between the two.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  loaded_modules / resolve_type  ┌──────────────────┐
//! │  HostLoader  │ ◄────────────────────────────── │   ModuleHandle   │
//! └──────────────┘                                 │  is_ready        │
//!                                                  │  static_member   │
//!                                                  │  invoke_static   │
//!                                                  └────────┬─────────┘
//!                                                           │ TypeDescriptor
//!                                                           ▼
//!                           ┌────────────────────┐   ┌──────────────────┐
//!                           │  CapabilityCache   │ ◄─│   MemberHandle   │
//!                           │  (once per type)   │   │   get / set      │
//!                           └────────────────────┘   └──────────────────┘
//! ```

pub mod binder;
pub mod capability;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod value;

pub use binder::{ModuleHandle, DEFAULT_READY_MEMBER};
pub use capability::{global_capabilities, CapabilityCache};
pub use descriptor::{
    MemberHandle, MemberKind, PropertyGetter, PropertySetter, StaticCell, StaticGetter,
    StaticMethod, TypeDescriptor, TypeDescriptorBuilder,
};
pub use error::{BindingError, FailureKind, Result};
pub use host::{DynHostLoader, HostLoader, LoadedModule};
pub use value::{DynObject, DynValue, ListRef, ObjectRef, ValueKind, WeakObjectRef};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::binder::ModuleHandle;
    pub use crate::descriptor::{MemberHandle, TypeDescriptor};
    pub use crate::error::{BindingError, FailureKind, Result};
    pub use crate::host::{DynHostLoader, HostLoader, LoadedModule};
    pub use crate::value::{DynValue, ListRef, ObjectRef, ValueKind, WeakObjectRef};
}
