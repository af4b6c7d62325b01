//! Runtime type descriptors and resolved member handles.
//!
//! A [`TypeDescriptor`] is what a host hands out when asked for a type by its
//! fully-qualified name. It lists the instance members (slot-backed fields and
//! callback-backed properties), the static members and the static methods of
//! the type. Consumers resolve a [`MemberHandle`] by name once and then use it
//! against any number of instances.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{BindingError, Result};
use crate::value::{DynObject, DynValue, ObjectRef, ValueKind};

/// Computes a property value from an instance.
pub type PropertyGetter = Arc<dyn Fn(&DynObject) -> Result<DynValue> + Send + Sync>;
/// Applies a property write to an instance.
pub type PropertySetter = Arc<dyn Fn(&mut DynObject, DynValue) -> Result<()> + Send + Sync>;
/// Computes the current value of a static property.
pub type StaticGetter = Arc<dyn Fn() -> Result<DynValue> + Send + Sync>;
/// A static method entry point.
pub type StaticMethod = Arc<dyn Fn(&[DynValue]) -> Result<DynValue> + Send + Sync>;
/// Shared storage behind a static field.
pub type StaticCell = Arc<RwLock<DynValue>>;

static NEXT_DESCRIPTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Whether a member is stored directly or computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Field,
    Property,
}

#[derive(Clone)]
enum Access {
    Slot(usize),
    Property {
        get: PropertyGetter,
        set: Option<PropertySetter>,
    },
}

impl Access {
    fn kind(&self) -> MemberKind {
        match self {
            Access::Slot(_) => MemberKind::Field,
            Access::Property { .. } => MemberKind::Property,
        }
    }
}

#[derive(Clone)]
struct MemberDef {
    name: String,
    value_kind: ValueKind,
    access: Access,
}

enum StaticMember {
    Cell(StaticCell),
    Getter(StaticGetter),
}

/// Description of a provider type, discovered at runtime.
pub struct TypeDescriptor {
    id: u64,
    full_name: String,
    members: Vec<MemberDef>,
    defaults: Vec<DynValue>,
    statics: HashMap<String, StaticMember>,
    methods: HashMap<String, StaticMethod>,
}

impl TypeDescriptor {
    pub fn builder(full_name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            full_name: full_name.into(),
            members: Vec::new(),
            defaults: Vec::new(),
            statics: HashMap::new(),
            methods: HashMap::new(),
        }
    }

    /// Process-unique identifier of this descriptor.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Names of all instance members, in declaration order.
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Resolve a slot-backed field.
    pub fn field(&self, name: &str) -> Result<MemberHandle> {
        match self.find(name) {
            Some(def) if def.access.kind() == MemberKind::Field => Ok(self.handle(def)),
            _ => Err(BindingError::member_not_found(&self.full_name, name)),
        }
    }

    /// Resolve a computed property.
    pub fn property(&self, name: &str) -> Result<MemberHandle> {
        match self.find(name) {
            Some(def) if def.access.kind() == MemberKind::Property => Ok(self.handle(def)),
            _ => Err(BindingError::member_not_found(&self.full_name, name)),
        }
    }

    /// Resolve a member of either kind.
    pub fn member(&self, name: &str) -> Result<MemberHandle> {
        self.find(name)
            .map(|def| self.handle(def))
            .ok_or_else(|| BindingError::member_not_found(&self.full_name, name))
    }

    pub fn has_static(&self, name: &str) -> bool {
        self.statics.contains_key(name)
    }

    /// Read the current value of a static field or property.
    pub fn static_value(&self, name: &str) -> Result<DynValue> {
        match self.statics.get(name) {
            Some(StaticMember::Cell(cell)) => Ok(cell.read().clone()),
            Some(StaticMember::Getter(get)) => get(),
            None => Err(BindingError::member_not_found(&self.full_name, name)),
        }
    }

    /// Overwrite a static field. Static properties are read-only.
    pub fn set_static(&self, name: &str, value: DynValue) -> Result<()> {
        match self.statics.get(name) {
            Some(StaticMember::Cell(cell)) => {
                *cell.write() = value;
                Ok(())
            }
            Some(StaticMember::Getter(_)) => Err(BindingError::ReadOnly(name.to_string())),
            None => Err(BindingError::member_not_found(&self.full_name, name)),
        }
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Invoke a static method.
    pub fn invoke(&self, name: &str, args: &[DynValue]) -> Result<DynValue> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| BindingError::member_not_found(&self.full_name, name))?;
        method(args)
    }

    /// Create a new instance with every field at its declared default.
    pub fn instantiate(self: &Arc<Self>) -> ObjectRef {
        ObjectRef::new(DynObject::new(Arc::clone(self), self.defaults.clone()))
    }

    pub fn is_instance(&self, object: &ObjectRef) -> bool {
        object.read().descriptor().id == self.id
    }

    pub(crate) fn slot_index(&self, name: &str) -> Option<usize> {
        self.find(name).and_then(|def| match def.access {
            Access::Slot(index) => Some(index),
            Access::Property { .. } => None,
        })
    }

    fn find(&self, name: &str) -> Option<&MemberDef> {
        self.members.iter().find(|m| m.name == name)
    }

    fn handle(&self, def: &MemberDef) -> MemberHandle {
        MemberHandle {
            owner_id: self.id,
            owner_name: Arc::from(self.full_name.as_str()),
            name: Arc::from(def.name.as_str()),
            value_kind: def.value_kind,
            access: def.access.clone(),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut statics: Vec<&String> = self.statics.keys().collect();
        statics.sort();
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("members", &self.member_names())
            .field("statics", &statics)
            .field("methods", &methods)
            .finish()
    }
}

/// Builder for [`TypeDescriptor`].
pub struct TypeDescriptorBuilder {
    full_name: String,
    members: Vec<MemberDef>,
    defaults: Vec<DynValue>,
    statics: HashMap<String, StaticMember>,
    methods: HashMap<String, StaticMethod>,
}

impl TypeDescriptorBuilder {
    /// Declare a slot-backed field.
    pub fn field(
        mut self,
        name: impl Into<String>,
        kind: ValueKind,
        default: impl Into<DynValue>,
    ) -> Self {
        let index = self.defaults.len();
        self.defaults.push(default.into());
        self.members.push(MemberDef {
            name: name.into(),
            value_kind: kind,
            access: Access::Slot(index),
        });
        self
    }

    /// Declare a read-only computed property.
    pub fn property<G>(mut self, name: impl Into<String>, kind: ValueKind, get: G) -> Self
    where
        G: Fn(&DynObject) -> Result<DynValue> + Send + Sync + 'static,
    {
        self.members.push(MemberDef {
            name: name.into(),
            value_kind: kind,
            access: Access::Property {
                get: Arc::new(get),
                set: None,
            },
        });
        self
    }

    /// Declare a read-write computed property.
    pub fn property_rw<G, S>(
        mut self,
        name: impl Into<String>,
        kind: ValueKind,
        get: G,
        set: S,
    ) -> Self
    where
        G: Fn(&DynObject) -> Result<DynValue> + Send + Sync + 'static,
        S: Fn(&mut DynObject, DynValue) -> Result<()> + Send + Sync + 'static,
    {
        self.members.push(MemberDef {
            name: name.into(),
            value_kind: kind,
            access: Access::Property {
                get: Arc::new(get),
                set: Some(Arc::new(set)),
            },
        });
        self
    }

    /// Declare a static field backed by shared storage.
    pub fn static_cell(mut self, name: impl Into<String>, cell: StaticCell) -> Self {
        self.statics.insert(name.into(), StaticMember::Cell(cell));
        self
    }

    /// Declare a computed static property.
    pub fn static_getter<G>(mut self, name: impl Into<String>, get: G) -> Self
    where
        G: Fn() -> Result<DynValue> + Send + Sync + 'static,
    {
        self.statics
            .insert(name.into(), StaticMember::Getter(Arc::new(get)));
        self
    }

    /// Declare a static method.
    pub fn method<M>(mut self, name: impl Into<String>, method: M) -> Self
    where
        M: Fn(&[DynValue]) -> Result<DynValue> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor {
            id: NEXT_DESCRIPTOR_ID.fetch_add(1, Ordering::Relaxed),
            full_name: self.full_name,
            members: self.members,
            defaults: self.defaults,
            statics: self.statics,
            methods: self.methods,
        })
    }
}

/// A member resolved once from a [`TypeDescriptor`].
///
/// Every `get`/`set` dereferences the target instance directly; nothing is
/// cached on the handle besides the member's location.
#[derive(Clone)]
pub struct MemberHandle {
    owner_id: u64,
    owner_name: Arc<str>,
    name: Arc<str>,
    value_kind: ValueKind,
    access: Access,
}

impl MemberHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner_name
    }

    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    pub fn member_kind(&self) -> MemberKind {
        self.access.kind()
    }

    pub fn is_writable(&self) -> bool {
        match &self.access {
            Access::Slot(_) => true,
            Access::Property { set, .. } => set.is_some(),
        }
    }

    /// Read the member's live value from `target`.
    pub fn get(&self, target: &ObjectRef) -> Result<DynValue> {
        let object = target.read();
        self.check_owner(&object)?;
        match &self.access {
            Access::Slot(index) => object
                .slot(*index)
                .cloned()
                .ok_or_else(|| BindingError::member_not_found(&self.owner_name, &self.name)),
            Access::Property { get, .. } => get(&object),
        }
    }

    /// Write `value` into the member on `target`.
    pub fn set(&self, target: &ObjectRef, value: DynValue) -> Result<()> {
        if !self.value_kind.accepts(&value) {
            return Err(BindingError::TypeMismatch {
                member: self.name.to_string(),
                expected: self.value_kind,
                found: value.kind(),
            });
        }

        let mut object = target.write();
        self.check_owner(&object)?;
        match &self.access {
            Access::Slot(index) => {
                let slot = object
                    .slot_mut(*index)
                    .ok_or_else(|| BindingError::member_not_found(&self.owner_name, &self.name))?;
                *slot = value;
                Ok(())
            }
            Access::Property { set: Some(set), .. } => set(&mut object, value),
            Access::Property { set: None, .. } => {
                Err(BindingError::ReadOnly(self.name.to_string()))
            }
        }
    }

    fn check_owner(&self, object: &DynObject) -> Result<()> {
        if object.descriptor().id() == self.owner_id {
            Ok(())
        } else {
            Err(BindingError::WrongInstanceType {
                expected: self.owner_name.to_string(),
                found: object.type_name().to_string(),
            })
        }
    }
}

impl fmt::Debug for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberHandle")
            .field("owner", &self.owner_name)
            .field("name", &self.name)
            .field("kind", &self.member_kind())
            .field("value_kind", &self.value_kind)
            .finish()
    }
}
