//! Dynamic values exchanged with a provider module.
//!
//! A provider hands out opaque values: scalars, shared object instances and
//! shared collections. Objects and collections are reference types. Cloning a
//! [`DynValue::Object`] clones the handle, never the instance, so a write made
//! through any handle is visible to every other holder.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use crate::descriptor::TypeDescriptor;

/// Kind tag for a [`DynValue`], used to declare member types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Object,
    List,
    /// Declared type that accepts any value.
    Any,
}

impl ValueKind {
    /// Check whether a value may be stored in a member declared with this kind.
    ///
    /// Reference-like kinds (string, object, list) accept `Null`.
    pub fn accepts(&self, value: &DynValue) -> bool {
        let found = value.kind();
        match self {
            ValueKind::Any => true,
            ValueKind::String | ValueKind::Object | ValueKind::List => {
                found == *self || found == ValueKind::Null
            }
            _ => found == *self,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::List => "list",
            ValueKind::Any => "any",
        };
        f.write_str(name)
    }
}

/// An opaque value owned by, or passed to, a provider.
#[derive(Debug, Clone, Default)]
pub enum DynValue {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Object(ObjectRef),
    List(ListRef),
}

impl DynValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            DynValue::Null => ValueKind::Null,
            DynValue::Boolean(_) => ValueKind::Boolean,
            DynValue::Integer(_) => ValueKind::Integer,
            DynValue::Float(_) => ValueKind::Float,
            DynValue::String(_) => ValueKind::String,
            DynValue::Object(_) => ValueKind::Object,
            DynValue::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Consume the value as an owned string. `Null` yields `None`.
    pub fn into_string(self) -> Option<String> {
        match self {
            DynValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            DynValue::Object(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            DynValue::List(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for DynValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DynValue::Null, DynValue::Null) => true,
            (DynValue::Boolean(a), DynValue::Boolean(b)) => a == b,
            (DynValue::Integer(a), DynValue::Integer(b)) => a == b,
            (DynValue::Float(a), DynValue::Float(b)) => a == b,
            (DynValue::String(a), DynValue::String(b)) => a == b,
            (DynValue::Object(a), DynValue::Object(b)) => a.ptr_eq(b),
            (DynValue::List(a), DynValue::List(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for DynValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for DynValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for DynValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for DynValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for DynValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for DynValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Option<String>> for DynValue {
    fn from(v: Option<String>) -> Self {
        v.map(Self::String).unwrap_or(Self::Null)
    }
}

impl From<ObjectRef> for DynValue {
    fn from(v: ObjectRef) -> Self {
        Self::Object(v)
    }
}

impl From<ListRef> for DynValue {
    fn from(v: ListRef) -> Self {
        Self::List(v)
    }
}

// ============================================================================
// Objects
// ============================================================================

/// Storage for one instance of a [`TypeDescriptor`].
pub struct DynObject {
    descriptor: Arc<TypeDescriptor>,
    slots: Vec<DynValue>,
}

impl DynObject {
    pub(crate) fn new(descriptor: Arc<TypeDescriptor>, slots: Vec<DynValue>) -> Self {
        Self { descriptor, slots }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.full_name()
    }

    /// Read a field by name. Properties are not visible here.
    pub fn get_field(&self, name: &str) -> Option<&DynValue> {
        self.descriptor
            .slot_index(name)
            .and_then(|index| self.slots.get(index))
    }

    /// Overwrite a field by name without kind checks.
    ///
    /// This is the provider's own write path. Returns `false` if the type has
    /// no such field.
    pub fn set_field(&mut self, name: &str, value: impl Into<DynValue>) -> bool {
        match self
            .descriptor
            .slot_index(name)
            .and_then(|index| self.slots.get_mut(index))
        {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&DynValue> {
        self.slots.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut DynValue> {
        self.slots.get_mut(index)
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynObject")
            .field("type", &self.type_name())
            .field("slots", &self.slots)
            .finish()
    }
}

/// Strong, shared handle to a provider-owned instance.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<DynObject>>);

impl ObjectRef {
    pub(crate) fn new(object: DynObject) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, DynObject> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, DynObject> {
        self.0.write()
    }

    pub fn descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::clone(self.0.read().descriptor())
    }

    pub fn type_name(&self) -> String {
        self.0.read().type_name().to_string()
    }

    /// Create a non-owning handle to the same instance.
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.type_name())
    }
}

/// Non-owning handle to a provider-owned instance.
///
/// Stops resolving once the provider releases the instance.
#[derive(Clone, Debug)]
pub struct WeakObjectRef(Weak<RwLock<DynObject>>);

impl WeakObjectRef {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

// ============================================================================
// Lists
// ============================================================================

/// Shared handle to a provider-owned ordered collection.
#[derive(Clone, Default)]
pub struct ListRef(Arc<RwLock<Vec<DynValue>>>);

impl ListRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<DynValue>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    /// Copy the current element handles out of the collection.
    pub fn snapshot(&self) -> Vec<DynValue> {
        self.0.read().clone()
    }

    pub fn push(&self, item: impl Into<DynValue>) {
        self.0.write().push(item.into());
    }

    /// Keep only elements matching the predicate. Returns how many were removed.
    pub fn retain(&self, mut keep: impl FnMut(&DynValue) -> bool) -> usize {
        let mut items = self.0.write();
        let before = items.len();
        items.retain(|item| keep(item));
        before - items.len()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListRef(len={})", self.len())
    }
}
