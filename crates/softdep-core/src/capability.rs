//! Process-wide cache of resolved capability descriptors.
//!
//! A capability descriptor maps the logical members a consumer cares about to
//! resolved [`MemberHandle`](crate::MemberHandle)s. Resolution walks the type
//! descriptor by name, so it is done once per type descriptor per process and
//! shared by every proxy built afterwards. Callers whose resolution depends on
//! extra inputs, such as configured member names, pass them as a variant so
//! that differently configured consumers never share an entry.

use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::descriptor::TypeDescriptor;

type CapabilityKey = (u64, TypeId, u64);
type CapabilityEntry = Arc<dyn Any + Send + Sync>;

/// Cache of capability descriptors keyed by type descriptor and capability type.
#[derive(Default)]
pub struct CapabilityCache {
    entries: RwLock<HashMap<CapabilityKey, CapabilityEntry>>,
    resolutions: AtomicUsize,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached capability `C` for `descriptor`, resolving it on first use.
    ///
    /// `resolve` runs under the cache's write lock and must not call back into
    /// this cache.
    pub fn get_or_resolve<C, F>(&self, descriptor: &TypeDescriptor, resolve: F) -> Arc<C>
    where
        C: Any + Send + Sync,
        F: FnOnce(&TypeDescriptor) -> C,
    {
        self.get_or_resolve_variant(descriptor, &(), resolve)
    }

    /// Like [`get_or_resolve`](Self::get_or_resolve), with one entry per
    /// distinct `variant`.
    pub fn get_or_resolve_variant<C, V, F>(
        &self,
        descriptor: &TypeDescriptor,
        variant: &V,
        resolve: F,
    ) -> Arc<C>
    where
        C: Any + Send + Sync,
        V: Hash + ?Sized,
        F: FnOnce(&TypeDescriptor) -> C,
    {
        let key = key_for::<C, V>(descriptor, variant);

        if let Some(found) = lookup::<C>(&self.entries.read(), &key) {
            return found;
        }

        let mut entries = self.entries.write();
        if let Some(found) = lookup::<C>(&entries, &key) {
            return found;
        }

        let resolved = Arc::new(resolve(descriptor));
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            type_name = descriptor.full_name(),
            capability = std::any::type_name::<C>(),
            "Capability descriptor resolved"
        );
        entries.insert(key, Arc::clone(&resolved) as CapabilityEntry);
        resolved
    }

    pub fn contains<C: Any>(&self, descriptor: &TypeDescriptor) -> bool {
        self.contains_variant::<C, ()>(descriptor, &())
    }

    pub fn contains_variant<C: Any, V: Hash + ?Sized>(
        &self,
        descriptor: &TypeDescriptor,
        variant: &V,
    ) -> bool {
        self.entries
            .read()
            .contains_key(&key_for::<C, V>(descriptor, variant))
    }

    /// Number of resolution closures run so far.
    pub fn resolution_count(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn key_for<C: Any, V: Hash + ?Sized>(descriptor: &TypeDescriptor, variant: &V) -> CapabilityKey {
    let mut hasher = DefaultHasher::new();
    variant.hash(&mut hasher);
    (descriptor.id(), TypeId::of::<C>(), hasher.finish())
}

fn lookup<C: Any + Send + Sync>(
    entries: &HashMap<CapabilityKey, CapabilityEntry>,
    key: &CapabilityKey,
) -> Option<Arc<C>> {
    entries
        .get(key)
        .and_then(|entry| Arc::clone(entry).downcast::<C>().ok())
}

/// Global capability cache singleton.
static GLOBAL_CAPABILITIES: Lazy<CapabilityCache> = Lazy::new(CapabilityCache::new);

/// Get the global capability cache.
pub fn global_capabilities() -> &'static CapabilityCache {
    &GLOBAL_CAPABILITIES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    struct NameCapability {
        has_name: bool,
    }

    #[test]
    fn test_resolves_once_per_descriptor() {
        let cache = CapabilityCache::new();
        let ty = TypeDescriptor::builder("Test.Record")
            .field("Name", ValueKind::String, "")
            .build();

        let first = cache.get_or_resolve(&ty, |d| NameCapability {
            has_name: d.has_member("Name"),
        });
        let second = cache.get_or_resolve(&ty, |_| NameCapability { has_name: false });

        assert!(first.has_name);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.resolution_count(), 1);
        assert!(cache.contains::<NameCapability>(&ty));
    }

    #[test]
    fn test_separate_descriptors_resolve_separately() {
        let cache = CapabilityCache::new();
        let current = TypeDescriptor::builder("Test.Record")
            .field("Name", ValueKind::String, "")
            .build();
        let legacy = TypeDescriptor::builder("Test.Record").build();

        let a = cache.get_or_resolve(&current, |d| NameCapability {
            has_name: d.has_member("Name"),
        });
        let b = cache.get_or_resolve(&legacy, |d| NameCapability {
            has_name: d.has_member("Name"),
        });

        assert!(a.has_name);
        assert!(!b.has_name);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_variants_resolve_separately() {
        let cache = CapabilityCache::new();
        let ty = TypeDescriptor::builder("Test.Record")
            .field("Name", ValueKind::String, "")
            .field("Label", ValueKind::String, "")
            .build();

        let resolve = |member: &str| {
            let member = member.to_string();
            move |d: &TypeDescriptor| NameCapability {
                has_name: d.has_member(&member),
            }
        };

        let by_name = cache.get_or_resolve_variant(&ty, "Name", resolve("Name"));
        let by_title = cache.get_or_resolve_variant(&ty, "Title", resolve("Title"));
        let again = cache.get_or_resolve_variant(&ty, "Name", resolve("Title"));

        assert!(by_name.has_name);
        assert!(!by_title.has_name);
        assert!(Arc::ptr_eq(&by_name, &again));
        assert_eq!(cache.resolution_count(), 2);
        assert!(cache.contains_variant::<NameCapability, str>(&ty, "Title"));
        assert!(!cache.contains::<NameCapability>(&ty));
    }
}
