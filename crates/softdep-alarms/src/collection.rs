//! Collection view over the provider's live alarm list.
//!
//! Every query re-reads the provider. [`AlarmList`] is a freshly materialized
//! snapshot of proxies; it is never updated in place, so callers re-fetch
//! after any create or delete to observe the change.

use std::sync::Arc;

use softdep_core::{DynValue, FailureKind, ModuleHandle, ObjectRef, TypeDescriptor};

use crate::capabilities::AlarmCapabilities;
use crate::config::AlarmClockConfig;
use crate::proxy::{AlarmProxy, AlarmSnapshot};
use crate::types::AlarmType;

/// Ordered, point-in-time list of alarm proxies.
#[derive(Debug, Clone, Default)]
pub struct AlarmList(Vec<AlarmProxy>);

impl AlarmList {
    pub fn new(alarms: Vec<AlarmProxy>) -> Self {
        Self(alarms)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlarmProxy> {
        self.0.iter()
    }

    /// Find an alarm by identifier.
    pub fn find(&self, id: &str) -> Option<&AlarmProxy> {
        self.0.iter().find(|a| a.id() == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.0.iter().map(AlarmProxy::id).collect()
    }

    pub fn snapshots(&self) -> Vec<AlarmSnapshot> {
        self.0.iter().map(AlarmProxy::snapshot).collect()
    }

    pub fn into_vec(self) -> Vec<AlarmProxy> {
        self.0
    }
}

impl IntoIterator for AlarmList {
    type Item = AlarmProxy;
    type IntoIter = std::vec::IntoIter<AlarmProxy>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AlarmList {
    type Item = &'a AlarmProxy;
    type IntoIter = std::slice::Iter<'a, AlarmProxy>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Access to the provider's alarm collection and its create/delete entry points.
pub struct AlarmCollection {
    module: Arc<ModuleHandle>,
    config: AlarmClockConfig,
}

impl AlarmCollection {
    pub fn new(module: Arc<ModuleHandle>, config: AlarmClockConfig) -> Self {
        Self { module, config }
    }

    pub fn module(&self) -> &ModuleHandle {
        &self.module
    }

    pub fn config(&self) -> &AlarmClockConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.module.is_ready()
    }

    /// The provider's record type, if the module is loaded and exposes it.
    pub fn record_type(&self) -> Option<Arc<TypeDescriptor>> {
        self.module.resolve_type(&self.config.record_type)
    }

    pub fn capabilities(&self) -> Option<Arc<AlarmCapabilities>> {
        self.record_type()
            .map(|ty| AlarmCapabilities::for_type(&ty, &self.config.members))
    }

    /// The provider's static API instance handle.
    pub fn api_instance(&self) -> Option<ObjectRef> {
        match self.module.static_member(&self.config.instance_member) {
            Ok(DynValue::Object(instance)) => Some(instance),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("API instance unavailable: {}", e);
                None
            }
        }
    }

    /// Materialize the provider's current alarms.
    ///
    /// Elements that cannot be wrapped are skipped and logged; the rest are
    /// returned in provider order.
    pub fn list(&self) -> AlarmList {
        let Some(record_type) = self.record_type() else {
            tracing::trace!(module = self.module.module_name(), "Alarm record type unavailable");
            return AlarmList::default();
        };

        let collection = match self.module.static_member(&self.config.collection_member) {
            Ok(value) => value,
            Err(e) => {
                if e.failure_kind() == FailureKind::Unavailable {
                    tracing::trace!("Alarm collection unavailable: {}", e);
                } else {
                    tracing::warn!("Alarm collection could not be read: {}", e);
                }
                return AlarmList::default();
            }
        };

        let items = match collection {
            DynValue::List(items) => items,
            DynValue::Null => return AlarmList::default(),
            other => {
                tracing::warn!(kind = %other.kind(), "Alarm collection is not a list");
                return AlarmList::default();
            }
        };

        let caps = AlarmCapabilities::for_type(&record_type, &self.config.members);
        let elements = items.snapshot();
        let mut alarms = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            match AlarmProxy::wrap(element, &record_type, Arc::clone(&caps)) {
                Ok(proxy) => alarms.push(proxy),
                Err(e) => {
                    tracing::warn!(index, "Skipping malformed alarm record: {}", e);
                }
            }
        }

        AlarmList::new(alarms)
    }

    /// Re-fetch the collection and locate one alarm.
    pub fn find(&self, id: &str) -> Option<AlarmProxy> {
        self.list().into_iter().find(|a| a.id() == id)
    }

    /// Create an alarm and return its identifier.
    ///
    /// Returns `None` if the provider is not ready, rejects the request, or
    /// the new record cannot be found right after creation. In the last case
    /// the provider may still have created it.
    pub fn create(&self, alarm_type: AlarmType, name: &str, ut: f64) -> Option<String> {
        self.create_record(alarm_type, name, ut).map(|alarm| alarm.id())
    }

    /// Create an alarm and return a proxy to the new record.
    pub fn create_record(&self, alarm_type: AlarmType, name: &str, ut: f64) -> Option<AlarmProxy> {
        if !self.is_ready() {
            tracing::debug!("Alarm provider not ready, create skipped");
            return None;
        }

        let args = [
            DynValue::from(alarm_type.discriminant()),
            DynValue::from(name),
            DynValue::from(ut),
        ];
        let result = match self.module.invoke_static(&self.config.create_method, &args) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Alarm creation failed: {}", e);
                return None;
            }
        };
        tracing::debug!(kind = %result.kind(), "Got result from alarm provider");

        let id = match result {
            DynValue::String(id) if !id.is_empty() => id,
            DynValue::String(_) | DynValue::Null => return None,
            other => {
                tracing::warn!(
                    kind = %other.kind(),
                    "Alarm creation returned a non-string identifier"
                );
                return None;
            }
        };

        match self.find(&id) {
            Some(alarm) => {
                tracing::debug!(id = %id, "Got created alarm from provider");
                Some(alarm)
            }
            None => {
                tracing::warn!(id = %id, "Created alarm not found in provider collection");
                None
            }
        }
    }

    /// Delete an alarm. Returns the provider's verdict, or `false`.
    pub fn delete(&self, id: &str) -> bool {
        if !self.is_ready() {
            tracing::debug!("Alarm provider not ready, delete skipped");
            return false;
        }

        match self
            .module
            .invoke_static(&self.config.delete_method, &[DynValue::from(id)])
        {
            Ok(DynValue::Boolean(deleted)) => deleted,
            Ok(other) => {
                tracing::debug!(kind = %other.kind(), "Delete returned a non-boolean result");
                false
            }
            Err(e) => {
                tracing::warn!(id, "Alarm deletion failed: {}", e);
                false
            }
        }
    }

    /// Attach an existing alarm to a vessel.
    pub fn set_vessel_binding(&self, id: &str, vessel_id: &str) -> bool {
        let Some(alarm) = self.find(id) else {
            tracing::debug!(id, "Alarm not found for vessel binding");
            return false;
        };
        bind_vessel(&alarm, vessel_id)
    }
}

pub(crate) fn bind_vessel(alarm: &AlarmProxy, vessel_id: &str) -> bool {
    match alarm.set_vessel_id(vessel_id) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(vessel_id, "Could not bind alarm to vessel: {}", e);
            false
        }
    }
}
