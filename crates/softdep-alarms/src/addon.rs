//! Consumer-facing alarm-clock API.

use std::sync::Arc;

use softdep_core::{DynHostLoader, ModuleHandle};

use crate::collection::{bind_vessel, AlarmCollection, AlarmList};
use crate::config::AlarmClockConfig;
use crate::proxy::AlarmProxy;
use crate::types::AlarmType;

/// Soft dependency on the alarm-clock provider.
///
/// Created once at consumer startup. Works whether or not the provider is
/// installed: without it, `ready()` is false, creates and deletes are no-ops
/// and listings are empty.
pub struct AlarmClockAddon {
    alarms: AlarmCollection,
}

impl AlarmClockAddon {
    /// Bind using default names with environment overrides.
    pub fn new(loader: DynHostLoader) -> Self {
        Self::with_config(loader, AlarmClockConfig::from_env())
    }

    pub fn with_config(loader: DynHostLoader, config: AlarmClockConfig) -> Self {
        let module = ModuleHandle::discover(loader, &config.module_name, &config.main_type)
            .with_ready_member(config.ready_member.clone());

        if module.is_loaded() {
            match module.resolve_type(&config.record_type) {
                Some(_) => tracing::info!(
                    module = %config.module_name,
                    record_type = %config.record_type,
                    "Alarm provider connected"
                ),
                None => tracing::warn!(
                    module = %config.module_name,
                    record_type = %config.record_type,
                    "Alarm provider loaded without its record type"
                ),
            }
        }

        Self {
            alarms: AlarmCollection::new(Arc::new(module), config),
        }
    }

    /// Whether the provider is loaded and reports itself ready.
    pub fn ready(&self) -> bool {
        self.alarms.is_ready()
    }

    /// Whether the provider module is loaded at all.
    pub fn is_installed(&self) -> bool {
        self.alarms.module().is_loaded()
    }

    pub fn provider_version(&self) -> Option<semver::Version> {
        self.alarms.module().version()
    }

    /// Create an alarm attached to `vessel_id` and return its identifier.
    ///
    /// `None` means no alarm is known to have been created. See
    /// [`AlarmCollection::create`] for the lookup race after creation.
    pub fn create_alarm(
        &self,
        alarm_type: AlarmType,
        name: &str,
        ut: f64,
        vessel_id: &str,
    ) -> Option<String> {
        let alarm = self.alarms.create_record(alarm_type, name, ut)?;
        bind_vessel(&alarm, vessel_id);
        Some(alarm.id())
    }

    pub fn delete_alarm(&self, id: &str) -> bool {
        self.alarms.delete(id)
    }

    pub fn list_alarms(&self) -> AlarmList {
        self.alarms.list()
    }

    pub fn find_alarm(&self, id: &str) -> Option<AlarmProxy> {
        self.alarms.find(id)
    }

    pub fn collection(&self) -> &AlarmCollection {
        &self.alarms
    }
}
