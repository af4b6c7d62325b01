//! Simulated alarm-clock provider.
//!
//! Exposes the same runtime surface as the real add-on: a main type with a
//! readiness flag, an API instance, the live alarm list and the create/delete
//! entry points, plus a record type whose members match the provider build
//! selected by [`ProviderProfile`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use softdep_core::{
    BindingError, DynValue, ListRef, ObjectRef, StaticCell, TypeDescriptor, ValueKind,
};

/// Module name the provider registers with the host.
pub const MODULE_NAME: &str = "KerbalAlarmClock";
/// Fully-qualified name of the main type.
pub const MAIN_TYPE: &str = "KerbalAlarmClock.KerbalAlarmClock";
/// Fully-qualified name of the alarm record type.
pub const RECORD_TYPE: &str = "KerbalAlarmClock.KACAlarm";
/// Fully-qualified name of the API instance type.
pub const API_TYPE: &str = "KerbalAlarmClock.KACAPI";

/// Action stored on newly created alarms (kill warp).
const DEFAULT_ACTION: i64 = 4;

/// Which provider build to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderProfile {
    /// Current build, all record members present.
    #[default]
    Current,
    /// Older build without `RepeatAlarmPeriodUT`.
    Legacy,
}

impl ProviderProfile {
    pub fn default_version(self) -> semver::Version {
        match self {
            ProviderProfile::Current => semver::Version::new(3, 12, 0),
            ProviderProfile::Legacy => semver::Version::new(2, 7, 8),
        }
    }
}

/// Initial values for one alarm inserted directly into the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmSeed {
    /// Fixed identifier, generated when absent
    pub id: Option<String>,
    pub vessel_id: Option<String>,
    pub name: String,
    pub notes: String,
    /// Alarm type discriminant
    pub alarm_type: i64,
    pub alarm_time: f64,
    pub alarm_margin: f64,
    /// Alarm action discriminant
    pub alarm_action: i64,
    pub xfer_origin_body_name: String,
    pub xfer_target_body_name: String,
    pub repeat_alarm: bool,
    pub repeat_alarm_period: f64,
}

impl Default for AlarmSeed {
    fn default() -> Self {
        Self {
            id: None,
            vessel_id: None,
            name: String::new(),
            notes: String::new(),
            alarm_type: 0,
            alarm_time: 0.0,
            alarm_margin: 0.0,
            alarm_action: DEFAULT_ACTION,
            xfer_origin_body_name: String::new(),
            xfer_target_body_name: String::new(),
            repeat_alarm: false,
            repeat_alarm_period: 0.0,
        }
    }
}

impl AlarmSeed {
    pub fn new(name: impl Into<String>, alarm_time: f64) -> Self {
        Self {
            name: name.into(),
            alarm_time,
            ..Self::default()
        }
    }
}

struct ProviderState {
    ready: StaticCell,
    instance: StaticCell,
    alarms: ListRef,
    /// Created alarms not yet visible in `alarms`
    pending: Mutex<Vec<ObjectRef>>,
    defer_next: AtomicBool,
    universal_time: RwLock<f64>,
}

impl ProviderState {
    fn remaining(&self, alarm_time: f64) -> f64 {
        alarm_time - *self.universal_time.read()
    }
}

/// In-process stand-in for the alarm-clock add-on.
pub struct SimulatedAlarmClock {
    profile: ProviderProfile,
    version: semver::Version,
    state: Arc<ProviderState>,
    main_type: Arc<TypeDescriptor>,
    record_type: Arc<TypeDescriptor>,
}

impl SimulatedAlarmClock {
    /// Provider that is not yet ready.
    pub fn new(profile: ProviderProfile) -> Self {
        let state = Arc::new(ProviderState {
            ready: Arc::new(RwLock::new(DynValue::Boolean(false))),
            instance: Arc::new(RwLock::new(DynValue::Null)),
            alarms: ListRef::new(),
            pending: Mutex::new(Vec::new()),
            defer_next: AtomicBool::new(false),
            universal_time: RwLock::new(0.0),
        });

        let record_type = build_record_type(profile);
        let main_type = build_main_type(&state, &record_type);

        let api_type = TypeDescriptor::builder(API_TYPE)
            .field("Version", ValueKind::String, profile.default_version().to_string())
            .build();
        *state.instance.write() = DynValue::Object(api_type.instantiate());

        Self {
            profile,
            version: profile.default_version(),
            state,
            main_type,
            record_type,
        }
    }

    /// Current build, already reporting ready.
    pub fn ready() -> Self {
        let clock = Self::new(ProviderProfile::Current);
        clock.set_ready(true);
        clock
    }

    pub fn with_version(mut self, version: semver::Version) -> Self {
        self.version = version;
        self
    }

    pub fn profile(&self) -> ProviderProfile {
        self.profile
    }

    pub fn module_name(&self) -> &str {
        MODULE_NAME
    }

    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    pub fn main_type(&self) -> &Arc<TypeDescriptor> {
        &self.main_type
    }

    pub fn record_type(&self) -> &Arc<TypeDescriptor> {
        &self.record_type
    }

    pub fn set_ready(&self, ready: bool) {
        *self.state.ready.write() = DynValue::Boolean(ready);
    }

    /// Overwrite the readiness flag with an arbitrary value.
    pub fn set_ready_value(&self, value: DynValue) {
        *self.state.ready.write() = value;
    }

    /// Hold the next created alarm back from the collection until
    /// [`commit_pending`](Self::commit_pending) runs.
    pub fn defer_next_created(&self) {
        self.state.defer_next.store(true, Ordering::SeqCst);
    }

    /// Move deferred alarms into the collection. Returns how many moved.
    pub fn commit_pending(&self) -> usize {
        let pending: Vec<ObjectRef> = self.state.pending.lock().drain(..).collect();
        let count = pending.len();
        for alarm in pending {
            self.state.alarms.push(alarm);
        }
        count
    }

    /// Append an element that is not an alarm record.
    pub fn push_malformed(&self, value: DynValue) {
        self.state.alarms.push(value);
    }

    /// Insert an alarm directly, bypassing the create entry point.
    pub fn insert_alarm(&self, seed: &AlarmSeed) -> String {
        let id = seed.id.clone().unwrap_or_else(new_alarm_id);
        let alarm = self.record_type.instantiate();
        {
            let mut record = alarm.write();
            record.set_field("ID", id.as_str());
            record.set_field("VesselID", seed.vessel_id.clone());
            record.set_field("Name", seed.name.as_str());
            record.set_field("Notes", seed.notes.as_str());
            record.set_field("TypeOfAlarm", seed.alarm_type);
            record.set_field("AlarmTime", seed.alarm_time);
            record.set_field("AlarmMarginSecs", seed.alarm_margin);
            record.set_field("AlarmAction", seed.alarm_action);
            record.set_field("Remaining", self.state.remaining(seed.alarm_time));
            record.set_field("XferOriginBodyName", seed.xfer_origin_body_name.as_str());
            record.set_field("XferTargetBodyName", seed.xfer_target_body_name.as_str());
            record.set_field("RepeatAlarm", seed.repeat_alarm);
            // Legacy builds have no backing field; the write is a no-op there.
            record.set_field("RepeatAlarmPeriod", seed.repeat_alarm_period);
        }
        self.state.alarms.push(alarm);
        id
    }

    /// Remove an alarm from the provider side. Returns whether it existed.
    pub fn remove_alarm(&self, id: &str) -> bool {
        remove_alarm(&self.state.alarms, id)
    }

    /// The provider's own record for `id`.
    pub fn alarm(&self, id: &str) -> Option<ObjectRef> {
        self.state
            .alarms
            .snapshot()
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .find(|obj| alarm_id(obj).as_deref() == Some(id))
    }

    /// Read one raw field of the provider's record.
    pub fn alarm_field(&self, id: &str, field: &str) -> Option<DynValue> {
        self.alarm(id)
            .and_then(|obj| obj.read().get_field(field).cloned())
    }

    /// Number of collection elements, malformed ones included.
    pub fn alarm_count(&self) -> usize {
        self.state.alarms.len()
    }

    pub fn alarm_ids(&self) -> Vec<String> {
        self.state
            .alarms
            .snapshot()
            .iter()
            .filter_map(DynValue::as_object)
            .filter_map(alarm_id)
            .collect()
    }

    pub fn universal_time(&self) -> f64 {
        *self.state.universal_time.read()
    }

    /// Move game time and recompute every alarm's `Remaining`.
    pub fn set_universal_time(&self, ut: f64) {
        *self.state.universal_time.write() = ut;
        for value in self.state.alarms.snapshot() {
            let Some(alarm) = value.as_object() else {
                continue;
            };
            let mut record = alarm.write();
            let time = record
                .get_field("AlarmTime")
                .and_then(DynValue::as_f64)
                .unwrap_or(0.0);
            record.set_field("Remaining", time - ut);
        }
    }
}

fn new_alarm_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn alarm_id(alarm: &ObjectRef) -> Option<String> {
    alarm
        .read()
        .get_field("ID")
        .and_then(DynValue::as_str)
        .map(str::to_string)
}

fn remove_alarm(alarms: &ListRef, id: &str) -> bool {
    let removed = alarms.retain(|value| {
        value
            .as_object()
            .map_or(true, |obj| alarm_id(obj).as_deref() != Some(id))
    });
    removed > 0
}

fn build_record_type(profile: ProviderProfile) -> Arc<TypeDescriptor> {
    let builder = TypeDescriptor::builder(RECORD_TYPE)
        .field("VesselID", ValueKind::String, DynValue::Null)
        .field("ID", ValueKind::String, DynValue::Null)
        .field("Name", ValueKind::String, "")
        .field("Notes", ValueKind::String, "")
        .field("TypeOfAlarm", ValueKind::Integer, 0i64)
        .field("AlarmTime", ValueKind::Float, 0.0)
        .property_rw(
            "AlarmTimeUT",
            ValueKind::Float,
            |obj| Ok(obj.get_field("AlarmTime").cloned().unwrap_or_default()),
            |obj, value| {
                obj.set_field("AlarmTime", value);
                Ok(())
            },
        )
        .field("AlarmMarginSecs", ValueKind::Float, 0.0)
        .field("AlarmAction", ValueKind::Integer, DEFAULT_ACTION)
        .field("Remaining", ValueKind::Float, 0.0)
        .field("XferOriginBodyName", ValueKind::String, "")
        .field("XferTargetBodyName", ValueKind::String, "")
        .field("RepeatAlarm", ValueKind::Boolean, false);

    match profile {
        ProviderProfile::Current => builder
            .field("RepeatAlarmPeriod", ValueKind::Float, 0.0)
            .property_rw(
                "RepeatAlarmPeriodUT",
                ValueKind::Float,
                |obj| {
                    Ok(obj
                        .get_field("RepeatAlarmPeriod")
                        .cloned()
                        .unwrap_or_default())
                },
                |obj, value| {
                    obj.set_field("RepeatAlarmPeriod", value);
                    Ok(())
                },
            )
            .build(),
        ProviderProfile::Legacy => builder.build(),
    }
}

fn build_main_type(
    state: &Arc<ProviderState>,
    record_type: &Arc<TypeDescriptor>,
) -> Arc<TypeDescriptor> {
    let create_state = Arc::clone(state);
    let create_type = Arc::clone(record_type);
    let delete_state = Arc::clone(state);

    TypeDescriptor::builder(MAIN_TYPE)
        .static_cell("APIReady", Arc::clone(&state.ready))
        .static_cell("APIInstance", Arc::clone(&state.instance))
        .static_cell("alarms", Arc::new(RwLock::new(DynValue::List(state.alarms.clone()))))
        .method("CreateAlarm", move |args| {
            create_alarm(&create_state, &create_type, args)
        })
        .method("DeleteAlarm", move |args| {
            let id = args
                .first()
                .and_then(DynValue::as_str)
                .ok_or_else(|| invalid_args("DeleteAlarm", "expected (string id)"))?;
            let deleted = remove_alarm(&delete_state.alarms, id);
            tracing::debug!(id, deleted, "Simulated provider delete");
            Ok(DynValue::Boolean(deleted))
        })
        .build()
}

fn create_alarm(
    state: &ProviderState,
    record_type: &Arc<TypeDescriptor>,
    args: &[DynValue],
) -> softdep_core::Result<DynValue> {
    let (alarm_type, name, ut) = match args {
        [alarm_type, name, ut] => (
            alarm_type.as_i64(),
            name.as_str().map(str::to_string),
            ut.as_f64(),
        ),
        _ => (None, None, None),
    };
    let (Some(alarm_type), Some(name), Some(ut)) = (alarm_type, name, ut) else {
        return Err(invalid_args("CreateAlarm", "expected (int type, string name, double ut)"));
    };

    let id = new_alarm_id();
    let alarm = record_type.instantiate();
    {
        let mut record = alarm.write();
        record.set_field("ID", id.as_str());
        record.set_field("Name", name);
        record.set_field("TypeOfAlarm", alarm_type);
        record.set_field("AlarmTime", ut);
        record.set_field("Remaining", state.remaining(ut));
    }

    if state.defer_next.swap(false, Ordering::SeqCst) {
        tracing::debug!(id = %id, "Simulated provider deferred new alarm");
        state.pending.lock().push(alarm);
    } else {
        state.alarms.push(alarm);
    }
    Ok(DynValue::String(id))
}

fn invalid_args(method: &str, reason: &str) -> BindingError {
    BindingError::InvocationFailed {
        method: method.to_string(),
        reason: reason.to_string(),
    }
}
