//! Typed proxy over one provider-owned alarm.
//!
//! The proxy is a view, not a copy. It keeps a non-owning handle to the
//! provider's instance and dereferences a pre-resolved member handle on every
//! access, so reads return the provider's live value and writes land in the
//! provider's own record.
//!
//! Getters never fail. A field the provider build lacks, a value of the wrong
//! type, or a record the provider has already deleted all read as the field's
//! default (`""`, `0.0`, `false`, [`AlarmType::Raw`]).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use softdep_core::{
    BindingError, DynValue, ObjectRef, Result, TypeDescriptor, WeakObjectRef,
};

use crate::capabilities::{AlarmCapabilities, AlarmField};
use crate::types::{AlarmAction, AlarmType};

/// Owned copy of every alarm field at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmSnapshot {
    pub id: String,
    pub vessel_id: String,
    pub name: String,
    pub notes: String,
    pub alarm_type: AlarmType,
    pub alarm_time: f64,
    pub alarm_margin: f64,
    pub alarm_action: AlarmAction,
    pub remaining: f64,
    pub xfer_origin_body_name: String,
    pub xfer_target_body_name: String,
    pub repeat_alarm: bool,
    pub repeat_alarm_period: f64,
}

/// Accessor for one alarm owned by the provider.
#[derive(Clone)]
pub struct AlarmProxy {
    instance: WeakObjectRef,
    caps: Arc<AlarmCapabilities>,
}

impl AlarmProxy {
    pub fn new(instance: &ObjectRef, caps: Arc<AlarmCapabilities>) -> Self {
        Self {
            instance: instance.downgrade(),
            caps,
        }
    }

    /// Wrap one element of the provider's collection.
    ///
    /// Fails if the element is not an instance of `record_type`.
    pub fn wrap(
        element: &DynValue,
        record_type: &TypeDescriptor,
        caps: Arc<AlarmCapabilities>,
    ) -> Result<Self> {
        let instance = element
            .as_object()
            .ok_or_else(|| BindingError::NotAnObject(element.kind()))?;

        if !record_type.is_instance(instance) {
            return Err(BindingError::WrongInstanceType {
                expected: record_type.full_name().to_string(),
                found: instance.type_name(),
            });
        }
        Ok(Self::new(instance, caps))
    }

    /// Whether the provider still holds this record.
    pub fn is_alive(&self) -> bool {
        self.instance.is_alive()
    }

    /// Strong handle to the underlying instance, if it still exists.
    pub fn instance(&self) -> Option<ObjectRef> {
        self.instance.upgrade()
    }

    pub fn capabilities(&self) -> &Arc<AlarmCapabilities> {
        &self.caps
    }

    /// Unique identifier of this alarm.
    pub fn id(&self) -> String {
        self.read_string(AlarmField::Id)
    }

    /// Identifier of the vessel the alarm is attached to.
    pub fn vessel_id(&self) -> String {
        self.read_string(AlarmField::VesselId)
    }

    pub fn set_vessel_id(&self, vessel_id: &str) -> Result<()> {
        self.write(AlarmField::VesselId, vessel_id.into())
    }

    /// Short display name.
    pub fn name(&self) -> String {
        self.read_string(AlarmField::Name)
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        self.write(AlarmField::Name, name.into())
    }

    /// Free-text description.
    pub fn notes(&self) -> String {
        self.read_string(AlarmField::Notes)
    }

    pub fn set_notes(&self, notes: &str) -> Result<()> {
        self.write(AlarmField::Notes, notes.into())
    }

    /// Origin body of a transfer alarm.
    pub fn xfer_origin_body_name(&self) -> String {
        self.read_string(AlarmField::XferOriginBodyName)
    }

    pub fn set_xfer_origin_body_name(&self, body: &str) -> Result<()> {
        self.write(AlarmField::XferOriginBodyName, body.into())
    }

    /// Destination body of a transfer alarm.
    pub fn xfer_target_body_name(&self) -> String {
        self.read_string(AlarmField::XferTargetBodyName)
    }

    pub fn set_xfer_target_body_name(&self, body: &str) -> Result<()> {
        self.write(AlarmField::XferTargetBodyName, body.into())
    }

    pub fn alarm_type(&self) -> AlarmType {
        let raw = self.read(AlarmField::AlarmType).and_then(|v| v.as_i64());
        match raw {
            Some(value) => AlarmType::from_discriminant(value).unwrap_or_else(|| {
                tracing::debug!(value, "Unknown alarm type discriminant");
                AlarmType::default()
            }),
            None => AlarmType::default(),
        }
    }

    /// Trigger time in UT.
    pub fn alarm_time(&self) -> f64 {
        self.read_f64(AlarmField::AlarmTime)
    }

    pub fn set_alarm_time(&self, ut: f64) -> Result<()> {
        self.write(AlarmField::AlarmTime, ut.into())
    }

    /// Seconds before the event at which the alarm fires.
    pub fn alarm_margin(&self) -> f64 {
        self.read_f64(AlarmField::AlarmMargin)
    }

    pub fn set_alarm_margin(&self, seconds: f64) -> Result<()> {
        self.write(AlarmField::AlarmMargin, seconds.into())
    }

    pub fn alarm_action(&self) -> AlarmAction {
        self.read(AlarmField::AlarmAction)
            .and_then(|v| v.as_i64())
            .and_then(AlarmAction::from_discriminant)
            .unwrap_or_default()
    }

    pub fn set_alarm_action(&self, action: AlarmAction) -> Result<()> {
        self.write(AlarmField::AlarmAction, action.discriminant().into())
    }

    /// Game time left before the alarm fires, as computed by the provider.
    pub fn remaining(&self) -> f64 {
        self.read_f64(AlarmField::Remaining)
    }

    pub fn repeat_alarm(&self) -> bool {
        self.read(AlarmField::RepeatAlarm)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn set_repeat_alarm(&self, repeat: bool) -> Result<()> {
        self.write(AlarmField::RepeatAlarm, repeat.into())
    }

    /// Repeat period in seconds. Older provider builds lack it and read `0.0`.
    pub fn repeat_alarm_period(&self) -> f64 {
        self.read_f64(AlarmField::RepeatAlarmPeriod)
    }

    pub fn set_repeat_alarm_period(&self, seconds: f64) -> Result<()> {
        self.write(AlarmField::RepeatAlarmPeriod, seconds.into())
    }

    pub fn snapshot(&self) -> AlarmSnapshot {
        AlarmSnapshot {
            id: self.id(),
            vessel_id: self.vessel_id(),
            name: self.name(),
            notes: self.notes(),
            alarm_type: self.alarm_type(),
            alarm_time: self.alarm_time(),
            alarm_margin: self.alarm_margin(),
            alarm_action: self.alarm_action(),
            remaining: self.remaining(),
            xfer_origin_body_name: self.xfer_origin_body_name(),
            xfer_target_body_name: self.xfer_target_body_name(),
            repeat_alarm: self.repeat_alarm(),
            repeat_alarm_period: self.repeat_alarm_period(),
        }
    }

    fn read(&self, field: AlarmField) -> Option<DynValue> {
        let handle = self.caps.handle(field)?;
        let Some(instance) = self.instance.upgrade() else {
            tracing::trace!(field = ?field, "Alarm released by provider");
            return None;
        };

        match handle.get(&instance) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(field = ?field, "Alarm field read failed: {}", e);
                None
            }
        }
    }

    fn read_string(&self, field: AlarmField) -> String {
        self.read(field)
            .and_then(DynValue::into_string)
            .unwrap_or_default()
    }

    fn read_f64(&self, field: AlarmField) -> f64 {
        self.read(field).and_then(|v| v.as_f64()).unwrap_or(0.0)
    }

    fn write(&self, field: AlarmField, value: DynValue) -> Result<()> {
        let handle = self
            .caps
            .handle(field)
            .ok_or_else(|| BindingError::MemberNotFound {
                type_name: self.caps.type_name().to_string(),
                member: format!("{:?}", field),
            })?;
        let instance = self
            .instance
            .upgrade()
            .ok_or(BindingError::InstanceDropped)?;
        handle.set(&instance, value)
    }
}

impl fmt::Debug for AlarmProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlarmProxy")
            .field("id", &self.id())
            .field("alive", &self.is_alive())
            .finish()
    }
}
