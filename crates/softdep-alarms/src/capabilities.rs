//! Capability descriptor for the provider's alarm record type.
//!
//! Maps each logical alarm field to a resolved member handle. Resolution runs
//! once per record type descriptor per process; every proxy built for that type
//! shares the result. A member the provider build lacks, or declares with an
//! incompatible type, resolves to `None` and the matching proxy accessor falls
//! back to its default.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use softdep_core::{global_capabilities, MemberHandle, TypeDescriptor, ValueKind};

use crate::config::AlarmMemberNames;

/// Logical alarm fields exposed through [`AlarmProxy`](crate::AlarmProxy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmField {
    VesselId,
    Id,
    Name,
    Notes,
    AlarmType,
    AlarmTime,
    AlarmMargin,
    AlarmAction,
    Remaining,
    XferOriginBodyName,
    XferTargetBodyName,
    RepeatAlarm,
    RepeatAlarmPeriod,
}

impl AlarmField {
    pub const ALL: [AlarmField; 13] = [
        AlarmField::VesselId,
        AlarmField::Id,
        AlarmField::Name,
        AlarmField::Notes,
        AlarmField::AlarmType,
        AlarmField::AlarmTime,
        AlarmField::AlarmMargin,
        AlarmField::AlarmAction,
        AlarmField::Remaining,
        AlarmField::XferOriginBodyName,
        AlarmField::XferTargetBodyName,
        AlarmField::RepeatAlarm,
        AlarmField::RepeatAlarmPeriod,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Provider member name for this field.
    pub fn member_name(self, names: &AlarmMemberNames) -> &str {
        match self {
            AlarmField::VesselId => &names.vessel_id,
            AlarmField::Id => &names.id,
            AlarmField::Name => &names.name,
            AlarmField::Notes => &names.notes,
            AlarmField::AlarmType => &names.alarm_type,
            AlarmField::AlarmTime => &names.alarm_time,
            AlarmField::AlarmMargin => &names.alarm_margin,
            AlarmField::AlarmAction => &names.alarm_action,
            AlarmField::Remaining => &names.remaining,
            AlarmField::XferOriginBodyName => &names.xfer_origin_body_name,
            AlarmField::XferTargetBodyName => &names.xfer_target_body_name,
            AlarmField::RepeatAlarm => &names.repeat_alarm,
            AlarmField::RepeatAlarmPeriod => &names.repeat_alarm_period,
        }
    }

    /// Value kind the proxy expects the provider to store.
    pub fn expected_kind(self) -> ValueKind {
        match self {
            AlarmField::VesselId
            | AlarmField::Id
            | AlarmField::Name
            | AlarmField::Notes
            | AlarmField::XferOriginBodyName
            | AlarmField::XferTargetBodyName => ValueKind::String,
            AlarmField::AlarmType | AlarmField::AlarmAction => ValueKind::Integer,
            AlarmField::AlarmTime
            | AlarmField::AlarmMargin
            | AlarmField::Remaining
            | AlarmField::RepeatAlarmPeriod => ValueKind::Float,
            AlarmField::RepeatAlarm => ValueKind::Boolean,
        }
    }
}

/// Resolved member handles for the alarm record type.
#[derive(Debug)]
pub struct AlarmCapabilities {
    type_name: String,
    handles: [Option<MemberHandle>; 13],
}

impl AlarmCapabilities {
    /// Resolve every logical field against `descriptor`.
    pub fn resolve(descriptor: &TypeDescriptor, names: &AlarmMemberNames) -> Self {
        let handles = AlarmField::ALL.map(|field| {
            let member = field.member_name(names);
            match descriptor.member(member) {
                Ok(handle) => {
                    let declared = handle.value_kind();
                    if declared == field.expected_kind() || declared == ValueKind::Any {
                        Some(handle)
                    } else {
                        tracing::warn!(
                            type_name = descriptor.full_name(),
                            member,
                            expected = %field.expected_kind(),
                            declared = %declared,
                            "Alarm member has an unexpected type, field disabled"
                        );
                        None
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        type_name = descriptor.full_name(),
                        field = ?field,
                        "Alarm member unavailable, field falls back to default: {}",
                        e
                    );
                    None
                }
            }
        });

        Self {
            type_name: descriptor.full_name().to_string(),
            handles,
        }
    }

    /// Cached capabilities for `descriptor` under `names`, resolved on first use.
    ///
    /// Each distinct set of member names gets its own entry.
    pub fn for_type(descriptor: &TypeDescriptor, names: &AlarmMemberNames) -> Arc<Self> {
        global_capabilities()
            .get_or_resolve_variant(descriptor, names, |d| Self::resolve(d, names))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn handle(&self, field: AlarmField) -> Option<&MemberHandle> {
        self.handles[field.index()].as_ref()
    }

    pub fn supports(&self, field: AlarmField) -> bool {
        self.handle(field).is_some()
    }

    /// Fields this provider build does not expose.
    pub fn missing(&self) -> Vec<AlarmField> {
        AlarmField::ALL
            .into_iter()
            .filter(|f| !self.supports(*f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use softdep_core::DynValue;

    fn record_type(with_period: bool) -> Arc<TypeDescriptor> {
        let builder = TypeDescriptor::builder("KerbalAlarmClock.KACAlarm")
            .field("VesselID", ValueKind::String, DynValue::Null)
            .field("ID", ValueKind::String, DynValue::Null)
            .field("Name", ValueKind::String, "")
            .field("Notes", ValueKind::String, "")
            .field("TypeOfAlarm", ValueKind::Integer, 0i64)
            .field("AlarmMarginSecs", ValueKind::Float, 0.0)
            .field("AlarmAction", ValueKind::Integer, 0i64)
            .field("Remaining", ValueKind::Float, 0.0)
            .field("XferOriginBodyName", ValueKind::String, "")
            .field("XferTargetBodyName", ValueKind::String, "")
            .field("RepeatAlarm", ValueKind::Boolean, false)
            .field("AlarmTime", ValueKind::Float, 0.0)
            .property("AlarmTimeUT", ValueKind::Float, |obj| {
                Ok(obj.get_field("AlarmTime").cloned().unwrap_or_default())
            });

        let builder = if with_period {
            builder.field("RepeatAlarmPeriodUT", ValueKind::Float, 0.0)
        } else {
            builder
        };
        builder.build()
    }

    #[test]
    fn test_resolve_all_fields() {
        let caps = AlarmCapabilities::resolve(&record_type(true), &AlarmMemberNames::default());
        assert!(caps.missing().is_empty());
        assert_eq!(caps.type_name(), "KerbalAlarmClock.KACAlarm");
        assert!(caps.handle(AlarmField::AlarmTime).is_some());
    }

    #[test]
    fn test_missing_member_degrades_single_field() {
        let caps = AlarmCapabilities::resolve(&record_type(false), &AlarmMemberNames::default());
        assert_eq!(caps.missing(), vec![AlarmField::RepeatAlarmPeriod]);
        assert!(caps.supports(AlarmField::RepeatAlarm));
    }

    #[test]
    fn test_mistyped_member_is_disabled() {
        let ty = TypeDescriptor::builder("KerbalAlarmClock.KACAlarm")
            .field("Name", ValueKind::Integer, 0i64)
            .build();
        let caps = AlarmCapabilities::resolve(&ty, &AlarmMemberNames::default());
        assert!(!caps.supports(AlarmField::Name));
        assert_eq!(caps.missing().len(), AlarmField::ALL.len());
    }

    #[test]
    fn test_for_type_is_cached() {
        let ty = record_type(true);
        let names = AlarmMemberNames::default();
        let a = AlarmCapabilities::for_type(&ty, &names);
        let b = AlarmCapabilities::for_type(&ty, &names);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_for_type_separates_member_names() {
        let ty = record_type(true);
        let renamed = AlarmMemberNames {
            notes: "Name".to_string(),
            ..AlarmMemberNames::default()
        };

        let default = AlarmCapabilities::for_type(&ty, &AlarmMemberNames::default());
        let custom = AlarmCapabilities::for_type(&ty, &renamed);

        assert!(!Arc::ptr_eq(&default, &custom));
        assert_eq!(default.handle(AlarmField::Notes).unwrap().name(), "Notes");
        assert_eq!(custom.handle(AlarmField::Notes).unwrap().name(), "Name");
    }
}
