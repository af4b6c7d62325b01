//! Alarm proxy integration tests
//!
//! Tests cover:
//! - Reads and writes going through to the provider's record
//! - Degraded fields on older provider builds
//! - Proxies outliving the record they view

use std::sync::Arc;

use softdep_alarms::{
    AlarmAction, AlarmClockAddon, AlarmClockConfig, AlarmField, AlarmProxy, AlarmType,
};
use softdep_core::{BindingError, DynValue};
use softdep_testing::{AlarmSeed, ProviderProfile, SimulatedAlarmClock, SimulatedHost};

fn setup(profile: ProviderProfile) -> (SimulatedAlarmClock, AlarmClockAddon) {
    let clock = SimulatedAlarmClock::new(profile);
    clock.set_ready(true);
    let host: Arc<SimulatedHost> = SimulatedHost::with_alarm_clock(&clock);
    let addon = AlarmClockAddon::with_config(host, AlarmClockConfig::default());
    (clock, addon)
}

fn proxy(addon: &AlarmClockAddon, id: &str) -> AlarmProxy {
    addon.find_alarm(id).unwrap()
}

// ============================================================================
// Live view
// ============================================================================

#[test]
fn test_write_visible_through_fresh_proxy() {
    let (clock, addon) = setup(ProviderProfile::Current);
    let id = clock.insert_alarm(&AlarmSeed::new("Burn", 500.0));

    let a = proxy(&addon, &id);
    let b = proxy(&addon, &id);
    a.set_notes("Check fuel first").unwrap();

    assert_eq!(b.notes(), "Check fuel first");
    assert_eq!(proxy(&addon, &id).notes(), "Check fuel first");
    assert_eq!(
        clock.alarm_field(&id, "Notes"),
        Some(DynValue::from("Check fuel first"))
    );
}

#[test]
fn test_provider_updates_are_visible() {
    let (clock, addon) = setup(ProviderProfile::Current);
    let id = clock.insert_alarm(&AlarmSeed::new("Apo", 1000.0));
    let alarm = proxy(&addon, &id);

    assert_eq!(alarm.remaining(), 1000.0);
    clock.set_universal_time(400.0);
    assert_eq!(alarm.remaining(), 600.0);
}

#[test]
fn test_setters_write_provider_fields() {
    let (clock, addon) = setup(ProviderProfile::Current);
    let id = clock.insert_alarm(&AlarmSeed::new("Burn", 500.0));
    let alarm = proxy(&addon, &id);

    alarm.set_name("Circularize").unwrap();
    alarm.set_alarm_time(750.0).unwrap();
    alarm.set_alarm_margin(30.0).unwrap();
    alarm.set_alarm_action(AlarmAction::PauseGame).unwrap();
    alarm.set_xfer_origin_body_name("Kerbin").unwrap();
    alarm.set_xfer_target_body_name("Duna").unwrap();
    alarm.set_repeat_alarm(true).unwrap();
    alarm.set_repeat_alarm_period(3600.0).unwrap();

    let snapshot = alarm.snapshot();
    assert_eq!(snapshot.name, "Circularize");
    assert_eq!(snapshot.alarm_time, 750.0);
    assert_eq!(snapshot.alarm_margin, 30.0);
    assert_eq!(snapshot.alarm_action, AlarmAction::PauseGame);
    assert_eq!(snapshot.xfer_target_body_name, "Duna");
    assert!(snapshot.repeat_alarm);
    assert_eq!(snapshot.repeat_alarm_period, 3600.0);

    // Time is written through the provider's UT property into its backing field.
    assert_eq!(clock.alarm_field(&id, "AlarmTime"), Some(DynValue::Float(750.0)));
    assert_eq!(clock.alarm_field(&id, "AlarmAction"), Some(DynValue::Integer(5)));
}

#[test]
fn test_unknown_alarm_type_reads_raw() {
    let (clock, addon) = setup(ProviderProfile::Current);
    let id = clock.insert_alarm(&AlarmSeed {
        alarm_type: 99,
        alarm_action: 42,
        ..AlarmSeed::new("Odd", 10.0)
    });

    let alarm = proxy(&addon, &id);
    assert_eq!(alarm.alarm_type(), AlarmType::Raw);
    assert_eq!(alarm.alarm_action(), AlarmAction::DoNothingDeleteWhenPassed);
}

#[test]
fn test_snapshot_serializes() {
    let (clock, addon) = setup(ProviderProfile::Current);
    let id = clock.insert_alarm(&AlarmSeed {
        alarm_type: 9,
        vessel_id: Some("vesselA".to_string()),
        ..AlarmSeed::new("SOI", 120.0)
    });

    let json = serde_json::to_value(proxy(&addon, &id).snapshot()).unwrap();
    assert_eq!(json["alarm_type"], "SOIChange");
    assert_eq!(json["vessel_id"], "vesselA");
    assert_eq!(json["alarm_action"], "KillWarp");
    assert_eq!(json["alarm_time"], 120.0);
}

// ============================================================================
// Older provider builds
// ============================================================================

#[test]
fn test_legacy_build_degrades_repeat_period() {
    let (clock, addon) = setup(ProviderProfile::Legacy);
    let id = clock.insert_alarm(&AlarmSeed {
        repeat_alarm: true,
        repeat_alarm_period: 3600.0,
        ..AlarmSeed::new("Repeat", 100.0)
    });

    let alarm = proxy(&addon, &id);
    assert!(alarm.repeat_alarm());
    assert_eq!(alarm.repeat_alarm_period(), 0.0);
    assert_eq!(alarm.name(), "Repeat");
    assert_eq!(
        alarm.capabilities().missing(),
        vec![AlarmField::RepeatAlarmPeriod]
    );

    let err = alarm.set_repeat_alarm_period(60.0).unwrap_err();
    assert!(matches!(err, BindingError::MemberNotFound { .. }));
}

#[test]
fn test_capabilities_shared_across_proxies() {
    let (clock, addon) = setup(ProviderProfile::Current);
    clock.insert_alarm(&AlarmSeed::new("One", 1.0));
    clock.insert_alarm(&AlarmSeed::new("Two", 2.0));

    let alarms = addon.list_alarms().into_vec();
    assert!(Arc::ptr_eq(alarms[0].capabilities(), alarms[1].capabilities()));
    assert!(Arc::ptr_eq(
        alarms[0].capabilities(),
        &addon.collection().capabilities().unwrap()
    ));
}

#[test]
fn test_type_mismatch_on_write() {
    let (clock, addon) = setup(ProviderProfile::Current);
    let id = clock.insert_alarm(&AlarmSeed::new("Burn", 500.0));
    let alarm = proxy(&addon, &id);

    let handle = alarm.capabilities().handle(AlarmField::Name).unwrap();
    let instance = alarm.instance().unwrap();
    let err = handle.set(&instance, DynValue::Float(1.0)).unwrap_err();
    assert!(matches!(err, BindingError::TypeMismatch { .. }));
    assert_eq!(alarm.name(), "Burn");
}

// ============================================================================
// Deleted records
// ============================================================================

#[test]
fn test_proxy_after_provider_delete() {
    let (clock, addon) = setup(ProviderProfile::Current);
    let id = clock.insert_alarm(&AlarmSeed {
        notes: "soon gone".to_string(),
        ..AlarmSeed::new("Burn", 500.0)
    });
    let alarm = proxy(&addon, &id);
    assert!(alarm.is_alive());

    assert!(clock.remove_alarm(&id));

    assert!(!alarm.is_alive());
    assert_eq!(alarm.id(), "");
    assert_eq!(alarm.notes(), "");
    assert_eq!(alarm.alarm_time(), 0.0);
    assert!(matches!(
        alarm.set_notes("late"),
        Err(BindingError::InstanceDropped)
    ));
}

#[test]
fn test_proxy_after_consumer_delete() {
    let (clock, addon) = setup(ProviderProfile::Current);
    let id = addon
        .create_alarm(AlarmType::Maneuver, "Burn", 500.0, "vesselA")
        .unwrap();
    let alarm = proxy(&addon, &id);

    assert!(addon.delete_alarm(&id));
    assert!(!alarm.is_alive());
    assert_eq!(alarm.vessel_id(), "");
    assert_eq!(clock.alarm_count(), 0);
}
