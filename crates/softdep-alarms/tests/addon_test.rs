//! Alarm-clock add-on integration tests
//!
//! Tests cover:
//! - Behaviour with the provider absent, loaded late, or not ready
//! - Create/list/delete round trips
//! - The post-create lookup race
//! - Malformed collection entries and unexpected provider shapes
//! - Per-add-on member name configuration

use std::sync::Arc;

use softdep_alarms::{AlarmClockAddon, AlarmClockConfig, AlarmType};
use softdep_core::{DynValue, ListRef, TypeDescriptor, TypeDescriptorBuilder, ValueKind};
use softdep_testing::{
    AlarmSeed, ProviderProfile, SimulatedAlarmClock, SimulatedHost, API_TYPE, MAIN_TYPE,
    MODULE_NAME,
};

fn addon_for(host: &Arc<SimulatedHost>) -> AlarmClockAddon {
    AlarmClockAddon::with_config(host.clone(), AlarmClockConfig::default())
}

/// Host whose provider module pairs a hand-built main type with the
/// simulated record type.
fn host_with_main_type(
    clock: &SimulatedAlarmClock,
    main: TypeDescriptorBuilder,
) -> Arc<SimulatedHost> {
    let main = main
        .static_getter("APIReady", || Ok(DynValue::Boolean(true)))
        .build();
    let host = Arc::new(SimulatedHost::new());
    host.load_module(
        MODULE_NAME,
        clock.version().clone(),
        vec![main, Arc::clone(clock.record_type())],
    );
    host
}

// ============================================================================
// Provider availability
// ============================================================================

#[test]
fn test_provider_absent() {
    let host = Arc::new(SimulatedHost::new());
    let addon = addon_for(&host);

    assert!(!addon.is_installed());
    assert!(!addon.ready());
    assert!(addon.provider_version().is_none());
    assert!(addon
        .create_alarm(AlarmType::Maneuver, "Burn", 500.0, "vesselA")
        .is_none());
    assert!(addon.list_alarms().is_empty());
    assert!(!addon.delete_alarm("anything"));
    assert!(addon.find_alarm("anything").is_none());
    assert!(addon.collection().api_instance().is_none());
}

#[test]
fn test_provider_loaded_after_consumer() {
    let host = Arc::new(SimulatedHost::new());
    let addon = addon_for(&host);
    assert!(!addon.ready());

    let clock = SimulatedAlarmClock::ready();
    host.install(&clock);

    assert!(addon.is_installed());
    assert!(addon.ready());
    assert_eq!(addon.provider_version(), Some(semver::Version::new(3, 12, 0)));
    assert!(addon
        .create_alarm(AlarmType::Raw, "Late", 10.0, "vesselA")
        .is_some());
}

#[test]
fn test_readiness_is_reread() {
    let clock = SimulatedAlarmClock::new(ProviderProfile::Current);
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    assert!(addon.is_installed());
    assert!(!addon.ready());
    assert!(addon
        .create_alarm(AlarmType::Maneuver, "Burn", 500.0, "vesselA")
        .is_none());
    assert_eq!(clock.alarm_count(), 0);

    clock.set_ready(true);
    assert!(addon.ready());

    clock.set_ready_value(DynValue::Integer(1));
    assert!(!addon.ready());
}

#[test]
fn test_listing_does_not_require_readiness() {
    let clock = SimulatedAlarmClock::new(ProviderProfile::Current);
    clock.insert_alarm(&AlarmSeed::new("Seeded", 100.0));
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    assert!(!addon.ready());
    assert_eq!(addon.list_alarms().len(), 1);
}

#[test]
fn test_api_instance() {
    let clock = SimulatedAlarmClock::ready();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    let instance = addon.collection().api_instance().unwrap();
    assert_eq!(instance.type_name(), API_TYPE);
}

// ============================================================================
// Create / list / delete
// ============================================================================

#[test]
fn test_create_then_list() {
    let clock = SimulatedAlarmClock::ready();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    let id = addon
        .create_alarm(AlarmType::Maneuver, "Burn", 500.0, "vesselA")
        .unwrap();
    assert!(!id.is_empty());

    let alarms = addon.list_alarms();
    assert_eq!(alarms.len(), 1);

    let alarm = alarms.find(&id).unwrap();
    assert_eq!(alarm.name(), "Burn");
    assert_eq!(alarm.alarm_time(), 500.0);
    assert_eq!(alarm.vessel_id(), "vesselA");
    assert_eq!(alarm.alarm_type(), AlarmType::Maneuver);
    assert_eq!(alarm.remaining(), 500.0);

    assert_eq!(
        clock.alarm_field(&id, "VesselID"),
        Some(DynValue::from("vesselA"))
    );
}

#[test]
fn test_list_preserves_provider_order() {
    let clock = SimulatedAlarmClock::ready();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    let first = clock.insert_alarm(&AlarmSeed::new("First", 100.0));
    let second = addon
        .create_alarm(AlarmType::Apoapsis, "Second", 200.0, "vesselB")
        .unwrap();
    let third = clock.insert_alarm(&AlarmSeed::new("Third", 50.0));

    assert_eq!(addon.list_alarms().ids(), vec![first, second, third]);
}

#[test]
fn test_list_is_a_snapshot() {
    let clock = SimulatedAlarmClock::ready();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    let before = addon.list_alarms();
    addon
        .create_alarm(AlarmType::Raw, "New", 10.0, "vesselA")
        .unwrap();

    assert!(before.is_empty());
    assert_eq!(addon.list_alarms().len(), 1);
}

#[test]
fn test_delete() {
    let clock = SimulatedAlarmClock::ready();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    let keep = addon
        .create_alarm(AlarmType::Raw, "Keep", 10.0, "vesselA")
        .unwrap();
    let gone = addon
        .create_alarm(AlarmType::Raw, "Drop", 20.0, "vesselA")
        .unwrap();

    assert!(addon.delete_alarm(&gone));
    assert_eq!(addon.list_alarms().ids(), vec![keep.clone()]);

    assert!(!addon.delete_alarm(&gone));
    assert!(!addon.delete_alarm("no-such-alarm"));
    assert_eq!(addon.list_alarms().len(), 1);

    clock.set_ready(false);
    assert!(!addon.delete_alarm(&keep));
    assert_eq!(clock.alarm_count(), 1);
}

#[test]
fn test_set_vessel_binding() {
    let clock = SimulatedAlarmClock::ready();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    let id = clock.insert_alarm(&AlarmSeed::new("Unbound", 100.0));
    assert_eq!(addon.find_alarm(&id).unwrap().vessel_id(), "");

    assert!(addon.collection().set_vessel_binding(&id, "vesselC"));
    assert_eq!(addon.find_alarm(&id).unwrap().vessel_id(), "vesselC");
    assert!(!addon.collection().set_vessel_binding("missing", "vesselC"));
}

// ============================================================================
// Lookup race and malformed entries
// ============================================================================

#[test]
fn test_created_alarm_not_yet_listed() {
    let clock = SimulatedAlarmClock::ready();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    clock.defer_next_created();
    let id = addon.create_alarm(AlarmType::Maneuver, "Burn", 500.0, "vesselA");
    assert!(id.is_none());
    assert!(addon.list_alarms().is_empty());

    // The provider did create it; it shows up once committed.
    assert_eq!(clock.commit_pending(), 1);
    let alarms = addon.list_alarms();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms.iter().next().unwrap().name(), "Burn");
    assert_eq!(alarms.iter().next().unwrap().vessel_id(), "");
}

#[test]
fn test_malformed_entries_are_skipped() {
    let clock = SimulatedAlarmClock::ready();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    let good = clock.insert_alarm(&AlarmSeed::new("Good", 100.0));
    clock.push_malformed(DynValue::from("not an alarm"));
    clock.push_malformed(DynValue::Null);

    let stranger = TypeDescriptor::builder("Other.Record")
        .field("ID", ValueKind::String, "stranger")
        .build();
    clock.push_malformed(DynValue::Object(stranger.instantiate()));

    let alarms = addon.list_alarms();
    assert_eq!(clock.alarm_count(), 4);
    assert_eq!(alarms.ids(), vec![good]);
}

#[test]
fn test_missing_collection_member() {
    let clock = SimulatedAlarmClock::ready();
    clock.insert_alarm(&AlarmSeed::new("Hidden", 100.0));
    let host = SimulatedHost::with_alarm_clock(&clock);

    let config = AlarmClockConfig {
        collection_member: "alarmList".to_string(),
        ..AlarmClockConfig::default()
    };
    let addon = AlarmClockAddon::with_config(host, config);

    assert!(addon.ready());
    assert!(addon.list_alarms().is_empty());
}

#[test]
fn test_fixture_seeded_provider() {
    let fixture = softdep_testing::ProviderFixture::from_json_str(include_str!(
        "../../softdep-testing/fixtures/two_alarms.json"
    ))
    .unwrap();
    let clock = fixture.build();
    let host = SimulatedHost::with_alarm_clock(&clock);
    let addon = addon_for(&host);

    let alarms = addon.list_alarms();
    assert_eq!(alarms.len(), 2);

    let transfer = alarms.find("0f1e2d3c4b5a69788796a5b4c3d2e1f0").unwrap();
    assert_eq!(transfer.alarm_type(), AlarmType::Transfer);
    assert_eq!(transfer.xfer_origin_body_name(), "Kerbin");
    assert_eq!(transfer.xfer_target_body_name(), "Mun");
    assert_eq!(transfer.remaining(), 7200.0);
    assert!(transfer.repeat_alarm());
    assert_eq!(transfer.repeat_alarm_period(), 21600.0);
}

#[test]
fn test_collection_member_not_a_list() {
    let clock = SimulatedAlarmClock::ready();
    clock.insert_alarm(&AlarmSeed::new("Hidden", 100.0));
    let host = host_with_main_type(
        &clock,
        TypeDescriptor::builder(MAIN_TYPE).static_getter("alarms", || Ok(DynValue::Integer(3))),
    );
    let addon = addon_for(&host);

    assert!(addon.ready());
    assert!(addon.list_alarms().is_empty());
    assert!(addon.find_alarm("anything").is_none());
}

#[test]
fn test_create_with_non_string_result() {
    let clock = SimulatedAlarmClock::ready();
    let host = host_with_main_type(
        &clock,
        TypeDescriptor::builder(MAIN_TYPE)
            .static_getter("alarms", || Ok(DynValue::List(ListRef::new())))
            .method("CreateAlarm", |_| Ok(DynValue::Integer(7))),
    );
    let addon = addon_for(&host);

    assert!(addon.ready());
    assert!(addon
        .create_alarm(AlarmType::Maneuver, "Burn", 500.0, "vesselA")
        .is_none());
    assert!(addon.list_alarms().is_empty());
}

// ============================================================================
// Member name configuration
// ============================================================================

#[test]
fn test_member_names_are_per_addon() {
    let clock = SimulatedAlarmClock::ready();
    let id = clock.insert_alarm(&AlarmSeed {
        notes: "the notes".to_string(),
        ..AlarmSeed::new("the name", 100.0)
    });
    let host = SimulatedHost::with_alarm_clock(&clock);

    let default = addon_for(&host);
    assert_eq!(default.find_alarm(&id).unwrap().notes(), "the notes");

    let mut config = AlarmClockConfig::default();
    config.members.notes = "Name".to_string();
    let renamed = AlarmClockAddon::with_config(host.clone(), config);

    assert_eq!(renamed.find_alarm(&id).unwrap().notes(), "the name");
    assert_eq!(default.find_alarm(&id).unwrap().notes(), "the notes");
}
