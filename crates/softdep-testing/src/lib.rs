//! Testing utilities for softdep
//!
//! This crate provides:
//! - A simulated host whose modules load and unload on demand
//! - A simulated alarm-clock provider in current and legacy builds
//! - JSON fixtures for seeding provider state

pub mod fixtures;
pub mod host;
pub mod provider;

pub use fixtures::ProviderFixture;
pub use host::SimulatedHost;
pub use provider::{
    AlarmSeed, ProviderProfile, SimulatedAlarmClock, API_TYPE, MAIN_TYPE, MODULE_NAME,
    RECORD_TYPE,
};
