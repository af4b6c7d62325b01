//! Soft-dependency bindings for the alarm-clock add-on.
//!
//! Discovers the provider module at runtime through
//! [`softdep_core::ModuleHandle`], wraps each provider-owned alarm in an
//! [`AlarmProxy`], and exposes list/create/delete through [`AlarmClockAddon`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use softdep_alarms::{AlarmClockAddon, AlarmType};
//!
//! let addon = AlarmClockAddon::new(host_loader);
//! if addon.ready() {
//!     if let Some(id) = addon.create_alarm(AlarmType::Maneuver, "Burn", 500.0, &vessel_id) {
//!         let alarm = addon.find_alarm(&id);
//!     }
//! }
//! for alarm in &addon.list_alarms() {
//!     println!("{} at {}", alarm.name(), alarm.alarm_time());
//! }
//! ```

pub mod addon;
pub mod capabilities;
pub mod collection;
pub mod config;
pub mod proxy;
pub mod types;

pub use addon::AlarmClockAddon;
pub use capabilities::{AlarmCapabilities, AlarmField};
pub use collection::{AlarmCollection, AlarmList};
pub use config::{AlarmClockConfig, AlarmMemberNames, ConfigError};
pub use proxy::{AlarmProxy, AlarmSnapshot};
pub use types::{AlarmAction, AlarmStateEvent, AlarmType, TimeEntryPrecision};
