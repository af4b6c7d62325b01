//! Binding configuration for the alarm-clock provider.
//!
//! Defaults name the members exposed by current provider builds. Every name can
//! be overridden from a TOML file, and the module/type names from environment
//! variables, so a renamed provider build can be bound without a rebuild.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default provider names.
pub mod defaults {
    pub const MODULE_NAME: &str = "KerbalAlarmClock";
    pub const MAIN_TYPE: &str = "KerbalAlarmClock.KerbalAlarmClock";
    pub const RECORD_TYPE: &str = "KerbalAlarmClock.KACAlarm";
    pub const READY_MEMBER: &str = "APIReady";
    pub const INSTANCE_MEMBER: &str = "APIInstance";
    pub const COLLECTION_MEMBER: &str = "alarms";
    pub const CREATE_METHOD: &str = "CreateAlarm";
    pub const DELETE_METHOD: &str = "DeleteAlarm";
}

/// Environment variable names.
pub mod env_vars {
    pub const MODULE_NAME: &str = "SOFTDEP_ALARM_MODULE";
    pub const MAIN_TYPE: &str = "SOFTDEP_ALARM_MAIN_TYPE";
    pub const RECORD_TYPE: &str = "SOFTDEP_ALARM_RECORD_TYPE";
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Provider member names for each alarm field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmMemberNames {
    pub vessel_id: String,
    pub id: String,
    pub name: String,
    pub notes: String,
    pub alarm_type: String,
    pub alarm_time: String,
    pub alarm_margin: String,
    pub alarm_action: String,
    pub remaining: String,
    pub xfer_origin_body_name: String,
    pub xfer_target_body_name: String,
    pub repeat_alarm: String,
    pub repeat_alarm_period: String,
}

impl Default for AlarmMemberNames {
    fn default() -> Self {
        Self {
            vessel_id: "VesselID".to_string(),
            id: "ID".to_string(),
            name: "Name".to_string(),
            notes: "Notes".to_string(),
            alarm_type: "TypeOfAlarm".to_string(),
            alarm_time: "AlarmTimeUT".to_string(),
            alarm_margin: "AlarmMarginSecs".to_string(),
            alarm_action: "AlarmAction".to_string(),
            remaining: "Remaining".to_string(),
            xfer_origin_body_name: "XferOriginBodyName".to_string(),
            xfer_target_body_name: "XferTargetBodyName".to_string(),
            repeat_alarm: "RepeatAlarm".to_string(),
            repeat_alarm_period: "RepeatAlarmPeriodUT".to_string(),
        }
    }
}

/// How to find and talk to the alarm-clock provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmClockConfig {
    pub module_name: String,
    pub main_type: String,
    pub record_type: String,
    pub ready_member: String,
    pub instance_member: String,
    pub collection_member: String,
    pub create_method: String,
    pub delete_method: String,
    pub members: AlarmMemberNames,
}

impl Default for AlarmClockConfig {
    fn default() -> Self {
        Self {
            module_name: defaults::MODULE_NAME.to_string(),
            main_type: defaults::MAIN_TYPE.to_string(),
            record_type: defaults::RECORD_TYPE.to_string(),
            ready_member: defaults::READY_MEMBER.to_string(),
            instance_member: defaults::INSTANCE_MEMBER.to_string(),
            collection_member: defaults::COLLECTION_MEMBER.to_string(),
            create_method: defaults::CREATE_METHOD.to_string(),
            delete_method: defaults::DELETE_METHOD.to_string(),
            members: AlarmMemberNames::default(),
        }
    }
}

impl AlarmClockConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides for module and type names.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_value(env_vars::MODULE_NAME) {
            self.module_name = v;
        }
        if let Some(v) = env_value(env_vars::MAIN_TYPE) {
            self.main_type = v;
        }
        if let Some(v) = env_value(env_vars::RECORD_TYPE) {
            self.record_type = v;
        }
        self
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
