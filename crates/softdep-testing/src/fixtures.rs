//! JSON fixtures describing a provider's initial state.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::provider::{AlarmSeed, ProviderProfile, SimulatedAlarmClock};

/// Serialized provider state: build profile, readiness, clock and alarms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderFixture {
    pub profile: ProviderProfile,
    /// Override for the profile's default version
    pub version: Option<semver::Version>,
    pub ready: bool,
    pub universal_time: f64,
    pub alarms: Vec<AlarmSeed>,
}

impl Default for ProviderFixture {
    fn default() -> Self {
        Self {
            profile: ProviderProfile::Current,
            version: None,
            ready: true,
            universal_time: 0.0,
            alarms: Vec::new(),
        }
    }
}

impl ProviderFixture {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid provider fixture")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write fixture {}", path.display()))
    }

    /// Build a provider seeded with this fixture's state.
    pub fn build(&self) -> SimulatedAlarmClock {
        let mut clock = SimulatedAlarmClock::new(self.profile);
        if let Some(version) = &self.version {
            clock = clock.with_version(version.clone());
        }
        clock.set_universal_time(self.universal_time);
        for seed in &self.alarms {
            clock.insert_alarm(seed);
        }
        clock.set_ready(self.ready);

        tracing::debug!(
            profile = ?self.profile,
            alarms = self.alarms.len(),
            "Seeded simulated alarm clock"
        );
        clock
    }
}
