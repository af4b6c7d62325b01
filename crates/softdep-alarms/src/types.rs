//! Alarm enumerations shared with the alarm-clock provider.
//!
//! The provider stores these as integers. Discriminants must match the
//! provider's declaration order.

use serde::{Deserialize, Serialize};

/// What an alarm is for. Affects the provider's icon and some calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum AlarmType {
    #[default]
    Raw = 0,
    Maneuver,
    ManeuverAuto,
    Apoapsis,
    Periapsis,
    AscendingNode,
    DescendingNode,
    LaunchRendevous,
    Closest,
    #[serde(rename = "SOIChange")]
    SoiChange,
    #[serde(rename = "SOIChangeAuto")]
    SoiChangeAuto,
    Transfer,
    TransferModelled,
    Distance,
    Crew,
    EarthTime,
    Contract,
    ContractAuto,
}

impl AlarmType {
    pub const ALL: [AlarmType; 18] = [
        AlarmType::Raw,
        AlarmType::Maneuver,
        AlarmType::ManeuverAuto,
        AlarmType::Apoapsis,
        AlarmType::Periapsis,
        AlarmType::AscendingNode,
        AlarmType::DescendingNode,
        AlarmType::LaunchRendevous,
        AlarmType::Closest,
        AlarmType::SoiChange,
        AlarmType::SoiChangeAuto,
        AlarmType::Transfer,
        AlarmType::TransferModelled,
        AlarmType::Distance,
        AlarmType::Crew,
        AlarmType::EarthTime,
        AlarmType::Contract,
        AlarmType::ContractAuto,
    ];

    pub fn discriminant(self) -> i32 {
        self as i32
    }

    pub fn from_discriminant(value: i64) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Case-insensitive lookup by variant name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            AlarmType::Raw => "Raw",
            AlarmType::Maneuver => "Maneuver",
            AlarmType::ManeuverAuto => "ManeuverAuto",
            AlarmType::Apoapsis => "Apoapsis",
            AlarmType::Periapsis => "Periapsis",
            AlarmType::AscendingNode => "AscendingNode",
            AlarmType::DescendingNode => "DescendingNode",
            AlarmType::LaunchRendevous => "LaunchRendevous",
            AlarmType::Closest => "Closest",
            AlarmType::SoiChange => "SOIChange",
            AlarmType::SoiChangeAuto => "SOIChangeAuto",
            AlarmType::Transfer => "Transfer",
            AlarmType::TransferModelled => "TransferModelled",
            AlarmType::Distance => "Distance",
            AlarmType::Crew => "Crew",
            AlarmType::EarthTime => "EarthTime",
            AlarmType::Contract => "Contract",
            AlarmType::ContractAuto => "ContractAuto",
        }
    }
}

impl std::fmt::Display for AlarmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What the provider does when an alarm fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum AlarmAction {
    #[default]
    DoNothingDeleteWhenPassed = 0,
    DoNothing,
    MessageOnly,
    KillWarpOnly,
    KillWarp,
    PauseGame,
}

impl AlarmAction {
    pub const ALL: [AlarmAction; 6] = [
        AlarmAction::DoNothingDeleteWhenPassed,
        AlarmAction::DoNothing,
        AlarmAction::MessageOnly,
        AlarmAction::KillWarpOnly,
        AlarmAction::KillWarp,
        AlarmAction::PauseGame,
    ];

    pub fn discriminant(self) -> i32 {
        self as i32
    }

    pub fn from_discriminant(value: i64) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Human-readable description, as shown by the provider's UI.
    pub fn description(self) -> &'static str {
        match self {
            AlarmAction::DoNothingDeleteWhenPassed => "Do Nothing-Delete When Past",
            AlarmAction::DoNothing => "Do Nothing",
            AlarmAction::MessageOnly => "Message Only-No Affect on warp",
            AlarmAction::KillWarpOnly => "Kill Warp Only-No Message",
            AlarmAction::KillWarp => "Kill Warp and Message",
            AlarmAction::PauseGame => "Pause Game and Message",
        }
    }
}

impl std::fmt::Display for AlarmAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Lifecycle events of a provider-owned alarm.
///
/// Created → Triggered → Closed, or Created → Deleted. The provider drives
/// these transitions; a consumer can only force `Deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmStateEvent {
    Created,
    Triggered,
    Closed,
    Deleted,
}

impl AlarmStateEvent {
    pub fn is_terminal(self) -> bool {
        matches!(self, AlarmStateEvent::Closed | AlarmStateEvent::Deleted)
    }

    /// Whether the provider may move an alarm from `self` to `next`.
    pub fn can_transition_to(self, next: AlarmStateEvent) -> bool {
        matches!(
            (self, next),
            (AlarmStateEvent::Created, AlarmStateEvent::Triggered)
                | (AlarmStateEvent::Created, AlarmStateEvent::Deleted)
                | (AlarmStateEvent::Triggered, AlarmStateEvent::Closed)
        )
    }
}

/// Unit granularity used when entering alarm times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TimeEntryPrecision {
    Seconds = 0,
    Minutes = 1,
    Hours = 2,
    Days = 3,
    Years = 4,
}
