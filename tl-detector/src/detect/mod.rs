pub mod context;
pub mod frame_processor;
pub mod light_source;
pub mod property;
pub mod route_index;
pub mod stability;
pub mod stop_line;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use tl_inference::TrafficLightClass;

/// Consecutive equal observations required before the published signal changes.
pub const STATE_COUNT_THRESHOLD: u32 = 3;
/// Published when no red light is confirmed ahead.
pub const NO_RED_LIGHT: i32 = -1;

/// Color of a traffic light.
///
/// Deserializes from the simulator's numeric state (0 red, 1 yellow, 2 green,
/// 4 unknown) or from the upper-case name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightColor {
    Red,
    Yellow,
    Green,
    #[default]
    Unknown,
}

impl LightColor {
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => LightColor::Red,
            1 => LightColor::Yellow,
            2 => LightColor::Green,
            _ => LightColor::Unknown,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RED" => Some(LightColor::Red),
            "YELLOW" => Some(LightColor::Yellow),
            "GREEN" => Some(LightColor::Green),
            "UNKNOWN" => Some(LightColor::Unknown),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LightColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireState {
            Id(u8),
            Name(String),
        }

        match WireState::deserialize(deserializer)? {
            WireState::Id(id) => Ok(LightColor::from_id(id)),
            WireState::Name(name) => LightColor::from_name(&name)
                .ok_or_else(|| D::Error::custom(format!("unknown light state '{}'", name))),
        }
    }
}

impl Display for LightColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LightColor::Red => write!(f, "RED"),
            LightColor::Yellow => write!(f, "YELLOW"),
            LightColor::Green => write!(f, "GREEN"),
            LightColor::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl From<TrafficLightClass> for LightColor {
    fn from(class: TrafficLightClass) -> Self {
        match class {
            TrafficLightClass::Stop => LightColor::Red,
            TrafficLightClass::Warning => LightColor::Yellow,
            TrafficLightClass::Go => LightColor::Green,
            TrafficLightClass::DontCare => LightColor::Unknown,
        }
    }
}

/// A light entity from the light feed, paired by list position with a stop line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TrafficLight {
    pub state: LightColor,
}

/// The raw per-frame result of association plus classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LightObservation {
    pub waypoint: i32,
    pub color: LightColor,
}

impl LightObservation {
    pub fn new(waypoint: i32, color: LightColor) -> Self {
        Self { waypoint, color }
    }

    /// Observation used when no light was found or its color is unknown.
    pub fn none() -> Self {
        Self {
            waypoint: NO_RED_LIGHT,
            color: LightColor::Unknown,
        }
    }
}
