use crate::utils::frame::RgbFrame;
use anyhow::Result;

pub mod yolo;

/// Traffic light classes of the LISA label set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TrafficLightClass {
    Stop,
    Warning,
    Go,
    DontCare,
}

impl TrafficLightClass {
    /// Maps a label from the model's class file. Unrecognised labels are `DontCare`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "stop" | "stopleft" | "red" => TrafficLightClass::Stop,
            "warning" | "warningleft" | "yellow" => TrafficLightClass::Warning,
            "go" | "goleft" | "goforward" | "green" => TrafficLightClass::Go,
            _ => TrafficLightClass::DontCare,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub class: TrafficLightClass,
    pub score: f32,
}

/// Turns a camera frame into the color class of the most confident traffic light.
///
/// Returns `Ok(None)` when nothing clears the confidence threshold.
pub trait TrafficLightClassifier: Send + Sync {
    fn classify(&self, frame: &RgbFrame) -> Result<Option<Classification>>;
}
