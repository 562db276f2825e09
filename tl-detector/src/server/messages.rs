use crate::detect::property::point::Point;
use crate::detect::{LightColor, TrafficLight};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseMessage {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointsMessage {
    pub waypoints: Vec<Point<f64>>,
}

/// One entry of the light feed. Only the state is read; any pose the
/// simulator attaches is ignored since lights pair with stop lines by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightMessage {
    pub state: LightColor,
}

impl From<LightMessage> for TrafficLight {
    fn from(message: LightMessage) -> Self {
        TrafficLight {
            state: message.state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficLightsMessage {
    pub lights: Vec<LightMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameQuery {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficWaypoint {
    pub traffic_waypoint: i32,
    #[serde(default)]
    pub dropped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAccepted {
    pub accepted: bool,
    pub waypoints: usize,
}
