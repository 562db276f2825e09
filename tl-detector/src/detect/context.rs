use crate::detect::property::point::Point;
use crate::detect::route_index::RouteIndex;
use crate::detect::TrafficLight;
use anyhow::{ensure, Result};
use log::{debug, info};
use parking_lot::RwLock;
use std::sync::Arc;

pub type SharedContext = Arc<RwLock<DetectorContext>>;

/// Latest-value snapshot of every asynchronous input the frame cycle reads.
#[derive(Debug, Default)]
pub struct DetectorContext {
    pose: Option<Point<f64>>,
    route: Option<Arc<RouteIndex>>,
    lights: Vec<TrafficLight>,
}

impl DetectorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedContext {
        Arc::new(RwLock::new(self))
    }

    pub fn pose(&self) -> Option<&Point<f64>> {
        self.pose.as_ref()
    }

    pub fn route(&self) -> Option<&Arc<RouteIndex>> {
        self.route.as_ref()
    }

    pub fn lights(&self) -> &[TrafficLight] {
        &self.lights
    }

    pub fn update_pose(&mut self, pose: Point<f64>) {
        self.pose = Some(pose);
    }

    /// Builds the route index from the first non-empty route.
    ///
    /// Later routes are ignored; returns whether this call built the index.
    pub fn set_route(&mut self, waypoints: Vec<Point<f64>>) -> bool {
        if self.route.is_some() {
            debug!("Route already indexed, ignoring update of {} waypoints", waypoints.len());
            return false;
        }
        if waypoints.is_empty() {
            debug!("Ignoring empty route");
            return false;
        }

        info!("Indexing route of {} waypoints", waypoints.len());
        self.route = Some(Arc::new(RouteIndex::new(waypoints)));
        true
    }

    /// Replaces the light list. Lights pair with stop lines by position, so a
    /// list of the wrong length is rejected and the previous one kept.
    pub fn update_lights(&mut self, lights: Vec<TrafficLight>, stop_line_count: usize) -> Result<()> {
        ensure!(
            lights.len() == stop_line_count,
            "light list has {} entries but {} stop lines are configured",
            lights.len(),
            stop_line_count
        );
        self.lights = lights;
        Ok(())
    }
}
