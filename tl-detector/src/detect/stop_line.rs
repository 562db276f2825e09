use crate::detect::context::DetectorContext;
use crate::detect::property::point::Point;
use crate::detect::TrafficLight;

/// Outcome of one stop line lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum StopLineLookup {
    /// Pose or route has not been received yet.
    NoData,
    /// No stop line lies ahead of the vehicle along the route.
    NotFound,
    Found(StopLineMatch),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopLineMatch {
    /// Route waypoint closest to the stop line.
    pub waypoint: usize,
    /// Position of the stop line in the configured list.
    pub stop_line: usize,
    /// The light paired with the stop line, if a light list has been received.
    pub light: Option<TrafficLight>,
}

/// Finds the closest stop line ahead of the vehicle on the route.
///
/// "Ahead" is measured in waypoint indices and never wraps past the end of the
/// route: a light that is only ahead through the route's start is missed.
#[derive(Debug, Clone)]
pub struct StopLineLocator {
    stop_lines: Vec<Point<f64>>,
}

impl StopLineLocator {
    pub fn new(stop_lines: Vec<Point<f64>>) -> Self {
        Self { stop_lines }
    }

    pub fn stop_lines(&self) -> &[Point<f64>] {
        &self.stop_lines
    }

    pub fn len(&self) -> usize {
        self.stop_lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_lines.is_empty()
    }

    pub fn locate(&self, context: &DetectorContext) -> StopLineLookup {
        let (Some(pose), Some(route)) = (context.pose(), context.route()) else {
            return StopLineLookup::NoData;
        };
        let Some(vehicle_waypoint) = route.nearest(pose) else {
            return StopLineLookup::NoData;
        };

        let waypoints = self
            .stop_lines
            .iter()
            .map(|line| route.nearest(line))
            .collect::<Vec<_>>();

        match closest_ahead(vehicle_waypoint, &waypoints, route.len()) {
            Some((stop_line, waypoint)) => StopLineLookup::Found(StopLineMatch {
                waypoint,
                stop_line,
                light: context.lights().get(stop_line).copied(),
            }),
            None => StopLineLookup::NotFound,
        }
    }
}

/// Picks the candidate with the smallest non-negative index delta from the
/// vehicle, first in input order on ties. Returns `(position, waypoint)`.
pub fn closest_ahead(
    vehicle_waypoint: usize,
    line_waypoints: &[Option<usize>],
    route_len: usize,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut diff = route_len;

    for (position, line_waypoint) in line_waypoints.iter().enumerate() {
        let Some(line_waypoint) = *line_waypoint else {
            continue;
        };
        let Some(delta) = line_waypoint.checked_sub(vehicle_waypoint) else {
            continue;
        };
        if delta < diff {
            diff = delta;
            best = Some((position, line_waypoint));
        }
    }

    best
}
