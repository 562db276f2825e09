use crate::detect::property::point::Point;
use std::cmp::Ordering;

/// Immutable 2-d tree over the route's waypoints.
///
/// The tree is stored implicitly: `order` is a permutation of waypoint indices
/// where every sub-slice has its splitting waypoint at the middle position.
#[derive(Debug, Clone)]
pub struct RouteIndex {
    points: Vec<Point<f64>>,
    order: Vec<usize>,
}

impl RouteIndex {
    pub fn new(points: Vec<Point<f64>>) -> Self {
        let mut order = (0..points.len()).collect::<Vec<_>>();
        build(&points, &mut order, 0);
        Self { points, order }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the waypoint closest to `position`, lowest index on ties.
    ///
    /// Returns `None` for an empty route or a non-finite position.
    pub fn nearest(&self, position: &Point<f64>) -> Option<usize> {
        if self.points.is_empty() || !position.is_finite() {
            return None;
        }

        let mut best = Nearest {
            distance: f64::INFINITY,
            index: usize::MAX,
        };
        self.search(position, 0, self.order.len(), 0, &mut best);
        (best.index != usize::MAX).then_some(best.index)
    }

    fn search(&self, target: &Point<f64>, lo: usize, hi: usize, depth: usize, best: &mut Nearest) {
        if lo >= hi {
            return;
        }

        let mid = lo + (hi - lo) / 2;
        let index = self.order[mid];
        let point = &self.points[index];

        let distance = point.distance_squared(target);
        if distance < best.distance || (distance == best.distance && index < best.index) {
            best.distance = distance;
            best.index = index;
        }

        let axis = depth % 2;
        let delta = target.axis(axis) - point.axis(axis);
        let (near, far) = if delta <= 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.search(target, near.0, near.1, depth + 1, best);
        // equal distances may still hide a lower index on the far side
        if delta * delta <= best.distance {
            self.search(target, far.0, far.1, depth + 1, best);
        }
    }
}

struct Nearest {
    distance: f64,
    index: usize,
}

fn build(points: &[Point<f64>], order: &mut [usize], depth: usize) {
    if order.len() <= 1 {
        return;
    }

    let axis = depth % 2;
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| compare(points, a, b, axis));

    let (left, right) = order.split_at_mut(mid);
    build(points, left, depth + 1);
    build(points, &mut right[1..], depth + 1);
}

fn compare(points: &[Point<f64>], a: usize, b: usize, axis: usize) -> Ordering {
    points[a]
        .axis(axis)
        .total_cmp(&points[b].axis(axis))
        .then(a.cmp(&b))
}
