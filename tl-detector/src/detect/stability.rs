use crate::detect::{LightColor, LightObservation, NO_RED_LIGHT, STATE_COUNT_THRESHOLD};
use log::debug;

/// Debounces per-frame observations into the value published for each frame.
///
/// The published value only changes once the same raw color has been observed
/// `threshold` frames in a row. A confirmed red publishes its stop line
/// waypoint; every other confirmed color publishes [`NO_RED_LIGHT`].
#[derive(Debug, Clone)]
pub struct StabilityFilter {
    threshold: u32,
    state: LightColor,
    last_stable: LightColor,
    last_published: i32,
    count: u32,
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new(STATE_COUNT_THRESHOLD)
    }
}

impl StabilityFilter {
    /// A threshold of zero behaves like one.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            state: LightColor::Unknown,
            last_stable: LightColor::Unknown,
            last_published: NO_RED_LIGHT,
            count: 0,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Raw color of the current run of observations.
    pub fn state(&self) -> LightColor {
        self.state
    }

    /// Last color that reached the threshold.
    pub fn last_stable(&self) -> LightColor {
        self.last_stable
    }

    pub fn last_published(&self) -> i32 {
        self.last_published
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Feeds one observation and returns the value to publish for this frame.
    pub fn observe(&mut self, observation: LightObservation) -> i32 {
        if observation.color != self.state {
            debug!("Raw light state {} -> {}", self.state, observation.color);
            self.state = observation.color;
            self.count = 0;
        }
        self.count = self.count.saturating_add(1);

        if self.count >= self.threshold {
            let published = if self.state == LightColor::Red {
                observation.waypoint
            } else {
                NO_RED_LIGHT
            };
            if published != self.last_published || self.state != self.last_stable {
                debug!("Committed {} -> publishing {}", self.state, published);
            }
            self.last_stable = self.state;
            self.last_published = published;
        }

        self.last_published
    }
}
