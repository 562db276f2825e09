use crate::config::DetectorConfig;
use crate::detect::context::{DetectorContext, SharedContext};
use crate::detect::light_source::{LightColorSource, LightSource};
use crate::detect::stability::StabilityFilter;
use crate::detect::stop_line::{StopLineLocator, StopLineLookup};
use crate::detect::{LightColor, LightObservation};
use log::{debug, trace};
use tl_inference::RgbFrame;

/// Runs one detection cycle per camera frame:
/// pose -> stop line ahead -> light color -> debounce -> published waypoint.
pub struct FrameProcessor {
    context: SharedContext,
    locator: StopLineLocator,
    source: LightSource,
    filter: StabilityFilter,
}

impl FrameProcessor {
    pub fn new(locator: StopLineLocator, source: LightSource, filter: StabilityFilter) -> Self {
        Self {
            context: DetectorContext::new().shared(),
            locator,
            source,
            filter,
        }
    }

    pub fn from_config(config: &DetectorConfig, source: LightSource) -> Self {
        Self::new(
            StopLineLocator::new(config.stop_lines()),
            source,
            StabilityFilter::new(config.state_count_threshold),
        )
    }

    /// Handle through which the feeds update pose, route and lights.
    pub fn context(&self) -> SharedContext {
        self.context.clone()
    }

    pub fn locator(&self) -> &StopLineLocator {
        &self.locator
    }

    pub fn filter(&self) -> &StabilityFilter {
        &self.filter
    }

    /// Processes one frame and returns the value to publish for it.
    pub async fn process(&mut self, frame: Option<&RgbFrame>) -> i32 {
        let observation = self.observe(frame).await;
        trace!("Observation {:?}", observation);
        self.filter.observe(observation)
    }

    async fn observe(&self, frame: Option<&RgbFrame>) -> LightObservation {
        let lookup = {
            let context = self.context.read();
            self.locator.locate(&context)
        };

        match lookup {
            StopLineLookup::Found(found) => {
                let color = self.source.classify(found.light.as_ref(), frame).await;
                if color == LightColor::Unknown {
                    LightObservation::none()
                } else {
                    LightObservation::new(found.waypoint as i32, color)
                }
            }
            StopLineLookup::NotFound => LightObservation::none(),
            StopLineLookup::NoData => {
                debug!("Pose or route not received yet");
                LightObservation::none()
            }
        }
    }
}
