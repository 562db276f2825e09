mod ground_truth;
mod vision;
#[macro_use]
mod dispatch_macro;

pub use ground_truth::GroundTruthSource;
pub use vision::VisionSource;

use crate::config::{DetectorConfig, LightSourceKind};
use crate::detect::{LightColor, TrafficLight};
use anyhow::Result;
use log::info;
use std::sync::Arc;
use tl_inference::inference::yolo::inference_yolo_detect::TrafficLightDetectSession;
use tl_inference::RgbFrame;

/// Produces the color of the light currently relevant to the vehicle.
///
/// Failures never surface as errors: anything that prevents a confident answer
/// yields [`LightColor::Unknown`].
#[allow(async_fn_in_trait)]
pub trait LightColorSource {
    async fn classify(&self, light: Option<&TrafficLight>, frame: Option<&RgbFrame>) -> LightColor;
}

define_light_source![
    GroundTruth => GroundTruthSource,
    Vision => VisionSource,
];

impl LightSource {
    /// Selects the source named by the configuration, loading the detector
    /// model for the vision variant.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let source = match config.light_source_kind() {
            LightSourceKind::GroundTruth => LightSource::GroundTruth(GroundTruthSource),
            LightSourceKind::Vision => {
                let detector = &config.detector;
                let session =
                    TrafficLightDetectSession::new(&detector.model_dir, detector.execution_provider()?)?
                        .with_thresholds(detector.score_threshold, detector.iou_threshold);
                LightSource::Vision(VisionSource::new(Arc::new(session), detector.timeout()))
            }
        };

        info!("Using {} light color source", source.name());
        Ok(source)
    }
}
