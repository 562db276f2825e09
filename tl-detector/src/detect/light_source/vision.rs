use crate::detect::light_source::LightColorSource;
use crate::detect::{LightColor, TrafficLight};
use log::{debug, error, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tl_inference::{RgbFrame, TrafficLightClassifier};

/// Classifies the camera frame with a vision model.
///
/// Runs on the blocking pool under a timeout. While one classification is in
/// flight further frames are answered with `Unknown` instead of queueing.
pub struct VisionSource {
    classifier: Arc<dyn TrafficLightClassifier>,
    timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl VisionSource {
    pub fn new(classifier: Arc<dyn TrafficLightClassifier>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl LightColorSource for VisionSource {
    async fn classify(&self, _light: Option<&TrafficLight>, frame: Option<&RgbFrame>) -> LightColor {
        let Some(frame) = frame else {
            debug!("No camera frame to classify");
            return LightColor::Unknown;
        };
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Classifier busy, dropping frame");
            return LightColor::Unknown;
        }

        let guard = InFlightGuard(self.in_flight.clone());
        let classifier = self.classifier.clone();
        let frame = frame.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            classifier.classify(&frame)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(Some(classification)))) => {
                debug!(
                    "Classified {:?} with score {:.2}",
                    classification.class, classification.score
                );
                classification.class.into()
            }
            Ok(Ok(Ok(None))) => LightColor::Unknown,
            Ok(Ok(Err(err))) => {
                warn!("Traffic light classification failed: {:#}", err);
                LightColor::Unknown
            }
            Ok(Err(err)) => {
                error!("Traffic light classification task failed: {}", err);
                LightColor::Unknown
            }
            Err(_) => {
                warn!("Traffic light classification exceeded {:?}", self.timeout);
                LightColor::Unknown
            }
        }
    }
}
