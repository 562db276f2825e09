use crate::engine::inference_engine::{ExecutionProvider, OnnxSession};
use crate::inference::yolo::NMSImplement;
use crate::inference::{Classification, TrafficLightClass, TrafficLightClassifier};
use crate::utils::extractor::ExtraToTensor;
use crate::utils::frame::RgbFrame;
use anyhow::{bail, ensure, Context, Result};
use log::debug;
use ndarray::{s, Array2, ArrayView2, Axis};
use ort::value::Tensor;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::path::Path;

pub const YOLO_INPUT_SIZE: usize = 640;
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.6;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.6;

pub trait YoloDetectInference {
    fn inference_yolo(&self, frame: &RgbFrame, confidence: f32) -> Result<Vec<YoloDetectResult>>;
}

/// One detected box in frame coordinates, center format.
#[derive(Debug, Clone)]
pub struct YoloDetectResult {
    pub score: (usize, f32),

    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub struct TrafficLightDetectSession {
    session: Mutex<OnnxSession>,
    input_name: String,
    labels: Vec<TrafficLightClass>,
    score_threshold: f32,
    iou_threshold: f32,
}

impl TrafficLightDetectSession {
    /// Loads `traffic_light.onnx` and `classes.txt` from `folder_path`.
    pub fn new(folder_path: impl AsRef<Path>, executor: ExecutionProvider) -> Result<Self> {
        let folder_path = folder_path.as_ref();
        let classes_path = folder_path.join("classes.txt");
        let labels = std::fs::read_to_string(&classes_path)
            .with_context(|| format!("failed to read {}", classes_path.display()))?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(TrafficLightClass::from_label)
            .collect::<Vec<_>>();
        ensure!(!labels.is_empty(), "{} lists no classes", classes_path.display());

        let session = OnnxSession::new(folder_path.join("traffic_light.onnx"), executor)?;
        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => bail!("traffic light model declares no inputs"),
        };

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            labels,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        })
    }

    pub fn with_thresholds(mut self, score_threshold: f32, iou_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self.iou_threshold = iou_threshold;
        self
    }
}

impl YoloDetectInference for TrafficLightDetectSession {
    fn inference_yolo(&self, frame: &RgbFrame, confidence: f32) -> Result<Vec<YoloDetectResult>> {
        let letterbox = frame.extra_letterbox_tensor(YOLO_INPUT_SIZE)?;
        let shape = [1, 3, YOLO_INPUT_SIZE, YOLO_INPUT_SIZE];
        let tensor = Tensor::from_array((shape.as_slice(), letterbox.data.clone().into_boxed_slice()))?;

        debug!("Finish building input tensor");
        let (output_shape, output) = {
            let mut session = self.session.lock();
            let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;
            let (output_shape, output) = outputs[0].try_extract_tensor::<f32>()?;
            (
                output_shape.iter().map(|&dim| dim as usize).collect::<Vec<_>>(),
                output.to_vec(),
            )
        };
        debug!("Finish running model, output shape {:?}", output_shape);

        let (features, anchors) = match output_shape.as_slice() {
            [1, features, anchors] | [features, anchors] => (*features, *anchors),
            other => bail!("unexpected detector output shape {:?}", other),
        };
        let output = Array2::from_shape_vec((features, anchors), output)?;

        let results = decode_detections(output.view(), confidence)?
            .into_iter()
            .map(|mut result| {
                let (x, y) = letterbox.to_frame(result.x, result.y);
                result.x = x;
                result.y = y;
                result.width /= letterbox.scale;
                result.height /= letterbox.scale;
                result
            })
            .collect();

        Ok(results)
    }
}

impl TrafficLightClassifier for TrafficLightDetectSession {
    fn classify(&self, frame: &RgbFrame) -> Result<Option<Classification>> {
        let detections = self
            .inference_yolo(frame, self.score_threshold)?
            .non_maximum_suppression(self.iou_threshold, self.score_threshold);
        debug!("{} traffic light(s) after NMS", detections.len());

        Ok(best_classification(&detections, &self.labels))
    }
}

/// Decodes a `[4 + classes, anchors]` YOLO head into boxes whose best class
/// score is at least `confidence`, the same cut NMS applies.
pub fn decode_detections(output: ArrayView2<f32>, confidence: f32) -> Result<Vec<YoloDetectResult>> {
    ensure!(
        output.nrows() > 4,
        "detector output has {} rows, expected box plus class scores",
        output.nrows()
    );

    let result = output
        .t()
        .axis_iter(Axis(0))
        .into_par_iter()
        .filter_map(|box_output| {
            let scores = box_output.slice(s![4..]);
            let (index, max_score) = scores.iter().enumerate().fold(
                (0, f32::MIN),
                |best, (index, &score)| if score > best.1 { (index, score) } else { best },
            );
            if max_score < confidence {
                return None;
            }

            Some(YoloDetectResult {
                score: (index, max_score),
                x: box_output[0],
                y: box_output[1],
                width: box_output[2],
                height: box_output[3],
            })
        })
        .collect::<Vec<_>>();

    Ok(result)
}

/// Picks the highest scoring detection and maps its class index through `labels`.
pub fn best_classification(
    detections: &[YoloDetectResult],
    labels: &[TrafficLightClass],
) -> Option<Classification> {
    detections
        .iter()
        .max_by(|a, b| {
            a.score
                .1
                .partial_cmp(&b.score.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|best| Classification {
            class: labels
                .get(best.score.0)
                .copied()
                .unwrap_or(TrafficLightClass::DontCare),
            score: best.score.1,
        })
}
