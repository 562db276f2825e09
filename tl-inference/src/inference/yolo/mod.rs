use inference_yolo_detect::YoloDetectResult;

pub mod inference_yolo_detect;

impl YoloDetectResult {
    /// Intersection over union of two center-format boxes.
    pub fn iou(&self, other: &YoloDetectResult) -> f32 {
        let (ax1, ay1, ax2, ay2) = self.corners();
        let (bx1, by1, bx2, by2) = other.corners();

        let intersection_width = (ax2.min(bx2) - ax1.max(bx1)).max(0.0);
        let intersection_height = (ay2.min(by2) - ay1.max(by1)).max(0.0);
        let intersection_area = intersection_width * intersection_height;

        let union = self.width * self.height + other.width * other.height - intersection_area;
        if union > 0.0 {
            intersection_area / union
        } else {
            0.0
        }
    }

    pub fn corners(&self) -> (f32, f32, f32, f32) {
        (
            self.x - self.width / 2.0,
            self.y - self.height / 2.0,
            self.x + self.width / 2.0,
            self.y + self.height / 2.0,
        )
    }
}

pub trait NMSImplement {
    fn non_maximum_suppression(self, iou_threshold: f32, score_threshold: f32) -> Vec<YoloDetectResult>;
}

impl NMSImplement for Vec<YoloDetectResult> {
    fn non_maximum_suppression(self, iou_threshold: f32, score_threshold: f32) -> Vec<YoloDetectResult> {
        let mut filtered_detections: Vec<YoloDetectResult> = self
            .into_iter()
            .filter(|d| d.score.1 >= score_threshold)
            .collect();

        filtered_detections.sort_by(|a, b| {
            b.score
                .1
                .partial_cmp(&a.score.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut result: Vec<YoloDetectResult> = Vec::new();

        while !filtered_detections.is_empty() {
            let best = filtered_detections.remove(0);
            filtered_detections.retain(|d| best.iou(d) < iou_threshold);
            result.push(best);
        }

        result
    }
}
