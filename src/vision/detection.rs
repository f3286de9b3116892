use super::preprocess::{Letterbox, letterbox};
use super::session::OnnxSession;
use super::{Detection, Detector};
use crate::config::DetectionModelConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use image::DynamicImage;
use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl From<&DetectionModelConfig> for DetectionParams {
    fn from(config: &DetectionModelConfig) -> Self {
        Self {
            input_size: config.input_size,
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
        }
    }
}

/// YOLOv8 detector exported to ONNX.
#[derive(Debug, Clone)]
pub struct OnnxDetector {
    session: OnnxSession,
    params: DetectionParams,
}

impl OnnxDetector {
    pub fn load(config: &DetectionModelConfig, intra_threads: usize) -> Result<Self> {
        let session = OnnxSession::load(&config.path, intra_threads)?;
        Ok(Self {
            session,
            params: DetectionParams::from(config),
        })
    }
}

#[async_trait]
impl Detector for OnnxDetector {
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let (input, geometry) = letterbox(image, self.params.input_size);
        let output = self.session.run(input).await?;
        let detections = decode_predictions(output.view(), &geometry, &self.params)?;
        debug!("Detected {} regions", detections.len());
        Ok(detections)
    }
}

/// Turns raw YOLOv8 output into detections in source image coordinates.
///
/// Accepts `[1, 4 + nc, N]` as exported by default, or the transposed
/// `[1, N, 4 + nc]`. Each candidate is `cx, cy, w, h` followed by class scores.
pub fn decode_predictions(
    output: ArrayViewD<f32>,
    geometry: &Letterbox,
    params: &DetectionParams,
) -> Result<Vec<Detection>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(Error::model_output(format!(
            "expected detection output [1, C, N], got {shape:?}"
        )));
    }

    let batch = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .map_err(|e| Error::model_output(e.to_string()))?;
    let candidates: ArrayView2<f32> = if shape[1] > shape[2] { batch } else { batch.reversed_axes() };

    if candidates.ncols() < 5 {
        return Err(Error::model_output(format!(
            "detection output needs at least 5 values per candidate, got {}",
            candidates.ncols()
        )));
    }

    let mut kept = Vec::new();
    for row in candidates.rows() {
        let (class_id, confidence) = row
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, score)| if score > best.1 { (i, score) } else { best });

        if confidence <= params.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        kept.push(Detection {
            bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
            confidence,
            class_id,
        });
    }

    let mut detections = non_maximum_suppression(kept, params.iou_threshold);
    detections.truncate(params.max_detections);
    for detection in &mut detections {
        detection.bbox = geometry.unmap(detection.bbox);
    }

    Ok(detections)
}

/// Greedy per-class suppression; the result is sorted by descending confidence.
pub fn non_maximum_suppression(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
