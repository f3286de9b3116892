use super::preprocess::center_crop;
use super::session::OnnxSession;
use super::{Classification, Classifier};
use crate::config::ClassificationModelConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use image::DynamicImage;
use ndarray::ArrayViewD;
use tracing::debug;

/// Tolerance when checking whether scores already form a distribution.
const PROBABILITY_EPSILON: f32 = 1e-3;

/// YOLOv8-cls classifier exported to ONNX.
#[derive(Debug, Clone)]
pub struct OnnxClassifier {
    session: OnnxSession,
    input_size: u32,
}

impl OnnxClassifier {
    pub fn load(config: &ClassificationModelConfig, intra_threads: usize) -> Result<Self> {
        let session = OnnxSession::load(&config.path, intra_threads)?;
        Ok(Self {
            session,
            input_size: config.input_size,
        })
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    async fn classify(&self, image: &DynamicImage) -> Result<Classification> {
        let input = center_crop(image, self.input_size);
        let output = self.session.run(input).await?;
        let classification = decode_scores(output.view())?;
        debug!(
            "Classified crop as {} ({:.3})",
            classification.class_index, classification.confidence
        );
        Ok(classification)
    }
}

/// Reads a `[1, nc]` score tensor and returns the top-1 class.
pub fn decode_scores(output: ArrayViewD<f32>) -> Result<Classification> {
    let shape = output.shape();
    if shape.is_empty() || shape[0] != 1 || output.is_empty() {
        return Err(Error::model_output(format!(
            "expected classification output [1, nc], got {shape:?}"
        )));
    }

    let scores: Vec<f32> = output.iter().copied().collect();
    let probabilities = to_probabilities(&scores);
    top1(&probabilities).ok_or_else(|| Error::model_output("classification output is empty"))
}

/// Applies softmax unless `scores` are already probabilities.
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let sum: f32 = scores.iter().sum();
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    if in_range && (sum - 1.0).abs() <= PROBABILITY_EPSILON {
        return scores.to_vec();
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

pub fn top1(probabilities: &[f32]) -> Option<Classification> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(class_index, confidence)| Classification {
            class_index,
            confidence: confidence.clamp(0.0, 1.0),
        })
}
