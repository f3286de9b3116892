//! Detection and classification models and the image plumbing around them.

pub mod classification;
pub mod crop;
pub mod decode;
pub mod detection;
pub mod preprocess;
mod session;
mod types;

pub use classification::OnnxClassifier;
pub use crop::crop_region;
pub use decode::decode_upload;
pub use detection::{DetectionParams, OnnxDetector};
pub use types::{Classification, Detection, PixelBox};

use crate::Result;
use async_trait::async_trait;
use image::DynamicImage;

/// Locates candidate regions in a full image.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detections sorted by descending confidence.
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// Assigns a single class to an already cropped region.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &DynamicImage) -> Result<Classification>;
}
