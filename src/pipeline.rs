use crate::{
    Result, labels,
    upload::crop_file_name,
    vision::{Classifier, Detector, PixelBox, crop_region},
};
use image::{DynamicImage, ImageFormat};
use std::{io::Cursor, path::PathBuf, sync::Arc};
use tracing::{debug, info};

/// Outcome for the single region the pipeline keeps per image.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionResult {
    pub bbox: PixelBox,
    pub class_index: usize,
    pub class_name: String,
    pub confidence: f32,
    pub crop_file_name: String,
}

pub struct DetectClassifyPipeline {
    detector: Arc<dyn Detector>,
    classifier: Arc<dyn Classifier>,
    result_dir: PathBuf,
}

impl DetectClassifyPipeline {
    pub async fn new(
        detector: Arc<dyn Detector>,
        classifier: Arc<dyn Classifier>,
        result_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let result_dir = result_dir.into();
        tokio::fs::create_dir_all(&result_dir).await?;
        Ok(Self {
            detector,
            classifier,
            result_dir,
        })
    }

    pub fn result_dir(&self) -> &std::path::Path {
        &self.result_dir
    }

    /// Detects, crops and classifies the first region of `image`.
    ///
    /// `file_name` is the sanitised upload name and determines the crop's name.
    /// Returns at most one result.
    pub async fn process(&self, file_name: &str, image: &DynamicImage) -> Result<Vec<RegionResult>> {
        let detections = self.detector.detect(image).await?;
        let Some(first) = detections.first() else {
            info!("No region detected in {}", file_name);
            return Ok(Vec::new());
        };
        debug!(
            "Using first of {} detections ({:.3}) for {}",
            detections.len(),
            first.confidence,
            file_name
        );

        let bbox = PixelBox::from(first);
        let crop = crop_region(image, bbox)?;

        let crop_file_name = crop_file_name(file_name);
        self.save_crop(&crop, &crop_file_name).await?;

        let classification = self.classifier.classify(&crop).await?;
        let class_name = labels::class_name(classification.class_index);
        info!(
            "Classified {} as {} ({:.3})",
            file_name, class_name, classification.confidence
        );

        Ok(vec![RegionResult {
            bbox,
            class_index: classification.class_index,
            class_name,
            confidence: classification.confidence,
            crop_file_name,
        }])
    }

    async fn save_crop(&self, crop: &DynamicImage, file_name: &str) -> Result<()> {
        let mut encoded = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(crop.to_rgb8()).write_to(&mut encoded, ImageFormat::Jpeg)?;

        let path = self.result_dir.join(file_name);
        tokio::fs::write(&path, encoded.into_inner()).await?;
        debug!("Saved crop {}", path.display());
        Ok(())
    }
}
