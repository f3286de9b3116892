use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use khon_detect::{
    Error, Result,
    vision::{Classification, Classifier, Detection, Detector},
};
use std::sync::{Arc, Mutex};

/// Mock detector returning a fixed list of detections
#[derive(Debug, Default)]
pub struct MockDetector {
    pub detections: Vec<Detection>,
    pub error: Option<String>,
    pub calls: Arc<Mutex<usize>>,
}

impl MockDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, bbox: [f32; 4], confidence: f32) -> Self {
        self.detections.push(Detection {
            bbox,
            confidence,
            class_id: 0,
        });
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Detector for MockDetector {
    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
        *self.calls.lock().unwrap() += 1;

        if let Some(ref error) = self.error {
            return Err(Error::inference(error.clone()));
        }

        Ok(self.detections.clone())
    }
}

/// Mock classifier returning a fixed class, recording crop sizes it receives
#[derive(Debug)]
pub struct MockClassifier {
    pub classification: Classification,
    pub error: Option<String>,
    pub seen_sizes: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl MockClassifier {
    pub fn new(class_index: usize, confidence: f32) -> Self {
        Self {
            classification: Classification {
                class_index,
                confidence,
            },
            error: None,
            seen_sizes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn seen_sizes(&self) -> Vec<(u32, u32)> {
        self.seen_sizes.lock().unwrap().clone()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new(10, 0.87)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, image: &DynamicImage) -> Result<Classification> {
        self.seen_sizes.lock().unwrap().push(image.dimensions());

        if let Some(ref error) = self.error {
            return Err(Error::inference(error.clone()));
        }

        Ok(self.classification)
    }
}
