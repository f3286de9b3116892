use crate::{pipeline::RegionResult, vision::PixelBox};
use serde::{Deserialize, Serialize};

/// Prefix under which saved crops are served.
pub const RESULTS_ROUTE: &str = "/static/results";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl From<PixelBox> for BoundingBox {
    fn from(b: PixelBox) -> Self {
        Self {
            x1: b.x1,
            y1: b.y1,
            x2: b.x2,
            y2: b.y2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub bbox: BoundingBox,
    pub class_name: String,
    pub confidence: f32,
    pub cropped_image: String,
}

impl From<RegionResult> for DetectionResponse {
    fn from(result: RegionResult) -> Self {
        Self {
            bbox: result.bbox.into(),
            class_name: result.class_name,
            confidence: result.confidence,
            cropped_image: format!("{RESULTS_ROUTE}/{}", result.crop_file_name),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
