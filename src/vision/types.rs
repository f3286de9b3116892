use serde::{Deserialize, Serialize};

/// A candidate region reported by the detection model, in original image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// `[x1, y1, x2, y2]`
    pub bbox: [f32; 4],
    pub confidence: f32,
    pub class_id: usize,
}

impl Detection {
    pub fn width(&self) -> f32 {
        (self.bbox[2] - self.bbox[0]).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bbox[3] - self.bbox[1]).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn iou(&self, other: &Detection) -> f32 {
        let x1 = self.bbox[0].max(other.bbox[0]);
        let y1 = self.bbox[1].max(other.bbox[1]);
        let x2 = self.bbox[2].min(other.bbox[2]);
        let y2 = self.bbox[3].min(other.bbox[3]);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Integer pixel rectangle; coordinates are truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl From<&Detection> for PixelBox {
    fn from(detection: &Detection) -> Self {
        // `as` saturates negatives and NaN to 0
        let [x1, y1, x2, y2] = detection.bbox.map(|v| v.trunc() as u32);
        Self { x1, y1, x2, y2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub class_index: usize,
    /// Probability of `class_index`, within [0, 1].
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn det(bbox: [f32; 4]) -> Detection {
        Detection {
            bbox,
            confidence: 0.9,
            class_id: 0,
        }
    }

    #[test]
    fn test_iou_identical_and_disjoint() {
        let a = det([0.0, 0.0, 10.0, 10.0]);
        let b = det([20.0, 20.0, 30.0, 30.0]);
        assert_eq!(a.iou(&a), 1.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_half_overlap() {
        let a = det([0.0, 0.0, 10.0, 10.0]);
        let b = det([5.0, 0.0, 15.0, 10.0]);
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_box_truncates() {
        let pixel = PixelBox::from(&det([10.9, 3.2, 99.99, 50.5]));
        assert_eq!(
            pixel,
            PixelBox {
                x1: 10,
                y1: 3,
                x2: 99,
                y2: 50
            }
        );
    }
}
