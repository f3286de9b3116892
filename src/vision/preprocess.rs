use image::{DynamicImage, RgbImage, imageops::FilterType};
use ndarray::Array4;

/// Grey level used to pad letterboxed detection inputs.
pub const LETTERBOX_FILL: f32 = 114.0;

/// Geometry of a letterbox transform, needed to map boxes back to the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub gain: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    pub fn new(source_width: u32, source_height: u32, target: u32) -> Self {
        let gain = (target as f32 / source_height as f32).min(target as f32 / source_width as f32);
        let pad_x = ((target as f32 - source_width as f32 * gain) / 2.0 - 0.1).round();
        let pad_y = ((target as f32 - source_height as f32 * gain) / 2.0 - 0.1).round();
        Self {
            gain,
            pad_x,
            pad_y,
            source_width,
            source_height,
        }
    }

    /// Size of the resized image before padding.
    pub fn scaled_size(&self) -> (u32, u32) {
        (
            ((self.source_width as f32 * self.gain).round() as u32).max(1),
            ((self.source_height as f32 * self.gain).round() as u32).max(1),
        )
    }

    /// Maps `[x1, y1, x2, y2]` from model input space to clipped source pixels.
    pub fn unmap(&self, bbox: [f32; 4]) -> [f32; 4] {
        let w = self.source_width as f32;
        let h = self.source_height as f32;
        [
            ((bbox[0] - self.pad_x) / self.gain).clamp(0.0, w),
            ((bbox[1] - self.pad_y) / self.gain).clamp(0.0, h),
            ((bbox[2] - self.pad_x) / self.gain).clamp(0.0, w),
            ((bbox[3] - self.pad_y) / self.gain).clamp(0.0, h),
        ]
    }
}

/// Resizes `image` into a `target`-sized square, keeping aspect ratio, and
/// returns the NCHW tensor in [0, 1] with the geometry used.
pub fn letterbox(image: &DynamicImage, target: u32) -> (Array4<f32>, Letterbox) {
    let geometry = Letterbox::new(image.width(), image.height(), target);
    let (scaled_w, scaled_h) = geometry.scaled_size();
    let resized = image::imageops::resize(&image.to_rgb8(), scaled_w, scaled_h, FilterType::Triangle);

    let size = target as usize;
    let mut tensor = Array4::from_elem((1, 3, size, size), LETTERBOX_FILL / 255.0);
    let left = geometry.pad_x.max(0.0) as usize;
    let top = geometry.pad_y.max(0.0) as usize;
    fill_tensor(&mut tensor, &resized, left, top);

    (tensor, geometry)
}

/// Resizes the shortest edge to `target`, centre crops a square, and returns
/// the NCHW tensor in [0, 1].
pub fn center_crop(image: &DynamicImage, target: u32) -> Array4<f32> {
    let (w, h) = (image.width().max(1), image.height().max(1));
    let scale = target as f32 / w.min(h) as f32;
    let scaled_w = ((w as f32 * scale).round() as u32).max(target);
    let scaled_h = ((h as f32 * scale).round() as u32).max(target);
    let resized = image::imageops::resize(&image.to_rgb8(), scaled_w, scaled_h, FilterType::Triangle);

    let left = (scaled_w - target) / 2;
    let top = (scaled_h - target) / 2;
    let cropped = image::imageops::crop_imm(&resized, left, top, target, target).to_image();

    let size = target as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    fill_tensor(&mut tensor, &cropped, 0, 0);
    tensor
}

fn fill_tensor(tensor: &mut Array4<f32>, image: &RgbImage, left: usize, top: usize) {
    let (_, _, rows, cols) = tensor.dim();
    for (x, y, pixel) in image.enumerate_pixels() {
        let (tx, ty) = (x as usize + left, y as usize + top);
        if tx >= cols || ty >= rows {
            continue;
        }
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = pixel[c] as f32 / 255.0;
        }
    }
}
