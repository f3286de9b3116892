use super::PixelBox;
use crate::{Error, Result};
use image::DynamicImage;

/// Cuts `region` out of `image`, clamping it to the image bounds.
pub fn crop_region(image: &DynamicImage, region: PixelBox) -> Result<DynamicImage> {
    let x1 = region.x1.min(image.width());
    let y1 = region.y1.min(image.height());
    let x2 = region.x2.min(image.width());
    let y2 = region.y2.min(image.height());

    let width = x2.saturating_sub(x1);
    let height = y2.saturating_sub(y1);
    if width == 0 || height == 0 {
        return Err(Error::EmptyCrop { width, height });
    }

    Ok(image.crop_imm(x1, y1, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use pretty_assertions::assert_eq;

    fn quadrants() -> DynamicImage {
        let mut img = RgbImage::from_pixel(100, 80, Rgb([0, 0, 0]));
        for y in 40..80 {
            for x in 50..100 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_crop_region_dimensions_and_content() {
        let region = PixelBox {
            x1: 50,
            y1: 40,
            x2: 90,
            y2: 70,
        };
        let crop = crop_region(&quadrants(), region).unwrap();

        assert_eq!(crop.dimensions(), (40, 30));
        assert_eq!(crop.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_crop_region_clamps_to_image() {
        let region = PixelBox {
            x1: 90,
            y1: 70,
            x2: 500,
            y2: 500,
        };
        let crop = crop_region(&quadrants(), region).unwrap();
        assert_eq!(crop.dimensions(), (10, 10));
    }

    #[test]
    fn test_crop_region_rejects_degenerate_box() {
        let region = PixelBox {
            x1: 30,
            y1: 10,
            x2: 30,
            y2: 60,
        };
        let result = crop_region(&quadrants(), region);
        assert!(matches!(result, Err(Error::EmptyCrop { width: 0, height: 50 })));
    }
}
