use crate::Result;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Decodes an uploaded image and rotates it upright according to its EXIF
/// orientation, so boxes and crops are in the frame the user sees.
pub fn decode_upload(bytes: &[u8]) -> Result<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;

    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    debug!(
        "Decoded {}x{} image with orientation {:?}",
        image.width(),
        image.height(),
        orientation
    );

    Ok(image)
}
