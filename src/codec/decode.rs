//! Image decoding.

use image::GenericImageView;

use crate::error::{Error, Result};
use crate::tensor::{pixel_tensor_from_raw, PixelTensor};

/// Decodes a PNG/JPEG/BMP/GIF buffer into a `[H, W, 3]` tensor in `[0, 1]`.
///
/// Grayscale images are expanded to RGB and alpha is dropped, so the result
/// always has three channels.
///
/// # Errors
///
/// Returns a decode-kind error if the bytes are not a supported image or the
/// image has a zero dimension.
pub fn decode(bytes: &[u8]) -> Result<PixelTensor> {
    let img = image::load_from_memory(bytes).map_err(|source| Error::Decode { source })?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::InvalidImage {
            reason: format!("image has zero dimension ({}x{})", width, height),
        });
    }
    tracing::debug!(width, height, color = ?img.color(), "decoded image");

    let rgb = img.to_rgb8();
    let samples = rgb.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
    pixel_tensor_from_raw(height as usize, width as usize, samples)
}
