use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb32FImage};
use ndarray::ArrayView3;

use crate::error::{Error, Result};
use crate::tensor::{pixel_tensor_from_raw, PixelTensor};

/// Resamples a `[H, W, 3]` tensor to `height x width` with a triangle
/// (bilinear) filter.
pub fn resize(image: ArrayView3<'_, f32>, height: usize, width: usize) -> Result<PixelTensor> {
    let (src_height, src_width, _) = image.dim();
    let to_u32 = |v: usize| u32::try_from(v).map_err(|_| Error::preprocess(format!("dimension {} exceeds u32", v)));

    let raw: Vec<f32> = image.iter().copied().collect();
    let buffer: Rgb32FImage = ImageBuffer::from_raw(to_u32(src_width)?, to_u32(src_height)?, raw)
        .ok_or_else(|| Error::preprocess("tensor does not fit an RGB image buffer"))?;

    let resized = imageops::resize(&buffer, to_u32(width)?, to_u32(height)?, FilterType::Triangle);
    pixel_tensor_from_raw(height, width, resized.into_raw())
        .map_err(|e| Error::preprocess(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_resize_shape() {
        let image = Array3::<f32>::from_elem((10, 20, 3), 0.3);
        let out = resize(image.view(), 5, 40).unwrap();
        assert_eq!(out.shape(), &[5, 40, 3]);
    }

    #[test]
    fn test_upscale_keeps_values_in_range() {
        let image = Array3::<f32>::from_shape_fn((2, 2, 3), |(y, x, _)| if (y + x) % 2 == 0 { 0.0 } else { 1.0 });
        let out = resize(image.view(), 16, 16).unwrap();
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        // Interpolation produces intermediate values between the checkerboard cells.
        assert!(out.iter().any(|v| *v > 0.1 && *v < 0.9));
    }
}
