//! JPEG encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use ndarray::{ArrayBase, Data, Dimension};

use crate::error::{Error, Result};
use crate::tensor::{squeeze_batch, RGB_CHANNELS};

/// Quality used by [`encode`].
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encodes a `[H, W, 3]` or `[1, H, W, 3]` tensor in `[0, 1]` as JPEG using
/// [`DEFAULT_JPEG_QUALITY`].
///
/// # Errors
///
/// Returns an encode-kind error for any other shape.
pub fn encode<S, D>(tensor: &ArrayBase<S, D>) -> Result<Vec<u8>>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    encode_jpeg(tensor, DEFAULT_JPEG_QUALITY)
}

/// Encodes a tensor as JPEG at the given quality (1-100).
///
/// A leading batch axis of size 1 is dropped. Samples are clamped to `[0, 1]`
/// before being scaled to `[0, 255]`.
pub fn encode_jpeg<S, D>(tensor: &ArrayBase<S, D>, quality: u8) -> Result<Vec<u8>>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let shape = tensor.shape().to_vec();
    let image = squeeze_batch(tensor.view().into_dyn()).ok_or_else(|| {
        Error::encode(format!("expected [H, W, 3] or [1, H, W, 3], got {:?}", shape))
    })?;

    let (height, width, channels) = image.dim();
    if channels != RGB_CHANNELS {
        return Err(Error::encode(format!("expected 3 channels, got {}", channels)));
    }
    if height == 0 || width == 0 {
        return Err(Error::encode(format!("image has zero dimension ({}x{})", width, height)));
    }
    let width_px = u32::try_from(width).map_err(|_| Error::encode("width exceeds u32"))?;
    let height_px = u32::try_from(height).map_err(|_| Error::encode("height exceeds u32"))?;

    let raw: Vec<u8> = image.iter().map(|&v| to_u8(v)).collect();

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode(&raw, width_px, height_px, ColorType::Rgb8)
        .map_err(|source| Error::EncodeImage { source })?;

    tracing::debug!(width, height, quality, bytes = buffer.len(), "encoded jpeg");
    Ok(buffer)
}

/// Maps a `[0, 1]` sample to `[0, 255]` with clamping.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
