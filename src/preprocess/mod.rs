//! Resize-and-center-crop preprocessing that turns arbitrary images into the
//! fixed square tensors the style models expect.

mod crop;
mod resize;

pub use crop::crop_or_pad;
pub use resize::resize;

use ndarray::{s, ArrayBase, Data, Dimension};

use crate::error::{Error, Result};
use crate::tensor::{batch, squeeze_batch, BatchedTensor, RGB_CHANNELS};

/// Target resolution for images fed to the style-predict model.
pub const STYLE_DIM: usize = 256;

/// Target resolution for content images fed to the style-transform model.
pub const CONTENT_DIM: usize = 384;

/// Resizes `tensor` so its shorter side equals `target_dim` (aspect ratio
/// preserved), center-crops to `target_dim x target_dim`, and adds a batch axis.
///
/// Accepts `[H, W, 3]` or `[1, H, W, 3]`. The result is always
/// `[1, target_dim, target_dim, 3]`.
///
/// # Errors
///
/// Returns a preprocess-kind error if `target_dim` is zero, the tensor has
/// fewer than two spatial axes, a real batch, a zero spatial size, or a
/// channel count other than 3.
pub fn preprocess<S, D>(tensor: &ArrayBase<S, D>, target_dim: usize) -> Result<BatchedTensor>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    if target_dim == 0 {
        return Err(Error::preprocess("target dimension must be positive"));
    }

    let shape = tensor.shape().to_vec();
    let image = squeeze_batch(tensor.view().into_dyn()).ok_or_else(|| {
        Error::preprocess(format!("expected [H, W, 3] or [1, H, W, 3], got {:?}", shape))
    })?;

    let (height, width, channels) = image.dim();
    if channels != RGB_CHANNELS {
        return Err(Error::preprocess(format!("expected 3 channels, got {}", channels)));
    }
    if height == 0 || width == 0 {
        return Err(Error::preprocess(format!("image has zero spatial size {:?}", shape)));
    }

    // Only the part of the source that survives the center crop is resampled,
    // so memory stays bounded by the target size for any aspect ratio.
    let (new_height, new_width) = scaled_dims(height, width, target_dim);
    let (y0, rows) = source_window(height, new_height, target_dim);
    let (x0, cols) = source_window(width, new_width, target_dim);
    let (out_height, out_width) = (new_height.min(target_dim), new_width.min(target_dim));

    let window = image.slice_move(s![y0..y0 + rows, x0..x0 + cols, ..]);
    let resized = if (out_height, out_width) == (rows, cols) {
        window.to_owned()
    } else {
        resize(window, out_height, out_width)?
    };

    let cropped = crop_or_pad(resized.view(), target_dim, target_dim);
    tracing::debug!(
        from = ?(height, width),
        scaled = ?(new_height, new_width),
        window = ?(rows, cols),
        target_dim,
        "preprocessed image"
    );
    Ok(batch(cropped))
}

/// Source span `(offset, length)` along one axis that maps onto the centered
/// `target`-long crop once the axis is scaled from `len` to `scaled`.
fn source_window(len: usize, scaled: usize, target: usize) -> (usize, usize) {
    if scaled <= target {
        return (0, len);
    }
    let ratio = len as f64 / scaled as f64;
    let length = ((target as f64 * ratio).round() as usize).clamp(1, len);
    let offset = ((((scaled - target) / 2) as f64 * ratio).round() as usize).min(len - length);
    (offset, length)
}

/// Dimensions after scaling so the shorter side becomes `target_dim`.
///
/// Both sides are rounded to the nearest integer; the shorter side lands on
/// `target_dim` exactly and the longer side on at least `target_dim`.
fn scaled_dims(height: usize, width: usize, target_dim: usize) -> (usize, usize) {
    let short = height.min(width);
    if short == target_dim {
        return (height, width);
    }
    let scale = target_dim as f64 / short as f64;
    let scale_side = |side: usize| -> usize {
        if side == short {
            target_dim
        } else {
            ((side as f64 * scale).round() as usize).max(target_dim)
        }
    };
    (scale_side(height), scale_side(width))
}
