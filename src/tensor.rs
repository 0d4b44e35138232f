//! Tensor types shared by every stage of the pipeline.
//!
//! Images are channels-last (`[H, W, C]`), matching the layout the style
//! models are exported with. Samples are `f32` in `[0, 1]`.

use ndarray::{Array3, Array4, ArrayD, ArrayView3, ArrayViewD, Axis, Ix3};

use crate::error::{Error, Result};

/// Number of color channels in every image tensor (RGB).
pub const RGB_CHANNELS: usize = 3;

/// `[height, width, 3]` image with samples in `[0, 1]`.
pub type PixelTensor = Array3<f32>;

/// `[1, height, width, 3]` image, the form inference engines consume.
pub type BatchedTensor = Array4<f32>;

/// Compact style summary produced by the style-predict model.
///
/// The shape is defined by the model (`[1, 1, 1, 100]` for the Magenta
/// arbitrary-stylization models) and is opaque to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleBottleneck(ArrayD<f32>);

impl StyleBottleneck {
    pub fn new(values: ArrayD<f32>) -> Self {
        StyleBottleneck(values)
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn values(&self) -> &ArrayD<f32> {
        &self.0
    }

    pub fn into_inner(self) -> ArrayD<f32> {
        self.0
    }
}

/// Views a rank-3 image, or a rank-4 image whose batch axis has size 1, as
/// `[H, W, C]`. Any other rank yields `None`.
pub(crate) fn squeeze_batch(tensor: ArrayViewD<'_, f32>) -> Option<ArrayView3<'_, f32>> {
    match tensor.ndim() {
        3 => tensor.into_dimensionality::<Ix3>().ok(),
        4 if tensor.shape()[0] == 1 => tensor
            .index_axis_move(Axis(0), 0)
            .into_dimensionality::<Ix3>()
            .ok(),
        _ => None,
    }
}

/// Adds the leading batch axis to an image tensor.
pub fn batch(image: PixelTensor) -> BatchedTensor {
    image.insert_axis(Axis(0))
}

/// Builds a `[H, W, 3]` tensor from interleaved RGB samples.
pub(crate) fn pixel_tensor_from_raw(height: usize, width: usize, raw: Vec<f32>) -> Result<PixelTensor> {
    Array3::from_shape_vec((height, width, RGB_CHANNELS), raw)
        .map_err(|e| Error::InvalidImage { reason: e.to_string() })
}
