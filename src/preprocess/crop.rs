use ndarray::{s, Array3, ArrayView3};

use crate::tensor::PixelTensor;

/// Center-crops or zero-pads `image` to exactly `target_height x target_width`.
///
/// Each axis is handled independently: a longer axis is cropped with offset
/// `(len - target) / 2`, a shorter one is padded with `(target - len) / 2`
/// zeros before the image.
pub fn crop_or_pad(image: ArrayView3<'_, f32>, target_height: usize, target_width: usize) -> PixelTensor {
    let (height, width, channels) = image.dim();
    let (src_y, dst_y, rows) = axis_window(height, target_height);
    let (src_x, dst_x, cols) = axis_window(width, target_width);

    let mut out = Array3::zeros((target_height, target_width, channels));
    out.slice_mut(s![dst_y..dst_y + rows, dst_x..dst_x + cols, ..])
        .assign(&image.slice(s![src_y..src_y + rows, src_x..src_x + cols, ..]));
    out
}

/// Returns `(source offset, destination offset, length)` for one axis.
fn axis_window(len: usize, target: usize) -> (usize, usize, usize) {
    if len >= target {
        ((len - target) / 2, 0, target)
    } else {
        (0, (target - len) / 2, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_symmetrically_with_zeros() {
        let image = PixelTensor::from_elem((2, 3, 3), 1.0);
        let out = crop_or_pad(image.view(), 4, 4);

        assert_eq!(out.shape(), &[4, 4, 3]);
        // Rows 1..3 and columns 0..3 hold the image.
        assert_eq!(out[[0, 0, 0]], 0.0);
        assert_eq!(out[[1, 0, 0]], 1.0);
        assert_eq!(out[[2, 2, 2]], 1.0);
        assert_eq!(out[[3, 1, 0]], 0.0);
        assert_eq!(out[[1, 3, 0]], 0.0);
        assert_eq!(out.sum(), 2.0 * 3.0 * 3.0);
    }

    #[test]
    fn test_crops_odd_excess_towards_start() {
        let image = PixelTensor::from_shape_fn((5, 1, 3), |(y, _, _)| y as f32);
        let out = crop_or_pad(image.view(), 2, 1);
        assert_eq!(out[[0, 0, 0]], 1.0);
        assert_eq!(out[[1, 0, 0]], 2.0);
    }

    #[test]
    fn test_mixed_crop_and_pad() {
        let image = PixelTensor::from_elem((6, 2, 3), 0.5);
        let out = crop_or_pad(image.view(), 4, 4);
        assert_eq!(out.shape(), &[4, 4, 3]);
        assert_eq!(out[[0, 1, 0]], 0.5);
        assert_eq!(out[[0, 0, 0]], 0.0);
    }
}
