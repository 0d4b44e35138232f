use crate::error::{Error, Result};
use crate::tensor::StyleBottleneck;

/// `ratio * style + (1 - ratio) * content`, element-wise.
///
/// `ratio` is not clamped: values above 1 or below 0 extrapolate, which
/// over- or under-stylizes. Callers that want strict blending clamp first.
///
/// # Errors
///
/// Returns an inference-kind error if the two bottlenecks differ in shape.
pub fn blend(style: &StyleBottleneck, content: &StyleBottleneck, ratio: f32) -> Result<StyleBottleneck> {
    if style.shape() != content.shape() {
        return Err(Error::ShapeMismatch {
            slot: "style_bottleneck".into(),
            expected: style.shape().to_vec(),
            actual: content.shape().to_vec(),
        });
    }
    let blended = style.values() * ratio + content.values() * (1.0 - ratio);
    Ok(StyleBottleneck::new(blended))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::{ArrayD, IxDyn};

    fn bottleneck(values: &[f32]) -> StyleBottleneck {
        StyleBottleneck::new(ArrayD::from_shape_vec(IxDyn(&[1, 1, 1, values.len()]), values.to_vec()).unwrap())
    }

    fn assert_close(actual: &StyleBottleneck, expected: &[f32]) {
        for (a, e) in actual.values().iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{} vs {}", a, e);
        }
    }

    #[test]
    fn test_blend_boundaries() {
        let s = bottleneck(&[1.0, -2.0, 0.5]);
        let c = bottleneck(&[3.0, 4.0, -1.0]);

        assert_close(&blend(&s, &c, 1.0).unwrap(), &[1.0, -2.0, 0.5]);
        assert_close(&blend(&s, &c, 0.0).unwrap(), &[3.0, 4.0, -1.0]);
        assert_close(&blend(&s, &c, 0.5).unwrap(), &[2.0, 1.0, -0.25]);
    }

    #[test]
    fn test_blend_extrapolates_without_clamping() {
        let s = bottleneck(&[1.0, 2.0]);
        let c = bottleneck(&[3.0, -1.0]);

        // 1.5 * s - 0.5 * c
        assert_close(&blend(&s, &c, 1.5).unwrap(), &[0.0, 3.5]);
        // -0.5 * s + 1.5 * c
        assert_close(&blend(&s, &c, -0.5).unwrap(), &[4.0, -2.5]);
    }

    #[test]
    fn test_blend_keeps_shape() {
        let s = bottleneck(&[0.0; 100]);
        let c = bottleneck(&[1.0; 100]);
        assert_eq!(blend(&s, &c, 0.3).unwrap().shape(), &[1, 1, 1, 100]);
    }

    #[test]
    fn test_blend_rejects_mismatched_shapes() {
        let s = bottleneck(&[1.0, 2.0]);
        let c = bottleneck(&[1.0, 2.0, 3.0]);
        assert_eq!(blend(&s, &c, 0.5).unwrap_err().kind(), ErrorKind::Inference);
    }
}
