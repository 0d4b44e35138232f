use crate::engine::InferenceEngine;
use crate::error::{Error, Result};
use crate::tensor::{BatchedTensor, StyleBottleneck};
use ndarray::Ix4;

/// Verifies the engine declares two inputs (content, bottleneck) and one output.
pub fn check_transformer_contract(engine: &dyn InferenceEngine) -> Result<()> {
    let (inputs, outputs) = (engine.inputs().len(), engine.outputs().len());
    if inputs != 2 || outputs != 1 {
        return Err(Error::inference(format!(
            "style-transform engine must declare 2 inputs and 1 output, found {} and {}",
            inputs, outputs
        )));
    }
    Ok(())
}

/// Runs the style-transform engine: content image in slot 0, bottleneck in
/// slot 1, stylized image out of slot 0.
///
/// The content tensor must already match the engine's declared resolution
/// (`[1, 384, 384, 3]` for the Magenta models).
///
/// # Errors
///
/// Returns an inference-kind error on any slot or shape disagreement, or if
/// the engine fails.
pub fn transform(
    engine: &mut dyn InferenceEngine,
    bottleneck: &StyleBottleneck,
    content: &BatchedTensor,
) -> Result<BatchedTensor> {
    check_transformer_contract(engine)?;
    engine.inputs()[0].check(content.shape())?;
    engine.inputs()[1].check(bottleneck.shape())?;

    engine.bind_input(0, content.clone().into_dyn())?;
    engine.bind_input(1, bottleneck.values().clone())?;
    engine.run()?;
    let output = engine.read_output(0)?;
    engine.outputs()[0].check(output.shape())?;

    let shape = output.shape().to_vec();
    let stylized = output.into_dimensionality::<Ix4>().map_err(|_| {
        Error::inference(format!("stylized output must be [1, H, W, 3], got {:?}", shape))
    })?;
    tracing::debug!(shape = ?stylized.shape(), "transformed content image");
    Ok(stylized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{SlotSpec, Tensor};
    use crate::error::ErrorKind;
    use ndarray::{ArrayD, IxDyn};

    /// Fills the content image with the first bottleneck value.
    struct FillEngine {
        inputs:  Vec<SlotSpec>,
        outputs: Vec<SlotSpec>,
        bound:   Vec<Option<Tensor>>,
        output:  Option<Tensor>,
    }

    impl FillEngine {
        fn new(dim: usize) -> Self {
            FillEngine {
                inputs: vec![
                    SlotSpec::new("content_image", vec![1, dim, dim, 3]),
                    SlotSpec::new("style_bottleneck", vec![1, 1, 1, 2]),
                ],
                outputs: vec![SlotSpec::new("stylized_image", vec![1, dim, dim, 3])],
                bound: vec![None, None],
                output: None,
            }
        }
    }

    impl InferenceEngine for FillEngine {
        fn inputs(&self) -> &[SlotSpec] { &self.inputs }
        fn outputs(&self) -> &[SlotSpec] { &self.outputs }

        fn bind_input(&mut self, slot: usize, tensor: Tensor) -> Result<()> {
            self.bound[slot] = Some(tensor);
            Ok(())
        }

        fn run(&mut self) -> Result<()> {
            let content = self.bound[0].as_ref().ok_or_else(|| Error::inference("content unbound"))?;
            let bottleneck = self.bound[1].as_ref().ok_or_else(|| Error::inference("bottleneck unbound"))?;
            let fill = bottleneck.iter().next().copied().unwrap_or(0.0);
            self.output = Some(ArrayD::from_elem(IxDyn(content.shape()), fill));
            Ok(())
        }

        fn read_output(&self, _slot: usize) -> Result<Tensor> {
            self.output.clone().ok_or_else(|| Error::inference("not run"))
        }
    }

    fn bottleneck(first: f32) -> StyleBottleneck {
        StyleBottleneck::new(ArrayD::from_shape_vec(IxDyn(&[1, 1, 1, 2]), vec![first, 0.0]).unwrap())
    }

    #[test]
    fn test_transform_binds_content_then_bottleneck() {
        let mut engine = FillEngine::new(12);
        let content = BatchedTensor::zeros((1, 12, 12, 3));
        let out = transform(&mut engine, &bottleneck(0.75), &content).unwrap();

        assert_eq!(out.shape(), &[1, 12, 12, 3]);
        assert!(out.iter().all(|v| (v - 0.75).abs() < 1e-6));
    }

    #[test]
    fn test_transform_rejects_content_at_wrong_resolution() {
        let mut engine = FillEngine::new(12);
        let content = BatchedTensor::zeros((1, 8, 8, 3));
        let err = transform(&mut engine, &bottleneck(0.5), &content).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inference);
        assert!(engine.bound.iter().all(Option::is_none));
    }

    #[test]
    fn test_transform_rejects_wrong_bottleneck_shape() {
        let mut engine = FillEngine::new(12);
        let content = BatchedTensor::zeros((1, 12, 12, 3));
        let wide = StyleBottleneck::new(ArrayD::zeros(IxDyn(&[1, 1, 1, 5])));
        assert_eq!(transform(&mut engine, &wide, &content).unwrap_err().kind(), ErrorKind::Inference);
    }

    #[test]
    fn test_transform_rejects_single_input_engine() {
        let mut engine = FillEngine::new(12);
        engine.inputs.pop();
        let content = BatchedTensor::zeros((1, 12, 12, 3));
        let err = transform(&mut engine, &bottleneck(0.5), &content).unwrap_err();
        assert!(err.to_string().contains("2 inputs"));
    }
}
