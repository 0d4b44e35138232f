use crate::engine::InferenceEngine;
use crate::error::{Error, Result};
use crate::tensor::{BatchedTensor, StyleBottleneck};

/// Verifies the engine declares exactly one input and one output.
pub fn check_predictor_contract(engine: &dyn InferenceEngine) -> Result<()> {
    let (inputs, outputs) = (engine.inputs().len(), engine.outputs().len());
    if inputs != 1 || outputs != 1 {
        return Err(Error::inference(format!(
            "style-predict engine must declare 1 input and 1 output, found {} and {}",
            inputs, outputs
        )));
    }
    Ok(())
}

/// Runs the style-predict engine on a preprocessed style image.
///
/// The tensor must already match the engine's input slot (`[1, 256, 256, 3]`
/// for the Magenta models); nothing is resized here.
///
/// # Errors
///
/// Returns an inference-kind error if the slot layout or any shape disagrees
/// with the engine's declaration, or the engine itself fails.
pub fn predict_bottleneck(engine: &mut dyn InferenceEngine, style: &BatchedTensor) -> Result<StyleBottleneck> {
    check_predictor_contract(engine)?;
    engine.inputs()[0].check(style.shape())?;

    engine.bind_input(0, style.clone().into_dyn())?;
    engine.run()?;
    let output = engine.read_output(0)?;
    engine.outputs()[0].check(output.shape())?;

    tracing::debug!(shape = ?output.shape(), "predicted style bottleneck");
    Ok(StyleBottleneck::new(output))
}
