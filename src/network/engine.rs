use std::path::Path;
use std::sync::Arc;

use crate::engine::{slot_at, EngineFactory, InferenceEngine, SlotSpec, Tensor};
use crate::error::{Error, Result};
use crate::network::graph::GraphModel;

/// [`InferenceEngine`] over a [`GraphModel`].
///
/// The model is shared read-only; bound inputs and results belong to the
/// engine instance.
pub struct GraphEngine {
    model:   Arc<GraphModel>,
    bound:   Vec<Option<Tensor>>,
    results: Vec<Tensor>,
}

impl GraphEngine {
    /// The model must already have passed [`GraphModel::validate`];
    /// [`GraphEngineFactory`] guarantees that.
    pub(crate) fn new(model: Arc<GraphModel>) -> Self {
        let bound = vec![None; model.inputs.len()];
        GraphEngine { model, bound, results: Vec::new() }
    }
}

impl InferenceEngine for GraphEngine {
    fn inputs(&self) -> &[SlotSpec] {
        &self.model.inputs
    }

    fn outputs(&self) -> &[SlotSpec] {
        &self.model.outputs
    }

    fn bind_input(&mut self, slot: usize, tensor: Tensor) -> Result<()> {
        slot_at(&self.model.inputs, slot, "input")?.check(tensor.shape())?;
        self.bound[slot] = Some(tensor);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let inputs = self.bound
            .iter()
            .zip(&self.model.inputs)
            .map(|(tensor, spec)| {
                tensor.as_ref().ok_or_else(|| {
                    Error::inference(format!("input slot '{}' is not bound", spec.name))
                })
            })
            .collect::<Result<Vec<&Tensor>>>()?;

        let results = self.model.execute(&inputs)?;
        for (tensor, spec) in results.iter().zip(&self.model.outputs) {
            spec.check(tensor.shape())?;
        }
        self.results = results;
        Ok(())
    }

    fn read_output(&self, slot: usize) -> Result<Tensor> {
        let spec = slot_at(&self.model.outputs, slot, "output")?;
        self.results.get(slot).cloned().ok_or_else(|| {
            Error::inference(format!("output slot '{}' read before run", spec.name))
        })
    }
}

/// Creates [`GraphEngine`]s sharing one loaded model.
pub struct GraphEngineFactory {
    model: Arc<GraphModel>,
}

impl GraphEngineFactory {
    /// Validates `model` and wraps it for sharing.
    ///
    /// # Errors
    ///
    /// An inference-kind error if the networks disagree with the declared
    /// slots.
    pub fn new(model: GraphModel) -> Result<Self> {
        model
            .validate()
            .map_err(|reason| Error::inference(format!("invalid model '{}': {}", model.name, reason)))?;
        Ok(GraphEngineFactory { model: Arc::new(model) })
    }

    /// Loads and validates the model file once; engines are cheap afterwards.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        GraphModel::load_json(path).and_then(GraphEngineFactory::new)
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }
}

impl EngineFactory for GraphEngineFactory {
    fn create(&self) -> Result<Box<dyn InferenceEngine>> {
        Ok(Box::new(GraphEngine::new(self.model.clone())))
    }
}
