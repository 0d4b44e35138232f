//! Inference engine capability.
//!
//! The style models are black boxes with declared input and output slots.
//! Anything that can bind tensors to those slots, run, and hand back the
//! outputs can drive the pipeline; the built-in backend lives in
//! [`crate::network`].

mod pool;

pub use pool::{EngineFactory, EnginePool, PooledEngine};

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dynamically-shaped `f32` tensor exchanged with an engine slot.
pub type Tensor = ArrayD<f32>;

/// A named tensor slot with a fixed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub name: String,
    pub shape: Vec<usize>,
}

impl SlotSpec {
    pub fn new(name: impl Into<String>, shape: Vec<usize>) -> Self {
        SlotSpec { name: name.into(), shape }
    }

    /// Fails with a shape-mismatch error unless `shape` equals the declared one.
    pub fn check(&self, shape: &[usize]) -> Result<()> {
        if self.shape == shape {
            Ok(())
        } else {
            Err(Error::ShapeMismatch {
                slot: self.name.clone(),
                expected: self.shape.clone(),
                actual: shape.to_vec(),
            })
        }
    }
}

/// Executor of one pretrained computation graph.
///
/// Engines carry bound buffers between `bind_input`, `run` and `read_output`,
/// so one instance must never be shared by concurrent requests. Use an
/// [`EnginePool`] to hand instances out.
pub trait InferenceEngine: Send {
    fn inputs(&self) -> &[SlotSpec];

    fn outputs(&self) -> &[SlotSpec];

    /// Binds `tensor` to input slot `slot`.
    fn bind_input(&mut self, slot: usize, tensor: Tensor) -> Result<()>;

    /// Executes the graph over the currently bound inputs.
    fn run(&mut self) -> Result<()>;

    /// Returns a copy of output slot `slot` from the last `run`.
    fn read_output(&self, slot: usize) -> Result<Tensor>;
}

/// Looks up a declared slot, failing with an inference error when the index
/// is out of range.
pub fn slot_at<'a>(slots: &'a [SlotSpec], slot: usize, direction: &str) -> Result<&'a SlotSpec> {
    slots.get(slot).ok_or_else(|| {
        Error::inference(format!(
            "{} slot {} out of range ({} declared)",
            direction,
            slot,
            slots.len()
        ))
    })
}
