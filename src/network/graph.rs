use std::path::Path;

use ndarray::{ArrayD, ArrayView3, Axis, IxDyn};
use serde::{Deserialize, Serialize};

use crate::engine::{SlotSpec, Tensor};
use crate::error::{Error, Result};
use crate::network::network::Network;
use crate::tensor::{batch, squeeze_batch, RGB_CHANNELS};

/// Per-channel statistics extracted from an image: standard deviations
/// (scale) followed by means (shift), R, G, B order.
pub const STYLE_FEATURES: usize = 2 * RGB_CHANNELS;

const DEFAULT_EPSILON: f32 = 1e-5;

fn default_epsilon() -> f32 {
    DEFAULT_EPSILON
}

/// The computation a [`GraphModel`] performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Graph {
    /// `image -> channel statistics -> encoder -> bottleneck`.
    StylePredict { encoder: Network },
    /// `(content, bottleneck) -> conditioner -> per-channel (scale, shift)`,
    /// applied to the instance-normalized content image.
    StyleTransform {
        conditioner: Network,
        #[serde(default = "default_epsilon")]
        epsilon: f32,
    },
}

/// A model artifact: declared slots plus the graph that fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    pub name: String,
    pub inputs: Vec<SlotSpec>,
    pub outputs: Vec<SlotSpec>,
    pub graph: Graph,
}

impl GraphModel {
    /// Serializes the model to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|source| Error::Serialize { source })
    }

    /// Deserializes and validates a model written by `save_json`.
    ///
    /// # Errors
    ///
    /// A missing or unreadable file and an invalid document are both
    /// inference-kind errors: the process cannot serve without its models.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<GraphModel> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::ModelLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = std::io::BufReader::new(file);
        let model: GraphModel = serde_json::from_reader(reader).map_err(|e| Error::ModelFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        model.validate().map_err(|reason| Error::ModelFormat {
            path: path.to_path_buf(),
            reason,
        })?;
        tracing::info!(model = %model.name, path = %path.display(), "loaded model");
        Ok(model)
    }

    /// Checks slot declarations against the graph's networks.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match &self.graph {
            Graph::StylePredict { encoder } => {
                expect_slot_counts(self, 1, 1)?;
                expect_image_slot(&self.inputs[0])?;
                validate_network("encoder", encoder, STYLE_FEATURES, element_count(&self.outputs[0]))
            }
            Graph::StyleTransform { conditioner, epsilon } => {
                expect_slot_counts(self, 2, 1)?;
                expect_image_slot(&self.inputs[0])?;
                if self.outputs[0].shape != self.inputs[0].shape {
                    return Err(format!(
                        "output shape {:?} differs from content shape {:?}",
                        self.outputs[0].shape, self.inputs[0].shape
                    ));
                }
                if !(*epsilon > 0.0) {
                    return Err(format!("epsilon must be positive, got {}", epsilon));
                }
                validate_network("conditioner", conditioner, element_count(&self.inputs[1]), STYLE_FEATURES)
            }
        }
    }

    /// Runs the graph over `inputs`, in slot order, after checking them
    /// against the declared slots.
    pub fn execute(&self, inputs: &[&Tensor]) -> Result<Vec<Tensor>> {
        if inputs.len() != self.inputs.len() {
            return Err(Error::inference(format!(
                "model '{}' takes {} input(s), got {}",
                self.name,
                self.inputs.len(),
                inputs.len()
            )));
        }
        for (tensor, spec) in inputs.iter().zip(&self.inputs) {
            spec.check(tensor.shape())?;
        }
        match &self.graph {
            Graph::StylePredict { encoder } => {
                let image = image_view(inputs[0])?;
                let features = channel_statistics(image);
                let bottleneck = encoder.forward(&features);
                let output = ArrayD::from_shape_vec(IxDyn(&self.outputs[0].shape), bottleneck)
                    .map_err(|e| Error::inference(format!("bottleneck shape: {}", e)))?;
                Ok(vec![output])
            }
            Graph::StyleTransform { conditioner, epsilon } => {
                let content = image_view(inputs[0])?;
                let bottleneck: Vec<f32> = inputs[1].iter().copied().collect();
                let params = conditioner.forward(&bottleneck);
                let stats = channel_statistics(content);

                let mut stylized = content.to_owned();
                for c in 0..RGB_CHANNELS {
                    let (std, mean) = (stats[c], stats[RGB_CHANNELS + c]);
                    let (scale, shift) = (params[c], params[RGB_CHANNELS + c]);
                    stylized
                        .index_axis_mut(Axis(2), c)
                        .mapv_inplace(|x| (scale * (x - mean) / (std + epsilon) + shift).clamp(0.0, 1.0));
                }
                Ok(vec![batch(stylized).into_dyn()])
            }
        }
    }
}

/// `[std_r, std_g, std_b, mean_r, mean_g, mean_b]` over all pixels.
pub(crate) fn channel_statistics(image: ArrayView3<'_, f32>) -> Vec<f32> {
    let mut features = vec![0.0; STYLE_FEATURES];
    for c in 0..RGB_CHANNELS {
        let channel = image.index_axis(Axis(2), c);
        features[c] = channel.std(0.0);
        features[RGB_CHANNELS + c] = channel.mean().unwrap_or(0.0);
    }
    features
}

fn image_view(tensor: &Tensor) -> Result<ArrayView3<'_, f32>> {
    squeeze_batch(tensor.view())
        .ok_or_else(|| Error::inference(format!("expected a [1, H, W, 3] image, got {:?}", tensor.shape())))
}

fn element_count(slot: &SlotSpec) -> usize {
    slot.shape.iter().product()
}

fn expect_slot_counts(model: &GraphModel, inputs: usize, outputs: usize) -> std::result::Result<(), String> {
    if model.inputs.len() != inputs || model.outputs.len() != outputs {
        return Err(format!(
            "expected {} input(s) and {} output(s), found {} and {}",
            inputs,
            outputs,
            model.inputs.len(),
            model.outputs.len()
        ));
    }
    Ok(())
}

fn expect_image_slot(slot: &SlotSpec) -> std::result::Result<(), String> {
    match slot.shape.as_slice() {
        [1, h, w, c] if *h > 0 && *w > 0 && *c == RGB_CHANNELS => Ok(()),
        other => Err(format!("slot '{}' must be [1, H, W, 3], got {:?}", slot.name, other)),
    }
}

fn validate_network(
    role: &str,
    network: &Network,
    input_size: usize,
    output_size: usize,
) -> std::result::Result<(), String> {
    network.validate().map_err(|e| format!("{}: {}", role, e))?;
    if network.input_size() != Some(input_size) || network.output_size() != Some(output_size) {
        return Err(format!(
            "{} maps {:?} -> {:?} values, expected {} -> {}",
            role,
            network.input_size(),
            network.output_size(),
            input_size,
            output_size
        ));
    }
    Ok(())
}
