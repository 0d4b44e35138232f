use crate::{activation::activation::ActivationFunction, layers::dense::Layer};
use serde::{Serialize, Deserialize};

/// Stack of dense layers evaluated in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
}

impl Network {
    /// Builds a network from (size, input_size, activation) tuples with
    /// Xavier-initialized weights.
    pub fn new(layer_specs: Vec<(usize, usize, ActivationFunction)>) -> Network {
        let layers = layer_specs.into_iter()
            .map(|(size, input_size, activation)| Layer::new(size, input_size, activation))
            .collect();
        Network { layers }
    }

    pub fn from_layers(layers: Vec<Layer>) -> Network {
        Network { layers }
    }

    /// Forward pass for one sample.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.feed_from(&current);
        }
        current
    }

    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(|l| l.input_size())
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(|l| l.size)
    }

    /// Checks every layer and that each layer's input matches the previous
    /// layer's output.
    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".into());
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate().map_err(|e| format!("layer {}: {}", i, e))?;
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[1].input_size() != pair[0].size {
                return Err(format!(
                    "layer {} expects {} inputs but layer {} produces {}",
                    i + 1, pair[1].input_size(), i, pair[0].size
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chains_layers() {
        let network = Network::new(vec![
            (4, 6, ActivationFunction::ReLU),
            (2, 4, ActivationFunction::Sigmoid),
        ]);
        assert!(network.validate().is_ok());
        assert_eq!(network.input_size(), Some(6));
        assert_eq!(network.output_size(), Some(2));

        let out = network.forward(&[0.5; 6]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_validate_rejects_broken_chain() {
        let network = Network::new(vec![
            (4, 6, ActivationFunction::ReLU),
            (2, 5, ActivationFunction::Identity),
        ]);
        assert!(network.validate().unwrap_err().contains("layer 1"));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(Network::from_layers(vec![]).validate().is_err());
    }
}
