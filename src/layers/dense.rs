use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Fully-connected layer: `a = f(x * W + b)`.
///
/// `weights` is `input_size x size`, `biases` is `1 x size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    /// Xavier-initialized weights and zero biases.
    pub fn new(size: usize, input_size: usize, activation: ActivationFunction) -> Layer {
        Layer {
            size,
            weights: Matrix::xavier(input_size, size),
            biases: Matrix::zeros(1, size),
            activator: activation
        }
    }

    /// Layer with the given weights and zero biases.
    pub fn from_weights(weights: Matrix, activation: ActivationFunction) -> Layer {
        let size = weights.cols;
        Layer {
            size,
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// Checks that weights and biases agree with `size`.
    pub fn validate(&self) -> Result<(), String> {
        if !self.weights.is_well_formed() || !self.biases.is_well_formed() {
            return Err("ragged weight or bias matrix".into());
        }
        if self.weights.cols != self.size {
            return Err(format!("weights have {} columns but layer size is {}", self.weights.cols, self.size));
        }
        if self.biases.rows != 1 || self.biases.cols != self.size {
            return Err(format!(
                "biases are {}x{} but layer size is {}",
                self.biases.rows, self.biases.cols, self.size
            ));
        }
        Ok(())
    }

    /// Forward pass for one sample. `input.len()` must equal `input_size()`.
    pub fn feed_from(&self, input: &[f32]) -> Vec<f32> {
        let z = &Matrix::row(input) * &self.weights + self.biases.clone();
        z.map(|x| self.activator.function(x)).into_row()
    }
}
