use serde::{Serialize, Deserialize};
use std::f32::consts::E;

/// Element-wise activation applied after a dense layer's linear transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    LeakyReLU { alpha: f32 },
    /// `ln(1 + e^x)`; keeps predicted standard deviations positive.
    Softplus,
}

impl ActivationFunction {
    pub fn function(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Softplus => {
                // Large inputs overflow exp(); softplus(x) ~ x there.
                if x > 20.0 { x } else { (1.0 + x.exp()).ln() }
            }
        }
    }
}
