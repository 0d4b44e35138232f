//! The three style stages: bottleneck prediction, blending, and transform.

mod blend;
mod predictor;
mod transformer;

pub use blend::blend;
pub use predictor::{check_predictor_contract, predict_bottleneck};
pub use transformer::{check_transformer_contract, transform};
