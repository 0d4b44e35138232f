pub mod activation;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod layers;
pub mod math;
pub mod network;
pub mod pipeline;
pub mod preprocess;
pub mod style;
pub mod tensor;

// Convenience re-exports
pub use codec::{decode, encode, encode_jpeg};
pub use config::{ServerConfig, StyleConfig};
pub use engine::{EngineFactory, EnginePool, InferenceEngine, SlotSpec, Tensor};
pub use error::{Error, ErrorKind, Result};
pub use network::{GraphEngine, GraphEngineFactory, GraphModel};
pub use pipeline::{Pipeline, DEFAULT_BLENDING_RATIO};
pub use preprocess::{preprocess, CONTENT_DIM, STYLE_DIM};
pub use style::{blend, predict_bottleneck, transform};
pub use tensor::{BatchedTensor, PixelTensor, StyleBottleneck};
