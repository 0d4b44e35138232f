//! Built-in inference backend.
//!
//! Model artifacts are JSON graph documents: declared input/output slots plus
//! a small dense [`Network`] that either summarizes an image into a style
//! bottleneck or turns a bottleneck into per-channel scale/shift parameters
//! for the content image.

pub mod engine;
pub mod graph;
pub mod network;
pub mod reference;

pub use engine::{GraphEngine, GraphEngineFactory};
pub use graph::{Graph, GraphModel, STYLE_FEATURES};
pub use network::Network;
pub use reference::DEFAULT_BOTTLENECK_DIM;
