//! Image codec: compressed bytes to `[0, 1]` pixel tensors and back to JPEG.

mod decode;
mod encode;

pub use decode::decode;
pub use encode::{encode, encode_jpeg, DEFAULT_JPEG_QUALITY};
