//! Error types for ferrite-style.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`Error`].
///
/// The pipeline never recovers locally; callers (the HTTP layer) use the kind
/// to decide what to tell the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Uploaded bytes are not a usable image.
    Decode,
    /// Invalid target dimension or tensor rank.
    Preprocess,
    /// Engine shape contract violated, or the engine/model failed.
    Inference,
    /// Tensor could not be serialized to JPEG.
    Encode,
    /// Invalid configuration.
    Config,
    /// Filesystem error outside the model loader.
    Io,
}

impl ErrorKind {
    /// Stable lowercase name, used in JSON error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode     => "decode",
            ErrorKind::Preprocess => "preprocess",
            ErrorKind::Inference  => "inference",
            ErrorKind::Encode     => "encode",
            ErrorKind::Config     => "config",
            ErrorKind::Io         => "io",
        }
    }
}

/// Main error type for the ferrite-style library.
#[derive(Error, Debug)]
pub enum Error {
    /// The image crate could not parse the uploaded bytes.
    #[error("failed to decode image: {source}")]
    Decode {
        #[source]
        source: image::ImageError,
    },

    /// The bytes parsed but the image is unusable (e.g. zero-sized).
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("preprocess failed: {reason}")]
    Preprocess { reason: String },

    /// A tensor did not match the shape an engine slot declares.
    #[error("tensor shape mismatch on slot '{slot}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        slot: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Any other engine contract or execution fault.
    #[error("inference failed: {reason}")]
    Inference { reason: String },

    /// A model file could not be read.
    #[error("failed to read model {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A model file was read but is not a valid graph document.
    #[error("invalid model {path}: {reason}")]
    ModelFormat { path: PathBuf, reason: String },

    #[error("failed to encode image: {reason}")]
    Encode { reason: String },

    #[error("failed to encode JPEG: {source}")]
    EncodeImage {
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration {name}: {reason}")]
    Config { name: String, reason: String },

    /// A config file is not valid JSON for [`crate::config::ServerConfig`].
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A model or config could not be written as JSON.
    #[error("failed to serialize JSON: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Decode { .. } | Error::InvalidImage { .. } => ErrorKind::Decode,
            Error::Preprocess { .. } => ErrorKind::Preprocess,
            Error::ShapeMismatch { .. }
            | Error::Inference { .. }
            | Error::ModelLoad { .. }
            | Error::ModelFormat { .. } => ErrorKind::Inference,
            Error::Encode { .. } | Error::EncodeImage { .. } => ErrorKind::Encode,
            Error::Config { .. } | Error::ConfigParse { .. } => ErrorKind::Config,
            Error::Serialize { .. } | Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn preprocess(reason: impl Into<String>) -> Self {
        Error::Preprocess { reason: reason.into() }
    }

    pub(crate) fn inference(reason: impl Into<String>) -> Self {
        Error::Inference { reason: reason.into() }
    }

    pub(crate) fn encode(reason: impl Into<String>) -> Self {
        Error::Encode { reason: reason.into() }
    }

    pub(crate) fn config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Config { name: name.into(), reason: reason.into() }
    }
}

/// Result type alias for ferrite-style operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_is_inference_kind() {
        let err = Error::ShapeMismatch {
            slot: "content".into(),
            expected: vec![1, 384, 384, 3],
            actual: vec![1, 256, 256, 3],
        };
        assert_eq!(err.kind(), ErrorKind::Inference);
        assert!(err.to_string().contains("content"));
    }

    #[test]
    fn test_model_load_is_inference_kind() {
        let err = Error::ModelLoad {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.kind(), ErrorKind::Inference);
        assert_eq!(err.kind().as_str(), "inference");
    }

    #[test]
    fn test_json_errors_keep_their_source() {
        use std::error::Error as _;

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::ConfigParse { path: PathBuf::from("config.json"), source: json };
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.source().is_some());

        let json = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err = Error::Serialize { source: json };
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.source().is_some());
    }
}
