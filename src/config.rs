use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_JPEG_QUALITY;
use crate::error::{Error, Result};
use crate::preprocess::{CONTENT_DIM, STYLE_DIM};

/// Pipeline configuration, fixed for the life of the process.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Style-predict model artifact.
    pub style_predict_model: PathBuf,
    /// Style-transform model artifact.
    pub style_transform_model: PathBuf,
    /// Resolution style images (and the content self-bottleneck image) are
    /// preprocessed to.
    pub style_dim: usize,
    /// Resolution content images are preprocessed to for the transform.
    pub content_dim: usize,
    /// JPEG quality of the response body (1-100).
    pub jpeg_quality: u8,
    /// Idle engines kept per model; 0 builds a fresh engine for every request.
    pub engine_pool_size: usize,
    /// When set, every stylized JPEG is also written here under a unique name.
    pub debug_dump_dir: Option<PathBuf>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        StyleConfig {
            style_predict_model:   PathBuf::from("models/style_predict.json"),
            style_transform_model: PathBuf::from("models/style_transform.json"),
            style_dim:             STYLE_DIM,
            content_dim:           CONTENT_DIM,
            jpeg_quality:          DEFAULT_JPEG_QUALITY,
            engine_pool_size:      0,
            debug_dump_dir:        None,
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.style_dim == 0 {
            return Err(Error::config("style_dim", "must be positive"));
        }
        if self.content_dim == 0 {
            return Err(Error::config("content_dim", "must be positive"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::config(
                "jpeg_quality",
                format!("must be within 1..=100, got {}", self.jpeg_quality),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration of the HTTP server binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:8000`.
    pub addr: String,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
    pub pipeline: StyleConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr:             "127.0.0.1:8000".into(),
            max_upload_bytes: 20 * 1024 * 1024,
            pipeline:         StyleConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|source| Error::Serialize { source })
    }

    /// Reads and validates a config file. Missing fields take their defaults.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<ServerConfig> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: ServerConfig = serde_json::from_reader(reader).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(Error::config("max_upload_bytes", "must be positive"));
        }
        self.pipeline.validate()
    }
}
