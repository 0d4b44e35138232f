//! End-to-end style transfer.
//!
//! A [`Pipeline`] is built once at startup from a [`StyleConfig`] and shared
//! by every request thread. It owns no per-request state: tensors live on
//! the calling thread and engines are checked out of a pool for exactly one
//! request at a time.

mod debug_dump;

pub use debug_dump::DebugDump;

use std::sync::Arc;
use std::time::Instant;

use crate::codec::{decode, encode_jpeg};
use crate::config::StyleConfig;
use crate::engine::{EngineFactory, EnginePool, InferenceEngine};
use crate::error::{Error, Result};
use crate::network::GraphEngineFactory;
use crate::preprocess::preprocess;
use crate::style::{blend, check_predictor_contract, check_transformer_contract, predict_bottleneck, transform};
use crate::tensor::RGB_CHANNELS;

/// Blending ratio applied when a request does not specify one.
pub const DEFAULT_BLENDING_RATIO: f32 = 1.0;

pub struct Pipeline {
    config:      StyleConfig,
    predictor:   EnginePool,
    transformer: EnginePool,
    dump:        Option<DebugDump>,
}

impl Pipeline {
    /// Builds a pipeline over arbitrary engine backends.
    ///
    /// One engine of each kind is created immediately so that a model whose
    /// slots disagree with `config` fails here rather than on the first
    /// request.
    ///
    /// # Errors
    ///
    /// Config-kind errors for invalid settings; inference-kind errors when an
    /// engine cannot be created or its slots do not fit the configured
    /// resolutions.
    pub fn new(
        config: StyleConfig,
        predict_factory: Arc<dyn EngineFactory>,
        transform_factory: Arc<dyn EngineFactory>,
    ) -> Result<Self> {
        config.validate()?;

        let predictor = EnginePool::new("style-predict", predict_factory, config.engine_pool_size);
        let transformer = EnginePool::new("style-transform", transform_factory, config.engine_pool_size);

        {
            let predict_engine = predictor.checkout()?;
            let transform_engine = transformer.checkout()?;
            check_contracts(&config, &*predict_engine, &*transform_engine)?;
        }

        let dump = config.debug_dump_dir.clone().map(DebugDump::new);
        tracing::info!(
            style_dim = config.style_dim,
            content_dim = config.content_dim,
            pool_size = config.engine_pool_size,
            debug_dump = dump.is_some(),
            "style pipeline ready"
        );
        Ok(Pipeline { config, predictor, transformer, dump })
    }

    /// Loads both models with the built-in graph backend.
    pub fn from_config(config: StyleConfig) -> Result<Self> {
        let predict = GraphEngineFactory::load(&config.style_predict_model)?;
        let transform = GraphEngineFactory::load(&config.style_transform_model)?;
        Pipeline::new(config, Arc::new(predict), Arc::new(transform))
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    pub fn predictor_pool(&self) -> &EnginePool {
        &self.predictor
    }

    pub fn transformer_pool(&self) -> &EnginePool {
        &self.transformer
    }

    /// Stylizes `content` with `style` and returns the result as JPEG bytes.
    ///
    /// `ratio` weights the style image's bottleneck against the content
    /// image's own; 1.0 is full stylization. Values outside `[0, 1]` are
    /// accepted and extrapolate.
    ///
    /// # Errors
    ///
    /// Any failing stage aborts the request; the error's
    /// [`kind`](Error::kind) tells which stage.
    pub fn apply_style(&self, content: &[u8], style: &[u8], ratio: f32) -> Result<Vec<u8>> {
        let started = Instant::now();

        let content_image = decode(content)?;
        let style_image = decode(style)?;

        let style_input = preprocess(&style_image, self.config.style_dim)?;
        let content_input = preprocess(&content_image, self.config.content_dim)?;

        let bottleneck = {
            let mut engine = self.predictor.checkout()?;
            let style_bottleneck = predict_bottleneck(&mut *engine, &style_input)?;
            if ratio != 1.0 {
                let content_small = preprocess(&content_image, self.config.style_dim)?;
                let content_bottleneck = predict_bottleneck(&mut *engine, &content_small)?;
                blend(&style_bottleneck, &content_bottleneck, ratio)?
            } else {
                style_bottleneck
            }
        };

        let stylized = {
            let mut engine = self.transformer.checkout()?;
            transform(&mut *engine, &bottleneck, &content_input)?
        };

        let jpeg = encode_jpeg(&stylized, self.config.jpeg_quality)?;
        if let Some(dump) = &self.dump {
            dump.write(&jpeg);
        }

        tracing::info!(
            content = ?content_image.dim(),
            style = ?style_image.dim(),
            ratio,
            bytes = jpeg.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stylized image"
        );
        Ok(jpeg)
    }
}

fn image_shape(dim: usize) -> Vec<usize> {
    vec![1, dim, dim, RGB_CHANNELS]
}

fn check_contracts(
    config: &StyleConfig,
    predictor: &dyn InferenceEngine,
    transformer: &dyn InferenceEngine,
) -> Result<()> {
    check_predictor_contract(predictor)?;
    check_transformer_contract(transformer)?;

    let style_shape = image_shape(config.style_dim);
    let content_shape = image_shape(config.content_dim);
    let bottleneck_shape = &predictor.outputs()[0].shape;

    let expectations = [
        ("style-predict input", &predictor.inputs()[0].shape, &style_shape),
        ("style-transform content input", &transformer.inputs()[0].shape, &content_shape),
        ("style-transform bottleneck input", &transformer.inputs()[1].shape, bottleneck_shape),
        ("style-transform output", &transformer.outputs()[0].shape, &content_shape),
    ];
    for (what, declared, expected) in expectations {
        if declared != expected {
            return Err(Error::inference(format!(
                "{} is declared as {:?}, expected {:?}",
                what, declared, expected
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::network::GraphModel;
    use image::{ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn small_config() -> StyleConfig {
        StyleConfig { style_dim: 16, content_dim: 24, ..StyleConfig::default() }
    }

    fn adain_pipeline(config: StyleConfig) -> Result<Pipeline> {
        let predict = GraphEngineFactory::new(GraphModel::adain_style_predict(config.style_dim, 10)?)?;
        let transform = GraphEngineFactory::new(GraphModel::adain_style_transform(config.content_dim, 10)?)?;
        Pipeline::new(config, Arc::new(predict), Arc::new(transform))
    }

    fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb(color));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }

    #[test]
    fn test_output_has_content_resolution() {
        let pipeline = adain_pipeline(small_config()).unwrap();
        let jpeg = pipeline.apply_style(&png(30, 20, [200, 0, 0]), &png(10, 10, [0, 0, 200]), 1.0).unwrap();
        let out = decode(&jpeg).unwrap();
        assert_eq!(out.dim(), (24, 24, 3));
    }

    #[test]
    fn test_contract_mismatch_fails_at_construction() {
        let config = small_config();
        let predict = GraphEngineFactory::new(GraphModel::adain_style_predict(16, 10).unwrap()).unwrap();
        let transform = GraphEngineFactory::new(GraphModel::adain_style_transform(32, 10).unwrap()).unwrap();
        let err = Pipeline::new(config, Arc::new(predict), Arc::new(transform)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Inference);
    }

    #[test]
    fn test_bottleneck_width_mismatch_fails_at_construction() {
        let config = small_config();
        let predict = GraphEngineFactory::new(GraphModel::adain_style_predict(16, 10).unwrap()).unwrap();
        let transform = GraphEngineFactory::new(GraphModel::adain_style_transform(24, 12).unwrap()).unwrap();
        let err = Pipeline::new(config, Arc::new(predict), Arc::new(transform)).err().unwrap();
        assert!(err.to_string().contains("bottleneck"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = StyleConfig { jpeg_quality: 0, ..small_config() };
        assert_eq!(adain_pipeline(config).err().unwrap().kind(), ErrorKind::Config);
    }

    #[test]
    fn test_undecodable_upload_is_decode_error() {
        let pipeline = adain_pipeline(small_config()).unwrap();
        let err = pipeline.apply_style(b"not an image", &png(8, 8, [0, 0, 0]), 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_pool_reuses_engines() {
        let config = StyleConfig { engine_pool_size: 2, ..small_config() };
        let pipeline = adain_pipeline(config).unwrap();
        assert_eq!(pipeline.predictor_pool().idle_count(), 1);

        let (content, style) = (png(12, 12, [10, 20, 30]), png(12, 12, [30, 20, 10]));
        pipeline.apply_style(&content, &style, 0.5).unwrap();
        assert_eq!(pipeline.predictor_pool().idle_count(), 1);
        assert_eq!(pipeline.transformer_pool().idle_count(), 1);
    }
}
