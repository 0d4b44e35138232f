use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::{ImageOutputFormat, Rgb, RgbImage};

use ferrite_style::network::DEFAULT_BOTTLENECK_DIM;
use ferrite_style::{decode, ErrorKind, GraphModel, Pipeline, PixelTensor, StyleConfig};

fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
    bytes.into_inner()
}

fn red() -> Vec<u8> {
    png(100, 100, [255, 0, 0])
}

fn blue() -> Vec<u8> {
    png(100, 100, [0, 0, 255])
}

/// Writes the statistics-transfer model pair into `dir` and points a default
/// config at it.
fn config_with_models(dir: &Path) -> StyleConfig {
    let config = StyleConfig {
        style_predict_model: dir.join("style_predict.json"),
        style_transform_model: dir.join("style_transform.json"),
        ..StyleConfig::default()
    };
    GraphModel::adain_style_predict(config.style_dim, DEFAULT_BOTTLENECK_DIM)
        .unwrap()
        .save_json(&config.style_predict_model)
        .unwrap();
    GraphModel::adain_style_transform(config.content_dim, DEFAULT_BOTTLENECK_DIM)
        .unwrap()
        .save_json(&config.style_transform_model)
        .unwrap();
    config
}

fn channel_means(image: &PixelTensor) -> [f32; 3] {
    let mut means = [0.0; 3];
    for (c, mean) in means.iter_mut().enumerate() {
        *mean = image.index_axis(ndarray::Axis(2), c).mean().unwrap();
    }
    means
}

#[test]
fn test_red_content_takes_blue_style() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config_with_models(dir.path())).unwrap();

    let jpeg = pipeline.apply_style(&red(), &blue(), 1.0).unwrap();
    assert!(!jpeg.is_empty());

    let out = decode(&jpeg).unwrap();
    assert_eq!(out.dim(), (384, 384, 3));
    let [r, g, b] = channel_means(&out);
    assert!(b > 0.9 && r < 0.1 && g < 0.1, "got {:?}", [r, g, b]);
}

#[test]
fn test_zero_ratio_keeps_content_style() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config_with_models(dir.path())).unwrap();

    let out = decode(&pipeline.apply_style(&red(), &blue(), 0.0).unwrap()).unwrap();
    let [r, g, b] = channel_means(&out);
    assert!(r > 0.9 && g < 0.1 && b < 0.1, "got {:?}", [r, g, b]);
}

#[test]
fn test_half_ratio_mixes_styles() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config_with_models(dir.path())).unwrap();

    let out = decode(&pipeline.apply_style(&red(), &blue(), 0.5).unwrap()).unwrap();
    let [r, _, b] = channel_means(&out);
    assert!((r - 0.5).abs() < 0.05 && (b - 0.5).abs() < 0.05, "got r={} b={}", r, b);
}

#[test]
fn test_out_of_range_ratio_does_not_fail() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config_with_models(dir.path())).unwrap();

    for ratio in [1.5, -0.5] {
        let out = decode(&pipeline.apply_style(&red(), &blue(), ratio).unwrap()).unwrap();
        assert_eq!(out.dim(), (384, 384, 3));
    }
}

#[test]
fn test_non_square_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config_with_models(dir.path())).unwrap();

    let jpeg = pipeline
        .apply_style(&png(200, 90, [0, 255, 0]), &png(31, 77, [0, 0, 255]), 0.7)
        .unwrap();
    assert_eq!(decode(&jpeg).unwrap().dim(), (384, 384, 3));
}

#[test]
fn test_garbage_upload_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config_with_models(dir.path())).unwrap();

    let err = pipeline.apply_style(&red(), b"\x00\x01\x02garbage", 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    let err = pipeline.apply_style(b"", &blue(), 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_missing_model_is_inference_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = StyleConfig {
        style_predict_model: dir.path().join("missing_predict.json"),
        style_transform_model: dir.path().join("missing_transform.json"),
        ..StyleConfig::default()
    };
    let err = Pipeline::from_config(config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Inference);
}

#[test]
fn test_resolution_mismatch_fails_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = StyleConfig { content_dim: 256, ..config_with_models(dir.path()) };
    let err = Pipeline::from_config(config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Inference);
}

#[test]
fn test_debug_dump_writes_each_result() {
    let dir = tempfile::tempdir().unwrap();
    let dump_dir = dir.path().join("dumps");
    let config = StyleConfig {
        debug_dump_dir: Some(dump_dir.clone()),
        ..config_with_models(dir.path())
    };
    let pipeline = Pipeline::from_config(config).unwrap();

    let first = pipeline.apply_style(&red(), &blue(), 1.0).unwrap();
    pipeline.apply_style(&red(), &blue(), 1.0).unwrap();

    let dumped: Vec<_> = std::fs::read_dir(&dump_dir).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(dumped.len(), 2);
    assert!(dumped.iter().any(|path| std::fs::read(path).unwrap() == first));
}

#[test]
fn test_concurrent_requests_share_one_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = StyleConfig { engine_pool_size: 2, ..config_with_models(dir.path()) };
    let pipeline = Arc::new(Pipeline::from_config(config).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || {
                let ratio = if i % 2 == 0 { 1.0 } else { 0.0 };
                let out = decode(&pipeline.apply_style(&red(), &blue(), ratio).unwrap()).unwrap();
                (ratio, channel_means(&out))
            })
        })
        .collect();

    for handle in handles {
        let (ratio, [r, _, b]) = handle.join().unwrap();
        if ratio == 1.0 {
            assert!(b > 0.9 && r < 0.1);
        } else {
            assert!(r > 0.9 && b < 0.1);
        }
    }
    assert!(pipeline.predictor_pool().idle_count() <= 2);
}
