//! Ready-made model pairs.
//!
//! The AdaIN pair needs no training: the predictor stores the style image's
//! channel statistics in the first six bottleneck values, and the transformer
//! re-colors the normalized content image with them. The random pair is
//! Xavier-initialized and only useful for exercising the plumbing.

use crate::activation::activation::ActivationFunction;
use crate::engine::SlotSpec;
use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::graph::{Graph, GraphModel, STYLE_FEATURES};
use crate::network::network::Network;

/// Bottleneck width of the Magenta arbitrary-stylization models.
pub const DEFAULT_BOTTLENECK_DIM: usize = 100;

const RANDOM_HIDDEN: usize = 32;

fn image_slot(name: &str, dim: usize) -> SlotSpec {
    SlotSpec::new(name, vec![1, dim, dim, 3])
}

fn bottleneck_slot(dim: usize) -> SlotSpec {
    SlotSpec::new("style_bottleneck", vec![1, 1, 1, dim])
}

fn check_bottleneck_dim(bottleneck_dim: usize, minimum: usize) -> Result<()> {
    if bottleneck_dim < minimum {
        return Err(Error::config(
            "bottleneck_dim",
            format!("must be at least {}, got {}", minimum, bottleneck_dim),
        ));
    }
    Ok(())
}

impl GraphModel {
    /// Style predictor whose bottleneck carries the image's channel
    /// statistics followed by zeros.
    pub fn adain_style_predict(image_dim: usize, bottleneck_dim: usize) -> Result<GraphModel> {
        check_bottleneck_dim(bottleneck_dim, STYLE_FEATURES)?;
        let encoder = Network::from_layers(vec![Layer::from_weights(
            Matrix::eye(STYLE_FEATURES, bottleneck_dim),
            ActivationFunction::Identity,
        )]);
        Ok(GraphModel {
            name: "adain-style-predict".into(),
            inputs: vec![image_slot("style_image", image_dim)],
            outputs: vec![bottleneck_slot(bottleneck_dim)],
            graph: Graph::StylePredict { encoder },
        })
    }

    /// Style transformer that applies the statistics written by
    /// [`GraphModel::adain_style_predict`].
    pub fn adain_style_transform(image_dim: usize, bottleneck_dim: usize) -> Result<GraphModel> {
        check_bottleneck_dim(bottleneck_dim, STYLE_FEATURES)?;
        let conditioner = Network::from_layers(vec![Layer::from_weights(
            Matrix::eye(bottleneck_dim, STYLE_FEATURES),
            ActivationFunction::Identity,
        )]);
        Ok(GraphModel {
            name: "adain-style-transform".into(),
            inputs: vec![image_slot("content_image", image_dim), bottleneck_slot(bottleneck_dim)],
            outputs: vec![image_slot("stylized_image", image_dim)],
            graph: Graph::StyleTransform { conditioner, epsilon: 1e-5 },
        })
    }

    pub fn random_style_predict(image_dim: usize, bottleneck_dim: usize) -> Result<GraphModel> {
        check_bottleneck_dim(bottleneck_dim, 1)?;
        let encoder = Network::new(vec![
            (RANDOM_HIDDEN, STYLE_FEATURES, ActivationFunction::Tanh),
            (bottleneck_dim, RANDOM_HIDDEN, ActivationFunction::Identity),
        ]);
        Ok(GraphModel {
            name: "random-style-predict".into(),
            inputs: vec![image_slot("style_image", image_dim)],
            outputs: vec![bottleneck_slot(bottleneck_dim)],
            graph: Graph::StylePredict { encoder },
        })
    }

    pub fn random_style_transform(image_dim: usize, bottleneck_dim: usize) -> Result<GraphModel> {
        check_bottleneck_dim(bottleneck_dim, 1)?;
        let conditioner = Network::new(vec![
            (RANDOM_HIDDEN, bottleneck_dim, ActivationFunction::ReLU),
            (STYLE_FEATURES, RANDOM_HIDDEN, ActivationFunction::Softplus),
        ]);
        Ok(GraphModel {
            name: "random-style-transform".into(),
            inputs: vec![image_slot("content_image", image_dim), bottleneck_slot(bottleneck_dim)],
            outputs: vec![image_slot("stylized_image", image_dim)],
            graph: Graph::StyleTransform { conditioner, epsilon: 1e-5 },
        })
    }
}
