use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::window::NormalizedWindow;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model artifact: {0}")]
    Shape(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("window {index} has {got} values, model expects {expected}")]
    ShapeMismatch {
        index: usize,
        got: usize,
        expected: usize,
    },
}

/// A pretrained model mapping normalized windows to relative-return
/// predictions, one scalar per window, order preserved. How the model
/// arrives at its outputs is its own business.
pub trait Predictor {
    fn name(&self) -> &str;
    fn predict_batch(&self, windows: &[NormalizedWindow]) -> Result<Vec<f64>, PredictError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Activation {
    Tanh,
    Relu,
    Identity,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::Identity => x,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Layer {
    /// Row-major weight matrix: one row per output unit.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    activation: Activation,
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    name: String,
    input_len: usize,
    layers: Vec<Layer>,
}

/// Feed-forward model deserialized from a JSON artifact on disk.
///
/// The artifact is produced by an offline training pipeline; here it is
/// only validated (dimension chaining, scalar output) and evaluated.
#[derive(Debug)]
pub struct DenseModel {
    artifact: ModelArtifact,
}

impl DenseModel {
    pub fn from_path(path: &Path) -> Result<Self, ModelLoadError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: display.clone(),
            source,
        })?;
        let artifact: ModelArtifact =
            serde_json::from_str(&contents).map_err(|source| ModelLoadError::Parse {
                path: display,
                source,
            })?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelLoadError> {
        if artifact.layers.is_empty() {
            return Err(ModelLoadError::Shape("model has no layers".to_string()));
        }

        let mut width = artifact.input_len;
        for (i, layer) in artifact.layers.iter().enumerate() {
            if layer.weights.is_empty() {
                return Err(ModelLoadError::Shape(format!("layer {} has no units", i)));
            }
            if layer.weights.len() != layer.bias.len() {
                return Err(ModelLoadError::Shape(format!(
                    "layer {}: {} weight rows but {} biases",
                    i,
                    layer.weights.len(),
                    layer.bias.len()
                )));
            }
            for row in &layer.weights {
                if row.len() != width {
                    return Err(ModelLoadError::Shape(format!(
                        "layer {}: weight row of width {} does not match input width {}",
                        i,
                        row.len(),
                        width
                    )));
                }
            }
            width = layer.weights.len();
        }

        if width != 1 {
            return Err(ModelLoadError::Shape(format!(
                "model output width is {}, expected a scalar",
                width
            )));
        }

        Ok(Self { artifact })
    }

    pub fn input_len(&self) -> usize {
        self.artifact.input_len
    }

    fn forward(&self, input: &[f64]) -> f64 {
        let mut current = input.to_vec();
        for layer in &self.artifact.layers {
            let next = layer
                .weights
                .iter()
                .zip(&layer.bias)
                .map(|(row, bias)| {
                    let sum: f64 = row.iter().zip(&current).map(|(w, x)| w * x).sum();
                    layer.activation.apply(sum + bias)
                })
                .collect();
            current = next;
        }
        current[0]
    }
}

impl Predictor for DenseModel {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn predict_batch(&self, windows: &[NormalizedWindow]) -> Result<Vec<f64>, PredictError> {
        let expected = self.artifact.input_len;
        let mut out = Vec::with_capacity(windows.len());
        for (index, window) in windows.iter().enumerate() {
            let values = window.values();
            if values.len() != expected {
                return Err(PredictError::ShapeMismatch {
                    index,
                    got: values.len(),
                    expected,
                });
            }
            out.push(self.forward(values));
        }
        Ok(out)
    }
}
