//! Inference adapter: a fitted scaler followed by a binary classifier.
//!
//! Both artifacts are JSON documents produced by the training pipeline:
//!
//! - scaler: `{"mean": [..], "scale": [..]}` (standardization, one entry per column)
//! - model: `{"layers": [{"weights": [[..]], "bias": [..], "activation": "relu"}]}`
//!   where `weights` is `[out][in]` and the last layer has a single unit whose
//!   output is P(Benign).
//!
//! The adapter is immutable after loading. `predict` takes `&self` and touches
//! no shared state, so one instance serves every request concurrently.

use crate::error::{ArtifactError, InferenceError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Column-wise transform applied before classification
pub trait Scaler: Send + Sync {
    /// Number of columns the scaler was fit on
    fn dim(&self) -> usize;

    fn transform(&self, input: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Binary classifier over scaled features
pub trait Classifier: Send + Sync {
    fn input_dim(&self) -> usize;

    /// Probability of the benign class
    fn predict_proba(&self, input: &[f64]) -> Result<f64, InferenceError>;
}

/// Standardization: `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawScaler")]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Scaler document as written on disk, before validation
#[derive(Deserialize)]
struct RawScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl TryFrom<RawScaler> for StandardScaler {
    type Error = ArtifactError;

    fn try_from(raw: RawScaler) -> Result<Self, Self::Error> {
        Self {
            mean: raw.mean,
            scale: raw.scale,
        }
        .validated()
    }
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        Self::try_from(RawScaler { mean, scale })
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        read_json(path)
    }

    fn validated(mut self) -> Result<Self, ArtifactError> {
        if self.mean.is_empty() {
            return Err(ArtifactError::Shape("scaler has no columns".to_string()));
        }
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::Shape(format!(
                "scaler mean has {} columns but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(ArtifactError::Shape(
                "scaler contains non-finite values".to_string(),
            ));
        }
        // Constant columns were fit with zero variance
        for s in self.scale.iter_mut() {
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Ok(self)
    }
}

impl Scaler for StandardScaler {
    fn dim(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, input: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if input.len() != self.dim() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.dim(),
                actual: input.len(),
            });
        }
        Ok(input
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Tanh,
    Sigmoid,
    Linear,
}

impl Activation {
    fn apply(self, z: f64) -> f64 {
        match self {
            Activation::Relu => z.max(0.0),
            Activation::Tanh => z.tanh(),
            Activation::Sigmoid => sigmoid(z),
            Activation::Linear => z,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn input_dim(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn output_dim(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let z = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b;
                self.activation.apply(z)
            })
            .collect()
    }
}

/// Feed-forward network ending in one probability unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDenseNetwork")]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

#[derive(Deserialize)]
struct RawDenseNetwork {
    layers: Vec<DenseLayer>,
}

impl TryFrom<RawDenseNetwork> for DenseNetwork {
    type Error = ArtifactError;

    fn try_from(raw: RawDenseNetwork) -> Result<Self, Self::Error> {
        Self { layers: raw.layers }.validated()
    }
}

impl DenseNetwork {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ArtifactError> {
        Self::try_from(RawDenseNetwork { layers })
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        read_json(path)
    }

    fn validated(self) -> Result<Self, ArtifactError> {
        if self.layers.is_empty() {
            return Err(ArtifactError::Shape("model has no layers".to_string()));
        }

        let mut expected_in: Option<usize> = None;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.weights.len() != layer.bias.len() || layer.bias.is_empty() {
                return Err(ArtifactError::Shape(format!(
                    "layer {} has {} weight rows but {} biases",
                    i,
                    layer.weights.len(),
                    layer.bias.len()
                )));
            }
            let width = layer.input_dim();
            if width == 0 || layer.weights.iter().any(|row| row.len() != width) {
                return Err(ArtifactError::Shape(format!(
                    "layer {} has ragged or empty weight rows",
                    i
                )));
            }
            if let Some(prev_out) = expected_in {
                if prev_out != width {
                    return Err(ArtifactError::Shape(format!(
                        "layer {} expects {} inputs but previous layer yields {}",
                        i, width, prev_out
                    )));
                }
            }
            expected_in = Some(layer.output_dim());
        }

        if expected_in != Some(1) {
            return Err(ArtifactError::Shape(
                "last layer must have exactly one unit".to_string(),
            ));
        }
        Ok(self)
    }
}

impl Classifier for DenseNetwork {
    fn input_dim(&self) -> usize {
        self.layers.first().map(DenseLayer::input_dim).unwrap_or(0)
    }

    fn predict_proba(&self, input: &[f64]) -> Result<f64, InferenceError> {
        if input.len() != self.input_dim() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.input_dim(),
                actual: input.len(),
            });
        }
        let output = self
            .layers
            .iter()
            .fold(input.to_vec(), |acc, layer| layer.forward(&acc));
        let p = output
            .first()
            .copied()
            .ok_or(InferenceError::InvalidOutput(f64::NAN))?;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(InferenceError::InvalidOutput(p));
        }
        Ok(p)
    }
}

/// Scaler + classifier behind a single `predict` call
pub struct InferenceAdapter {
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl InferenceAdapter {
    pub fn new(
        scaler: Box<dyn Scaler>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        if scaler.dim() != classifier.input_dim() {
            return Err(ArtifactError::Shape(format!(
                "scaler yields {} columns but classifier expects {}",
                scaler.dim(),
                classifier.input_dim()
            )));
        }
        Ok(Self { scaler, classifier })
    }

    /// Load both artifacts from disk
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, ArtifactError> {
        let scaler = StandardScaler::load(scaler_path)?;
        let network = DenseNetwork::load(model_path)?;
        let adapter = Self::new(Box::new(scaler), Box::new(network))?;
        info!(
            "Loaded inference artifacts ({} features) from {} and {}",
            adapter.input_dim(),
            scaler_path.display(),
            model_path.display()
        );
        Ok(adapter)
    }

    pub fn input_dim(&self) -> usize {
        self.scaler.dim()
    }

    /// P(Benign) for a raw, unscaled feature vector
    pub fn predict(&self, vector: &[f64]) -> Result<f64, InferenceError> {
        if vector.len() != self.input_dim() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.input_dim(),
                actual: vector.len(),
            });
        }
        let scaled = self.scaler.transform(vector)?;
        let p = self.classifier.predict_proba(&scaled)?;
        debug!("Raw model probability of benign: {:.6}", p);
        Ok(p)
    }
}

impl fmt::Debug for InferenceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceAdapter")
            .field("input_dim", &self.input_dim())
            .finish()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scaler_standardizes() {
        let scaler = StandardScaler::new(vec![1.0, 10.0], vec![2.0, 5.0]).unwrap();
        let out = scaler.transform(&[3.0, 0.0]).unwrap();
        assert_relative_eq!(out[0], 1.0);
        assert_relative_eq!(out[1], -2.0);
    }

    #[test]
    fn test_scaler_zero_scale_is_identity_shift() {
        let scaler = StandardScaler::new(vec![4.0], vec![0.0]).unwrap();
        assert_relative_eq!(scaler.transform(&[6.0]).unwrap()[0], 2.0);
    }

    #[test]
    fn test_scaler_rejects_wrong_length() {
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        assert_eq!(
            scaler.transform(&[1.0]),
            Err(InferenceError::DimensionMismatch {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_sigmoid_is_stable_at_extremes() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }

    #[test]
    fn test_network_forward() {
        let network = DenseNetwork::new(vec![
            DenseLayer {
                weights: vec![vec![1.0, -1.0], vec![0.5, 0.5]],
                bias: vec![0.0, 0.0],
                activation: Activation::Relu,
            },
            DenseLayer {
                weights: vec![vec![1.0, 1.0]],
                bias: vec![-1.0],
                activation: Activation::Sigmoid,
            },
        ])
        .unwrap();
        // hidden = [relu(2-0), relu(1+0)] = [2, 1]; out = sigmoid(2)
        let p = network.predict_proba(&[2.0, 0.0]).unwrap();
        assert_relative_eq!(p, sigmoid(2.0));
    }

    #[test]
    fn test_network_rejects_multi_unit_output() {
        let err = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![1.0], vec![1.0]],
            bias: vec![0.0, 0.0],
            activation: Activation::Sigmoid,
        }])
        .unwrap_err();
        assert!(matches!(err, ArtifactError::Shape(_)));
    }

    #[test]
    fn test_deserialize_validates_network() {
        let json = r#"{"layers": [
            {"weights": [[1.0]], "bias": [1.0], "activation": "relu"},
            {"weights": [], "bias": [], "activation": "sigmoid"}
        ]}"#;
        let err = serde_json::from_str::<DenseNetwork>(json).unwrap_err();
        assert!(err.to_string().contains("layer 1"));
    }

    #[test]
    fn test_deserialize_validates_scaler() {
        let scaler: StandardScaler =
            serde_json::from_str(r#"{"mean": [4.0], "scale": [0.0]}"#).unwrap();
        assert_relative_eq!(scaler.transform(&[6.0]).unwrap()[0], 2.0);

        assert!(serde_json::from_str::<StandardScaler>(r#"{"mean": [], "scale": []}"#).is_err());
    }

    #[test]
    fn test_empty_output_is_error_not_panic() {
        let network = DenseNetwork {
            layers: vec![
                DenseLayer {
                    weights: vec![vec![1.0]],
                    bias: vec![1.0],
                    activation: Activation::Relu,
                },
                DenseLayer {
                    weights: vec![],
                    bias: vec![],
                    activation: Activation::Sigmoid,
                },
            ],
        };
        assert!(matches!(
            network.predict_proba(&[1.0]),
            Err(InferenceError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_linear_output_out_of_range_is_error() {
        let network = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![1.0]],
            bias: vec![0.0],
            activation: Activation::Linear,
        }])
        .unwrap();
        assert_eq!(
            network.predict_proba(&[3.0]),
            Err(InferenceError::InvalidOutput(3.0))
        );
    }
}
