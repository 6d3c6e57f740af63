//! Error types for Cytoscan.

use crate::catalog::Step;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failure inside a forward pass
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Feature vector has {actual} values, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Classifier produced an invalid probability: {0}")]
    InvalidOutput(f64),
}

/// Failure while loading the scaler or classifier from disk
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed artifact: {0}")]
    Shape(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A feature with no usable value at the terminal step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingFeature {
    pub feature: &'static str,
    pub step: Step,
}

/// Why the terminal step could not produce a prediction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Submission incomplete: {} feature(s) missing", missing.len())]
    Incomplete { missing: Vec<MissingFeature> },

    #[error("Invalid value {value:?} for '{feature}' (step {})", step.number())]
    InvalidValue {
        feature: &'static str,
        step: Step,
        value: String,
    },

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl EvaluationError {
    /// Stable tag for metrics and JSON payloads
    pub fn reason(&self) -> &'static str {
        match self {
            EvaluationError::Incomplete { .. } => "incomplete",
            EvaluationError::InvalidValue { .. } => "invalid_value",
            EvaluationError::Inference(_) => "inference",
        }
    }

    /// True for failures caused by the user's input rather than the model
    pub fn is_user_error(&self) -> bool {
        !matches!(self, EvaluationError::Inference(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_tags() {
        let incomplete = EvaluationError::Incomplete { missing: vec![] };
        assert_eq!(incomplete.reason(), "incomplete");
        assert!(incomplete.is_user_error());

        let inference = EvaluationError::from(InferenceError::DimensionMismatch {
            expected: 30,
            actual: 29,
        });
        assert_eq!(inference.reason(), "inference");
        assert!(!inference.is_user_error());
    }

    #[test]
    fn test_invalid_value_message_names_step() {
        let err = EvaluationError::InvalidValue {
            feature: "mean area",
            step: Step::Area,
            value: "abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("mean area"));
        assert!(msg.contains("step 3"));
    }
}
