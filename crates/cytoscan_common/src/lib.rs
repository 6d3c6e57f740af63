//! Shared types and pipeline for Cytoscan components.
//!
//! The daemon and the control tool both build on these modules: the feature
//! catalog, the per-session accumulator, the inference adapter and the wizard
//! controller that ties them together.

pub mod catalog;
pub mod config;
pub mod error;
pub mod inference;
pub mod reference;
pub mod session;
pub mod verdict;
pub mod wizard;

pub use catalog::{Step, FEATURE_COUNT};
pub use config::Config;
pub use error::{ArtifactError, ConfigError, EvaluationError, InferenceError, MissingFeature};
pub use inference::{Classifier, DenseNetwork, InferenceAdapter, Scaler, StandardScaler};
pub use session::SessionState;
pub use verdict::{Band, Label, Verdict};
pub use wizard::{MissingPolicy, PredictionResult, WizardState};

/// Version string shared by the daemon and the control tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
