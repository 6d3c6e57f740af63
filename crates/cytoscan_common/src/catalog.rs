//! Feature catalog: the 30 nucleus measurements grouped into wizard steps.
//!
//! The flattened order (step 1 first, features in table order) is the column
//! order the scaler and classifier were fit on. Reordering anything here
//! silently changes what the model sees.

use serde::Serialize;
use std::collections::BTreeMap;

/// Total number of features across all steps
pub const FEATURE_COUNT: usize = 30;

const RADIUS: &[&str] = &["mean radius", "radius error", "worst radius"];
const PERIMETER: &[&str] = &["mean perimeter", "perimeter error", "worst perimeter"];
const AREA: &[&str] = &["mean area", "area error", "worst area"];
const TEXTURE: &[&str] = &["mean texture", "texture error", "worst texture"];
const SYMMETRY: &[&str] = &[
    "mean symmetry",
    "symmetry error",
    "worst symmetry",
    "mean fractal dimension",
    "fractal dimension error",
    "worst fractal dimension",
];
const SMOOTHNESS_COMPACTNESS: &[&str] = &[
    "mean smoothness",
    "smoothness error",
    "worst smoothness",
    "mean compactness",
    "compactness error",
    "worst compactness",
];
const CONCAVITY: &[&str] = &[
    "mean concavity",
    "concavity error",
    "worst concavity",
    "mean concave points",
    "concave points error",
    "worst concave points",
];

/// A data-entry step of the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Radius,
    Perimeter,
    Area,
    Texture,
    Symmetry,
    SmoothnessCompactness,
    Concavity,
}

impl Step {
    /// All steps in wizard order
    pub fn all() -> [Step; 7] {
        [
            Step::Radius,
            Step::Perimeter,
            Step::Area,
            Step::Texture,
            Step::Symmetry,
            Step::SmoothnessCompactness,
            Step::Concavity,
        ]
    }

    /// Map a 1-based step number to a step
    pub fn from_number(n: i64) -> Option<Step> {
        match n {
            1 => Some(Step::Radius),
            2 => Some(Step::Perimeter),
            3 => Some(Step::Area),
            4 => Some(Step::Texture),
            5 => Some(Step::Symmetry),
            6 => Some(Step::SmoothnessCompactness),
            7 => Some(Step::Concavity),
            _ => None,
        }
    }

    /// 1-based step number
    pub fn number(self) -> u8 {
        match self {
            Step::Radius => 1,
            Step::Perimeter => 2,
            Step::Area => 3,
            Step::Texture => 4,
            Step::Symmetry => 5,
            Step::SmoothnessCompactness => 6,
            Step::Concavity => 7,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Radius => "Radius",
            Step::Perimeter => "Perimeter",
            Step::Area => "Area",
            Step::Texture => "Texture",
            Step::Symmetry => "Symmetry & fractal dimension",
            Step::SmoothnessCompactness => "Smoothness & compactness",
            Step::Concavity => "Concavity",
        }
    }

    /// Features collected on this step, in vector order
    pub fn features(self) -> &'static [&'static str] {
        match self {
            Step::Radius => RADIUS,
            Step::Perimeter => PERIMETER,
            Step::Area => AREA,
            Step::Texture => TEXTURE,
            Step::Symmetry => SYMMETRY,
            Step::SmoothnessCompactness => SMOOTHNESS_COMPACTNESS,
            Step::Concavity => CONCAVITY,
        }
    }

    /// The following data-entry step, `None` after the last one
    pub fn next(self) -> Option<Step> {
        Step::from_number(i64::from(self.number()) + 1)
    }
}

/// Ordered mapping from step number to its features
pub fn categories() -> BTreeMap<u8, &'static [&'static str]> {
    Step::all()
        .into_iter()
        .map(|step| (step.number(), step.features()))
        .collect()
}

/// All feature names in vector order
pub fn flattened() -> Vec<&'static str> {
    Step::all()
        .into_iter()
        .flat_map(|step| step.features().iter().copied())
        .collect()
}

pub fn step_count() -> usize {
    Step::all().len()
}

pub fn feature_count() -> usize {
    FEATURE_COUNT
}

/// Session/form key for a feature name
pub fn sanitize_key(feature: &str) -> String {
    feature.replace(' ', "_")
}

/// The step a feature is collected on
pub fn step_of(feature: &str) -> Option<Step> {
    Step::all()
        .into_iter()
        .find(|step| step.features().iter().any(|f| *f == feature))
}
