//! Mapping from P(Benign) to a display-ready verdict.
//!
//! The warning threshold (0.7) and the band thresholds (0.8 / 0.5) are
//! independent. Confidence in [0.5, 0.7) is yellow with a warning, [0.7, 0.8)
//! is yellow without one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence at or above which the band is green
pub const GREEN_THRESHOLD: f64 = 0.8;

/// Confidence at or above which the band is yellow
pub const YELLOW_THRESHOLD: f64 = 0.5;

/// Confidence below which the specialist warning is attached
pub const WARNING_THRESHOLD: f64 = 0.7;

pub const LOW_CONFIDENCE_WARNING: &str = "Low confidence: please consult a specialist.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Benign,
    Malignant,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Benign => "Benign",
            Label::Malignant => "Malignant",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse confidence band driving the display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Green,
    Yellow,
    Red,
}

impl Band {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= GREEN_THRESHOLD {
            Band::Green
        } else if confidence >= YELLOW_THRESHOLD {
            Band::Yellow
        } else {
            Band::Red
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Band::Green => "#22c55e",
            Band::Yellow => "#f59e0b",
            Band::Red => "#dc2626",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    /// Raw classifier output, P(Benign)
    pub probability_benign: f64,
    pub confidence: f64,
    pub band: Band,
    pub warning: Option<String>,
}

impl Verdict {
    pub fn from_probability(p_benign: f64) -> Self {
        let (label, confidence) = if p_benign >= 0.5 {
            (Label::Benign, p_benign)
        } else {
            (Label::Malignant, 1.0 - p_benign)
        };
        let warning =
            (confidence < WARNING_THRESHOLD).then(|| LOW_CONFIDENCE_WARNING.to_string());

        Self {
            label,
            probability_benign: p_benign,
            confidence,
            band: Band::from_confidence(confidence),
            warning,
        }
    }

    /// Confidence scaled to 0..=100 for display
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}
