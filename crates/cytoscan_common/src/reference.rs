//! Reference samples with known labels.
//!
//! The first two rows of the Wisconsin diagnostic breast cancer dataset, keyed
//! by feature name so they can be laid out in catalog order regardless of the
//! dataset's own column order.

use crate::catalog::{self, sanitize_key, Step};
use crate::verdict::Label;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct ReferenceSample {
    pub id: &'static str,
    pub label: Label,
    values: &'static [(&'static str, f64)],
}

impl ReferenceSample {
    pub fn value(&self, feature: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| *name == feature)
            .map(|(_, v)| *v)
    }

    /// Values in catalog order
    pub fn vector(&self) -> Vec<f64> {
        catalog::flattened()
            .into_iter()
            .map(|feature| self.value(feature).unwrap_or(0.0))
            .collect()
    }

    /// The form a user would post for `step`
    pub fn form_for(&self, step: Step) -> HashMap<String, String> {
        step.features()
            .iter()
            .filter_map(|feature| {
                self.value(feature)
                    .map(|v| (sanitize_key(feature), v.to_string()))
            })
            .collect()
    }
}

const SAMPLE_842302: &[(&str, f64)] = &[
    ("mean radius", 17.99),
    ("mean texture", 10.38),
    ("mean perimeter", 122.8),
    ("mean area", 1001.0),
    ("mean smoothness", 0.1184),
    ("mean compactness", 0.2776),
    ("mean concavity", 0.3001),
    ("mean concave points", 0.1471),
    ("mean symmetry", 0.2419),
    ("mean fractal dimension", 0.07871),
    ("radius error", 1.095),
    ("texture error", 0.9053),
    ("perimeter error", 8.589),
    ("area error", 153.4),
    ("smoothness error", 0.006399),
    ("compactness error", 0.04904),
    ("concavity error", 0.05373),
    ("concave points error", 0.01587),
    ("symmetry error", 0.03003),
    ("fractal dimension error", 0.006193),
    ("worst radius", 25.38),
    ("worst texture", 17.33),
    ("worst perimeter", 184.6),
    ("worst area", 2019.0),
    ("worst smoothness", 0.1622),
    ("worst compactness", 0.6656),
    ("worst concavity", 0.7119),
    ("worst concave points", 0.2654),
    ("worst symmetry", 0.4601),
    ("worst fractal dimension", 0.1189),
];

const SAMPLE_842517: &[(&str, f64)] = &[
    ("mean radius", 20.57),
    ("mean texture", 17.77),
    ("mean perimeter", 132.9),
    ("mean area", 1326.0),
    ("mean smoothness", 0.08474),
    ("mean compactness", 0.07864),
    ("mean concavity", 0.0869),
    ("mean concave points", 0.07017),
    ("mean symmetry", 0.1812),
    ("mean fractal dimension", 0.05667),
    ("radius error", 0.5435),
    ("texture error", 0.7339),
    ("perimeter error", 3.398),
    ("area error", 74.08),
    ("smoothness error", 0.005225),
    ("compactness error", 0.01308),
    ("concavity error", 0.0186),
    ("concave points error", 0.0134),
    ("symmetry error", 0.01389),
    ("fractal dimension error", 0.003532),
    ("worst radius", 24.99),
    ("worst texture", 23.41),
    ("worst perimeter", 158.8),
    ("worst area", 1956.0),
    ("worst smoothness", 0.1238),
    ("worst compactness", 0.1866),
    ("worst concavity", 0.2416),
    ("worst concave points", 0.186),
    ("worst symmetry", 0.275),
    ("worst fractal dimension", 0.08902),
];

static SAMPLES: [ReferenceSample; 2] = [
    ReferenceSample {
        id: "842302",
        label: Label::Malignant,
        values: SAMPLE_842302,
    },
    ReferenceSample {
        id: "842517",
        label: Label::Malignant,
        values: SAMPLE_842517,
    },
];

pub fn samples() -> &'static [ReferenceSample] {
    &SAMPLES
}

pub fn sample(index: usize) -> Option<&'static ReferenceSample> {
    SAMPLES.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_cover_catalog() {
        for sample in samples() {
            for feature in catalog::flattened() {
                assert!(
                    sample.value(feature).is_some(),
                    "{} lacks {}",
                    sample.id,
                    feature
                );
            }
        }
    }

    #[test]
    fn test_vector_is_catalog_ordered() {
        let v = sample(0).unwrap().vector();
        assert_eq!(v.len(), catalog::FEATURE_COUNT);
        assert_eq!(v[0], 17.99); // mean radius
        assert_eq!(v[3], 122.8); // mean perimeter
        assert_eq!(v[29], 0.2654); // worst concave points
    }

    #[test]
    fn test_form_for_uses_sanitized_keys() {
        let form = sample(1).unwrap().form_for(Step::Area);
        assert_eq!(form.len(), 3);
        assert_eq!(form.get("mean_area").map(String::as_str), Some("1326"));
    }
}
