//! Wizard controller: step resolution, submission and terminal evaluation.
//!
//! States are `Step(1..=7)` for data entry, `Summary` for the terminal step
//! (number 8) and `Invalid` for anything else, which callers turn into a
//! redirect to the entry point.

use crate::catalog::{self, Step};
use crate::error::{EvaluationError, InferenceError, MissingFeature};
use crate::inference::InferenceAdapter;
use crate::session::SessionState;
use crate::verdict::Verdict;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Step(Step),
    Summary,
    Invalid,
}

/// What to do with features that have no value at the terminal step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Refuse to predict and list the missing features
    #[default]
    Reject,
    /// Substitute 0.0 (legacy behavior, biases the prediction)
    ZeroFill,
}

/// Step count including the terminal summary
pub fn total_steps() -> usize {
    catalog::step_count() + 1
}

/// Map a requested step number to a wizard state
pub fn resolve(n: i64) -> WizardState {
    if n == total_steps() as i64 {
        return WizardState::Summary;
    }
    match Step::from_number(n) {
        Some(step) => WizardState::Step(step),
        None => WizardState::Invalid,
    }
}

/// Record a step's form and return the state to move to
pub fn submit(
    session: &mut SessionState,
    step: Step,
    form: &HashMap<String, String>,
) -> WizardState {
    session.record(step, form);
    match step.next() {
        Some(next) => WizardState::Step(next),
        None => WizardState::Summary,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureValue {
    pub feature: &'static str,
    pub value: f64,
}

/// Terminal-step outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Values the prediction was computed from, in vector order
    pub pairs: Vec<FeatureValue>,
}

impl PredictionResult {
    pub fn vector(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.value).collect()
    }
}

/// Read every feature from the session in catalog order.
///
/// The first unparseable value aborts the collection, including a submitted
/// blank. Only features with no session entry are handled per `policy`.
pub fn collect_vector(
    session: &SessionState,
    policy: MissingPolicy,
) -> Result<Vec<f64>, EvaluationError> {
    let mut values = Vec::with_capacity(catalog::feature_count());
    let mut missing = Vec::new();

    for step in Step::all() {
        for &feature in step.features() {
            match session.get(feature).map(str::trim) {
                Some(raw) => {
                    let value = parse_value(raw).ok_or_else(|| EvaluationError::InvalidValue {
                        feature,
                        step,
                        value: raw.to_string(),
                    })?;
                    values.push(value);
                }
                None => {
                    missing.push(MissingFeature { feature, step });
                    values.push(0.0);
                }
            }
        }
    }

    if !missing.is_empty() {
        match policy {
            MissingPolicy::Reject => return Err(EvaluationError::Incomplete { missing }),
            MissingPolicy::ZeroFill => {
                warn!(
                    "Substituting 0.0 for {} missing feature(s): {}",
                    missing.len(),
                    missing
                        .iter()
                        .map(|m| m.feature)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
    }

    Ok(values)
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Run the terminal step: collect, predict, band
pub fn evaluate(
    session: &SessionState,
    adapter: &InferenceAdapter,
    policy: MissingPolicy,
) -> Result<PredictionResult, EvaluationError> {
    let vector = collect_vector(session, policy)?;
    let verdict = classify_vector(adapter, &vector)?;
    info!(
        "Wizard prediction: {} ({:.1}% confidence)",
        verdict.label,
        verdict.confidence_percent()
    );

    let pairs = catalog::flattened()
        .into_iter()
        .zip(vector)
        .map(|(feature, value)| FeatureValue { feature, value })
        .collect();

    Ok(PredictionResult { verdict, pairs })
}

/// Predict from an already assembled vector. Shared by the wizard and the
/// direct prediction endpoint.
pub fn classify_vector(
    adapter: &InferenceAdapter,
    vector: &[f64],
) -> Result<Verdict, InferenceError> {
    let p = adapter.predict(vector)?;
    Ok(Verdict::from_probability(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bounds() {
        assert_eq!(resolve(1), WizardState::Step(Step::Radius));
        assert_eq!(resolve(7), WizardState::Step(Step::Concavity));
        assert_eq!(resolve(8), WizardState::Summary);
        assert_eq!(resolve(0), WizardState::Invalid);
        assert_eq!(resolve(9), WizardState::Invalid);
        assert_eq!(resolve(-3), WizardState::Invalid);
    }

    #[test]
    fn test_submit_advances() {
        let mut session = SessionState::new();
        let form = HashMap::new();
        assert_eq!(
            submit(&mut session, Step::Radius, &form),
            WizardState::Step(Step::Perimeter)
        );
        assert_eq!(
            submit(&mut session, Step::Concavity, &form),
            WizardState::Summary
        );
    }

    #[test]
    fn test_parse_value_rejects_non_finite() {
        assert_eq!(parse_value("1.5"), Some(1.5));
        assert_eq!(parse_value("1e3"), Some(1000.0));
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("12,5"), None);
    }

    #[test]
    fn test_submitted_blank_is_invalid_under_zero_fill() {
        let mut session = SessionState::new();
        for step in Step::all() {
            let form = step
                .features()
                .iter()
                .map(|f| (catalog::sanitize_key(f), "1.0".to_string()))
                .collect();
            session.record(step, &form);
        }
        let mut area: HashMap<String, String> = Step::Area
            .features()
            .iter()
            .map(|f| (catalog::sanitize_key(f), "1.0".to_string()))
            .collect();
        area.insert("area_error".to_string(), "  ".to_string());
        session.record(Step::Area, &area);

        for policy in [MissingPolicy::Reject, MissingPolicy::ZeroFill] {
            assert_eq!(
                collect_vector(&session, policy),
                Err(EvaluationError::InvalidValue {
                    feature: "area error",
                    step: Step::Area,
                    value: String::new(),
                })
            );
        }
    }

    #[test]
    fn test_total_steps() {
        assert_eq!(total_steps(), 8);
    }
}
