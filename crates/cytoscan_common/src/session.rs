//! Per-session accumulator of raw wizard values.
//!
//! Values are stored exactly as submitted. Parsing and completeness checks
//! happen at the terminal step, never here.

use crate::catalog::{sanitize_key, Step};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Raw values collected during one wizard traversal
#[derive(Debug, Clone)]
pub struct SessionState {
    values: HashMap<String, String>,
    last_seen: Instant,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            last_seen: Instant::now(),
        }
    }

    /// Store the submitted values for every feature of `step`.
    ///
    /// Fields are looked up by sanitized key first, then by the raw feature
    /// name. A field missing from the form removes any earlier value so a
    /// resubmission fully replaces that step.
    pub fn record(&mut self, step: Step, form: &HashMap<String, String>) {
        for feature in step.features() {
            let key = sanitize_key(feature);
            let submitted = form.get(&key).or_else(|| form.get(*feature));
            match submitted {
                Some(value) => {
                    self.values.insert(key, value.clone());
                }
                None => {
                    self.values.remove(&key);
                }
            }
        }
        self.touch();
    }

    pub fn get(&self, feature: &str) -> Option<&str> {
        self.values.get(&sanitize_key(feature)).map(String::as_str)
    }

    /// Wipe all values (fresh wizard entry)
    pub fn clear(&mut self) {
        self.values.clear();
        self.touch();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mark the session as used now
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.idle_for() >= ttl
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_record_uses_sanitized_keys() {
        let mut state = SessionState::new();
        state.record(
            Step::Radius,
            &form(&[("mean_radius", "17.99"), ("radius_error", "1.095")]),
        );
        assert_eq!(state.get("mean radius"), Some("17.99"));
        assert_eq!(state.get("radius error"), Some("1.095"));
        assert_eq!(state.get("worst radius"), None);
    }

    #[test]
    fn test_record_accepts_raw_feature_names() {
        let mut state = SessionState::new();
        state.record(Step::Area, &form(&[("mean area", "1001")]));
        assert_eq!(state.get("mean area"), Some("1001"));
    }

    #[test]
    fn test_record_ignores_fields_of_other_steps() {
        let mut state = SessionState::new();
        state.record(Step::Radius, &form(&[("mean_area", "1001")]));
        assert!(state.is_empty());
    }

    #[test]
    fn test_expiry() {
        let state = SessionState::new();
        assert!(!state.is_expired(Duration::from_secs(60)));
        assert!(state.is_expired(Duration::ZERO));
    }
}
