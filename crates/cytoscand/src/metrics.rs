//! Prometheus metrics for the wizard and prediction endpoints

use prometheus::{
    register_counter_vec_with_registry, register_histogram_with_registry,
    register_int_gauge_with_registry, CounterVec, Encoder, Histogram, IntGauge, Registry,
    TextEncoder,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct WizardMetrics {
    pub step_submissions_total: CounterVec,
    pub predictions_total: CounterVec,
    pub prediction_failures_total: CounterVec,
    pub active_sessions: IntGauge,
    pub inference_seconds: Histogram,

    registry: Arc<Registry>,
}

impl WizardMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let step_submissions_total = register_counter_vec_with_registry!(
            "cytoscan_step_submissions_total",
            "Total number of wizard step submissions by step",
            &["step"],
            registry
        )?;

        let predictions_total = register_counter_vec_with_registry!(
            "cytoscan_predictions_total",
            "Total number of predictions by label and source",
            &["label", "source"],
            registry
        )?;

        let prediction_failures_total = register_counter_vec_with_registry!(
            "cytoscan_prediction_failures_total",
            "Total number of failed predictions by reason",
            &["reason"],
            registry
        )?;

        let active_sessions = register_int_gauge_with_registry!(
            "cytoscan_active_sessions",
            "Number of live wizard sessions",
            registry
        )?;

        let inference_seconds = register_histogram_with_registry!(
            "cytoscan_inference_seconds",
            "Time spent assembling the feature vector and running the model",
            vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05],
            registry
        )?;

        Ok(Self {
            step_submissions_total,
            predictions_total,
            prediction_failures_total,
            active_sessions,
            inference_seconds,
            registry: Arc::new(registry),
        })
    }

    pub fn record_submission(&self, step: u8) {
        let step = step.to_string();
        self.step_submissions_total
            .with_label_values(&[step.as_str()])
            .inc();
    }

    pub fn record_prediction(&self, label: &str, source: &str) {
        self.predictions_total
            .with_label_values(&[label, source])
            .inc();
    }

    pub fn record_failure(&self, reason: &str) {
        self.prediction_failures_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
