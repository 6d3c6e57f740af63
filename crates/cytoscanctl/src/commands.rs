//! Command implementations for cytoscanctl

use anyhow::{anyhow, Context, Result};
use cytoscan_common::reference::{self, ReferenceSample};
use cytoscan_common::wizard;
use cytoscan_common::{catalog, Band, Config, InferenceAdapter, Step, Verdict};
use owo_colors::OwoColorize;
use std::path::PathBuf;

fn reference_sample(index: usize) -> Result<&'static ReferenceSample> {
    reference::sample(index).ok_or_else(|| {
        anyhow!(
            "no reference sample {} (have {})",
            index,
            reference::samples().len()
        )
    })
}

/// Post a reference sample to the daemon and print the response
pub async fn api(url: &str, sample: usize) -> Result<()> {
    let sample = reference_sample(sample)?;
    let endpoint = format!("{}/predict", url.trim_end_matches('/'));
    let payload = serde_json::json!({ "features": sample.vector() });

    let client = reqwest::Client::new();
    let response = client
        .post(&endpoint)
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("calling {}", endpoint))?
        .error_for_status()
        .with_context(|| format!("{} returned an error", endpoint))?;
    let body: serde_json::Value = response.json().await.context("decoding response")?;

    println!("API response for sample {}:", sample.id);
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Predict a reference sample offline from the artifacts
pub fn local(
    config: Option<PathBuf>,
    scaler: Option<PathBuf>,
    model: Option<PathBuf>,
    sample: usize,
) -> Result<()> {
    let config = match config {
        Some(path) => Config::load_from_path(&path)?,
        None => Config::load(),
    };
    let scaler = scaler.unwrap_or(config.artifacts.scaler_path);
    let model = model.unwrap_or(config.artifacts.model_path);

    let adapter = InferenceAdapter::load(&scaler, &model).context("loading artifacts")?;
    let sample = reference_sample(sample)?;
    let verdict = wizard::classify_vector(&adapter, &sample.vector())?;

    println!("Local test (sample {}):", sample.id);
    println!("True label: {}", sample.label);
    println!("{}", format_verdict(&verdict));
    Ok(())
}

fn format_verdict(verdict: &Verdict) -> String {
    let label = match verdict.band {
        Band::Green => verdict.label.green().to_string(),
        Band::Yellow => verdict.label.yellow().to_string(),
        Band::Red => verdict.label.red().to_string(),
    };
    let mut line = format!(
        "Predicted: {}, Probability: {:.4}, Confidence: {:.1}%",
        label,
        verdict.probability_benign,
        verdict.confidence_percent()
    );
    if let Some(warning) = &verdict.warning {
        line.push_str(&format!("\n{}", warning.yellow()));
    }
    line
}

/// Print the steps and their features in vector order
pub fn catalog() {
    println!(
        "{} features over {} steps",
        catalog::feature_count(),
        catalog::step_count()
    );
    for step in Step::all() {
        println!("{}. {}", step.number(), step.title().bold());
        for feature in step.features() {
            println!("   {:<26} {}", feature, catalog::sanitize_key(feature).dimmed());
        }
    }
}
