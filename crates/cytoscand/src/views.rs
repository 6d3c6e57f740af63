//! HTML views for the wizard.
//!
//! Pure functions from pipeline values to markup. Every user-supplied string
//! goes through `escape`.

use cytoscan_common::catalog::{self, sanitize_key};
use cytoscan_common::error::EvaluationError;
use cytoscan_common::wizard::{total_steps, PredictionResult};
use cytoscan_common::{SessionState, Step};
use std::fmt::Write;

/// Escape text for HTML bodies and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Cytoscan</title>
</head>
<body>
<nav><a href="/">Home</a> | <a href="/about">About</a> | <a href="/docs">Docs</a></nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        body = body
    )
}

fn progress(current: usize) -> String {
    format!(
        r#"<p class="progress">Step {} of {}</p>"#,
        current,
        total_steps()
    )
}

pub fn home() -> String {
    layout(
        "Home",
        r#"<h1>Cytoscan</h1>
<p>Enter the cell nucleus measurements from a fine needle aspirate, one group
at a time. After the last group the model estimates whether the mass is
benign or malignant.</p>
<p><a href="/step/1">Start</a></p>"#,
    )
}

pub fn about() -> String {
    layout(
        "About",
        r#"<h1>About</h1>
<p>Cytoscan runs a pre-trained classifier over 30 measurements describing
the cell nuclei in a digitized fine needle aspirate image. It is a decision
aid and does not replace a pathologist.</p>"#,
    )
}

pub fn docs() -> String {
    let mut steps = String::new();
    for step in Step::all() {
        let _ = write!(
            steps,
            "<li><strong>{}</strong>: {}</li>",
            escape(step.title()),
            escape(&step.features().join(", "))
        );
    }
    layout(
        "Docs",
        &format!(
            r#"<h1>Documentation</h1>
<p>The wizard collects {} features over {} steps:</p>
<ol>{}</ol>
<p>Confidence of 80% or more is shown in green, 50% to 80% in yellow.
Below 70% a warning suggests consulting a specialist.</p>
<p>Programmatic access: <code>POST /predict</code> with
<code>{{"features": [..30 numbers in the order above..]}}</code>.</p>"#,
            catalog::feature_count(),
            catalog::step_count(),
            steps
        ),
    )
}

/// Data-entry form for one step, pre-filled from the session
pub fn step_form(step: Step, session: &SessionState) -> String {
    let mut fields = String::new();
    for feature in step.features() {
        let key = sanitize_key(feature);
        let value = session.get(feature).unwrap_or("");
        let _ = write!(
            fields,
            r#"<label for="{key}">{label}</label>
<input id="{key}" name="{key}" type="text" inputmode="decimal" value="{value}" required>
"#,
            key = escape(&key),
            label = escape(feature),
            value = escape(value)
        );
    }

    let n = step.number();
    let back = if n > 1 {
        format!(r#"<a href="/step/{}">Back</a> "#, n - 1)
    } else {
        String::new()
    };

    layout(
        step.title(),
        &format!(
            r#"<h1>{title}</h1>
{progress}
<form method="post" action="/step/{n}">
{fields}{back}<button type="submit">Next</button>
</form>"#,
            title = escape(step.title()),
            progress = progress(n as usize),
            n = n,
            fields = fields,
            back = back
        ),
    )
}

pub fn summary(result: &PredictionResult) -> String {
    let verdict = &result.verdict;
    let percent = verdict.confidence_percent();

    let warning = verdict
        .warning
        .as_deref()
        .map(|w| format!(r#"<p class="warning">{}</p>"#, escape(w)))
        .unwrap_or_default();

    let mut rows = String::new();
    for pair in &result.pairs {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(pair.feature),
            pair.value
        );
    }

    layout(
        "Result",
        &format!(
            r#"<h1>Prediction: {label}</h1>
{progress}
<p>Confidence: {percent:.1}%</p>
<div class="bar" style="width: {percent:.1}%; background-color: {color};"></div>
{warning}
<table>
<thead><tr><th>Feature</th><th>Value</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<p><a href="/">Start over</a></p>"#,
            label = verdict.label,
            progress = progress(total_steps()),
            percent = percent,
            color = verdict.band.hex(),
            warning = warning,
            rows = rows
        ),
    )
}

/// Page explaining why the summary could not be computed
pub fn evaluation_error(err: &EvaluationError) -> String {
    let body = match err {
        EvaluationError::Incomplete { missing } => {
            let mut items = String::new();
            for m in missing {
                let _ = write!(
                    items,
                    r#"<li>{} (<a href="/step/{n}">step {n}: {}</a>)</li>"#,
                    escape(m.feature),
                    escape(m.step.title()),
                    n = m.step.number()
                );
            }
            format!(
                r#"<h1>Some values are missing</h1>
<p>Please fill in these features before requesting a prediction:</p>
<ul>{}</ul>"#,
                items
            )
        }
        EvaluationError::InvalidValue {
            feature,
            step,
            value,
        } => format!(
            r#"<h1>Invalid value</h1>
<p>The value "{}" entered for {} is not a number.</p>
<p><a href="/step/{}">Correct it on step {}: {}</a></p>"#,
            escape(value),
            escape(feature),
            step.number(),
            step.number(),
            escape(step.title())
        ),
        EvaluationError::Inference(_) => return internal_error(),
    };
    layout("Cannot predict", &body)
}

pub fn internal_error() -> String {
    layout(
        "Error",
        r#"<h1>Something went wrong</h1>
<p>The prediction could not be computed. Please try again later.</p>
<p><a href="/">Start over</a></p>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cytoscan_common::error::MissingFeature;
    use cytoscan_common::verdict::Verdict;
    use cytoscan_common::wizard::FeatureValue;
    use std::collections::HashMap;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"x" & 'y'</b>"#),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_step_form_prefills_and_escapes() {
        let mut session = SessionState::new();
        let form = HashMap::from([("mean_radius".to_string(), "\"><script>".to_string())]);
        session.record(Step::Radius, &form);

        let html = step_form(Step::Radius, &session);
        assert!(html.contains(r#"name="mean_radius""#));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Step 1 of 8"));
        assert!(html.contains(r#"action="/step/1""#));
        assert!(!html.contains("Back"));
    }

    #[test]
    fn test_summary_shows_band_and_warning() {
        let result = PredictionResult {
            verdict: Verdict::from_probability(0.6),
            pairs: vec![FeatureValue {
                feature: "mean radius",
                value: 17.99,
            }],
        };
        let html = summary(&result);
        assert!(html.contains("Prediction: Benign"));
        assert!(html.contains("60.0%"));
        assert!(html.contains("#f59e0b"));
        assert!(html.contains("consult a specialist"));
        assert!(html.contains("<td>mean radius</td><td>17.99</td>"));
    }

    #[test]
    fn test_incomplete_links_back_to_steps() {
        let err = EvaluationError::Incomplete {
            missing: vec![MissingFeature {
                feature: "worst area",
                step: Step::Area,
            }],
        };
        let html = evaluation_error(&err);
        assert!(html.contains("worst area"));
        assert!(html.contains(r#"href="/step/3""#));
    }
}
