//! Model validation: structural schema check, then business rules.
//!
//! The two phases behave differently on purpose. The structural check walks
//! the whole document and aggregates every violation into one error, so a
//! hand-edited model surfaces all of its problems at once. Business rules
//! run afterwards in a fixed order and fail on the first violation. The
//! asymmetry is inherited behavior; do not unify it without a product call.
//!
//! Out-of-range spike timestamps and data-quality issues never fail
//! validation — they come back as [`Validated::warnings`] and are logged.

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::error::CadenceError;
use crate::model::{PatternType, TrafficModel};

/// Spike timestamps older than this are suspect: the model likely predates
/// the traffic it claims to describe.
const SPIKE_WINDOW_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// A model that passed validation, plus any non-fatal findings.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub model: TrafficModel,
    /// Non-fatal findings, in document order. Already logged via `tracing`;
    /// kept here so callers can surface them in their own output.
    pub warnings: Vec<String>,
}

/// Validate a raw model document.
///
/// Validation is read-only and idempotent: the same document always yields
/// the same result and the same warnings.
pub fn validate(raw: &Value) -> Result<Validated, CadenceError> {
    let mut v = Vec::new();
    check_structure(raw, &mut v);
    if !v.is_empty() {
        return Err(CadenceError::SchemaValidation { violations: v });
    }

    // Structure is known-good, so the typed decode cannot fail on shape.
    let model: TrafficModel =
        serde_json::from_value(raw.clone()).map_err(|e| CadenceError::SchemaValidation {
            violations: vec![format!("$: {e}")],
        })?;

    check_business_rules(&model)?;

    let warnings = collect_warnings(&model);
    for w in &warnings {
        warn!("{w}");
    }

    Ok(Validated { model, warnings })
}

/// Fixed-order, fail-fast domain rules.
fn check_business_rules(model: &TrafficModel) -> Result<(), CadenceError> {
    if model.baseline.mean < 0.0 {
        return Err(CadenceError::BusinessRule {
            field: "baseline.mean",
            reason: format!("mean rate must be non-negative, got {}", model.baseline.mean),
        });
    }
    if model.statistics.min > model.statistics.max {
        return Err(CadenceError::BusinessRule {
            field: "statistics",
            reason: format!(
                "min ({}) exceeds max ({})",
                model.statistics.min, model.statistics.max
            ),
        });
    }
    let confidence = model.pattern.confidence;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(CadenceError::BusinessRule {
            field: "pattern.confidence",
            reason: format!("confidence must be within [0, 1], got {confidence}"),
        });
    }
    Ok(())
}

fn collect_warnings(model: &TrafficModel) -> Vec<String> {
    let mut warnings = Vec::new();

    let now_ms = Utc::now().timestamp_millis();
    for (i, event) in model.spikes.events.iter().enumerate() {
        if event.timestamp > now_ms {
            warnings.push(format!(
                "spikes.events[{i}]: timestamp {} is in the future",
                event.timestamp
            ));
        } else if event.timestamp < now_ms - SPIKE_WINDOW_MS {
            warnings.push(format!(
                "spikes.events[{i}]: timestamp {} is more than a year old",
                event.timestamp
            ));
        }
    }

    if model.pattern.confidence < 0.3 {
        warnings.push(format!(
            "pattern.confidence: low classification confidence ({:.2}), scenarios may not match production shape",
            model.pattern.confidence
        ));
    }
    if model.baseline.coefficients.is_empty() {
        warnings.push(
            "baseline.coefficients: no periodic components, signal may be too noisy".to_string(),
        );
    }
    if model.metadata.samples < 100 {
        warnings.push(format!(
            "metadata.samples: only {} samples analyzed, consider a longer observation window",
            model.metadata.samples
        ));
    }

    warnings
}

// --- Structural schema walk ---

fn check_structure(raw: &Value, out: &mut Vec<String>) {
    let Some(root) = as_object(raw, "$", out) else {
        return;
    };

    expect_string(root.get("version"), "version", out);

    if let Some(baseline) = expect_object(root.get("baseline"), "baseline", out) {
        expect_number(baseline.get("mean"), "baseline.mean", out);
        if let Some(coeffs) =
            expect_array(baseline.get("coefficients"), "baseline.coefficients", out)
        {
            for (i, coeff) in coeffs.iter().enumerate() {
                let path = format!("baseline.coefficients[{i}]");
                let Some(coeff) = as_object(coeff, &path, out) else {
                    continue;
                };
                if let Some(freq) =
                    expect_number(coeff.get("frequency"), &format!("{path}.frequency"), out)
                {
                    if freq < 0.0 {
                        out.push(format!("{path}.frequency: must be non-negative, got {freq}"));
                    }
                }
                expect_number(coeff.get("amplitude"), &format!("{path}.amplitude"), out);
                expect_number(coeff.get("phase"), &format!("{path}.phase"), out);
            }
        }
    }

    if let Some(stats) = expect_object(root.get("statistics"), "statistics", out) {
        for field in ["min", "max", "p95", "p99"] {
            expect_number(stats.get(field), &format!("statistics.{field}"), out);
        }
    }

    if let Some(spikes) = expect_object(root.get("spikes"), "spikes", out) {
        if let Some(events) = expect_array(spikes.get("events"), "spikes.events", out) {
            for (i, event) in events.iter().enumerate() {
                let path = format!("spikes.events[{i}]");
                let Some(event) = as_object(event, &path, out) else {
                    continue;
                };
                expect_integer(event.get("timestamp"), &format!("{path}.timestamp"), out);
                expect_number(event.get("magnitude"), &format!("{path}.magnitude"), out);
            }
        }
    }

    if let Some(pattern) = expect_object(root.get("pattern"), "pattern", out) {
        if let Some(tag) = expect_string(pattern.get("type"), "pattern.type", out) {
            if !PatternType::ALL.iter().any(|k| k.as_str() == tag) {
                out.push(format!(
                    "pattern.type: unknown pattern {tag:?}, expected one of {}",
                    PatternType::ALL.map(PatternType::as_str).join(", ")
                ));
            }
        }
        expect_number(pattern.get("confidence"), "pattern.confidence", out);
    }

    if let Some(metadata) = expect_object(root.get("metadata"), "metadata", out) {
        expect_string(metadata.get("metric"), "metadata.metric", out);
        expect_string(metadata.get("duration"), "metadata.duration", out);
        expect_integer(metadata.get("timestamp"), "metadata.timestamp", out);
        if let Some(samples) = expect_integer(metadata.get("samples"), "metadata.samples", out) {
            if samples < 0 {
                out.push(format!("metadata.samples: must be non-negative, got {samples}"));
            }
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_object<'a>(
    v: &'a Value,
    path: &str,
    out: &mut Vec<String>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match v.as_object() {
        Some(obj) => Some(obj),
        None => {
            out.push(format!("{path}: expected object, found {}", type_name(v)));
            None
        }
    }
}

fn expect_object<'a>(
    v: Option<&'a Value>,
    path: &str,
    out: &mut Vec<String>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match v {
        Some(v) => as_object(v, path, out),
        None => {
            out.push(format!("{path}: missing required field"));
            None
        }
    }
}

fn expect_array<'a>(v: Option<&'a Value>, path: &str, out: &mut Vec<String>) -> Option<&'a [Value]> {
    match v {
        Some(Value::Array(items)) => Some(items.as_slice()),
        Some(v) => {
            out.push(format!("{path}: expected array, found {}", type_name(v)));
            None
        }
        None => {
            out.push(format!("{path}: missing required field"));
            None
        }
    }
}

fn expect_number(v: Option<&Value>, path: &str, out: &mut Vec<String>) -> Option<f64> {
    match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(v) => {
            out.push(format!("{path}: expected number, found {}", type_name(v)));
            None
        }
        None => {
            out.push(format!("{path}: missing required field"));
            None
        }
    }
}

fn expect_integer(v: Option<&Value>, path: &str, out: &mut Vec<String>) -> Option<i64> {
    match v {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.as_i64(),
        Some(v) => {
            out.push(format!("{path}: expected integer, found {}", type_name(v)));
            None
        }
        None => {
            out.push(format!("{path}: missing required field"));
            None
        }
    }
}

fn expect_string<'a>(v: Option<&'a Value>, path: &str, out: &mut Vec<String>) -> Option<&'a str> {
    match v {
        Some(Value::String(s)) => Some(s),
        Some(v) => {
            out.push(format!("{path}: expected string, found {}", type_name(v)));
            None
        }
        None => {
            out.push(format!("{path}: missing required field"));
            None
        }
    }
}
