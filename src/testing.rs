//! Shared fixtures for unit tests.

use chrono::Utc;
use serde_json::{Value, json};

use crate::model::{PatternType, TrafficModel};

/// A well-formed model document: daily harmonic over a ~12.5 req/s mean,
/// three recent spike events, classified business-hours-normal.
pub fn sample_model_json() -> Value {
    let now_ms = Utc::now().timestamp_millis();
    json!({
        "version": "1.0.0",
        "baseline": {
            "mean": 12.5,
            "coefficients": [
                { "frequency": 0.04166666666666666, "amplitude": 6.0, "phase": -1.2 },
                { "frequency": 0.08333333333333333, "amplitude": 2.2, "phase": 0.4 }
            ]
        },
        "statistics": { "min": 2.0, "max": 85.0, "p95": 45.2, "p99": 72.9 },
        "spikes": {
            "events": [
                { "timestamp": now_ms - 3 * 3_600_000, "magnitude": 40.0 },
                { "timestamp": now_ms - 2 * 3_600_000, "magnitude": 60.0 },
                { "timestamp": now_ms - 3_600_000, "magnitude": 80.0 }
            ]
        },
        "pattern": { "type": "business-hours-normal", "confidence": 0.82 },
        "metadata": {
            "metric": "http_requests_total",
            "duration": "7d",
            "timestamp": now_ms,
            "samples": 10_080
        }
    })
}

pub fn sample_model() -> TrafficModel {
    serde_json::from_value(sample_model_json()).expect("fixture must deserialize")
}

pub fn with_pattern(mut model: TrafficModel, kind: PatternType) -> TrafficModel {
    model.pattern.kind = kind;
    model
}
