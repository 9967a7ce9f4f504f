//! Traffic-model types and file loading.
//!
//! A [`TrafficModel`] is the JSON artifact produced by the external analysis
//! phase (wavelet decomposition + Fourier fit + spike detection over
//! production metrics). This crate only consumes it: the model is loaded
//! once, validated once, and then read-only for the rest of the pipeline.
//!
//! The analysis phase emits more fields than the compiler needs
//! (`baseline.std`, `statistics.p50`, `decomposition`, ...); unknown fields
//! are ignored on deserialization.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CadenceError, ModelLoadCause};

/// Complete learned description of one service's traffic.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrafficModel {
    /// Model format version tag.
    pub version: String,
    pub baseline: Baseline,
    pub statistics: Statistics,
    pub spikes: Spikes,
    pub pattern: Pattern,
    pub metadata: Metadata,
}

/// Harmonic reconstruction of the periodic (diurnal) request-rate curve.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Baseline {
    /// Mean request rate in req/s. Never negative in a valid model.
    pub mean: f64,
    /// Sinusoidal terms, strongest first.
    pub coefficients: Vec<Coefficient>,
}

/// One sinusoidal term of the baseline: `amplitude * sin(2π·frequency·t + phase)`
/// with `t` in hours and `frequency` in cycles per hour.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Coefficient {
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
}

/// Summary statistics of the observed rate, in req/s.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Spikes {
    pub events: Vec<SpikeEvent>,
}

/// A detected short-duration traffic surge.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpikeEvent {
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Surge height above baseline, req/s.
    pub magnitude: f64,
}

/// Overall classified shape of the traffic.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pattern {
    #[serde(rename = "type")]
    pub kind: PatternType,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Closed classification of traffic shapes. The synthesizer dispatches on
/// this exhaustively, so adding a kind is a compile-time decision rather
/// than a silent default branch. Unknown wire tags are a schema violation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    BusinessHoursHeavy,
    BusinessHoursNormal,
    Bursty,
    WeeklyBatch,
    Steady,
    Other,
}

impl PatternType {
    pub const ALL: [PatternType; 6] = [
        PatternType::BusinessHoursHeavy,
        PatternType::BusinessHoursNormal,
        PatternType::Bursty,
        PatternType::WeeklyBatch,
        PatternType::Steady,
        PatternType::Other,
    ];

    /// The kebab-case wire tag, as it appears in model files.
    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::BusinessHoursHeavy => "business-hours-heavy",
            PatternType::BusinessHoursNormal => "business-hours-normal",
            PatternType::Bursty => "bursty",
            PatternType::WeeklyBatch => "weekly-batch",
            PatternType::Steady => "steady",
            PatternType::Other => "other",
        }
    }
}

/// Provenance of the model: what was analyzed, when, and how much of it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Metric name or PromQL expression the model was learned from.
    pub metric: String,
    /// Lookback window of the analysis, e.g. `"7d"`.
    pub duration: String,
    /// Epoch milliseconds when the analysis ran.
    pub timestamp: i64,
    /// Number of time-series samples analyzed.
    pub samples: u64,
}

/// Read a model file into raw JSON, without validating it.
///
/// The returned value is what [`crate::validate::validate`] consumes; keeping
/// the load untyped lets the validator report every schema violation at once
/// instead of stopping at serde's first error.
pub fn load_model(path: &Path) -> Result<serde_json::Value, CadenceError> {
    let text = fs::read_to_string(path).map_err(|e| CadenceError::ModelLoad {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    serde_json::from_str(&text).map_err(|e| CadenceError::ModelLoad {
        path: path.to_path_buf(),
        source: ModelLoadCause::Json(e),
    })
}
