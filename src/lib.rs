//! # cadence - traffic-model → load-script compiler
//!
//! Turns a learned statistical description of production request traffic
//! (a JSON `TrafficModel` produced by an external analysis phase) into an
//! executable k6 load-test script with multiple traffic-generation
//! scenarios.
//!
//! The pipeline is three stages, applied strictly forward:
//!
//! ```text
//! model file ──▶ validate ──▶ synthesize ──▶ emit ──▶ k6 script
//!                (schema +     (baseline /    (scenarios +
//!                 rules)        spikes /       behaviors +
//!                               pattern)       summary)
//! ```
//!
//! Each stage is synchronous and side-effect free; the whole chain is safe
//! to run repeatedly and concurrently. Given the same model and options the
//! emitted script is byte-identical except for its generation timestamp.

pub mod emit;
pub mod error;
pub mod model;
pub mod options;
pub mod scenario;
pub mod synth;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use emit::emit;
pub use error::CadenceError;
pub use model::{PatternType, TrafficModel, load_model};
pub use options::{GenerateOptions, parse_duration_minutes, parse_headers};
pub use scenario::{Executor, Scenario, Stage};
pub use synth::synthesize;
pub use validate::{Validated, validate};
