//! Scenario value types.
//!
//! A [`Scenario`] is one named, independently configured traffic-generation
//! unit in the emitted script. The synthesizer produces these fresh on every
//! call and never mutates them afterwards; the emitter consumes them.
//!
//! Everything here is unit-pure: stage lengths are seconds, scenario-level
//! durations and start offsets are minutes. Choosing between `90m` and `2h`
//! presentation is the emitter's job.

/// One stage of a ramping executor: hold or move toward `target` req/s for
/// `duration_secs` of wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub duration_secs: u64,
    pub target: u64,
}

/// A named traffic-generation unit plus its executor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Key in the script's `scenarios` map.
    pub name: &'static str,
    /// Exported function this scenario drives; `None` runs the default
    /// entry point.
    pub exec: Option<&'static str>,
    pub executor: Executor,
}

/// The four traffic-shape strategies the target runner supports, with their
/// numeric parameters. Closed by design: the synthesizer's dispatch table is
/// exhaustive over pattern types, and this enum is exhaustive over what
/// those tables may produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Executor {
    /// Arrival rate follows a stage sequence; used for the reconstructed
    /// baseline curve and for multi-stage ramps.
    RampingArrivalRate {
        start_rate: u64,
        pre_allocated_vus: u64,
        max_vus: u64,
        stages: Vec<Stage>,
    },
    /// A fixed pool of VUs shares a fixed iteration budget; used to replay
    /// spike bursts.
    SharedIterations {
        vus: u64,
        iterations: u64,
        start_secs: u64,
        max_duration_minutes: u64,
    },
    /// Constant arrival rate over a window.
    ConstantArrivalRate {
        rate: u64,
        duration_minutes: u64,
        start_minutes: u64,
        pre_allocated_vus: u64,
        max_vus: u64,
    },
    /// VU count is driven from outside (runner API) within a cap.
    ExternallyControlled {
        vus: u64,
        max_vus: u64,
        duration_minutes: u64,
        start_minutes: u64,
    },
}

impl Executor {
    /// The executor-kind tag used in the emitted script.
    pub fn kind(&self) -> &'static str {
        match self {
            Executor::RampingArrivalRate { .. } => "ramping-arrival-rate",
            Executor::SharedIterations { .. } => "shared-iterations",
            Executor::ConstantArrivalRate { .. } => "constant-arrival-rate",
            Executor::ExternallyControlled { .. } => "externally-controlled",
        }
    }
}
