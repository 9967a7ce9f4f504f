//! Scenario synthesis: the numeric core of the pipeline.
//!
//! Maps a trusted model plus resolved options to an ordered set of
//! scenarios. Pure: same inputs, same output, no shared state.

use std::f64::consts::TAU;

use tracing::debug;

use crate::error::CadenceError;
use crate::model::{PatternType, TrafficModel};
use crate::options::{GenerateOptions, parse_duration_minutes};
use crate::scenario::{Executor, Scenario, Stage};

/// One stage per simulated minute, capped at 24 simulated hours.
const MAX_STAGES: u64 = 1440;

/// Synthesize the scenario set for a validated model.
///
/// Always yields a `baseline` scenario; adds `spikes` when the model carries
/// spike events; adds one pattern-specific scenario for the classified
/// traffic shape (none for `steady` / `other`).
pub fn synthesize(
    model: &TrafficModel,
    opts: &GenerateOptions,
) -> Result<Vec<Scenario>, CadenceError> {
    opts.ensure_valid()?;
    let duration_minutes = parse_duration_minutes(&opts.duration)?;

    let mut scenarios = vec![baseline_scenario(model, opts, duration_minutes)];
    if !model.spikes.events.is_empty() {
        scenarios.push(spike_scenario(model, opts));
    }
    if let Some(scenario) = pattern_scenario(model, opts) {
        scenarios.push(scenario);
    }

    debug!(
        count = scenarios.len(),
        pattern = model.pattern.kind.as_str(),
        "synthesized scenarios"
    );
    Ok(scenarios)
}

/// Round half away from zero, then floor at 1. The generated test must keep
/// at least one request per second flowing through every window.
fn clamp_rate(value: f64) -> u64 {
    let rounded = value.round();
    if rounded < 1.0 { 1 } else { rounded as u64 }
}

/// Compress a simulated-minutes window into wall-clock minutes, floor 1.
fn compress_minutes(minutes: f64, time_scale: f64) -> u64 {
    let compressed = (minutes / time_scale).round();
    if compressed < 1.0 { 1 } else { compressed as u64 }
}

/// Reconstruct the learned diurnal rate curve into per-minute stages.
///
/// Each stage covers one simulated minute; time compression shortens the
/// wall-clock stage length while the `frequency * 60 * time_scale` rescaling
/// keeps every harmonic's cycle length correct in simulated time.
fn baseline_scenario(
    model: &TrafficModel,
    opts: &GenerateOptions,
    duration_minutes: u64,
) -> Scenario {
    let scale = opts.scale;
    let time_scale = opts.time_scale;

    let total_stages = duration_minutes.min(MAX_STAGES);
    let stage_secs = {
        let secs = (60.0 / time_scale).round();
        if secs < 1.0 { 1 } else { secs as u64 }
    };

    let mean_rate = model.baseline.mean * scale;
    let mut stages = Vec::with_capacity(total_stages as usize);
    let mut peak = 1u64;
    for i in 0..total_stages {
        let sim_hours = i as f64 / 60.0;
        let mut rate = mean_rate;
        for coeff in &model.baseline.coefficients {
            let angular = TAU * (coeff.frequency * 60.0 * time_scale);
            rate += coeff.amplitude * (angular * sim_hours + coeff.phase).sin() * scale;
        }
        let target = clamp_rate(rate);
        peak = peak.max(target);
        stages.push(Stage {
            duration_secs: stage_secs,
            target,
        });
    }

    let start_rate = clamp_rate(mean_rate);
    let pre_allocated_vus = (mean_rate * 2.0).ceil().max(1.0) as u64;
    let max_vus = ((peak as f64) * 2.0).ceil() as u64;

    Scenario {
        name: "baseline",
        exec: None,
        executor: Executor::RampingArrivalRate {
            start_rate,
            pre_allocated_vus,
            max_vus,
            stages,
        },
    }
}

/// Replay detected spike events as a shared iteration budget: enough VUs to
/// reproduce the average surge height, one batch of iterations per run.
fn spike_scenario(model: &TrafficModel, opts: &GenerateOptions) -> Scenario {
    let events = &model.spikes.events;
    let avg_magnitude =
        events.iter().map(|e| e.magnitude).sum::<f64>() / events.len() as f64;

    let vus = (avg_magnitude * opts.scale / 10.0).ceil().max(1.0) as u64;
    let iterations = (events.len() as f64 * opts.scale * opts.time_scale)
        .round()
        .max(1.0) as u64;
    let max_duration_minutes = {
        let mins = (10.0 / opts.time_scale).round();
        if mins < 1.0 { 1 } else { mins as u64 }
    };

    Scenario {
        name: "spikes",
        exec: Some("spikeTraffic"),
        executor: Executor::SharedIterations {
            vus,
            iterations,
            start_secs: 30,
            max_duration_minutes,
        },
    }
}

/// One extra scenario per classified shape. Exhaustive over [`PatternType`]:
/// a new pattern kind will not compile until it gets a row here.
fn pattern_scenario(model: &TrafficModel, opts: &GenerateOptions) -> Option<Scenario> {
    let scale = opts.scale;
    let ts = opts.time_scale;
    let stats = &model.statistics;

    match model.pattern.kind {
        PatternType::BusinessHoursHeavy => {
            let rate = clamp_rate(stats.p95 * scale);
            Some(Scenario {
                name: "rush_hour",
                exec: Some("rushHourTraffic"),
                executor: Executor::ConstantArrivalRate {
                    rate,
                    duration_minutes: compress_minutes(120.0, ts),
                    start_minutes: compress_minutes(30.0, ts),
                    pre_allocated_vus: rate,
                    max_vus: rate * 2,
                },
            })
        }
        PatternType::BusinessHoursNormal => {
            let plateau = clamp_rate(stats.p95 * scale);
            let trough = clamp_rate(model.baseline.mean * 0.3 * scale);
            let stages = vec![
                Stage {
                    duration_secs: compress_minutes(120.0, ts) * 60,
                    target: plateau,
                },
                Stage {
                    duration_secs: compress_minutes(360.0, ts) * 60,
                    target: plateau,
                },
                Stage {
                    duration_secs: compress_minutes(120.0, ts) * 60,
                    target: trough,
                },
            ];
            Some(Scenario {
                name: "business_hours",
                exec: Some("businessHoursTraffic"),
                executor: Executor::RampingArrivalRate {
                    start_rate: trough,
                    pre_allocated_vus: (model.baseline.mean * scale * 2.0).ceil().max(1.0) as u64,
                    max_vus: plateau * 2,
                    stages,
                },
            })
        }
        PatternType::Bursty => {
            let max_vus = clamp_rate(stats.max * scale);
            Some(Scenario {
                name: "bursts",
                exec: Some("burstTraffic"),
                executor: Executor::ExternallyControlled {
                    vus: (max_vus / 10).max(1),
                    max_vus,
                    duration_minutes: compress_minutes(60.0, ts),
                    start_minutes: compress_minutes(15.0, ts),
                },
            })
        }
        PatternType::WeeklyBatch => {
            let rate = clamp_rate(stats.p99 * scale);
            Some(Scenario {
                name: "weekly_batch",
                exec: Some("batchTraffic"),
                executor: Executor::ConstantArrivalRate {
                    rate,
                    duration_minutes: compress_minutes(30.0, ts),
                    start_minutes: compress_minutes(60.0, ts),
                    pre_allocated_vus: rate,
                    max_vus: rate * 2,
                },
            })
        }
        PatternType::Steady | PatternType::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_model, with_pattern};

    fn opts() -> GenerateOptions {
        GenerateOptions::new("http://localhost:8080")
    }

    fn baseline_stages(scenarios: &[Scenario]) -> &[Stage] {
        match &scenarios[0].executor {
            Executor::RampingArrivalRate { stages, .. } => stages,
            other => panic!("baseline should be ramping-arrival-rate, got {}", other.kind()),
        }
    }

    #[test]
    fn test_two_hour_run_yields_120_one_minute_stages() {
        let mut opts = opts();
        opts.duration = "2h".to_string();
        let scenarios = synthesize(&sample_model(), &opts).unwrap();

        let stages = baseline_stages(&scenarios);
        assert_eq!(stages.len(), 120);
        assert!(stages.iter().all(|s| s.duration_secs == 60));
    }

    #[test]
    fn test_time_compression_halves_stage_length() {
        let mut opts = opts();
        opts.duration = "2h".to_string();
        opts.time_scale = 2.0;
        let scenarios = synthesize(&sample_model(), &opts).unwrap();

        let stages = baseline_stages(&scenarios);
        assert_eq!(stages.len(), 120);
        assert!(stages.iter().all(|s| s.duration_secs == 30));
    }

    #[test]
    fn test_stage_count_caps_at_one_simulated_day() {
        let mut opts = opts();
        opts.duration = "48h".to_string();
        opts.time_scale = 2.0;
        let scenarios = synthesize(&sample_model(), &opts).unwrap();
        assert_eq!(baseline_stages(&scenarios).len(), 1440);
    }

    #[test]
    fn test_stage_targets_never_drop_below_one() {
        // Amplitudes dwarf the mean, so the raw curve dips far below zero.
        let mut model = sample_model();
        model.baseline.mean = 0.4;
        model.baseline.coefficients[0].amplitude = -80.0;
        let mut opts = opts();
        opts.scale = 0.25;

        let scenarios = synthesize(&model, &opts).unwrap();
        assert!(baseline_stages(&scenarios).iter().all(|s| s.target >= 1));
    }

    #[test]
    fn test_baseline_pool_sizing() {
        let model = sample_model();
        let scenarios = synthesize(&model, &opts()).unwrap();
        let Executor::RampingArrivalRate {
            pre_allocated_vus,
            max_vus,
            stages,
            ..
        } = &scenarios[0].executor
        else {
            panic!("baseline executor kind changed");
        };

        let expected_pre = (model.baseline.mean * 2.0).ceil() as u64;
        let peak = stages.iter().map(|s| s.target).max().unwrap();
        assert_eq!(*pre_allocated_vus, expected_pre);
        assert_eq!(*max_vus, peak * 2);
    }

    #[test]
    fn test_spike_scenario_parameters() {
        let model = sample_model(); // three events, magnitudes 40/60/80
        let mut opts = opts();
        opts.scale = 2.0;
        opts.time_scale = 4.0;

        let scenarios = synthesize(&model, &opts).unwrap();
        let spikes = scenarios.iter().find(|s| s.name == "spikes").unwrap();
        assert_eq!(spikes.exec, Some("spikeTraffic"));
        let Executor::SharedIterations {
            vus,
            iterations,
            start_secs,
            max_duration_minutes,
        } = &spikes.executor
        else {
            panic!("spikes executor kind changed");
        };

        // avg magnitude 60, scaled x2, one VU per 10 req/s of surge
        assert_eq!(*vus, 12);
        // 3 events * scale 2 * timeScale 4
        assert_eq!(*iterations, 24);
        assert_eq!(*start_secs, 30);
        // round(10 / 4) = 3 (half away from zero)
        assert_eq!(*max_duration_minutes, 3);
    }

    #[test]
    fn test_no_spike_scenario_without_events() {
        let mut model = sample_model();
        model.spikes.events.clear();
        let scenarios = synthesize(&model, &opts()).unwrap();
        assert!(scenarios.iter().all(|s| s.name != "spikes"));
    }

    #[test]
    fn test_pattern_dispatch_is_exhaustive_and_exact() {
        for kind in PatternType::ALL {
            let model = with_pattern(sample_model(), kind);
            let scenarios = synthesize(&model, &opts()).unwrap();
            let extra: Vec<_> = scenarios
                .iter()
                .filter(|s| s.name != "baseline" && s.name != "spikes")
                .collect();

            match kind {
                PatternType::Steady | PatternType::Other => assert!(extra.is_empty()),
                _ => {
                    assert_eq!(extra.len(), 1, "{kind:?} should add exactly one scenario");
                    let expected_kind = match kind {
                        PatternType::BusinessHoursHeavy => "constant-arrival-rate",
                        PatternType::BusinessHoursNormal => "ramping-arrival-rate",
                        PatternType::Bursty => "externally-controlled",
                        PatternType::WeeklyBatch => "constant-arrival-rate",
                        _ => unreachable!(),
                    };
                    assert_eq!(extra[0].executor.kind(), expected_kind);
                }
            }
        }
    }

    #[test]
    fn test_rush_hour_uses_p95_and_compressed_windows() {
        let model = with_pattern(sample_model(), PatternType::BusinessHoursHeavy);
        let mut opts = opts();
        opts.time_scale = 4.0;
        let scenarios = synthesize(&model, &opts).unwrap();

        let rush = scenarios.iter().find(|s| s.name == "rush_hour").unwrap();
        let Executor::ConstantArrivalRate {
            rate,
            duration_minutes,
            start_minutes,
            ..
        } = &rush.executor
        else {
            panic!("rush_hour executor kind changed");
        };
        assert_eq!(*rate, model.statistics.p95.round() as u64);
        assert_eq!(*duration_minutes, 30); // 120 / 4
        assert_eq!(*start_minutes, 8); // round(30 / 4) = 8
    }

    #[test]
    fn test_business_hours_ramp_shape() {
        let model = with_pattern(sample_model(), PatternType::BusinessHoursNormal);
        let scenarios = synthesize(&model, &opts()).unwrap();

        let ramp = scenarios.iter().find(|s| s.name == "business_hours").unwrap();
        let Executor::RampingArrivalRate { stages, .. } = &ramp.executor else {
            panic!("business_hours executor kind changed");
        };
        assert_eq!(stages.len(), 3);
        let plateau = clamp_rate(model.statistics.p95);
        let trough = clamp_rate(model.baseline.mean * 0.3);
        assert_eq!(stages[0].target, plateau);
        assert_eq!(stages[1].target, plateau);
        assert_eq!(stages[2].target, trough);
        assert_eq!(stages[0].duration_secs, 120 * 60);
        assert_eq!(stages[1].duration_secs, 360 * 60);
        assert_eq!(stages[2].duration_secs, 120 * 60);
    }

    #[test]
    fn test_windows_floor_at_one_minute_under_extreme_compression() {
        let model = with_pattern(sample_model(), PatternType::WeeklyBatch);
        let mut opts = opts();
        opts.time_scale = 500.0;
        let scenarios = synthesize(&model, &opts).unwrap();

        let batch = scenarios.iter().find(|s| s.name == "weekly_batch").unwrap();
        let Executor::ConstantArrivalRate {
            duration_minutes,
            start_minutes,
            ..
        } = &batch.executor
        else {
            panic!("weekly_batch executor kind changed");
        };
        assert_eq!(*duration_minutes, 1);
        assert_eq!(*start_minutes, 1);

        // Stage lengths floor at one second.
        assert!(baseline_stages(&scenarios).iter().all(|s| s.duration_secs == 1));
    }

    #[test]
    fn test_malformed_duration_is_rejected() {
        let mut opts = opts();
        opts.duration = "soon".to_string();
        let err = synthesize(&sample_model(), &opts).unwrap_err();
        assert!(matches!(err, CadenceError::DurationFormat { .. }));
    }

    #[test]
    fn test_non_positive_scale_is_rejected_before_synthesis() {
        let mut opts = opts();
        opts.scale = -1.0;
        let err = synthesize(&sample_model(), &opts).unwrap_err();
        assert!(matches!(err, CadenceError::InvalidOption { name: "scale", .. }));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let model = sample_model();
        let o = opts();
        assert_eq!(synthesize(&model, &o).unwrap(), synthesize(&model, &o).unwrap());
    }
}
