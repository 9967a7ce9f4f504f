//! cadence - compile a learned traffic model into a k6 load-test script.
//!
//! Usage:
//!   cadence generate --model traffic-model.json --target https://api.example.com
//!   cadence generate --model traffic-model.json --target https://api.example.com \
//!       --duration 2h --scale 0.5 --time-scale 24 --headers 'X-Tenant:acme' --out load-test.js

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;

use cadence::error::CadenceError;
use cadence::model::{TrafficModel, load_model};
use cadence::options::{GenerateOptions, parse_headers};
use cadence::{emit, synthesize, validate};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Compile learned traffic models into k6 load-test scripts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug-level pipeline output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a traffic model and generate a k6 script from it
    Generate {
        /// Traffic model file (JSON, produced by the analysis phase)
        #[arg(short, long, default_value = "traffic-model.json")]
        model: PathBuf,

        /// Base URL the generated script will hit
        #[arg(short, long)]
        target: String,

        /// Simulated test duration (e.g. 90m, 2h)
        #[arg(short, long, default_value = "1h")]
        duration: String,

        /// Uniform multiplier on all rate magnitudes
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Simulated-to-wall-clock time compression (24 = one day per hour)
        #[arg(long, default_value_t = 1.0)]
        time_scale: f64,

        /// Request headers: JSON object ('{"A":"B"}') or pair list ('A:B,C:D')
        #[arg(long)]
        headers: Option<String>,

        /// Output script file
        #[arg(short, long, default_value = "load-test.js")]
        out: PathBuf,
    },

    /// Validate a traffic model without generating anything
    Check {
        /// Traffic model file (JSON, produced by the analysis phase)
        #[arg(short, long, default_value = "traffic-model.json")]
        model: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Generate {
            model,
            target,
            duration,
            scale,
            time_scale,
            headers,
            out,
        } => run_generate(model, target, duration, scale, time_scale, headers, out),
        Commands::Check { model } => run_check(model),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    model_path: PathBuf,
    target: String,
    duration: String,
    scale: f64,
    time_scale: f64,
    headers: Option<String>,
    out: PathBuf,
) -> Result<(), CadenceError> {
    // Resolve options once, up front; everything downstream takes them as-is.
    let mut opts = GenerateOptions::new(target);
    opts.duration = duration;
    opts.scale = scale;
    opts.time_scale = time_scale;
    if let Some(raw) = headers {
        opts.headers = parse_headers(&raw)?;
    }
    opts.ensure_valid()?;

    info!("loading model from {}", model_path.display());
    let raw = load_model(&model_path)?;
    let validated = validate(&raw).inspect_err(|_| {
        tracing::error!("model {} failed validation", model_path.display());
    })?;
    info!("model validated ({} warnings)", validated.warnings.len());

    let scenarios = synthesize(&validated.model, &opts)?;
    let script = emit(&validated.model, &scenarios, &opts);

    fs::write(&out, &script).map_err(|e| CadenceError::ScriptWrite {
        path: out.clone(),
        source: e,
    })?;

    info!(
        "wrote {} scenario(s) to {}",
        scenarios.len(),
        out.display()
    );
    print_model_summary(&validated.model, &scenarios.iter().map(|s| s.name).collect::<Vec<_>>());
    Ok(())
}

fn run_check(model_path: PathBuf) -> Result<(), CadenceError> {
    let raw = load_model(&model_path)?;
    let validated = validate(&raw).inspect_err(|_| {
        tracing::error!("model {} failed validation", model_path.display());
    })?;
    info!(
        "{} is valid ({} warnings)",
        model_path.display(),
        validated.warnings.len()
    );
    print_model_summary(&validated.model, &[]);
    Ok(())
}

fn print_model_summary(model: &TrafficModel, scenario_names: &[&str]) {
    let stats = &model.statistics;
    eprintln!("╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║                    Traffic Model Summary                     ║");
    eprintln!("╠══════════════════════════════════════════════════════════════╣");
    eprintln!(
        "║ Pattern: {:<34} confidence {:.2} ║",
        model.pattern.kind.as_str(),
        model.pattern.confidence
    );
    eprintln!(
        "║ Baseline mean: {:<10.2} req/s   range: {:>8.2} - {:<8.2} ║",
        model.baseline.mean, stats.min, stats.max
    );
    eprintln!(
        "║ P95: {:<10.2} req/s           P99: {:<10.2} req/s       ║",
        stats.p95, stats.p99
    );
    eprintln!(
        "║ Periodic components: {:<6}     spike events: {:<10}     ║",
        model.baseline.coefficients.len(),
        model.spikes.events.len()
    );
    if !scenario_names.is_empty() {
        eprintln!("║ Scenarios: {:<49} ║", scenario_names.join(", "));
    }
    eprintln!("╚══════════════════════════════════════════════════════════════╝");
}
