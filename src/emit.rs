//! Script emission: serialize scenarios and behavior functions into one k6
//! JavaScript artifact.
//!
//! The output is a pure function of (model, scenarios, options) except for a
//! single generation timestamp in the header comment. All duration
//! presentation (seconds vs minutes vs hours) happens here; upstream stages
//! deal only in numbers.

use chrono::{SecondsFormat, Utc};

use crate::model::{PatternType, TrafficModel};
use crate::options::GenerateOptions;
use crate::scenario::{Executor, Scenario, Stage};

/// Render the full script.
///
/// `opts.target` and every header key and value are embedded **verbatim**:
/// no escaping is applied. Callers must guarantee these values contain no
/// script-breaking sequences (`'`, `"`, `\`, backticks, `${`); the CLI
/// forwards user input under that contract.
pub fn emit(model: &TrafficModel, scenarios: &[Scenario], opts: &GenerateOptions) -> String {
    let mut out = String::with_capacity(8 * 1024);

    write_header(&mut out, model);
    write_request_setup(&mut out, opts);
    write_options_block(&mut out, scenarios);
    write_behaviors(&mut out, model.pattern.kind, scenarios);
    write_summary_handler(&mut out);

    out
}

fn write_header(out: &mut String, model: &TrafficModel) {
    out.push_str("// k6 load-test script generated by cadence\n");
    out.push_str(&format!(
        "// Source metric: {} ({} lookback, {} samples)\n",
        model.metadata.metric, model.metadata.duration, model.metadata.samples
    ));
    out.push_str(&format!(
        "// Pattern: {} (confidence {:.2})\n",
        model.pattern.kind.as_str(),
        model.pattern.confidence
    ));
    out.push_str(&format!(
        "// Generated at: {}\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out.push_str("// Regenerate from the traffic model instead of editing by hand.\n\n");
    out.push_str("import http from 'k6/http';\n");
    out.push_str("import { check, sleep } from 'k6';\n\n");
}

fn write_request_setup(out: &mut String, opts: &GenerateOptions) {
    out.push_str(&format!("const TARGET = '{}';\n", opts.target));
    if opts.headers.is_empty() {
        out.push_str("const PARAMS = { headers: {} };\n\n");
    } else {
        out.push_str("const PARAMS = {\n  headers: {\n");
        for (key, value) in &opts.headers {
            out.push_str(&format!("    '{key}': '{value}',\n"));
        }
        out.push_str("  },\n};\n\n");
    }
}

fn write_options_block(out: &mut String, scenarios: &[Scenario]) {
    out.push_str("export const options = {\n  scenarios: {\n");
    for scenario in scenarios {
        write_scenario(out, scenario);
    }
    out.push_str("  },\n};\n\n");
}

fn write_scenario(out: &mut String, scenario: &Scenario) {
    out.push_str(&format!("    {}: {{\n", scenario.name));
    out.push_str(&format!("      executor: '{}',\n", scenario.executor.kind()));

    match &scenario.executor {
        Executor::RampingArrivalRate {
            start_rate,
            pre_allocated_vus,
            max_vus,
            stages,
        } => {
            out.push_str(&format!("      startRate: {start_rate},\n"));
            out.push_str("      timeUnit: '1s',\n");
            out.push_str(&format!("      preAllocatedVUs: {pre_allocated_vus},\n"));
            out.push_str(&format!("      maxVUs: {max_vus},\n"));
            out.push_str("      stages: [\n");
            for Stage {
                duration_secs,
                target,
            } in stages
            {
                out.push_str(&format!(
                    "        {{ target: {target}, duration: '{}' }},\n",
                    fmt_seconds(*duration_secs)
                ));
            }
            out.push_str("      ],\n");
        }
        Executor::SharedIterations {
            vus,
            iterations,
            start_secs,
            max_duration_minutes,
        } => {
            out.push_str(&format!("      vus: {vus},\n"));
            out.push_str(&format!("      iterations: {iterations},\n"));
            out.push_str(&format!("      startTime: '{start_secs}s',\n"));
            out.push_str(&format!(
                "      maxDuration: '{}',\n",
                fmt_minutes(*max_duration_minutes)
            ));
        }
        Executor::ConstantArrivalRate {
            rate,
            duration_minutes,
            start_minutes,
            pre_allocated_vus,
            max_vus,
        } => {
            out.push_str(&format!("      rate: {rate},\n"));
            out.push_str("      timeUnit: '1s',\n");
            out.push_str(&format!(
                "      duration: '{}',\n",
                fmt_minutes(*duration_minutes)
            ));
            out.push_str(&format!(
                "      startTime: '{}',\n",
                fmt_minutes(*start_minutes)
            ));
            out.push_str(&format!("      preAllocatedVUs: {pre_allocated_vus},\n"));
            out.push_str(&format!("      maxVUs: {max_vus},\n"));
        }
        Executor::ExternallyControlled {
            vus,
            max_vus,
            duration_minutes,
            start_minutes,
        } => {
            out.push_str(&format!("      vus: {vus},\n"));
            out.push_str(&format!("      maxVUs: {max_vus},\n"));
            out.push_str(&format!(
                "      duration: '{}',\n",
                fmt_minutes(*duration_minutes)
            ));
            out.push_str(&format!(
                "      startTime: '{}',\n",
                fmt_minutes(*start_minutes)
            ));
        }
    }

    if let Some(exec) = scenario.exec {
        out.push_str(&format!("      exec: '{exec}',\n"));
    }
    out.push_str("    },\n");
}

/// Think-time (sleep) expression per classified pattern. Closed table:
/// the five classified shapes plus the catch-all.
fn think_time(kind: PatternType) -> &'static str {
    match kind {
        PatternType::BusinessHoursHeavy => "Math.random() * 1.5 + 0.5",
        PatternType::BusinessHoursNormal => "Math.random() * 3 + 1",
        PatternType::Bursty => "Math.random() * 0.5 + 0.1",
        PatternType::WeeklyBatch => "Math.random() * 5 + 2",
        PatternType::Steady => "Math.random() * 2 + 1",
        PatternType::Other => "Math.random() * 2 + 1",
    }
}

fn write_behaviors(out: &mut String, kind: PatternType, scenarios: &[Scenario]) {
    out.push_str("function hit() {\n");
    out.push_str("  const res = http.get(TARGET, PARAMS);\n");
    out.push_str("  check(res, { 'status is 2xx': (r) => r.status >= 200 && r.status < 300 });\n");
    out.push_str("  return res;\n}\n\n");

    out.push_str("export default function () {\n");
    out.push_str("  hit();\n");
    out.push_str(&format!("  sleep({});\n}}\n\n", think_time(kind)));

    for scenario in scenarios {
        let Some(exec) = scenario.exec else { continue };
        // Spike replay hammers with minimal pauses; the pattern-specific
        // behaviors reuse the classified think-time.
        let sleep_expr = if exec == "spikeTraffic" {
            "Math.random() * 0.3 + 0.1"
        } else {
            think_time(kind)
        };
        out.push_str(&format!("export function {exec}() {{\n"));
        out.push_str("  hit();\n");
        out.push_str(&format!("  sleep({sleep_expr});\n}}\n\n"));
    }
}

fn write_summary_handler(out: &mut String) {
    out.push_str(
        r#"export function handleSummary(data) {
  const lines = ['', '================ load test summary ================'];
  const metrics = data.metrics || {};
  for (const name of Object.keys(metrics).sort()) {
    const values = metrics[name].values || {};
    const parts = Object.keys(values)
      .sort()
      .map((key) => key + '=' + Number(values[key]).toFixed(2));
    lines.push('  ' + name + ': ' + parts.join(' '));
  }
  lines.push('===================================================', '');
  return { stdout: lines.join('\n') };
}
"#,
    );
}

/// Stage lengths: seconds below ten minutes, then minutes, then whole hours.
fn fmt_seconds(secs: u64) -> String {
    if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 600 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

/// Scenario windows: minutes, promoted to hours on whole-hour boundaries.
fn fmt_minutes(minutes: u64) -> String {
    if minutes >= 60 && minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{minutes}m")
    }
}
