// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Human-readable rendering of reports.

use super::TelemetryReport;
use crate::analysis::variance::VarianceResult;
use khora_core::telemetry::RuntimeDiagnosticsSnapshot;

/// Renders category totals, the frame total, and the hand-off total.
///
/// Diagnostics are appended when the report carries them; `verbose` adds a
/// per-frame dispatch listing.
pub fn render_summary(report: &TelemetryReport, verbose: bool) -> String {
    let summary = &report.summary;
    let mut lines = vec!["Aggregate category totals (ms):".to_string()];
    for (category, value) in &summary.category_totals_ms {
        lines.push(format!("  {category:>10}: {value:8.4}"));
    }
    lines.push(format!("Total recorded frame time: {:.4} ms", summary.total_ms));
    lines.push(format!(
        "{}→{} hand-off: {:.4} ms",
        capitalize(&summary.handoff.upstream),
        capitalize(&summary.handoff.downstream),
        summary.handoff_ms
    ));

    if let Some(diagnostics) = &report.diagnostics {
        lines.push(String::new());
        render_diagnostics(diagnostics, &mut lines);
    }

    if verbose {
        lines.push(String::new());
        lines.push("Per-frame dispatch timings:".to_string());
        for frame in &report.frames {
            lines.push(format!(
                "Frame {} (sim {:.6}s)",
                frame.index, frame.simulation_time
            ));
            for dispatch in frame.dispatches() {
                lines.push(format!(
                    "  {:<24} {:<10} {:8.4} ms",
                    dispatch.name, dispatch.category, dispatch.duration_ms
                ));
            }
            lines.push(format!(
                "{:<40}{:8.4} ms",
                "  -- frame total --", frame.frame_total_ms()
            ));
        }
    }

    lines.join("\n")
}

/// Renders one verdict line per variance check.
pub fn render_variance(results: &[VarianceResult]) -> String {
    results
        .iter()
        .map(|result| {
            format!(
                "[{}] {}: {:.2}% (limit {:.2}%, mean {:.4} ms, stdev {:.4} ms, {}/{} samples)",
                if result.passed { "PASS" } else { "FAIL" },
                result.check.dispatch_name,
                result.percent,
                result.check.max_percent,
                result.mean_ms,
                result.stdev_ms,
                result.durations_ms.len(),
                result.total_samples
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_diagnostics(diagnostics: &RuntimeDiagnosticsSnapshot, lines: &mut Vec<String>) {
    lines.push("Runtime diagnostics:".to_string());
    lines.push(format!(
        "  lifecycle: {} init ({:.4} ms), {} ticks (last {:.4} ms, avg {:.4} ms, max {:.4} ms), {} shutdown ({:.4} ms)",
        diagnostics.initialize_count,
        diagnostics.last_initialize_ms,
        diagnostics.tick_count,
        diagnostics.last_tick_ms,
        diagnostics.average_tick_ms,
        diagnostics.max_tick_ms,
        diagnostics.shutdown_count,
        diagnostics.last_shutdown_ms
    ));
    if !diagnostics.stages.is_empty() {
        lines.push("  stages:".to_string());
        for stage in &diagnostics.stages {
            lines.push(format!(
                "    {:<20} last {:8.4} ms  avg {:8.4} ms  max {:8.4} ms  ({} samples)",
                stage.name, stage.last_ms, stage.average_ms, stage.max_ms, stage.sample_count
            ));
        }
    }
    if !diagnostics.subsystems.is_empty() {
        lines.push("  subsystems:".to_string());
        for subsystem in &diagnostics.subsystems {
            lines.push(format!(
                "    {:<20} tick last {:8.4} ms  max {:8.4} ms  ({} ticks, {} init, {} shutdown)",
                subsystem.name,
                subsystem.last_tick_ms,
                subsystem.max_tick_ms,
                subsystem.tick_count,
                subsystem.initialize_count,
                subsystem.shutdown_count
            ));
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
