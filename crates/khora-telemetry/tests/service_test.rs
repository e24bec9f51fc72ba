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

//! End-to-end runs of the telemetry service against a scripted runtime.

mod common;

use anyhow::Result;
use approx::assert_relative_eq;
use common::{pipeline_script, ScriptedRuntime};
use khora_core::{InitContext, TelemetryError};
use khora_telemetry::report::json::{read_report, write_report};
use khora_telemetry::report::terminal::render_summary;
use khora_telemetry::{
    HandoffPair, RuntimeInfo, SessionState, TelemetryRunConfig, TelemetryService,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tempfile::tempdir;

fn config(frames: usize, variance: &[&str]) -> TelemetryRunConfig {
    TelemetryRunConfig {
        frames,
        variance_specs: variance.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn test_run_produces_summary_and_verdicts() -> Result<()> {
    let mut runtime = ScriptedRuntime::new(pipeline_script()).with_modules(&["physics", "geometry"]);
    let mut service = TelemetryService::new(config(3, &["geometry.deform:5", "physics.integrate:5"]))?;
    let info = RuntimeInfo::describe("libengine_runtime.so", &runtime);

    let report = service.run(&mut runtime, info)?;

    assert_eq!(report.frames.len(), 3);
    assert_relative_eq!(report.summary.category_totals_ms["physics"], 3.0, epsilon = 1e-9);
    assert_relative_eq!(report.summary.category_totals_ms["geometry"], 6.0, epsilon = 1e-9);
    assert_relative_eq!(report.summary.total_ms, 9.0, epsilon = 1e-9);
    assert_relative_eq!(report.summary.handoff_ms, 9.0, epsilon = 1e-9);
    assert_eq!(report.variance.len(), 2);
    assert!(report.all_checks_passed());
    assert_eq!(report.runtime.modules, ["physics", "geometry"]);
    assert!(report.runtime.features.has_module_registry);
    assert!(report.diagnostics.is_none());

    assert_eq!(service.state(), SessionState::Shutdown);
    assert_eq!(runtime.shutdowns, 1);
    Ok(())
}

#[test]
fn test_run_walks_every_lifecycle_state() -> Result<()> {
    let mut runtime = ScriptedRuntime::new(pipeline_script());
    let mut service = TelemetryService::new(config(2, &[]))?;
    assert_eq!(service.state(), SessionState::Unbound);
    assert!(service.lifecycle().is_empty());

    service.run(&mut runtime, RuntimeInfo::default())?;

    assert_eq!(
        service.lifecycle(),
        [
            SessionState::Bound,
            SessionState::Initialized,
            SessionState::Capturing,
            SessionState::Initialized,
            SessionState::Shutdown,
        ]
    );
    Ok(())
}

#[test]
fn test_failed_check_is_reported_not_raised() -> Result<()> {
    let mut runtime = ScriptedRuntime::new(vec![
        vec![(Some("geometry.deform"), 1.0)],
        vec![(Some("geometry.deform"), 2.0)],
        vec![(Some("geometry.deform"), 0.5)],
    ]);
    let mut service = TelemetryService::new(config(3, &["geometry.deform:10"]))?;

    let report = service.run(&mut runtime, RuntimeInfo::default())?;

    assert!(!report.all_checks_passed());
    assert_eq!(report.failed_checks().count(), 1);
    Ok(())
}

#[test]
fn test_invalid_spec_rejected_before_runtime_calls() {
    for specs in [&["invalid"][..], &[":3"][..], &["geometry.deform:-1"][..]] {
        let err = TelemetryService::new(config(3, specs)).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidVarianceSpec(_)));
    }

    let err = TelemetryService::new(TelemetryRunConfig {
        trim_fraction: 0.5,
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, TelemetryError::InvalidVarianceSpec(_)));
}

#[test]
fn test_missing_dispatch_fails_after_shutdown() -> Result<()> {
    let mut runtime = ScriptedRuntime::new(pipeline_script());
    let mut service = TelemetryService::new(config(2, &["animation.skin:5"]))?;

    let err = service.run(&mut runtime, RuntimeInfo::default()).unwrap_err();

    assert!(matches!(err, TelemetryError::NoMatchingDispatch { .. }));
    assert_eq!(runtime.shutdowns, 1);
    Ok(())
}

#[test]
fn test_shutdown_runs_when_capture_panics() -> Result<()> {
    let mut runtime = ScriptedRuntime::new(pipeline_script()).panicking_on_tick(2);
    let mut service = TelemetryService::new(config(5, &[]))?;

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        service.run(&mut runtime, RuntimeInfo::default())
    }));

    assert!(outcome.is_err());
    assert_eq!(runtime.shutdowns, 1);
    assert_eq!(runtime.ticks, 2);
    Ok(())
}

#[test]
fn test_run_collects_diagnostics_and_init_context() -> Result<()> {
    let mut runtime = ScriptedRuntime::new(pipeline_script()).with_diagnostics();
    let mut service = TelemetryService::new(TelemetryRunConfig {
        frames: 4,
        init: InitContext::with_window_backend("headless"),
        ..Default::default()
    })?;

    let report = service.run(&mut runtime, RuntimeInfo::default())?;

    let diagnostics = report.diagnostics.as_ref().unwrap();
    assert_eq!(diagnostics.tick_count, 4);
    assert_eq!(diagnostics.initialize_count, 1);
    assert_eq!(diagnostics.shutdown_count, 0);
    assert_eq!(
        runtime.init_context.as_ref().and_then(|c| c.window_backend.as_deref()),
        Some("headless")
    );
    assert!(render_summary(&report, false).contains("Runtime diagnostics:"));
    Ok(())
}

#[test]
fn test_custom_handoff_pair() -> Result<()> {
    let mut runtime = ScriptedRuntime::new(vec![vec![
        (Some("physics.integrate"), 1.0),
        (Some("animation.skin"), 3.0),
        (Some("render.submit"), 0.5),
    ]]);
    let mut service = TelemetryService::new(TelemetryRunConfig {
        handoff: HandoffPair::new("animation", "render"),
        ..Default::default()
    })?;

    let report = service.run(&mut runtime, RuntimeInfo::default())?;

    assert_relative_eq!(report.summary.handoff_ms, 3.5);
    assert!(render_summary(&report, false).contains("Animation→Render hand-off: 3.5000 ms"));
    Ok(())
}

#[test]
fn test_report_survives_json_round_trip() -> Result<()> {
    let mut runtime = ScriptedRuntime::new(pipeline_script()).with_diagnostics();
    let mut service = TelemetryService::new(config(3, &["geometry.deform:5"]))?;
    let info = RuntimeInfo::describe("engine_runtime", &runtime);
    let report = service.run(&mut runtime, info)?;

    let dir = tempdir()?;
    let path = dir.path().join("reports").join("telemetry.json");
    write_report(&report, &path)?;
    let restored = read_report(&path)?;

    assert_eq!(restored, report);
    Ok(())
}
