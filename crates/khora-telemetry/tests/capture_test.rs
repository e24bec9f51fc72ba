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

//! Integration tests for frame capture and the runtime session lifecycle.

mod common;

use approx::assert_relative_eq;
use common::{pipeline_script, ScriptedRuntime, NATIVE_CLOCK_OFFSET};
use khora_core::InitContext;
use khora_telemetry::{capture_frames, read_diagnostics, FrameDriver, RuntimeSession, SessionState};
use std::panic::{catch_unwind, AssertUnwindSafe};

#[test]
fn test_capture_preserves_dispatch_order() {
    let mut runtime = ScriptedRuntime::new(vec![vec![
        (Some("geometry.deform"), 0.5),
        (Some("physics.integrate"), 0.25),
        (Some("animation.skin"), 0.125),
    ]]);

    let frames = capture_frames(&mut runtime, 2, 0.016);

    assert_eq!(frames.len(), 2);
    for (index, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index, index);
        let names: Vec<&str> = frame.dispatches().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["geometry.deform", "physics.integrate", "animation.skin"]);
        assert_relative_eq!(frame.frame_total_ms(), 0.875);
    }
}

#[test]
fn test_local_clock_accumulates_exactly() {
    let mut runtime = ScriptedRuntime::new(pipeline_script());

    let frames = capture_frames(&mut runtime, 5, 0.016);

    let mut expected = 0.0;
    for frame in &frames {
        expected += 0.016;
        assert_eq!(frame.simulation_time, expected);
        assert_eq!(frame.timestep, 0.016);
    }
}

#[test]
fn test_native_clock_is_preferred() {
    let mut runtime = ScriptedRuntime::new(pipeline_script()).with_native_clock();

    let frames = capture_frames(&mut runtime, 2, 0.5);

    assert_relative_eq!(frames[0].simulation_time, NATIVE_CLOCK_OFFSET + 0.5);
    assert_relative_eq!(frames[1].simulation_time, NATIVE_CLOCK_OFFSET + 1.0);
}

#[test]
fn test_null_dispatch_name_is_unknown() {
    let mut runtime = ScriptedRuntime::new(vec![vec![(None, 0.3), (Some("physics.step"), 0.2)]]);

    let frames = capture_frames(&mut runtime, 1, 0.016);
    let dispatch = &frames[0].dispatches()[0];

    assert_eq!(dispatch.name, "");
    assert_eq!(dispatch.category, "unknown");
    assert_relative_eq!(frames[0].category_totals_ms()["unknown"], 0.3);
}

#[test]
fn test_empty_frames_have_zero_totals() {
    let mut runtime = ScriptedRuntime::new(Vec::new());

    let frames = capture_frames(&mut runtime, 3, 0.016);

    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|f| f.dispatches().is_empty() && f.frame_total_ms() == 0.0));
}

#[test]
fn test_session_brackets_lifecycle() {
    let mut runtime = ScriptedRuntime::new(pipeline_script());
    {
        let mut session = RuntimeSession::start(&mut runtime, &InitContext::default());
        assert_eq!(session.state(), SessionState::Initialized);
        let frames = session.capture(&FrameDriver::new(2, 0.016));
        assert_eq!(frames.len(), 2);
        assert_eq!(session.state(), SessionState::Initialized);
    }

    assert_eq!(
        runtime.calls,
        ["configure_default_modules", "initialize", "tick", "tick", "shutdown"]
    );
    assert_eq!(runtime.shutdowns, 1);
}

#[test]
fn test_finish_returns_state_history() {
    let mut runtime = ScriptedRuntime::new(pipeline_script());
    let mut session = RuntimeSession::start(&mut runtime, &InitContext::default());
    assert_eq!(session.transitions(), [SessionState::Bound, SessionState::Initialized]);

    session.capture(&FrameDriver::new(1, 0.016));
    let history = session.finish();

    assert_eq!(
        history,
        [
            SessionState::Bound,
            SessionState::Initialized,
            SessionState::Capturing,
            SessionState::Initialized,
            SessionState::Shutdown,
        ]
    );
    assert_eq!(runtime.shutdowns, 1);
}

#[test]
fn test_session_shuts_down_when_capture_panics() {
    let mut runtime = ScriptedRuntime::new(pipeline_script()).panicking_on_tick(1);

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut session = RuntimeSession::start(&mut runtime, &InitContext::default());
        session.capture(&FrameDriver::new(3, 0.016))
    }));

    assert!(outcome.is_err());
    assert_eq!(runtime.shutdowns, 1);
    assert_eq!(runtime.calls.last().map(String::as_str), Some("shutdown"));
}

#[test]
fn test_window_backend_travels_in_init_context() {
    let mut runtime = ScriptedRuntime::new(pipeline_script());

    RuntimeSession::start(&mut runtime, &InitContext::with_window_backend("headless")).finish();

    let context = runtime.init_context.clone().unwrap();
    assert_eq!(context.window_backend.as_deref(), Some("headless"));
    assert_eq!(runtime.shutdowns, 1);
}

#[test]
fn test_diagnostics_are_read_fresh() {
    let mut runtime = ScriptedRuntime::new(pipeline_script()).with_diagnostics();
    let mut session = RuntimeSession::start(&mut runtime, &InitContext::default());

    session.capture(&FrameDriver::new(2, 0.016));
    let first = session.diagnostics().unwrap();
    session.capture(&FrameDriver::new(3, 0.016));
    let second = session.diagnostics().unwrap();

    assert_eq!(first.tick_count, 2);
    assert_eq!(second.tick_count, 5);
    assert_eq!(second.initialize_count, 1);
    assert_eq!(second.stages.len(), 2);
    assert_eq!(second.stages[0].name, "simulate");
    assert_eq!(second.stages[1].name, "");
    assert_eq!(second.subsystems[0].name, "physics");
    assert_eq!(second.subsystems[0].tick_count, 5);
}

#[test]
fn test_diagnostics_absent_is_not_an_error() {
    let runtime = ScriptedRuntime::new(pipeline_script());
    assert!(read_diagnostics(&runtime).is_none());
}
