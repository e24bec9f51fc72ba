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

//! A scripted in-process runtime standing in for the native library.

#![allow(dead_code)]

use khora_core::{DiagnosticsSource, InitContext, RuntimeApi, RuntimeFeatures};

/// Offset added to the native clock so tests can tell it from the local one.
pub const NATIVE_CLOCK_OFFSET: f64 = 100.0;

/// Per-tick dispatch script: `(name, duration_ms)`, `None` for a null name.
pub type FrameScript = Vec<(Option<&'static str>, f64)>;

#[derive(Debug, Default)]
pub struct FakeDiagnostics {
    pub initialize_count: u64,
    pub shutdown_count: u64,
    pub tick_count: u64,
    pub last_tick_ms: f64,
}

impl DiagnosticsSource for FakeDiagnostics {
    fn initialize_count(&self) -> u64 {
        self.initialize_count
    }
    fn shutdown_count(&self) -> u64 {
        self.shutdown_count
    }
    fn tick_count(&self) -> u64 {
        self.tick_count
    }
    fn last_initialize_ms(&self) -> f64 {
        0.5
    }
    fn last_shutdown_ms(&self) -> f64 {
        0.0
    }
    fn last_tick_ms(&self) -> f64 {
        self.last_tick_ms
    }
    fn average_tick_ms(&self) -> f64 {
        self.last_tick_ms
    }
    fn max_tick_ms(&self) -> f64 {
        self.last_tick_ms
    }

    fn stage_count(&self) -> usize {
        2
    }
    fn stage_name(&self, index: usize) -> Option<String> {
        (index == 0).then(|| "simulate".to_string())
    }
    fn stage_last_ms(&self, index: usize) -> f64 {
        index as f64 + 1.0
    }
    fn stage_average_ms(&self, index: usize) -> f64 {
        index as f64 + 1.0
    }
    fn stage_max_ms(&self, index: usize) -> f64 {
        index as f64 + 2.0
    }
    fn stage_samples(&self, _index: usize) -> u64 {
        self.tick_count
    }

    fn subsystem_count(&self) -> usize {
        1
    }
    fn subsystem_name(&self, _index: usize) -> Option<String> {
        Some("physics".to_string())
    }
    fn subsystem_last_initialize_ms(&self, _index: usize) -> f64 {
        0.25
    }
    fn subsystem_last_tick_ms(&self, _index: usize) -> f64 {
        0.75
    }
    fn subsystem_last_shutdown_ms(&self, _index: usize) -> f64 {
        0.0
    }
    fn subsystem_max_initialize_ms(&self, _index: usize) -> f64 {
        0.25
    }
    fn subsystem_max_tick_ms(&self, _index: usize) -> f64 {
        1.0
    }
    fn subsystem_max_shutdown_ms(&self, _index: usize) -> f64 {
        0.0
    }
    fn subsystem_initialize_count(&self, _index: usize) -> u64 {
        self.initialize_count
    }
    fn subsystem_tick_count(&self, _index: usize) -> u64 {
        self.tick_count
    }
    fn subsystem_shutdown_count(&self, _index: usize) -> u64 {
        self.shutdown_count
    }
}

/// Replays a fixed dispatch script and records every call made to it.
#[derive(Debug, Default)]
pub struct ScriptedRuntime {
    /// Scripts per tick; ticks past the end repeat the last script.
    pub script: Vec<FrameScript>,
    pub calls: Vec<String>,
    pub init_context: Option<InitContext>,
    pub native_clock: bool,
    pub native_elapsed: f64,
    pub diagnostics: Option<FakeDiagnostics>,
    pub modules: Option<Vec<String>>,
    /// Panics on the tick with this zero-based index.
    pub panic_on_tick: Option<usize>,
    pub ticks: usize,
    pub shutdowns: usize,
    current: FrameScript,
}

impl ScriptedRuntime {
    pub fn new(script: Vec<FrameScript>) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    pub fn with_native_clock(mut self) -> Self {
        self.native_clock = true;
        self.native_elapsed = NATIVE_CLOCK_OFFSET;
        self
    }

    pub fn with_diagnostics(mut self) -> Self {
        self.diagnostics = Some(FakeDiagnostics::default());
        self
    }

    pub fn with_modules(mut self, modules: &[&str]) -> Self {
        self.modules = Some(modules.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn panicking_on_tick(mut self, tick: usize) -> Self {
        self.panic_on_tick = Some(tick);
        self
    }
}

impl RuntimeApi for ScriptedRuntime {
    fn features(&self) -> RuntimeFeatures {
        RuntimeFeatures {
            has_simulation_time: self.native_clock,
            has_diagnostics: self.diagnostics.is_some(),
            has_streaming_metrics: false,
            has_module_registry: self.modules.is_some(),
        }
    }

    fn configure_default_modules(&mut self) {
        self.calls.push("configure_default_modules".to_string());
    }

    fn initialize(&mut self, context: &InitContext) {
        self.calls.push("initialize".to_string());
        self.init_context = Some(context.clone());
        if let Some(diagnostics) = &mut self.diagnostics {
            diagnostics.initialize_count += 1;
        }
    }

    fn shutdown(&mut self) {
        self.calls.push("shutdown".to_string());
        self.shutdowns += 1;
        if let Some(diagnostics) = &mut self.diagnostics {
            diagnostics.shutdown_count += 1;
        }
    }

    fn tick(&mut self, dt: f64) {
        if self.panic_on_tick == Some(self.ticks) {
            panic!("scripted failure on tick {}", self.ticks);
        }
        self.calls.push("tick".to_string());
        self.current = self
            .script
            .get(self.ticks)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_default();
        self.ticks += 1;
        self.native_elapsed += dt;
        if let Some(diagnostics) = &mut self.diagnostics {
            diagnostics.tick_count += 1;
            diagnostics.last_tick_ms = self.current.iter().map(|(_, ms)| ms).sum();
        }
    }

    fn dispatch_count(&self) -> usize {
        self.current.len()
    }

    fn dispatch_name(&self, index: usize) -> Option<String> {
        self.current
            .get(index)
            .and_then(|(name, _)| name.map(str::to_string))
    }

    fn dispatch_duration_ms(&self, index: usize) -> f64 {
        self.current.get(index).map_or(0.0, |(_, ms)| *ms)
    }

    fn simulation_time(&self) -> Option<f64> {
        self.native_clock.then_some(self.native_elapsed)
    }

    fn diagnostics(&self) -> Option<&dyn DiagnosticsSource> {
        self.diagnostics
            .as_ref()
            .map(|d| d as &dyn DiagnosticsSource)
    }

    fn module_names(&self) -> Option<Vec<String>> {
        self.modules.clone()
    }
}

/// Three frames of a physics/geometry pipeline with slight jitter.
pub fn pipeline_script() -> Vec<FrameScript> {
    vec![
        vec![(Some("physics.integrate"), 1.0), (Some("geometry.deform"), 2.0)],
        vec![(Some("physics.integrate"), 1.01), (Some("geometry.deform"), 2.02)],
        vec![(Some("physics.integrate"), 0.99), (Some("geometry.deform"), 1.98)],
    ]
}
