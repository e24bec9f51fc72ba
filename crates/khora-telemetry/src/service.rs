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

//! Service orchestrating a complete telemetry run.

use crate::analysis::aggregate::{summarise_with, HandoffPair};
use crate::analysis::variance::{evaluate_all, parse_variance_checks, VarianceCheck};
use crate::capture::driver::FrameDriver;
use crate::capture::session::{RuntimeSession, SessionState};
use crate::report::{RuntimeInfo, TelemetryReport};
use khora_core::{InitContext, RuntimeApi, TelemetryResult};
use std::time::Instant;

/// Parameters of a telemetry run.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRunConfig {
    /// Number of frames to capture.
    pub frames: usize,
    /// Fixed timestep in seconds.
    pub dt: f64,
    /// Context handed to the runtime's initialize call.
    pub init: InitContext,
    /// Raw `NAME:PERCENT` variance specifications.
    pub variance_specs: Vec<String>,
    /// Fraction of samples trimmed from each end per variance check.
    pub trim_fraction: f64,
    /// Categories combined into the hand-off total.
    pub handoff: HandoffPair,
}

impl TelemetryRunConfig {
    /// Parses the variance specifications without touching the runtime.
    pub fn validate(&self) -> TelemetryResult<Vec<VarianceCheck>> {
        parse_variance_checks(&self.variance_specs, self.trim_fraction)
    }
}

impl Default for TelemetryRunConfig {
    fn default() -> Self {
        Self {
            frames: 1,
            dt: 0.016,
            init: InitContext::default(),
            variance_specs: Vec::new(),
            trim_fraction: 0.0,
            handoff: HandoffPair::default(),
        }
    }
}

/// Runs capture, diagnostics, and analysis against a bound runtime.
#[derive(Debug)]
pub struct TelemetryService {
    config: TelemetryRunConfig,
    checks: Vec<VarianceCheck>,
    lifecycle: Vec<SessionState>,
}

impl TelemetryService {
    /// Creates a service, rejecting malformed variance specifications.
    pub fn new(config: TelemetryRunConfig) -> TelemetryResult<Self> {
        let checks = config.validate()?;
        Ok(Self {
            config,
            checks,
            lifecycle: Vec::new(),
        })
    }

    /// The run configuration.
    pub fn config(&self) -> &TelemetryRunConfig {
        &self.config
    }

    /// The parsed variance checks.
    pub fn checks(&self) -> &[VarianceCheck] {
        &self.checks
    }

    /// Lifecycle state reached by the most recent run, `Unbound` before any.
    pub fn state(&self) -> SessionState {
        self.lifecycle.last().copied().unwrap_or(SessionState::Unbound)
    }

    /// Every state the most recent run passed through, oldest first.
    pub fn lifecycle(&self) -> &[SessionState] {
        &self.lifecycle
    }

    /// Performs one run.
    ///
    /// The runtime is shut down before analysis begins, including when
    /// capture unwinds.
    pub fn run(
        &mut self,
        runtime: &mut dyn RuntimeApi,
        info: RuntimeInfo,
    ) -> TelemetryResult<TelemetryReport> {
        self.lifecycle.clear();
        let driver = FrameDriver::new(self.config.frames, self.config.dt);
        let started = Instant::now();

        let mut session = RuntimeSession::start(runtime, &self.config.init);
        let frames = session.capture(&driver);
        let diagnostics = session.diagnostics();
        self.lifecycle = session.finish();

        log::info!(
            "Captured {} frames at dt={}s in {:?}",
            frames.len(),
            self.config.dt,
            started.elapsed()
        );

        let summary = summarise_with(&frames, self.config.handoff.clone());
        let variance = evaluate_all(&frames, &self.checks)?;

        Ok(TelemetryReport {
            runtime: info,
            frames,
            summary,
            diagnostics,
            variance,
        })
    }
}
