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

//! Advances the runtime frame by frame and reads back dispatch timings.

use khora_core::telemetry::{DispatchSample, FrameSample};
use khora_core::RuntimeApi;

/// Local elapsed-time accumulator for runtimes that do not report their own.
///
/// Accumulates exactly the `dt` handed to each tick, so reported simulation
/// time stays consistent with the timesteps the runtime actually received.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    elapsed: f64,
}

impl SimulationClock {
    /// Creates a clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one tick of `dt` seconds and returns the new elapsed time.
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.elapsed += dt;
        self.elapsed
    }

    /// The accumulated elapsed time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// Ticks a runtime for a fixed number of frames at a fixed timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDriver {
    frame_count: usize,
    dt: f64,
}

impl FrameDriver {
    /// Creates a driver recording `frame_count` frames of `dt` seconds each.
    pub fn new(frame_count: usize, dt: f64) -> Self {
        Self { frame_count, dt }
    }

    /// Number of frames to record.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Runs the capture loop.
    ///
    /// The runtime must already be initialized. Frames are returned in tick
    /// order and dispatches in the order the runtime reported them.
    pub fn capture(&self, runtime: &mut dyn RuntimeApi) -> Vec<FrameSample> {
        let native_time = runtime.features().has_simulation_time;
        let mut clock = SimulationClock::new();
        let mut frames = Vec::with_capacity(self.frame_count);

        for index in 0..self.frame_count {
            runtime.tick(self.dt);
            let local_time = clock.advance(self.dt);
            let simulation_time = if native_time {
                runtime.simulation_time().unwrap_or(local_time)
            } else {
                local_time
            };

            let frame = FrameSample::new(index, simulation_time, self.dt, read_dispatches(runtime));
            log::trace!(
                "Frame {} (sim {:.6}s): {} dispatches, {:.4} ms",
                frame.index,
                frame.simulation_time,
                frame.dispatches().len(),
                frame.frame_total_ms()
            );
            frames.push(frame);
        }

        frames
    }
}

/// Shorthand for `FrameDriver::new(frame_count, dt).capture(runtime)`.
pub fn capture_frames(runtime: &mut dyn RuntimeApi, frame_count: usize, dt: f64) -> Vec<FrameSample> {
    FrameDriver::new(frame_count, dt).capture(runtime)
}

fn read_dispatches(runtime: &dyn RuntimeApi) -> Vec<DispatchSample> {
    (0..runtime.dispatch_count())
        .map(|index| {
            let name = runtime.dispatch_name(index).unwrap_or_default();
            let duration_ms = runtime.dispatch_duration_ms(index);
            if !duration_ms.is_finite() {
                log::warn!("Dispatch '{}' reported a non-finite duration: {}", name, duration_ms);
            }
            DispatchSample::new(name, duration_ms)
        })
        .collect()
}
