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

//! Abstract interface of a bound simulation runtime.
//!
//! The probe never talks to a native library directly. It drives a
//! [`RuntimeApi`], which `khora-infra` implements on top of a dynamically
//! loaded library and tests implement with scripted fakes.

use crate::telemetry::StreamingMetrics;
use serde::{Deserialize, Serialize};

/// Optional capabilities negotiated when the runtime was bound.
///
/// Computed once at bind time; callers branch on these flags instead of
/// probing the runtime again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFeatures {
    /// The runtime reports its own elapsed simulation time.
    pub has_simulation_time: bool,
    /// The full lifecycle/stage/subsystem diagnostics family is available.
    pub has_diagnostics: bool,
    /// The runtime reports task-queue and streaming counters.
    pub has_streaming_metrics: bool,
    /// The runtime can enumerate the modules it was built with.
    pub has_module_registry: bool,
}

/// Configuration handed to the runtime when it is initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitContext {
    /// Overrides the windowing backend the runtime selects (e.g., "headless").
    pub window_backend: Option<String>,
}

impl InitContext {
    /// Creates a context that overrides the window backend.
    pub fn with_window_backend(backend: impl Into<String>) -> Self {
        Self {
            window_backend: Some(backend.into()),
        }
    }
}

/// A loaded simulation runtime, exclusively owned by its caller.
///
/// All calls are blocking and must be issued from a single thread in the
/// order configure → initialize → (tick → read dispatches)* → shutdown.
pub trait RuntimeApi {
    /// The optional capabilities this runtime exposes.
    fn features(&self) -> RuntimeFeatures;

    /// Registers the runtime's default set of modules.
    fn configure_default_modules(&mut self);

    /// Initializes the runtime with the given context.
    fn initialize(&mut self, context: &InitContext);

    /// Releases all native runtime state.
    fn shutdown(&mut self);

    /// Advances the simulation by `dt` seconds.
    fn tick(&mut self, dt: f64);

    /// Number of dispatches executed during the last tick.
    fn dispatch_count(&self) -> usize;

    /// Name of the dispatch at `index`, `None` if the runtime reported none.
    fn dispatch_name(&self, index: usize) -> Option<String>;

    /// Duration of the dispatch at `index`, in milliseconds.
    fn dispatch_duration_ms(&self, index: usize) -> f64;

    /// Elapsed simulated time in seconds, if the runtime reports it.
    fn simulation_time(&self) -> Option<f64>;

    /// The diagnostics accessors, if the runtime exposes the whole family.
    fn diagnostics(&self) -> Option<&dyn DiagnosticsSource>;

    /// Current task-queue and streaming counters, if exposed.
    fn streaming_metrics(&self) -> Option<StreamingMetrics> {
        None
    }

    /// Names of the modules the runtime was built with, if exposed.
    fn module_names(&self) -> Option<Vec<String>> {
        None
    }
}

/// Raw accessors of the runtime's cumulative diagnostics.
///
/// Stage and subsystem metrics are indexed collections: read the count, then
/// each index below it.
#[allow(missing_docs)]
pub trait DiagnosticsSource {
    fn initialize_count(&self) -> u64;
    fn shutdown_count(&self) -> u64;
    fn tick_count(&self) -> u64;
    fn last_initialize_ms(&self) -> f64;
    fn last_shutdown_ms(&self) -> f64;
    fn last_tick_ms(&self) -> f64;
    fn average_tick_ms(&self) -> f64;
    fn max_tick_ms(&self) -> f64;

    fn stage_count(&self) -> usize;
    fn stage_name(&self, index: usize) -> Option<String>;
    fn stage_last_ms(&self, index: usize) -> f64;
    fn stage_average_ms(&self, index: usize) -> f64;
    fn stage_max_ms(&self, index: usize) -> f64;
    fn stage_samples(&self, index: usize) -> u64;

    fn subsystem_count(&self) -> usize;
    fn subsystem_name(&self, index: usize) -> Option<String>;
    fn subsystem_last_initialize_ms(&self, index: usize) -> f64;
    fn subsystem_last_tick_ms(&self, index: usize) -> f64;
    fn subsystem_last_shutdown_ms(&self, index: usize) -> f64;
    fn subsystem_max_initialize_ms(&self, index: usize) -> f64;
    fn subsystem_max_tick_ms(&self, index: usize) -> f64;
    fn subsystem_max_shutdown_ms(&self, index: usize) -> f64;
    fn subsystem_initialize_count(&self, index: usize) -> u64;
    fn subsystem_tick_count(&self, index: usize) -> u64;
    fn subsystem_shutdown_count(&self, index: usize) -> u64;
}
