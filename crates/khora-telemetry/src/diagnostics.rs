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

//! Reads the runtime's own lifecycle, stage, and subsystem timing counters.

use khora_core::telemetry::{RuntimeDiagnosticsSnapshot, RuntimeStageMetric, RuntimeSubsystemMetric};
use khora_core::{DiagnosticsSource, RuntimeApi};

/// Takes a fresh diagnostics snapshot from the runtime.
///
/// Returns `None` when the runtime does not export the diagnostics entry
/// points. Call again after every capture batch; snapshots are not cached.
pub fn read_diagnostics(runtime: &dyn RuntimeApi) -> Option<RuntimeDiagnosticsSnapshot> {
    if !runtime.features().has_diagnostics {
        log::debug!("Runtime does not expose diagnostics; skipping snapshot");
        return None;
    }
    runtime.diagnostics().map(snapshot_from)
}

/// Copies every counter out of a diagnostics source.
pub fn snapshot_from(source: &dyn DiagnosticsSource) -> RuntimeDiagnosticsSnapshot {
    let stages = (0..source.stage_count())
        .map(|i| RuntimeStageMetric {
            name: source.stage_name(i).unwrap_or_default(),
            last_ms: source.stage_last_ms(i),
            average_ms: source.stage_average_ms(i),
            max_ms: source.stage_max_ms(i),
            sample_count: source.stage_samples(i),
        })
        .collect();

    let subsystems = (0..source.subsystem_count())
        .map(|i| RuntimeSubsystemMetric {
            name: source.subsystem_name(i).unwrap_or_default(),
            last_initialize_ms: source.subsystem_last_initialize_ms(i),
            last_tick_ms: source.subsystem_last_tick_ms(i),
            last_shutdown_ms: source.subsystem_last_shutdown_ms(i),
            max_initialize_ms: source.subsystem_max_initialize_ms(i),
            max_tick_ms: source.subsystem_max_tick_ms(i),
            max_shutdown_ms: source.subsystem_max_shutdown_ms(i),
            initialize_count: source.subsystem_initialize_count(i),
            tick_count: source.subsystem_tick_count(i),
            shutdown_count: source.subsystem_shutdown_count(i),
        })
        .collect();

    RuntimeDiagnosticsSnapshot {
        initialize_count: source.initialize_count(),
        shutdown_count: source.shutdown_count(),
        tick_count: source.tick_count(),
        last_initialize_ms: source.last_initialize_ms(),
        last_shutdown_ms: source.last_shutdown_ms(),
        last_tick_ms: source.last_tick_ms(),
        average_tick_ms: source.average_tick_ms(),
        max_tick_ms: source.max_tick_ms(),
        stages,
        subsystems,
    }
}
