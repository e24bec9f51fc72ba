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

//! Cumulative lifecycle statistics reported by the runtime itself.

use serde::{Deserialize, Serialize};

/// Cumulative timing statistics for one pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStageMetric {
    /// The stage name (e.g., "animation.evaluate").
    pub name: String,
    /// Duration of the most recent execution.
    pub last_ms: f64,
    /// Mean duration over all executions.
    pub average_ms: f64,
    /// Longest observed duration.
    pub max_ms: f64,
    /// Number of executions recorded.
    pub sample_count: u64,
}

/// Cumulative lifecycle statistics for one loaded subsystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSubsystemMetric {
    /// The subsystem name (e.g., "physics").
    pub name: String,
    /// Duration of the most recent initialization.
    pub last_initialize_ms: f64,
    /// Duration of the most recent tick.
    pub last_tick_ms: f64,
    /// Duration of the most recent shutdown.
    pub last_shutdown_ms: f64,
    /// Longest observed initialization.
    pub max_initialize_ms: f64,
    /// Longest observed tick.
    pub max_tick_ms: f64,
    /// Longest observed shutdown.
    pub max_shutdown_ms: f64,
    /// Number of initializations.
    pub initialize_count: u64,
    /// Number of ticks.
    pub tick_count: u64,
    /// Number of shutdowns.
    pub shutdown_count: u64,
}

/// A point-in-time read of the runtime's lifecycle diagnostics.
///
/// Always rebuilt in full from the runtime; never updated incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeDiagnosticsSnapshot {
    /// Number of times the runtime was initialized.
    pub initialize_count: u64,
    /// Number of times the runtime was shut down.
    pub shutdown_count: u64,
    /// Number of ticks executed.
    pub tick_count: u64,
    /// Duration of the most recent initialization.
    pub last_initialize_ms: f64,
    /// Duration of the most recent shutdown.
    pub last_shutdown_ms: f64,
    /// Duration of the most recent tick.
    pub last_tick_ms: f64,
    /// Mean tick duration.
    pub average_tick_ms: f64,
    /// Longest tick duration.
    pub max_tick_ms: f64,
    /// Per-stage statistics, in runtime order.
    pub stages: Vec<RuntimeStageMetric>,
    /// Per-subsystem statistics, in runtime order.
    pub subsystems: Vec<RuntimeSubsystemMetric>,
}

/// Task-queue and asset-streaming counters.
///
/// Layout matches the out-parameter of `engine_runtime_streaming_metrics`;
/// field names mirror the native struct.
#[allow(missing_docs)]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingMetrics {
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub pending_tasks: usize,
    pub active_workers: usize,
    pub total_enqueued: u64,
    pub total_executed: u64,
    pub streaming_pending: u64,
    pub streaming_loading: u64,
    pub streaming_total_requests: u64,
    pub streaming_total_completed: u64,
    pub streaming_total_failed: u64,
    pub streaming_total_cancelled: u64,
    pub streaming_total_rejected: u64,
}
