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

//! Provides the plain data records captured from a simulation runtime.
//!
//! This module defines the "common language" of the probe: per-frame dispatch
//! timings and the cumulative lifecycle diagnostics a runtime may expose.
//! `khora-telemetry` produces and analyzes these records, and the reporter
//! serializes them verbatim.

pub mod diagnostics;
pub mod frame;

pub use self::diagnostics::{
    RuntimeDiagnosticsSnapshot, RuntimeStageMetric, RuntimeSubsystemMetric, StreamingMetrics,
};
pub use self::frame::{categorize_dispatch, DispatchSample, FrameSample, UNKNOWN_CATEGORY};
