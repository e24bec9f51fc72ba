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

//! # Khora Telemetry
//!
//! Drives a bound runtime through fixed-timestep frames, aggregates the
//! per-dispatch timings it reports, gates frame-to-frame stability with
//! trimmed coefficient-of-variation checks, and renders the results.

pub mod analysis;
pub mod capture;
pub mod diagnostics;
pub mod report;
pub mod service;

pub use analysis::aggregate::{summarise, summarise_with, HandoffPair, TelemetrySummary};
pub use analysis::variance::{
    evaluate_all, evaluate_variance, parse_variance_check, parse_variance_checks, VarianceCheck,
    VarianceResult,
};
pub use capture::driver::{capture_frames, FrameDriver, SimulationClock};
pub use capture::session::{RuntimeSession, SessionState};
pub use diagnostics::read_diagnostics;
pub use report::{RuntimeInfo, TelemetryReport};
pub use service::{TelemetryRunConfig, TelemetryService};
