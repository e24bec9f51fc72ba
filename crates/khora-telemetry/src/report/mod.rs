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

//! The outcome of a telemetry run and its renderings.

pub mod json;
pub mod terminal;

use crate::analysis::aggregate::TelemetrySummary;
use crate::analysis::variance::VarianceResult;
use khora_core::telemetry::{FrameSample, RuntimeDiagnosticsSnapshot};
use khora_core::{RuntimeApi, RuntimeFeatures};
use serde::{Deserialize, Serialize};

/// Identifies the runtime a report was captured from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    /// The path or name the library was loaded from.
    pub library: String,
    /// Optional capabilities the runtime exported.
    pub features: RuntimeFeatures,
    /// Registered module names, empty if the runtime lists none.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl RuntimeInfo {
    /// Describes a bound runtime.
    pub fn describe(library: impl Into<String>, runtime: &dyn RuntimeApi) -> Self {
        Self {
            library: library.into(),
            features: runtime.features(),
            modules: runtime.module_names().unwrap_or_default(),
        }
    }
}

/// Everything produced by one telemetry run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReport {
    /// Where the frames came from.
    pub runtime: RuntimeInfo,
    /// Captured frames in tick order.
    pub frames: Vec<FrameSample>,
    /// Totals across `frames`.
    pub summary: TelemetrySummary,
    /// Runtime self-reported counters; `null` when the runtime has none.
    #[serde(default)]
    pub diagnostics: Option<RuntimeDiagnosticsSnapshot>,
    /// Variance verdicts, in the order the checks were given.
    #[serde(default)]
    pub variance: Vec<VarianceResult>,
}

impl TelemetryReport {
    /// Returns `true` if no variance check failed.
    pub fn all_checks_passed(&self) -> bool {
        self.variance.iter().all(|result| result.passed)
    }

    /// Iterates over the variance checks that failed.
    pub fn failed_checks(&self) -> impl Iterator<Item = &VarianceResult> {
        self.variance.iter().filter(|result| !result.passed)
    }

    /// Names the first NaN or infinite timing value in the report, if any.
    ///
    /// JSON cannot represent such values, so a report containing one would
    /// not read back.
    pub fn first_non_finite(&self) -> Option<String> {
        let bad = |label: String, value: f64| {
            (!value.is_finite()).then(|| format!("{label} = {value}"))
        };

        for frame in &self.frames {
            let at = |field: &str| format!("frame {} {field}", frame.index);
            let found = bad(at("simulation_time"), frame.simulation_time)
                .or_else(|| bad(at("dt"), frame.timestep))
                .or_else(|| {
                    frame.dispatches().iter().find_map(|d| {
                        bad(at(&format!("dispatch '{}' duration_ms", d.name)), d.duration_ms)
                    })
                });
            if found.is_some() {
                return found;
            }
        }

        let summary = &self.summary;
        if let Some(found) = bad("summary total_ms".to_string(), summary.total_ms)
            .or_else(|| bad("summary handoff_ms".to_string(), summary.handoff_ms))
        {
            return Some(found);
        }

        self.variance.iter().find_map(|result| {
            let name = &result.check.dispatch_name;
            bad(format!("variance '{name}' mean_ms"), result.mean_ms)
                .or_else(|| bad(format!("variance '{name}' stdev_ms"), result.stdev_ms))
                .or_else(|| bad(format!("variance '{name}' percent"), result.percent))
        })
    }
}
