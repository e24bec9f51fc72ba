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

//! Per-frame dispatch timing records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category assigned to dispatches reported without a name.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Separator between a dispatch's category and the rest of its name.
const CATEGORY_SEPARATOR: char = '.';

/// Derives the pipeline category of a dispatch from its name.
///
/// `"physics.integrate"` belongs to `"physics"`, a name without a separator is
/// its own category, and an empty name maps to [`UNKNOWN_CATEGORY`].
pub fn categorize_dispatch(name: &str) -> &str {
    if name.is_empty() {
        return UNKNOWN_CATEGORY;
    }
    match name.split_once(CATEGORY_SEPARATOR) {
        Some((category, _)) => category,
        None => name,
    }
}

/// A single dispatcher kernel sample captured from the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSample {
    /// The name the runtime reported for the dispatch, empty if it reported none.
    pub name: String,
    /// The execution time of the dispatch in milliseconds.
    pub duration_ms: f64,
    /// The pipeline category derived from `name`.
    pub category: String,
}

impl DispatchSample {
    /// Creates a sample, deriving its category from the name.
    pub fn new(name: impl Into<String>, duration_ms: f64) -> Self {
        let name = name.into();
        let category = categorize_dispatch(&name).to_string();
        Self {
            name,
            duration_ms,
            category,
        }
    }
}

/// Telemetry captured for a single frame.
///
/// Totals are computed from the dispatches whenever a frame is built,
/// including when it is deserialized, so `frame_total_ms` always equals the
/// sum of the dispatch durations and the category totals partition them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FrameRecord")]
pub struct FrameSample {
    /// Zero-based frame counter within the capture.
    pub index: usize,
    /// Elapsed simulated time in seconds after this frame's tick.
    pub simulation_time: f64,
    /// The timestep in seconds applied for this frame.
    #[serde(rename = "dt")]
    pub timestep: f64,
    dispatches: Vec<DispatchSample>,
    category_totals_ms: BTreeMap<String, f64>,
    frame_total_ms: f64,
}

/// Serialized form of a frame; stored totals are ignored on load.
#[derive(Deserialize)]
struct FrameRecord {
    index: usize,
    simulation_time: f64,
    dt: f64,
    dispatches: Vec<DispatchRecord>,
}

#[derive(Deserialize)]
struct DispatchRecord {
    name: String,
    duration_ms: f64,
}

impl From<FrameRecord> for FrameSample {
    fn from(record: FrameRecord) -> Self {
        let dispatches = record
            .dispatches
            .into_iter()
            .map(|d| DispatchSample::new(d.name, d.duration_ms))
            .collect();
        Self::new(record.index, record.simulation_time, record.dt, dispatches)
    }
}

impl FrameSample {
    /// Builds a frame record and its aggregate totals from ordered dispatches.
    pub fn new(
        index: usize,
        simulation_time: f64,
        timestep: f64,
        dispatches: Vec<DispatchSample>,
    ) -> Self {
        let mut category_totals_ms: BTreeMap<String, f64> = BTreeMap::new();
        let mut frame_total_ms = 0.0;
        for dispatch in &dispatches {
            *category_totals_ms
                .entry(dispatch.category.clone())
                .or_insert(0.0) += dispatch.duration_ms;
            frame_total_ms += dispatch.duration_ms;
        }
        Self {
            index,
            simulation_time,
            timestep,
            dispatches,
            category_totals_ms,
            frame_total_ms,
        }
    }

    /// Dispatches in the order the runtime executed them.
    pub fn dispatches(&self) -> &[DispatchSample] {
        &self.dispatches
    }

    /// Summed dispatch durations per category, in milliseconds.
    pub fn category_totals_ms(&self) -> &BTreeMap<String, f64> {
        &self.category_totals_ms
    }

    /// Sum of all dispatch durations in milliseconds.
    pub fn frame_total_ms(&self) -> f64 {
        self.frame_total_ms
    }

    /// Returns the summed duration of every dispatch named exactly `name`,
    /// or `None` if the frame has no such dispatch.
    pub fn dispatch_total_ms(&self, name: &str) -> Option<f64> {
        let mut matched = false;
        let mut total = 0.0;
        for dispatch in self.dispatches.iter().filter(|d| d.name == name) {
            matched = true;
            total += dispatch.duration_ms;
        }
        matched.then_some(total)
    }
}
