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

//! Run-level totals across all captured frames.

use khora_core::telemetry::FrameSample;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The two categories whose combined time forms the hand-off total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffPair {
    /// The producing category.
    pub upstream: String,
    /// The consuming category.
    pub downstream: String,
}

impl HandoffPair {
    /// Creates a pair from two category names.
    pub fn new(upstream: impl Into<String>, downstream: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            downstream: downstream.into(),
        }
    }
}

impl Default for HandoffPair {
    fn default() -> Self {
        Self::new("physics", "geometry")
    }
}

/// Category and frame totals summed over a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySummary {
    /// Total milliseconds per category, across all frames.
    pub category_totals_ms: BTreeMap<String, f64>,
    /// Sum of every frame's total.
    pub total_ms: f64,
    /// Combined time of the hand-off pair's categories.
    pub handoff_ms: f64,
    /// The categories `handoff_ms` was computed from.
    #[serde(default)]
    pub handoff: HandoffPair,
}

impl TelemetrySummary {
    /// Summarises frames with the default physics/geometry hand-off.
    pub fn from_frames(frames: &[FrameSample]) -> Self {
        Self::with_handoff(frames, HandoffPair::default())
    }

    /// Summarises frames with a custom hand-off pair.
    pub fn with_handoff(frames: &[FrameSample], handoff: HandoffPair) -> Self {
        let mut category_totals_ms: BTreeMap<String, f64> = BTreeMap::new();
        let mut total_ms = 0.0;
        for frame in frames {
            for (category, value) in frame.category_totals_ms() {
                *category_totals_ms.entry(category.clone()).or_insert(0.0) += value;
            }
            total_ms += frame.frame_total_ms();
        }

        let category_total = |name: &str| category_totals_ms.get(name).copied().unwrap_or(0.0);
        let handoff_ms = category_total(&handoff.upstream) + category_total(&handoff.downstream);

        Self {
            category_totals_ms,
            total_ms,
            handoff_ms,
            handoff,
        }
    }
}

/// Summarises frames with the default hand-off pair.
pub fn summarise(frames: &[FrameSample]) -> TelemetrySummary {
    TelemetrySummary::from_frames(frames)
}

/// Summarises frames with a custom hand-off pair.
pub fn summarise_with(frames: &[FrameSample], handoff: HandoffPair) -> TelemetrySummary {
    TelemetrySummary::with_handoff(frames, handoff)
}
