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

//! Frame-to-frame stability gates for individual dispatches.
//!
//! A check collects one duration per frame for a named dispatch, discards the
//! most extreme samples at both ends, and compares the coefficient of
//! variation of what remains against a threshold.

use khora_core::telemetry::FrameSample;
use khora_core::{TelemetryError, TelemetryResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Trim fractions must stay strictly below this bound.
pub const MAX_TRIM_FRACTION: f64 = 0.5;

/// A stability requirement on one named dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceCheck {
    /// Exact dispatch name to sample in each frame.
    pub dispatch_name: String,
    /// Largest acceptable coefficient of variation, in percent.
    pub max_percent: f64,
    /// Fraction of samples discarded from each end after sorting.
    pub trim_fraction: f64,
}

impl VarianceCheck {
    /// Creates an untrimmed check.
    pub fn new(dispatch_name: impl Into<String>, max_percent: f64) -> Self {
        Self {
            dispatch_name: dispatch_name.into(),
            max_percent,
            trim_fraction: 0.0,
        }
    }

    /// Sets the trim fraction.
    pub fn with_trim(mut self, trim_fraction: f64) -> Self {
        self.trim_fraction = trim_fraction;
        self
    }
}

impl FromStr for VarianceCheck {
    type Err = TelemetryError;

    /// Parses `NAME:PERCENT` with no trimming.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        parse_variance_check(spec, 0.0)
    }
}

/// Outcome of one variance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceResult {
    /// The check that was evaluated.
    pub check: VarianceCheck,
    /// Per-frame durations kept after trimming, in ascending order.
    pub durations_ms: Vec<f64>,
    /// Mean of the kept durations.
    pub mean_ms: f64,
    /// Population standard deviation of the kept durations.
    pub stdev_ms: f64,
    /// Coefficient of variation in percent.
    pub percent: f64,
    /// Number of per-frame samples before trimming.
    pub total_samples: usize,
    /// Whether `percent` stayed within the check's threshold.
    pub passed: bool,
}

/// Rejects trim fractions outside `[0, 0.5)`.
pub fn validate_trim_fraction(trim_fraction: f64) -> TelemetryResult<()> {
    if trim_fraction.is_finite() && (0.0..MAX_TRIM_FRACTION).contains(&trim_fraction) {
        Ok(())
    } else {
        Err(TelemetryError::InvalidVarianceSpec(format!(
            "trim fraction must be in [0, {MAX_TRIM_FRACTION}), got {trim_fraction}"
        )))
    }
}

/// Parses a `NAME:PERCENT` specification.
///
/// The name may itself contain `:`; the split happens at the last one.
pub fn parse_variance_check(spec: &str, trim_fraction: f64) -> TelemetryResult<VarianceCheck> {
    validate_trim_fraction(trim_fraction)?;

    let invalid = |reason: &str| TelemetryError::InvalidVarianceSpec(format!("'{spec}': {reason}"));

    let (name, percent) = spec
        .rsplit_once(':')
        .ok_or_else(|| invalid("expected NAME:PERCENT"))?;
    if name.is_empty() {
        return Err(invalid("dispatch name is empty"));
    }
    let max_percent: f64 = percent
        .trim()
        .parse()
        .map_err(|_| invalid("threshold is not a number"))?;
    if !max_percent.is_finite() || max_percent < 0.0 {
        return Err(invalid("threshold must be a non-negative finite percentage"));
    }

    Ok(VarianceCheck::new(name, max_percent).with_trim(trim_fraction))
}

/// Parses every specification with a shared trim fraction.
///
/// The trim fraction is validated first, so an invalid fraction is reported
/// even when no specifications are given.
pub fn parse_variance_checks<S: AsRef<str>>(
    specs: &[S],
    trim_fraction: f64,
) -> TelemetryResult<Vec<VarianceCheck>> {
    validate_trim_fraction(trim_fraction)?;
    specs
        .iter()
        .map(|spec| parse_variance_check(spec.as_ref(), trim_fraction))
        .collect()
}

/// Evaluates one check against the captured frames.
///
/// Every frame contributes one sample: the summed duration of the matching
/// dispatches, or zero when the frame has none. A dispatch absent from every
/// frame is an error.
pub fn evaluate_variance(
    frames: &[FrameSample],
    check: &VarianceCheck,
) -> TelemetryResult<VarianceResult> {
    let per_frame: Vec<Option<f64>> = frames
        .iter()
        .map(|frame| frame.dispatch_total_ms(&check.dispatch_name))
        .collect();
    if per_frame.iter().all(Option::is_none) {
        return Err(TelemetryError::NoMatchingDispatch {
            dispatch: check.dispatch_name.clone(),
        });
    }

    let mut samples: Vec<f64> = per_frame.into_iter().map(|v| v.unwrap_or(0.0)).collect();
    samples.sort_by(f64::total_cmp);

    let total_samples = samples.len();
    let trim = (total_samples as f64 * check.trim_fraction).floor() as usize;
    if 2 * trim >= total_samples {
        return Err(TelemetryError::ExcessiveTrim {
            dispatch: check.dispatch_name.clone(),
            samples: total_samples,
            trim,
        });
    }
    let kept = samples[trim..total_samples - trim].to_vec();

    let count = kept.len() as f64;
    let mean_ms = kept.iter().sum::<f64>() / count;
    let variance = kept.iter().map(|v| (v - mean_ms) * (v - mean_ms)).sum::<f64>() / count;
    let stdev_ms = variance.sqrt();
    let percent = if mean_ms == 0.0 {
        0.0
    } else {
        stdev_ms / mean_ms * 100.0
    };

    log::debug!(
        "Variance '{}': {} of {} samples, mean {:.4} ms, stdev {:.4} ms, {:.2}%",
        check.dispatch_name,
        kept.len(),
        total_samples,
        mean_ms,
        stdev_ms,
        percent
    );

    Ok(VarianceResult {
        check: check.clone(),
        durations_ms: kept,
        mean_ms,
        stdev_ms,
        percent,
        total_samples,
        passed: percent <= check.max_percent,
    })
}

/// Evaluates checks in order, stopping at the first error.
pub fn evaluate_all(
    frames: &[FrameSample],
    checks: &[VarianceCheck],
) -> TelemetryResult<Vec<VarianceResult>> {
    checks
        .iter()
        .map(|check| evaluate_variance(frames, check))
        .collect()
}
