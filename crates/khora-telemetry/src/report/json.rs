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

//! Pretty-printed JSON persistence of reports.

use super::TelemetryReport;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes any report value as indented JSON.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize telemetry to JSON")
}

/// Writes `value` to `path` as JSON with a trailing newline.
///
/// Missing parent directories are created.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut text = to_json_pretty(value)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Writes a telemetry report to `path`.
///
/// Fails without writing if any timing is NaN or infinite.
pub fn write_report(report: &TelemetryReport, path: &Path) -> Result<()> {
    if let Some(value) = report.first_non_finite() {
        bail!(
            "Refusing to write {}: non-finite timing ({}) cannot be stored as JSON",
            path.display(),
            value
        );
    }
    write_json(report, path)
}

/// Reads a report previously written by [`write_report`].
pub fn read_report(path: &Path) -> Result<TelemetryReport> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse telemetry report {}", path.display()))
}
