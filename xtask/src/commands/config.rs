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

use crate::helpers::print_info;
use anyhow::{Context, Result};
use khora_telemetry::HandoffPair;
use serde::Deserialize;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Telemetry.toml";

/// Path-list variable naming extra directories to search for the runtime.
pub const LIBRARY_PATH_ENV: &str = "ENGINE_RUNTIME_LIBRARY_PATH";

/// Older name of [`LIBRARY_PATH_ENV`], still honored after it.
pub const LEGACY_LIBRARY_PATH_ENV: &str = "ENGINE3G_LIBRARY_PATH";

/// Variables read by [`env_search_paths`], in search order.
pub const LIBRARY_PATH_ENVS: [&str; 2] = [LIBRARY_PATH_ENV, LEGACY_LIBRARY_PATH_ENV];

/// Represents the structure of the `Telemetry.toml` file.
///
/// Every key is optional; command-line flags override whatever is set here.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Directory containing the runtime library.
    pub library_dir: Option<PathBuf>,
    /// Base name of the runtime library.
    pub library_name: Option<String>,
    /// Additional directories searched after `library_dir`.
    pub search_paths: Vec<PathBuf>,
    pub frames: Option<usize>,
    pub dt: Option<f64>,
    /// Where to write the JSON report.
    pub output: Option<PathBuf>,
    pub window_backend: Option<String>,
    /// `NAME:PERCENT` variance checks.
    pub variance: Vec<String>,
    pub variance_trim: Option<f64>,
    /// Categories summed into the hand-off total.
    pub handoff: Option<HandoffPair>,
}

/// Loads the configuration file.
///
/// An explicit path must exist. Without one, `Telemetry.toml` in the working
/// directory is used if present, and defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<TelemetryConfig> {
    let config_path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if explicit.is_none() && !config_path.exists() {
        log::debug!(
            "No '{}' found. Using default configuration.",
            config_path.display()
        );
        return Ok(TelemetryConfig::default());
    }

    print_info(&format!(
        "Found '{}'. Loading configuration.",
        config_path.display()
    ));
    let config_str = fs::read_to_string(config_path).with_context(|| {
        format!(
            "Failed to read configuration file at '{}'",
            config_path.display()
        )
    })?;
    parse_config(&config_str)
        .with_context(|| format!("Failed to parse TOML from '{}'", config_path.display()))
}

/// Parses configuration text.
pub fn parse_config(text: &str) -> Result<TelemetryConfig> {
    Ok(toml::from_str(text)?)
}

/// Directories listed in `ENGINE_RUNTIME_LIBRARY_PATH`, then in
/// `ENGINE3G_LIBRARY_PATH`, in order.
pub fn env_search_paths() -> Vec<PathBuf> {
    LIBRARY_PATH_ENVS
        .iter()
        .filter_map(|name| env::var_os(name))
        .flat_map(|value| split_search_paths(&value))
        .collect()
}

/// Splits a platform path list, dropping empty entries.
pub fn split_search_paths(value: &OsStr) -> Vec<PathBuf> {
    env::split_paths(value)
        .filter(|path| !path.as_os_str().is_empty())
        .collect()
}
