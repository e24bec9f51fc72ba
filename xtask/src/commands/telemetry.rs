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

use crate::commands::config::{env_search_paths, load_config, TelemetryConfig};
use crate::helpers::*;
use anyhow::{Context, Result};
use clap::Args;
use khora_core::InitContext;
use khora_infra::{LibraryResolver, NativeRuntime};
use khora_telemetry::report::json::write_report;
use khora_telemetry::report::terminal::{render_summary, render_variance};
use khora_telemetry::{RuntimeInfo, TelemetryRunConfig, TelemetryService};
use std::path::PathBuf;

pub const DEFAULT_LIBRARY_NAME: &str = "engine_runtime";

/// Capture dispatcher telemetry for the animation/physics/geometry hand-off
/// that precedes rendering submissions.
#[derive(Args, Debug, Clone, Default)]
pub struct TelemetryArgs {
    /// Directory containing the runtime library (falls back to the working
    /// directory and system library paths).
    #[arg(long)]
    pub library_dir: Option<PathBuf>,

    /// Base name of the runtime shared library to load [default: engine_runtime].
    #[arg(long)]
    pub library_name: Option<String>,

    /// Number of frames to record [default: 1].
    #[arg(long)]
    pub frames: Option<usize>,

    /// Simulation timestep in seconds passed to each tick [default: 0.016].
    #[arg(long)]
    pub dt: Option<f64>,

    /// Optional JSON file to persist telemetry results.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print per-frame dispatch timings and debug logs.
    #[arg(long)]
    pub verbose: bool,

    /// Fail when a dispatch's frame-to-frame variation exceeds PERCENT.
    #[arg(long = "variance", value_name = "NAME:PERCENT")]
    pub variance: Vec<String>,

    /// Fraction of samples trimmed from each end before variance checks [default: 0.0].
    #[arg(long, value_name = "FRACTION")]
    pub variance_trim: Option<f64>,

    /// Window backend the runtime should select (e.g. "headless").
    #[arg(long)]
    pub window_backend: Option<String>,

    /// Configuration file [default: Telemetry.toml if present].
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Fully merged settings for one telemetry run.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySettings {
    pub library_name: String,
    pub library_dir: Option<PathBuf>,
    pub search_paths: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub run: TelemetryRunConfig,
}

impl TelemetrySettings {
    /// Merges flags over the file configuration over built-in defaults.
    ///
    /// Search paths from the file come before those from the environment.
    pub fn resolve(args: &TelemetryArgs, config: TelemetryConfig, env_paths: Vec<PathBuf>) -> Self {
        let defaults = TelemetryRunConfig::default();
        let variance_specs = if args.variance.is_empty() {
            config.variance
        } else {
            args.variance.clone()
        };
        let window_backend = args.window_backend.clone().or(config.window_backend);

        let mut search_paths = config.search_paths;
        search_paths.extend(env_paths);

        Self {
            library_name: args
                .library_name
                .clone()
                .or(config.library_name)
                .unwrap_or_else(|| DEFAULT_LIBRARY_NAME.to_string()),
            library_dir: args.library_dir.clone().or(config.library_dir),
            search_paths,
            output: args.output.clone().or(config.output),
            verbose: args.verbose,
            run: TelemetryRunConfig {
                frames: args.frames.or(config.frames).unwrap_or(defaults.frames),
                dt: args.dt.or(config.dt).unwrap_or(defaults.dt),
                init: InitContext { window_backend },
                variance_specs,
                trim_fraction: args
                    .variance_trim
                    .or(config.variance_trim)
                    .unwrap_or(defaults.trim_fraction),
                handoff: config.handoff.unwrap_or(defaults.handoff),
            },
        }
    }

    /// The resolver for the configured library.
    pub fn resolver(&self) -> LibraryResolver {
        let resolver = LibraryResolver::new(self.library_name.clone())
            .with_search_paths(self.search_paths.iter().cloned());
        match &self.library_dir {
            Some(dir) => resolver.with_directory(dir.clone()),
            None => resolver,
        }
    }
}

/// Runs the probe; returns `false` if any variance check failed.
pub fn run(args: &TelemetryArgs) -> Result<bool> {
    print_task_start("Runtime Frame Telemetry", STOPWATCH, BLUE);

    let config = load_config(args.config.as_deref())?;
    let settings = TelemetrySettings::resolve(args, config, env_search_paths());

    // Malformed variance specs are rejected before the library is touched.
    let mut service = TelemetryService::new(settings.run.clone())?;

    let resolver = settings.resolver();
    log::debug!("Library candidates: {:?}", resolver.candidate_paths());
    let mut runtime = NativeRuntime::load(&resolver)?;
    let library = runtime.library_path().display().to_string();
    print_info(&format!("Loaded runtime from '{}'", library));

    let info = RuntimeInfo::describe(library, &runtime);
    if !info.modules.is_empty() {
        print_info(&format!("Runtime modules: {}", info.modules.join(", ")));
    }
    let report = service.run(&mut runtime, info)?;

    print_task_start("Summary", CHART, CYAN);
    println!("{}", render_summary(&report, settings.verbose));

    if !report.variance.is_empty() {
        print_task_start("Variance Checks", SCALES, YELLOW);
        println!("{}", render_variance(&report.variance));
    }

    if let Some(output) = &settings.output {
        write_report(&report, output)
            .with_context(|| format!("Failed to persist telemetry to '{}'", output.display()))?;
        print_success(&format!("Telemetry written to '{}'", output.display()));
    }

    let failed: Vec<&str> = report
        .failed_checks()
        .map(|result| result.check.dispatch_name.as_str())
        .collect();
    if failed.is_empty() {
        print_success(&format!("Captured {} frames", report.frames.len()));
        Ok(true)
    } else {
        print_error(&format!("Variance exceeded for: {}", failed.join(", ")));
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khora_telemetry::HandoffPair;

    #[test]
    fn test_defaults_without_flags_or_file() {
        let settings =
            TelemetrySettings::resolve(&TelemetryArgs::default(), TelemetryConfig::default(), Vec::new());

        assert_eq!(settings.library_name, DEFAULT_LIBRARY_NAME);
        assert_eq!(settings.library_dir, None);
        assert_eq!(settings.run.frames, 1);
        assert_eq!(settings.run.dt, 0.016);
        assert_eq!(settings.run.trim_fraction, 0.0);
        assert!(settings.run.variance_specs.is_empty());
        assert_eq!(settings.run.init, InitContext::default());
        assert_eq!(settings.run.handoff, HandoffPair::default());
    }

    #[test]
    fn test_flags_override_file() {
        let args = TelemetryArgs {
            frames: Some(10),
            variance: vec!["geometry.deform:5".to_string()],
            window_backend: Some("headless".to_string()),
            ..Default::default()
        };
        let config = TelemetryConfig {
            frames: Some(60),
            dt: Some(0.008),
            library_name: Some("engine_runtime_d".to_string()),
            variance: vec!["physics.integrate:2".to_string()],
            window_backend: Some("glfw".to_string()),
            ..Default::default()
        };

        let settings = TelemetrySettings::resolve(&args, config, Vec::new());

        assert_eq!(settings.run.frames, 10);
        assert_eq!(settings.run.dt, 0.008);
        assert_eq!(settings.library_name, "engine_runtime_d");
        assert_eq!(settings.run.variance_specs, ["geometry.deform:5"]);
        assert_eq!(settings.run.init.window_backend.as_deref(), Some("headless"));
    }

    #[test]
    fn test_search_paths_combine_file_then_env() {
        let config = TelemetryConfig {
            search_paths: vec![PathBuf::from("from-file")],
            ..Default::default()
        };
        let settings = TelemetrySettings::resolve(
            &TelemetryArgs::default(),
            config,
            vec![PathBuf::from("from-env")],
        );

        assert_eq!(
            settings.search_paths,
            [PathBuf::from("from-file"), PathBuf::from("from-env")]
        );
    }

    #[test]
    fn test_resolver_uses_library_dir() {
        let args = TelemetryArgs {
            library_dir: Some(PathBuf::from("build/lib")),
            ..Default::default()
        };
        let settings = TelemetrySettings::resolve(&args, TelemetryConfig::default(), Vec::new());
        let resolver = settings.resolver();

        assert_eq!(resolver.name(), DEFAULT_LIBRARY_NAME);
        assert_eq!(resolver.search_directories()[0], PathBuf::from("build/lib"));
    }
}
