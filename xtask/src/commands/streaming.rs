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

use crate::commands::config::{env_search_paths, load_config};
use crate::commands::telemetry::DEFAULT_LIBRARY_NAME;
use crate::helpers::*;
use anyhow::Result;
use clap::Args;
use khora_core::{RuntimeApi, TelemetryError};
use khora_infra::{LibraryResolver, NativeRuntime};
use khora_telemetry::report::json::{to_json_pretty, write_json};
use std::path::PathBuf;

/// Report the runtime's task-queue and asset-streaming counters.
#[derive(Args, Debug, Clone, Default)]
pub struct StreamingArgs {
    /// Directory containing the runtime shared library.
    #[arg(long)]
    pub library_dir: Option<PathBuf>,

    /// Base name of the runtime shared library to load [default: engine_runtime].
    #[arg(long)]
    pub library_name: Option<String>,

    /// Optional path to write the metrics JSON.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Configuration file [default: Telemetry.toml if present].
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &StreamingArgs) -> Result<()> {
    print_task_start("Streaming Metrics", GEAR, MAGENTA);

    let config = load_config(args.config.as_deref())?;
    let name = args
        .library_name
        .clone()
        .or(config.library_name)
        .unwrap_or_else(|| DEFAULT_LIBRARY_NAME.to_string());
    let mut resolver = LibraryResolver::new(name)
        .with_search_paths(config.search_paths)
        .with_search_paths(env_search_paths());
    if let Some(dir) = args.library_dir.clone().or(config.library_dir) {
        resolver = resolver.with_directory(dir);
    }

    let runtime = NativeRuntime::load(&resolver)?;
    let metrics = runtime
        .streaming_metrics()
        .ok_or(TelemetryError::MissingCapability {
            capability: "engine_runtime_streaming_metrics",
        })?;

    println!("{}", to_json_pretty(&metrics)?);
    if let Some(output) = &args.output {
        write_json(&metrics, output)?;
        print_success(&format!("Metrics written to '{}'", output.display()));
    }
    Ok(())
}
