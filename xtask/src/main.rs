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

// Runtime probing tasks for the engine runtime library
// Run with: cargo xtask <command>

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use commands::streaming::StreamingArgs;
use commands::telemetry::TelemetryArgs;
use helpers::*;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Runtime frame telemetry tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Capture per-dispatch frame timings from the runtime library.
    Telemetry(TelemetryArgs),
    /// Print the runtime's streaming metrics as JSON.
    Streaming(StreamingArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Telemetry(args) if args.verbose);
    init_logger(verbose);
    print_banner();

    let outcome = match &cli.command {
        Commands::Telemetry(args) => commands::telemetry::run(args),
        Commands::Streaming(args) => commands::streaming::run(args).map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
