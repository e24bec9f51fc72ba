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

//! Defines the error taxonomy of the runtime probe.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for probe operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// One failed attempt to load a dynamic library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAttempt {
    /// The path (or bare file name, for system lookups) handed to the loader.
    pub path: PathBuf,
    /// The loader's error message.
    pub error: String,
}

impl fmt::Display for LoadAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.path.display(), self.error)
    }
}

/// An error that aborts a telemetry run.
///
/// Every variant is fatal. Missing optional runtime capabilities are not
/// errors and never surface here, except for commands that exist solely to
/// read that capability.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Every candidate path for the runtime library failed to load.
    #[error("unable to load runtime library '{library}'{}", format_attempts(.attempts))]
    LibraryNotFound {
        /// The logical library name that was requested.
        library: String,
        /// All paths tried, in order, with the loader error for each.
        attempts: Vec<LoadAttempt>,
    },

    /// A required entry point is missing from the loaded library.
    #[error("runtime library does not export required entry point '{symbol}'")]
    InvalidBinding {
        /// The symbol that failed to resolve.
        symbol: String,
    },

    /// A variance check specification or trim fraction is malformed.
    #[error("invalid variance check: {0}")]
    InvalidVarianceSpec(String),

    /// A variance check names a dispatch that was never observed.
    #[error("no dispatch named '{dispatch}' was recorded in any frame")]
    NoMatchingDispatch {
        /// The dispatch name the check targeted.
        dispatch: String,
    },

    /// Trimming would discard every sample of a variance check.
    #[error(
        "trimming {trim} samples from each end of '{dispatch}' leaves nothing of {samples} samples"
    )]
    ExcessiveTrim {
        /// The dispatch name the check targeted.
        dispatch: String,
        /// The number of per-frame samples before trimming.
        samples: usize,
        /// The number of samples discarded from each end.
        trim: usize,
    },

    /// The runtime does not expose an optional capability a command requires.
    #[error("runtime library does not expose {capability}")]
    MissingCapability {
        /// A human-readable name for the capability.
        capability: &'static str,
    },
}

fn format_attempts(attempts: &[LoadAttempt]) -> String {
    if attempts.is_empty() {
        return ": no candidate paths were tried".to_string();
    }
    let mut out = String::from(". Tried:");
    for attempt in attempts {
        out.push_str("\n- ");
        out.push_str(&attempt.to_string());
    }
    out
}
