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

//! # Khora Core
//!
//! Foundational crate containing the contracts shared by the runtime probe:
//! the abstract interface of a bound simulation runtime, the plain telemetry
//! records captured from it, and the error taxonomy.
//!
//! `khora-infra` provides the concrete native implementation of
//! [`runtime::RuntimeApi`], while `khora-telemetry` drives it and analyzes
//! what it reports.

#![warn(missing_docs)]

pub mod error;
pub mod runtime;
pub mod telemetry;

pub use error::{LoadAttempt, TelemetryError, TelemetryResult};
pub use runtime::{DiagnosticsSource, InitContext, RuntimeApi, RuntimeFeatures};
