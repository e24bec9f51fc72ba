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

//! [`RuntimeApi`] implementation backed by the runtime's exported C API.

use super::library::{LibraryResolver, LoadedLibrary};
use super::symbols::{
    decode_c_str, lookup, CountFn, CoreFns, DiagnosticsFns, F64Fn, ModuleRegistryFns, NameAtFn,
    StreamingFn,
};
use khora_core::telemetry::StreamingMetrics;
use khora_core::{
    DiagnosticsSource, InitContext, RuntimeApi, RuntimeFeatures, TelemetryError, TelemetryResult,
};
use libloading::Library;
use std::path::{Path, PathBuf};

/// Environment variable the runtime's platform layer reads to pick a window backend.
pub const WINDOW_BACKEND_ENV: &str = "ENGINE_PLATFORM_WINDOW_BACKEND";

/// A runtime library bound to typed entry points.
///
/// Required entry points are resolved eagerly and binding fails if any is
/// missing. Optional ones are probed once and recorded in
/// [`RuntimeFeatures`].
pub struct NativeRuntime {
    core: CoreFns,
    simulation_time: Option<F64Fn>,
    diagnostics: Option<DiagnosticsFns>,
    streaming_metrics: Option<StreamingFn>,
    modules: Option<ModuleRegistryFns>,
    features: RuntimeFeatures,
    path: PathBuf,
    // Keeps every function pointer above valid; never read directly.
    _library: Library,
}

impl NativeRuntime {
    /// Resolves the library with `resolver` and binds it.
    pub fn load(resolver: &LibraryResolver) -> TelemetryResult<Self> {
        let LoadedLibrary { library, path } = resolver.resolve()?;
        Self::bind(library, path)
    }

    /// Binds the entry points of an already loaded library.
    pub fn bind(library: Library, path: PathBuf) -> TelemetryResult<Self> {
        macro_rules! required {
            ($name:literal) => {
                // SAFETY: the alias type of the target field is the C signature
                // declared for this symbol in the runtime's public header.
                unsafe { lookup(&library, $name) }.ok_or_else(|| TelemetryError::InvalidBinding {
                    symbol: $name.to_string(),
                })?
            };
        }

        let core = CoreFns {
            configure_default_modules: required!("engine_runtime_configure_with_default_modules"),
            initialize: required!("engine_runtime_initialize"),
            shutdown: required!("engine_runtime_shutdown"),
            tick: required!("engine_runtime_tick"),
            dispatch_count: required!("engine_runtime_dispatch_count"),
            dispatch_name: required!("engine_runtime_dispatch_name"),
            dispatch_duration: required!("engine_runtime_dispatch_duration"),
        };

        // SAFETY: as above, each optional symbol is looked up with its declared signature.
        let simulation_time: Option<F64Fn> =
            unsafe { lookup(&library, "engine_runtime_simulation_time") };
        let diagnostics = unsafe { DiagnosticsFns::load(&library) };
        let streaming_metrics: Option<StreamingFn> =
            unsafe { lookup(&library, "engine_runtime_streaming_metrics") };
        let modules = unsafe {
            match (
                lookup::<CountFn>(&library, "engine_runtime_module_count"),
                lookup::<NameAtFn>(&library, "engine_runtime_module_at"),
            ) {
                (Some(count), Some(at)) => Some(ModuleRegistryFns { count, at }),
                _ => None,
            }
        };

        let features = RuntimeFeatures {
            has_simulation_time: simulation_time.is_some(),
            has_diagnostics: diagnostics.is_some(),
            has_streaming_metrics: streaming_metrics.is_some(),
            has_module_registry: modules.is_some(),
        };
        log::debug!("Bound runtime '{}' with {:?}", path.display(), features);
        if !features.has_simulation_time {
            log::info!("Runtime does not report simulation time; it will be accumulated locally");
        }

        Ok(Self {
            core,
            simulation_time,
            diagnostics,
            streaming_metrics,
            modules,
            features,
            path,
            _library: library,
        })
    }

    /// The path the library was loaded from.
    pub fn library_path(&self) -> &Path {
        &self.path
    }
}

/// Publishes the requested window backend where the runtime's platform layer
/// looks for it. Leaves the environment untouched when none is requested.
fn export_window_backend(context: &InitContext) {
    if let Some(backend) = &context.window_backend {
        log::info!("Requesting window backend '{}'", backend);
        std::env::set_var(WINDOW_BACKEND_ENV, backend);
    }
}

// SAFETY (all calls below): the function pointers were bound from `_library`,
// which lives as long as `self`, and match the runtime's declared signatures.
impl RuntimeApi for NativeRuntime {
    fn features(&self) -> RuntimeFeatures {
        self.features
    }

    fn configure_default_modules(&mut self) {
        unsafe { (self.core.configure_default_modules)() }
    }

    fn initialize(&mut self, context: &InitContext) {
        export_window_backend(context);
        unsafe { (self.core.initialize)() }
    }

    fn shutdown(&mut self) {
        unsafe { (self.core.shutdown)() }
    }

    fn tick(&mut self, dt: f64) {
        unsafe { (self.core.tick)(dt) }
    }

    fn dispatch_count(&self) -> usize {
        unsafe { (self.core.dispatch_count)() }
    }

    fn dispatch_name(&self, index: usize) -> Option<String> {
        unsafe { decode_c_str((self.core.dispatch_name)(index)) }
    }

    fn dispatch_duration_ms(&self, index: usize) -> f64 {
        // The runtime reports seconds.
        unsafe { (self.core.dispatch_duration)(index) * 1000.0 }
    }

    fn simulation_time(&self) -> Option<f64> {
        self.simulation_time.map(|f| unsafe { f() })
    }

    fn diagnostics(&self) -> Option<&dyn DiagnosticsSource> {
        self.diagnostics
            .as_ref()
            .map(|fns| fns as &dyn DiagnosticsSource)
    }

    fn streaming_metrics(&self) -> Option<StreamingMetrics> {
        self.streaming_metrics.map(|f| {
            let mut metrics = StreamingMetrics::default();
            unsafe { f(&mut metrics) };
            metrics
        })
    }

    fn module_names(&self) -> Option<Vec<String>> {
        let modules = self.modules.as_ref()?;
        let count = unsafe { (modules.count)() };
        Some(
            (0..count)
                .filter_map(|index| unsafe { decode_c_str((modules.at)(index)) })
                .collect(),
        )
    }
}

impl std::fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeRuntime")
            .field("path", &self.path)
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}
