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

//! C signatures and symbol tables of the runtime's exported API.

use khora_core::telemetry::StreamingMetrics;
use khora_core::DiagnosticsSource;
use libloading::Library;
use std::ffi::{c_char, CStr};

pub(crate) type VoidFn = unsafe extern "C" fn();
pub(crate) type TickFn = unsafe extern "C" fn(f64);
pub(crate) type CountFn = unsafe extern "C" fn() -> usize;
pub(crate) type NameAtFn = unsafe extern "C" fn(usize) -> *const c_char;
pub(crate) type F64Fn = unsafe extern "C" fn() -> f64;
pub(crate) type F64AtFn = unsafe extern "C" fn(usize) -> f64;
pub(crate) type U64Fn = unsafe extern "C" fn() -> u64;
pub(crate) type U64AtFn = unsafe extern "C" fn(usize) -> u64;
pub(crate) type StreamingFn = unsafe extern "C" fn(*mut StreamingMetrics);

/// Looks up `symbol` and copies out the function pointer.
///
/// # Safety
/// `T` must be the exact C signature the library exports under `symbol`, and
/// the returned pointer must not be called after `library` is dropped.
pub(crate) unsafe fn lookup<T: Copy>(library: &Library, symbol: &str) -> Option<T> {
    library.get::<T>(symbol.as_bytes()).ok().map(|s| *s)
}

/// Decodes a nullable C string returned by the runtime.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub(crate) unsafe fn decode_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Entry points every supported runtime build exports.
pub(crate) struct CoreFns {
    pub configure_default_modules: VoidFn,
    pub initialize: VoidFn,
    pub shutdown: VoidFn,
    pub tick: TickFn,
    pub dispatch_count: CountFn,
    pub dispatch_name: NameAtFn,
    pub dispatch_duration: F64AtFn,
}

/// The `engine_runtime_module_*` pair.
pub(crate) struct ModuleRegistryFns {
    pub count: CountFn,
    pub at: NameAtFn,
}

/// The `engine_runtime_diagnostic_*` family. Bound as a unit.
pub(crate) struct DiagnosticsFns {
    initialize_count: U64Fn,
    shutdown_count: U64Fn,
    tick_count: U64Fn,
    last_initialize_ms: F64Fn,
    last_shutdown_ms: F64Fn,
    last_tick_ms: F64Fn,
    average_tick_ms: F64Fn,
    max_tick_ms: F64Fn,
    stage_count: CountFn,
    stage_name: NameAtFn,
    stage_last_ms: F64AtFn,
    stage_average_ms: F64AtFn,
    stage_max_ms: F64AtFn,
    stage_samples: U64AtFn,
    subsystem_count: CountFn,
    subsystem_name: NameAtFn,
    subsystem_last_initialize_ms: F64AtFn,
    subsystem_last_tick_ms: F64AtFn,
    subsystem_last_shutdown_ms: F64AtFn,
    subsystem_max_initialize_ms: F64AtFn,
    subsystem_max_tick_ms: F64AtFn,
    subsystem_max_shutdown_ms: F64AtFn,
    subsystem_initialize_count: U64AtFn,
    subsystem_tick_count: U64AtFn,
    subsystem_shutdown_count: U64AtFn,
}

impl DiagnosticsFns {
    /// Binds the whole family, or nothing if any single symbol is missing.
    ///
    /// # Safety
    /// Same contract as [`lookup`].
    pub(crate) unsafe fn load(library: &Library) -> Option<Self> {
        macro_rules! load_fn {
            ($name:literal) => {{
                match lookup(library, concat!("engine_runtime_diagnostic_", $name)) {
                    Some(f) => f,
                    None => {
                        log::debug!(
                            "Diagnostics unavailable: missing 'engine_runtime_diagnostic_{}'",
                            $name
                        );
                        return None;
                    }
                }
            }};
        }

        Some(Self {
            initialize_count: load_fn!("initialize_count"),
            shutdown_count: load_fn!("shutdown_count"),
            tick_count: load_fn!("tick_count"),
            last_initialize_ms: load_fn!("last_initialize_ms"),
            last_shutdown_ms: load_fn!("last_shutdown_ms"),
            last_tick_ms: load_fn!("last_tick_ms"),
            average_tick_ms: load_fn!("average_tick_ms"),
            max_tick_ms: load_fn!("max_tick_ms"),
            stage_count: load_fn!("stage_count"),
            stage_name: load_fn!("stage_name"),
            stage_last_ms: load_fn!("stage_last_ms"),
            stage_average_ms: load_fn!("stage_average_ms"),
            stage_max_ms: load_fn!("stage_max_ms"),
            stage_samples: load_fn!("stage_samples"),
            subsystem_count: load_fn!("subsystem_count"),
            subsystem_name: load_fn!("subsystem_name"),
            subsystem_last_initialize_ms: load_fn!("subsystem_last_initialize_ms"),
            subsystem_last_tick_ms: load_fn!("subsystem_last_tick_ms"),
            subsystem_last_shutdown_ms: load_fn!("subsystem_last_shutdown_ms"),
            subsystem_max_initialize_ms: load_fn!("subsystem_max_initialize_ms"),
            subsystem_max_tick_ms: load_fn!("subsystem_max_tick_ms"),
            subsystem_max_shutdown_ms: load_fn!("subsystem_max_shutdown_ms"),
            subsystem_initialize_count: load_fn!("subsystem_initialize_count"),
            subsystem_tick_count: load_fn!("subsystem_tick_count"),
            subsystem_shutdown_count: load_fn!("subsystem_shutdown_count"),
        })
    }
}

// SAFETY (all methods): the pointers were bound from the library owned by the
// same `NativeRuntime`, which outlives this table, and every accessor is a
// noexcept C function taking plain scalars.
impl DiagnosticsSource for DiagnosticsFns {
    fn initialize_count(&self) -> u64 {
        unsafe { (self.initialize_count)() }
    }

    fn shutdown_count(&self) -> u64 {
        unsafe { (self.shutdown_count)() }
    }

    fn tick_count(&self) -> u64 {
        unsafe { (self.tick_count)() }
    }

    fn last_initialize_ms(&self) -> f64 {
        unsafe { (self.last_initialize_ms)() }
    }

    fn last_shutdown_ms(&self) -> f64 {
        unsafe { (self.last_shutdown_ms)() }
    }

    fn last_tick_ms(&self) -> f64 {
        unsafe { (self.last_tick_ms)() }
    }

    fn average_tick_ms(&self) -> f64 {
        unsafe { (self.average_tick_ms)() }
    }

    fn max_tick_ms(&self) -> f64 {
        unsafe { (self.max_tick_ms)() }
    }

    fn stage_count(&self) -> usize {
        unsafe { (self.stage_count)() }
    }

    fn stage_name(&self, index: usize) -> Option<String> {
        unsafe { decode_c_str((self.stage_name)(index)) }
    }

    fn stage_last_ms(&self, index: usize) -> f64 {
        unsafe { (self.stage_last_ms)(index) }
    }

    fn stage_average_ms(&self, index: usize) -> f64 {
        unsafe { (self.stage_average_ms)(index) }
    }

    fn stage_max_ms(&self, index: usize) -> f64 {
        unsafe { (self.stage_max_ms)(index) }
    }

    fn stage_samples(&self, index: usize) -> u64 {
        unsafe { (self.stage_samples)(index) }
    }

    fn subsystem_count(&self) -> usize {
        unsafe { (self.subsystem_count)() }
    }

    fn subsystem_name(&self, index: usize) -> Option<String> {
        unsafe { decode_c_str((self.subsystem_name)(index)) }
    }

    fn subsystem_last_initialize_ms(&self, index: usize) -> f64 {
        unsafe { (self.subsystem_last_initialize_ms)(index) }
    }

    fn subsystem_last_tick_ms(&self, index: usize) -> f64 {
        unsafe { (self.subsystem_last_tick_ms)(index) }
    }

    fn subsystem_last_shutdown_ms(&self, index: usize) -> f64 {
        unsafe { (self.subsystem_last_shutdown_ms)(index) }
    }

    fn subsystem_max_initialize_ms(&self, index: usize) -> f64 {
        unsafe { (self.subsystem_max_initialize_ms)(index) }
    }

    fn subsystem_max_tick_ms(&self, index: usize) -> f64 {
        unsafe { (self.subsystem_max_tick_ms)(index) }
    }

    fn subsystem_max_shutdown_ms(&self, index: usize) -> f64 {
        unsafe { (self.subsystem_max_shutdown_ms)(index) }
    }

    fn subsystem_initialize_count(&self, index: usize) -> u64 {
        unsafe { (self.subsystem_initialize_count)(index) }
    }

    fn subsystem_tick_count(&self, index: usize) -> u64 {
        unsafe { (self.subsystem_tick_count)(index) }
    }

    fn subsystem_shutdown_count(&self, index: usize) -> u64 {
        unsafe { (self.subsystem_shutdown_count)(index) }
    }
}
