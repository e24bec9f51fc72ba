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

//! RAII bracketing of the runtime's initialize/shutdown lifecycle.

use super::driver::FrameDriver;
use crate::diagnostics::read_diagnostics;
use khora_core::telemetry::{FrameSample, RuntimeDiagnosticsSnapshot};
use khora_core::{InitContext, RuntimeApi};

/// Lifecycle of the runtime over one telemetry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No library has been bound yet.
    Unbound,
    /// Entry points are bound but the runtime is not initialized.
    Bound,
    /// The runtime is initialized and idle.
    Initialized,
    /// Frames are being ticked.
    Capturing,
    /// The runtime has been shut down.
    Shutdown,
}

/// An initialized runtime that is shut down when the session is dropped.
///
/// `shutdown` runs exactly once, on [`finish`](Self::finish) or on drop,
/// including while unwinding from a panic during capture. Every state the
/// session passes through is recorded in order.
pub struct RuntimeSession<'a> {
    runtime: &'a mut dyn RuntimeApi,
    transitions: Vec<SessionState>,
}

impl<'a> RuntimeSession<'a> {
    /// Configures the default modules and initializes the runtime.
    pub fn start(runtime: &'a mut dyn RuntimeApi, context: &InitContext) -> Self {
        log::debug!("Session: {:?} -> {:?}", SessionState::Bound, SessionState::Initialized);
        runtime.configure_default_modules();
        runtime.initialize(context);
        Self {
            runtime,
            transitions: vec![SessionState::Bound, SessionState::Initialized],
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.transitions.last().copied().unwrap_or(SessionState::Unbound)
    }

    /// States visited so far, oldest first.
    pub fn transitions(&self) -> &[SessionState] {
        &self.transitions
    }

    /// Read access to the initialized runtime.
    pub fn runtime(&self) -> &dyn RuntimeApi {
        &*self.runtime
    }

    /// Records frames with `driver`.
    pub fn capture(&mut self, driver: &FrameDriver) -> Vec<FrameSample> {
        self.transitions.push(SessionState::Capturing);
        let frames = driver.capture(&mut *self.runtime);
        self.transitions.push(SessionState::Initialized);
        frames
    }

    /// Reads a fresh diagnostics snapshot, if the runtime exposes one.
    pub fn diagnostics(&self) -> Option<RuntimeDiagnosticsSnapshot> {
        read_diagnostics(&*self.runtime)
    }

    /// Shuts the runtime down now and returns every state visited.
    pub fn finish(mut self) -> Vec<SessionState> {
        self.shutdown();
        std::mem::take(&mut self.transitions)
    }

    fn shutdown(&mut self) {
        let state = self.state();
        if state == SessionState::Shutdown {
            return;
        }
        if std::thread::panicking() {
            log::warn!("Shutting down runtime after a failure in state {:?}", state);
        } else {
            log::debug!("Session: {:?} -> {:?}", state, SessionState::Shutdown);
        }
        self.runtime.shutdown();
        self.transitions.push(SessionState::Shutdown);
    }
}

impl Drop for RuntimeSession<'_> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
