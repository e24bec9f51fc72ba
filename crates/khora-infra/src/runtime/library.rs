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

//! Locates the runtime shared library on disk.
//!
//! Resolution is deterministic: the candidate file names depend only on the
//! target platform, never on which files happen to exist, and the search
//! directories are tried in a fixed order.

use khora_core::{LoadAttempt, TelemetryError, TelemetryResult};
use libloading::Library;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// The platform families that name shared libraries differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPlatform {
    /// `name.dll`
    Windows,
    /// `libname.dylib`, `name.dylib`
    Apple,
    /// `libname.so`, `name.so`
    Unix,
}

impl TargetPlatform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            TargetPlatform::Windows
        } else if cfg!(target_vendor = "apple") {
            TargetPlatform::Apple
        } else {
            TargetPlatform::Unix
        }
    }
}

/// Returns the file names a library called `name` may have on `platform`,
/// in the order they should be tried.
pub fn candidate_file_names(name: &str, platform: TargetPlatform) -> Vec<String> {
    match platform {
        TargetPlatform::Windows => vec![format!("{name}.dll")],
        TargetPlatform::Apple => vec![format!("lib{name}.dylib"), format!("{name}.dylib")],
        TargetPlatform::Unix => vec![format!("lib{name}.so"), format!("{name}.so")],
    }
}

/// A successfully loaded library and the path it was loaded from.
#[derive(Debug)]
pub struct LoadedLibrary {
    /// The open library handle.
    pub library: Library,
    /// The path (or bare file name, for a system lookup) that loaded.
    pub path: PathBuf,
}

/// Finds and opens a shared library by logical name.
#[derive(Debug, Clone)]
pub struct LibraryResolver {
    name: String,
    directory: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
    platform: TargetPlatform,
    system_fallback: bool,
}

impl LibraryResolver {
    /// Creates a resolver for `name` (e.g., `"engine_runtime"`) on the current platform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: None,
            search_paths: Vec::new(),
            platform: TargetPlatform::current(),
            system_fallback: true,
        }
    }

    /// Searches `directory` first instead of the current working directory.
    ///
    /// An explicit directory also disables the system-wide fallback lookup.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Appends extra directories to search after the primary one.
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    /// Resolves file names for `platform` instead of the current one.
    pub fn with_platform(mut self, platform: TargetPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Enables or disables the system-wide lookup used when no directory is given.
    pub fn with_system_fallback(mut self, enabled: bool) -> Self {
        self.system_fallback = enabled;
        self
    }

    /// The logical library name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered, de-duplicated directories that will be searched.
    pub fn search_directories(&self) -> Vec<PathBuf> {
        let primary = match &self.directory {
            Some(directory) => directory.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        let mut directories: Vec<PathBuf> = Vec::with_capacity(1 + self.search_paths.len());
        for directory in std::iter::once(primary).chain(self.search_paths.iter().cloned()) {
            if !directories.contains(&directory) {
                directories.push(directory);
            }
        }
        directories
    }

    /// Every path that will be tried before any system-wide lookup, in order.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let names = candidate_file_names(&self.name, self.platform);
        self.search_directories()
            .into_iter()
            .flat_map(|directory| {
                names
                    .iter()
                    .map(move |file_name| directory.join(file_name))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Opens the first candidate that loads.
    pub fn resolve(&self) -> TelemetryResult<LoadedLibrary> {
        // SAFETY: loading a library runs its initializers. The runtime library
        // is trusted build output of the engine this probe measures.
        let (library, path) = self.resolve_with(|path| unsafe { Library::new(path) })?;
        Ok(LoadedLibrary { library, path })
    }

    /// Runs the resolution algorithm with a custom loader.
    ///
    /// Returns the loaded value and the path that produced it, or
    /// [`TelemetryError::LibraryNotFound`] listing every failed attempt.
    pub fn resolve_with<T, E, F>(&self, mut load: F) -> TelemetryResult<(T, PathBuf)>
    where
        E: Display,
        F: FnMut(&Path) -> Result<T, E>,
    {
        let mut attempts = Vec::new();

        for path in self.candidate_paths() {
            match load(&path) {
                Ok(value) => {
                    log::info!("Loaded runtime library from '{}'", path.display());
                    return Ok((value, path));
                }
                Err(e) => {
                    log::trace!("Failed to load '{}': {}", path.display(), e);
                    attempts.push(LoadAttempt {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        if self.directory.is_none() && self.system_fallback {
            log::debug!(
                "No candidate found on disk for '{}', trying the system library search path",
                self.name
            );
            for file_name in candidate_file_names(&self.name, self.platform) {
                let path = PathBuf::from(file_name);
                match load(&path) {
                    Ok(value) => {
                        log::info!("Loaded runtime library '{}' from the system path", path.display());
                        return Ok((value, path));
                    }
                    Err(e) => attempts.push(LoadAttempt {
                        path,
                        error: e.to_string(),
                    }),
                }
            }
        }

        Err(TelemetryError::LibraryNotFound {
            library: self.name.clone(),
            attempts,
        })
    }
}
