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

//! Device configuration and backend selection.

use crate::renderer::error::RenderError;
use serde::{Deserialize, Serialize};

/// The execution targets the command-buffer contract can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// A fully explicit native API with real command buffers.
    Explicit,
    /// Desktop OpenGL, Core profile.
    #[default]
    GlCore,
    /// OpenGL ES 3.0.
    GlEs3,
}

impl BackendKind {
    /// Returns `true` for the backends that drive a global, stateful context.
    pub const fn is_stateful(self) -> bool {
        matches!(self, BackendKind::GlCore | BackendKind::GlEs3)
    }
}

/// The operating systems a backend can be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetOs {
    /// Microsoft Windows.
    Windows,
    /// Linux and other desktop Unix flavours.
    Linux,
    /// Apple macOS.
    MacOs,
    /// Android.
    Android,
    /// Apple iOS.
    Ios,
}

impl TargetOs {
    /// The operating system this crate was compiled for.
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            TargetOs::Windows
        } else if cfg!(target_os = "macos") {
            TargetOs::MacOs
        } else if cfg!(target_os = "android") {
            TargetOs::Android
        } else if cfg!(target_os = "ios") {
            TargetOs::Ios
        } else {
            TargetOs::Linux
        }
    }
}

/// Global settings used when creating a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// The backend to create.
    pub backend: BackendKind,
    /// The operating system to create it for. `None` means the host OS.
    pub os: Option<TargetOs>,
    /// The number of command processors the device exposes.
    pub command_processors: usize,
    /// The number of frames the presentation surface lets be in flight at once.
    pub frames_in_flight: u32,
    /// Enables record-time checks that are otherwise documented preconditions
    /// (e.g. reading a device-only buffer before its upload).
    pub validation: bool,
    /// An optional debug label for the device.
    pub label: Option<String>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::GlCore,
            os: None,
            command_processors: 1,
            frames_in_flight: 2,
            validation: cfg!(debug_assertions),
            label: None,
        }
    }
}

impl DeviceSettings {
    /// Creates settings for `backend` with every other field at its default.
    pub fn for_backend(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Parses settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, RenderError> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| RenderError::InitializationFailed(format!("invalid device settings: {e}")))?;
        Ok(settings.sanitized())
    }

    /// The operating system the device targets.
    pub fn target_os(&self) -> TargetOs {
        self.os.unwrap_or_else(TargetOs::current)
    }

    /// Clamps counts to their minimum of one.
    pub fn sanitized(mut self) -> Self {
        if self.command_processors == 0 {
            log::warn!("DeviceSettings: command_processors was 0, using 1.");
            self.command_processors = 1;
        }
        if self.frames_in_flight == 0 {
            log::warn!("DeviceSettings: frames_in_flight was 0, using 1.");
            self.frames_in_flight = 1;
        }
        self
    }
}

/// What a created device can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// The backend the device runs on.
    pub backend: BackendKind,
    /// Exclusive upper bound of vertex binding slots.
    pub max_vertex_bindings: u32,
    /// Exclusive upper bound of uniform buffer binding points.
    pub max_uniform_bindings: u32,
    /// `true` if several vertex buffers can be bound with one native call.
    /// When `false`, multi-binds are recorded as a sequence of single binds.
    pub multi_bind: bool,
}
