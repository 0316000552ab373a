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

use super::gl::{GlContext, GlDevice, GlProfile};
use stratum_core::renderer::api::settings::{BackendKind, DeviceSettings, TargetOs};
use stratum_core::renderer::RenderError;

/// Returns `true` if `backend` can run on `os`.
///
/// The explicit backend is not provided by this crate and is never supported.
pub fn is_supported(backend: BackendKind, os: TargetOs) -> bool {
    match backend {
        BackendKind::Explicit => false,
        BackendKind::GlCore => matches!(os, TargetOs::Windows | TargetOs::Linux),
        BackendKind::GlEs3 => matches!(
            os,
            TargetOs::Android | TargetOs::Ios | TargetOs::Linux | TargetOs::Windows | TargetOs::MacOs
        ),
    }
}

/// Creates a device for the backend and OS requested in `settings`.
///
/// `context_factory` runs on the device's context thread and must return a
/// context that is current there. The draw strategy is chosen here, once.
///
/// # Errors
///
/// * `RenderError::BackendUnsupported` - If the backend cannot run on the OS.
/// * `RenderError::InitializationFailed` - If the context could not be created.
pub fn create_device<F>(settings: &DeviceSettings, context_factory: F) -> Result<GlDevice, RenderError>
where
    F: FnOnce(BackendKind) -> Result<Box<dyn GlContext>, String> + Send + 'static,
{
    let settings = settings.clone().sanitized();
    let backend = settings.backend;
    let os = settings.target_os();

    let profile = GlProfile::from_backend(backend)
        .filter(|_| is_supported(backend, os))
        .ok_or_else(|| {
            log::error!("Backend {:?} is not supported on {:?}.", backend, os);
            RenderError::BackendUnsupported { backend, os }
        })?;

    log::info!("Selected {:?} backend for {:?}.", backend, os);
    GlDevice::new(profile, settings, Box::new(move || context_factory(backend)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_matrix() {
        assert!(is_supported(BackendKind::GlCore, TargetOs::Windows));
        assert!(is_supported(BackendKind::GlCore, TargetOs::Linux));
        assert!(!is_supported(BackendKind::GlCore, TargetOs::MacOs));
        assert!(!is_supported(BackendKind::GlCore, TargetOs::Android));
        assert!(is_supported(BackendKind::GlEs3, TargetOs::Ios));
        assert!(is_supported(BackendKind::GlEs3, TargetOs::MacOs));
        assert!(!is_supported(BackendKind::Explicit, TargetOs::Linux));
    }

    #[test]
    fn test_unsupported_backend_never_runs_the_factory() {
        let settings = DeviceSettings {
            os: Some(TargetOs::Android),
            ..DeviceSettings::for_backend(BackendKind::GlCore)
        };
        let result = create_device(&settings, |_| panic!("factory must not run"));
        assert_eq!(
            result.unwrap_err(),
            RenderError::BackendUnsupported {
                backend: BackendKind::GlCore,
                os: TargetOs::Android,
            }
        );
    }
}
