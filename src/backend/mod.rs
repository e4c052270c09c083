//! Backend abstraction layer
//!
//! Provides the capability traits and shared types every backend implements.
//!
//! # Available Backends
//!
//! - `headless`: in-memory backend for tests and CI, always available
//! - `wgpu-backend` (default feature): wgpu for rendering, winit for windows

pub mod headless;
mod table;
pub mod traits;
pub mod types;

#[cfg(all(feature = "wgpu-backend", not(target_arch = "wasm32")))]
pub mod wgpu_backend;

pub use headless::HeadlessBackend;
pub use traits::*;
pub use types::*;

use crate::config::{BackendType, RendererConfig};
use crate::mesh::MeshData;

/// Create the backend requested by `config`.
///
/// [`BackendType::Auto`] tries wgpu first and falls back to headless. An
/// explicit [`BackendType::Wgpu`] reports the failure instead.
pub fn create_backend(config: &RendererConfig) -> BackendResult<Box<dyn GraphicsBackend>> {
    match config.backend {
        BackendType::Headless => {
            log::info!("Using headless backend");
            Ok(Box::new(HeadlessBackend::new()))
        }
        BackendType::Wgpu => create_wgpu(config),
        BackendType::Auto => match create_wgpu(config) {
            Ok(backend) => Ok(backend),
            Err(e) => {
                log::warn!("Failed to create wgpu backend: {}", e);
                log::info!("Using headless backend");
                Ok(Box::new(HeadlessBackend::new()))
            }
        },
    }
}

/// Reject layouts no backend can feed to a shader.
///
/// Runs at upload, after `MeshData::verify` accepted the descriptor.
pub(crate) fn check_vertex_formats(data: &MeshData<'_>) -> BackendResult<()> {
    match data.attribs().iter().find(|attrib| !attrib.is_drawable()) {
        Some(attrib) => Err(BackendError::UnsupportedVertexFormat {
            ty: attrib.ty.name(),
            count: attrib.count,
        }),
        None => Ok(()),
    }
}

#[cfg(all(feature = "wgpu-backend", not(target_arch = "wasm32")))]
fn create_wgpu(config: &RendererConfig) -> BackendResult<Box<dyn GraphicsBackend>> {
    let backend = wgpu_backend::WgpuBackend::new(config)?;
    log::info!("Using wgpu backend");
    Ok(Box::new(backend))
}

#[cfg(not(all(feature = "wgpu-backend", not(target_arch = "wasm32"))))]
fn create_wgpu(_config: &RendererConfig) -> BackendResult<Box<dyn GraphicsBackend>> {
    Err(BackendError::InitializationFailed(
        "built without the wgpu-backend feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_headless() {
        let config = RendererConfig {
            backend: BackendType::Headless,
            ..Default::default()
        };
        let backend = create_backend(&config).unwrap();
        assert_eq!(backend.name(), "headless");
        assert_eq!(backend.stats(), ResourceStats::default());
    }

    #[test]
    fn test_vertex_format_check() {
        use crate::mesh::VertexAttribType;

        let bytes = [0u8; 60];
        let indices = [0, 1, 2];
        let mut data = MeshData::new();
        data.append_attrib(VertexAttribType::Float, 5, false).unwrap();
        let data = data.with_vertices(&bytes, 3).with_indices(&indices);

        assert_eq!(data.verify(), Ok(()));
        assert_eq!(
            check_vertex_formats(&data),
            Err(BackendError::UnsupportedVertexFormat { ty: "Float", count: 5 })
        );
    }
}
