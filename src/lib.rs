//! gfx-facade - a backend-agnostic rendering facade
//!
//! Callers describe meshes, shaders, textures, framebuffers and windows through
//! opaque handles and plain data descriptors. Whichever backend is active does
//! the native work:
//! - **wgpu**: wgpu for rasterization, winit for windows and events
//! - **Headless**: in-memory backend with resource statistics (tests, CI)
//!
//! # Features
//! - Fixed-capacity vertex attribute model with structural verification
//! - Closed error taxonomy shared by every backend
//! - Typed opaque handles dispatched through capability traits
//! - WGSL shader reflection for uniform lookup
//!
//! # Example
//!
//! ```ignore
//! use gfx_facade::{MeshData, Renderer, RendererConfig, VertexAttribType};
//!
//! let mut renderer = Renderer::new(RendererConfig::default());
//! assert!(renderer.init());
//!
//! let mesh = renderer.create_mesh()?;
//! let mut data = MeshData::new();
//! data.append_attrib(VertexAttribType::Float, 3, false)?;
//! data.append_attrib(VertexAttribType::Float, 3, false)?;
//! let data = data.with_vertices(bytemuck::cast_slice(&vertices), 3).with_indices(&[0, 1, 2]);
//! renderer.upload_mesh_data(mesh, &data)?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod handle;
pub mod logging;
pub mod math;
pub mod mesh;
pub mod renderer;
pub mod shader;

pub use backend::{
    BackendError, ClearMask, FrameBufferDescriptor, GraphicsBackend, HeadlessBackend,
    ResourceStats, ShaderCompileOutput, TextureDescriptor, TextureFormat,
};
#[cfg(all(feature = "wgpu-backend", not(target_arch = "wasm32")))]
pub use backend::wgpu_backend::WgpuBackend;
pub use config::{BackendType, PowerPreference, RendererConfig};
pub use error::{ErrorCode, RenderError, RenderResult};
pub use handle::{FrameBuffer, Mesh, Shader, Texture, Window};
pub use math::Color;
pub use mesh::{
    attrib_size, MeshData, VertexAttribDescription, VertexAttribType, VertexIndex,
    MAX_VERTEX_ATTRIBS,
};
pub use renderer::Renderer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
