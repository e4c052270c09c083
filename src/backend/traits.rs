//! Core backend abstraction traits
//!
//! One capability trait per resource kind; [`GraphicsBackend`] bundles them.
//! All traits are object-safe so the facade can hold a `Box<dyn GraphicsBackend>`.
//!
//! Backends receive mesh descriptors only after [`MeshData::verify`] accepted
//! them, and report failures as [`BackendError`]. The facade turns those into
//! the shared error taxonomy.

use glam::Vec4;
use thiserror::Error;

use crate::backend::types::*;
use crate::handle::{FrameBuffer, Mesh, Shader, Texture, Window};
use crate::math::Color;
use crate::mesh::MeshData;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to create window: {0}")]
    WindowCreationFailed(String),
    #[error("Unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u64 },
    #[error("Mesh {0} has no uploaded data")]
    MeshNotCreated(Mesh),
    #[error("Shader {0} has not been compiled")]
    ShaderNotCompiled(Shader),
    #[error("No shader bound for drawing")]
    NoShaderBound,
    #[error("Unsupported vertex format: {count} x {ty}")]
    UnsupportedVertexFormat { ty: &'static str, count: u32 },
    #[error("No render target")]
    NoRenderTarget,
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Native error: {0}")]
    Native(String),
}

impl BackendError {
    pub(crate) fn unknown(kind: &'static str, id: u64) -> Self {
        BackendError::UnknownHandle { kind, id }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Callback invoked with the new framebuffer size of a window.
pub type ResizeCallback = Box<dyn FnMut(u32, u32)>;

/// Mesh resources: create, upload, draw, destroy.
pub trait MeshBackend {
    /// Allocate a mesh with no data.
    fn create_mesh(&mut self) -> BackendResult<Mesh>;

    /// Translate a verified descriptor into native buffers.
    ///
    /// On failure the mesh falls back to the no-data state.
    fn upload_mesh_data(&mut self, mesh: Mesh, data: &MeshData<'_>) -> BackendResult<()>;

    /// Draw with the bound shader into the current target.
    ///
    /// Returns [`BackendError::MeshNotCreated`] when no data was uploaded.
    fn draw_mesh(&mut self, mesh: Mesh) -> BackendResult<()>;

    fn destroy_mesh(&mut self, mesh: Mesh) -> BackendResult<()>;
}

/// Shader programs: compile, uniform lookup and update, binding.
pub trait ShaderBackend {
    fn create_shader(&mut self) -> BackendResult<Shader>;

    /// Compile a single WGSL source holding both stages.
    fn compile_shader(&mut self, shader: Shader, source: &str) -> ShaderCompileOutput;

    /// Location of a `vec4<f32>` uniform, -1 if the program has no such uniform.
    fn uniform_location(&mut self, shader: Shader, name: &str) -> BackendResult<i32>;

    fn set_uniform_vec4(&mut self, shader: Shader, location: i32, value: Vec4)
        -> BackendResult<()>;

    /// Bind the shader for subsequent draws.
    fn use_shader(&mut self, shader: Shader) -> BackendResult<()>;

    fn destroy_shader(&mut self, shader: Shader) -> BackendResult<()>;
}

/// Textures
pub trait TextureBackend {
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<Texture>;

    fn destroy_texture(&mut self, texture: Texture);
}

/// Offscreen render targets
pub trait FrameBufferBackend {
    fn create_framebuffer(&mut self, desc: &FrameBufferDescriptor) -> BackendResult<FrameBuffer>;

    fn destroy_framebuffer(&mut self, framebuffer: FrameBuffer);

    /// Render into `framebuffer`, or back into the render window for `None`.
    fn set_render_target(&mut self, framebuffer: Option<FrameBuffer>);
}

/// Windows, presentation and event delivery
pub trait WindowBackend {
    fn create_window(&mut self, width: u32, height: u32, title: &str) -> BackendResult<Window>;

    fn destroy_window(&mut self, window: Window);

    /// Replace the resize callback of `window`.
    fn register_resize_callback(&mut self, window: Window, callback: ResizeCallback);

    fn should_close(&self, window: Window) -> bool;

    /// Present what was rendered into `window` since the last swap.
    fn swap_buffers(&mut self, window: Window);

    /// Process pending window events.
    ///
    /// Resize callbacks run here, synchronously, before this returns.
    fn poll_events(&mut self);

    /// Make `window` the render window.
    fn set_render_window(&mut self, window: Window);
}

/// Viewport and clear state of the current target
pub trait RenderControl {
    fn set_viewport(&mut self, viewport: Viewport);

    fn clear(&mut self, color: Color, mask: ClearMask);
}

/// Main graphics backend trait
pub trait GraphicsBackend:
    MeshBackend + ShaderBackend + TextureBackend + FrameBufferBackend + WindowBackend + RenderControl
{
    /// Get the backend name
    fn name(&self) -> &'static str;

    /// Seconds since the backend was created
    fn time(&self) -> f32;

    fn stats(&self) -> ResourceStats;
}
