//! Renderer facade
//!
//! [`Renderer`] owns the active backend and is the only entry point callers
//! need. It follows an `init → operations → terminate` lifecycle; operations
//! issued outside of it log an error and return [`RenderError::Internal`].
//!
//! Mesh descriptors are verified here, before the backend sees them, so the
//! `MeshData*` codes are identical on every backend.

use glam::Vec4;

use crate::backend::{
    self, BackendResult, ClearMask, FrameBufferDescriptor, GraphicsBackend, ResourceStats,
    ShaderCompileOutput, TextureDescriptor, Viewport,
};
use crate::config::RendererConfig;
use crate::error::{RenderError, RenderResult};
use crate::handle::{FrameBuffer, Mesh, Shader, Texture, Window};
use crate::math::Color;
use crate::mesh::MeshData;

/// Builds the backend at [`Renderer::init`].
pub type BackendFactory = Box<dyn Fn(&RendererConfig) -> BackendResult<Box<dyn GraphicsBackend>>>;

/// Backend-agnostic renderer
pub struct Renderer {
    config: RendererConfig,
    factory: BackendFactory,
    backend: Option<Box<dyn GraphicsBackend>>,
}

impl Renderer {
    /// Create an uninitialized renderer that selects its backend from `config`.
    pub fn new(config: RendererConfig) -> Self {
        Self::with_factory(config, backend::create_backend)
    }

    /// Create an uninitialized renderer whose backend comes from `factory`.
    pub fn with_factory<F>(config: RendererConfig, factory: F) -> Self
    where
        F: Fn(&RendererConfig) -> BackendResult<Box<dyn GraphicsBackend>> + 'static,
    {
        Self {
            config,
            factory: Box::new(factory),
            backend: None,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Bring up the backend. Returns `true` on success.
    ///
    /// Calling it again while initialized returns `true` without creating
    /// anything.
    pub fn init(&mut self) -> bool {
        if self.backend.is_some() {
            log::debug!("Renderer already initialized");
            return true;
        }

        match (self.factory)(&self.config) {
            Ok(backend) => {
                log::info!("Renderer initialized with {} backend", backend.name());
                self.backend = Some(backend);
                true
            }
            Err(e) => {
                log::error!("Renderer initialization failed: {}", e);
                false
            }
        }
    }

    /// Drop the backend and every native object it owns.
    pub fn terminate(&mut self) {
        if let Some(backend) = self.backend.take() {
            log::info!("Terminating {} backend", backend.name());
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|b| b.name())
    }

    /// Seconds since init, 0 when not initialized.
    pub fn time(&self) -> f32 {
        self.backend.as_ref().map_or(0.0, |b| b.time())
    }

    pub fn stats(&self) -> ResourceStats {
        self.backend
            .as_ref()
            .map(|b| b.stats())
            .unwrap_or_default()
    }

    fn backend(&mut self, op: &str) -> RenderResult<&mut (dyn GraphicsBackend + 'static)> {
        match self.backend.as_deref_mut() {
            Some(backend) => Ok(backend),
            None => {
                log::error!("{}: renderer is not initialized", op);
                Err(RenderError::Internal)
            }
        }
    }

    /// For operations without a result code.
    fn backend_or_warn(&mut self, op: &str) -> Option<&mut (dyn GraphicsBackend + 'static)> {
        let backend = self.backend.as_deref_mut();
        if backend.is_none() {
            log::warn!("{}: renderer is not initialized", op);
        }
        backend
    }

    // Meshes

    pub fn create_mesh(&mut self) -> RenderResult<Mesh> {
        Ok(self.backend("create_mesh")?.create_mesh()?)
    }

    /// Verify `data` and upload it into `mesh`.
    ///
    /// An invalid descriptor returns its verification code and never reaches
    /// the backend.
    pub fn upload_mesh_data(&mut self, mesh: Mesh, data: &MeshData<'_>) -> RenderResult<()> {
        data.verify()?;
        Ok(self
            .backend("upload_mesh_data")?
            .upload_mesh_data(mesh, data)?)
    }

    pub fn draw_mesh(&mut self, mesh: Mesh) -> RenderResult<()> {
        Ok(self.backend("draw_mesh")?.draw_mesh(mesh)?)
    }

    pub fn destroy_mesh(&mut self, mesh: Mesh) -> RenderResult<()> {
        Ok(self.backend("destroy_mesh")?.destroy_mesh(mesh)?)
    }

    // Textures and framebuffers

    pub fn create_texture(&mut self, desc: &TextureDescriptor) -> RenderResult<Texture> {
        Ok(self.backend("create_texture")?.create_texture(desc)?)
    }

    pub fn destroy_texture(&mut self, texture: Texture) {
        if let Some(backend) = self.backend_or_warn("destroy_texture") {
            backend.destroy_texture(texture);
        }
    }

    pub fn create_framebuffer(&mut self, desc: &FrameBufferDescriptor) -> RenderResult<FrameBuffer> {
        Ok(self.backend("create_framebuffer")?.create_framebuffer(desc)?)
    }

    pub fn destroy_framebuffer(&mut self, framebuffer: FrameBuffer) {
        if let Some(backend) = self.backend_or_warn("destroy_framebuffer") {
            backend.destroy_framebuffer(framebuffer);
        }
    }

    /// Render into `framebuffer`, or back into the render window for `None`.
    pub fn set_render_target(&mut self, framebuffer: Option<FrameBuffer>) {
        if let Some(backend) = self.backend_or_warn("set_render_target") {
            backend.set_render_target(framebuffer);
        }
    }

    // Shaders

    pub fn create_shader(&mut self) -> RenderResult<Shader> {
        Ok(self.backend("create_shader")?.create_shader()?)
    }

    /// Compile a WGSL source holding `vs_main` and `fs_main`.
    pub fn compile_shader(&mut self, shader: Shader, source: &str) -> ShaderCompileOutput {
        let backend = match self.backend("compile_shader") {
            Ok(backend) => backend,
            Err(e) => {
                return ShaderCompileOutput {
                    result: Err(e),
                    log: String::new(),
                }
            }
        };

        // the backend leaves logging to us when it has a diagnostic
        let output = backend.compile_shader(shader, source);
        if !output.log.is_empty() {
            log::error!("{} compilation failed:\n{}", shader, output.log);
        }
        output
    }

    /// Location of a `vec4<f32>` uniform, -1 when the shader has none by that name.
    pub fn uniform_location(&mut self, shader: Shader, name: &str) -> RenderResult<i32> {
        Ok(self
            .backend("uniform_location")?
            .uniform_location(shader, name)?)
    }

    /// Write a uniform. Location -1 is ignored.
    pub fn set_uniform_vec4(
        &mut self,
        shader: Shader,
        location: i32,
        value: impl Into<Vec4>,
    ) -> RenderResult<()> {
        Ok(self
            .backend("set_uniform_vec4")?
            .set_uniform_vec4(shader, location, value.into())?)
    }

    pub fn use_shader(&mut self, shader: Shader) -> RenderResult<()> {
        Ok(self.backend("use_shader")?.use_shader(shader)?)
    }

    pub fn destroy_shader(&mut self, shader: Shader) -> RenderResult<()> {
        Ok(self.backend("destroy_shader")?.destroy_shader(shader)?)
    }

    // Windows

    /// Open a window. The first window becomes the render window.
    pub fn create_window(&mut self, width: u32, height: u32, title: &str) -> RenderResult<Window> {
        Ok(self
            .backend("create_window")?
            .create_window(width, height, title)?)
    }

    pub fn destroy_window(&mut self, window: Window) {
        if let Some(backend) = self.backend_or_warn("destroy_window") {
            backend.destroy_window(window);
        }
    }

    /// Replace the resize callback of `window`. It runs inside [`poll_events`](Self::poll_events).
    pub fn register_resize_callback(
        &mut self,
        window: Window,
        callback: impl FnMut(u32, u32) + 'static,
    ) {
        if let Some(backend) = self.backend_or_warn("register_resize_callback") {
            backend.register_resize_callback(window, Box::new(callback));
        }
    }

    /// `true` once the user asked to close `window`, or when it doesn't exist.
    pub fn should_close(&self, window: Window) -> bool {
        self.backend
            .as_ref()
            .map_or(true, |b| b.should_close(window))
    }

    pub fn swap_buffers(&mut self, window: Window) {
        if let Some(backend) = self.backend_or_warn("swap_buffers") {
            backend.swap_buffers(window);
        }
    }

    pub fn poll_events(&mut self) {
        if let Some(backend) = self.backend_or_warn("poll_events") {
            backend.poll_events();
        }
    }

    pub fn set_render_window(&mut self, window: Window) {
        if let Some(backend) = self.backend_or_warn("set_render_window") {
            backend.set_render_window(window);
        }
    }

    // Render state

    pub fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        if let Some(backend) = self.backend_or_warn("set_viewport") {
            backend.set_viewport(Viewport {
                x,
                y,
                width,
                height,
            });
        }
    }

    pub fn clear(&mut self, color: Color, mask: ClearMask) {
        if let Some(backend) = self.backend_or_warn("clear") {
            backend.clear(color, mask);
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendType;
    use crate::error::ErrorCode;
    use crate::mesh::VertexAttribType;

    fn headless() -> Renderer {
        let mut renderer =
            Renderer::new(RendererConfig::default().with_backend(BackendType::Headless));
        assert!(renderer.init());
        renderer
    }

    #[test]
    fn test_operations_before_init_are_internal() {
        let mut renderer = Renderer::new(RendererConfig::default());
        assert!(!renderer.is_initialized());
        assert_eq!(renderer.create_mesh(), Err(RenderError::Internal));
        assert_eq!(renderer.create_shader(), Err(RenderError::Internal));
        assert_eq!(renderer.time(), 0.0);
        assert!(renderer.should_close(Window::from_raw(1)));
        // no-return operations are no-ops
        renderer.poll_events();
        renderer.clear(Color::BLACK, ClearMask::COLOR);
    }

    #[test]
    fn test_verify_runs_before_backend() {
        let mut renderer = headless();
        let mesh = renderer.create_mesh().unwrap();

        let mut data = MeshData::new();
        data.append_attrib(VertexAttribType::Float, 3, false).unwrap();
        let bytes = [0u8; 35];
        let data = data.with_vertices(&bytes, 3).with_indices(&[0, 1, 2]);

        let before = renderer.stats();
        let result = renderer.upload_mesh_data(mesh, &data);
        assert_eq!(ErrorCode::from(&result), ErrorCode::MeshDataLengthError);
        assert_eq!(result, data.verify());
        assert_eq!(renderer.stats(), before);
    }

    #[test]
    fn test_terminate_releases_backend() {
        let mut renderer = headless();
        renderer.create_mesh().unwrap();
        assert_eq!(renderer.stats().meshes, 1);

        renderer.terminate();
        assert!(!renderer.is_initialized());
        assert_eq!(renderer.stats(), ResourceStats::default());

        // headless can come back up after terminate
        assert!(renderer.init());
        assert_eq!(renderer.stats().meshes, 0);
    }

    #[test]
    fn test_failing_factory() {
        let mut renderer = Renderer::with_factory(RendererConfig::default(), |_| {
            Err(crate::BackendError::InitializationFailed("no gpu".into()))
        });
        assert!(!renderer.init());
        assert!(!renderer.is_initialized());
    }
}
