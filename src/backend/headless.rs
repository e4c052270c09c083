//! Headless backend for testing and development.
//!
//! This backend doesn't touch a GPU or a window system but honours the full
//! resource contract: handles are tracked, mesh uploads are recorded, shaders
//! are really validated and reflected, and windows are virtual. Window events
//! are injected through an [`EventQueue`] and delivered by `poll_events`, like
//! an OS event queue would.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use glam::Vec4;

use crate::backend::check_vertex_formats;
use crate::backend::table::ResourceTable;
use crate::backend::traits::*;
use crate::backend::types::*;
use crate::error::RenderError;
use crate::handle::{FrameBuffer, Mesh, Shader, Texture, Window};
use crate::math::Color;
use crate::mesh::{MeshData, VertexAttribDescription};
use crate::shader::{self, ShaderReflection};

/// Event delivered to a virtual window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessEvent {
    Resized { width: u32, height: u32 },
    CloseRequested,
}

/// Shared queue of pending window events.
///
/// Clones share the same queue, so a test can keep one while the backend is
/// owned by a renderer.
#[derive(Debug, Clone, Default)]
pub struct EventQueue(Rc<RefCell<VecDeque<(Window, HeadlessEvent)>>>);

impl EventQueue {
    pub fn push(&self, window: Window, event: HeadlessEvent) {
        self.0.borrow_mut().push_back((window, event));
    }

    pub fn push_resize(&self, window: Window, width: u32, height: u32) {
        self.push(window, HeadlessEvent::Resized { width, height });
    }

    pub fn push_close(&self, window: Window) {
        self.push(window, HeadlessEvent::CloseRequested);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn pop(&self) -> Option<(Window, HeadlessEvent)> {
        self.0.borrow_mut().pop_front()
    }
}

/// Layout captured by a successful upload.
#[derive(Debug, Clone)]
struct UploadedMesh {
    attribs: Vec<VertexAttribDescription>,
    stride: usize,
    vert_count: u32,
    index_count: usize,
}

#[derive(Debug, Default)]
struct HeadlessMesh {
    uploaded: Option<UploadedMesh>,
}

#[derive(Debug, Default)]
struct HeadlessShader {
    reflection: Option<ShaderReflection>,
    uniform_values: Vec<Vec4>,
}

struct HeadlessWindow {
    title: String,
    width: u32,
    height: u32,
    close_requested: bool,
    resize_callback: Option<ResizeCallback>,
}

/// Which surface draws and clears land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Window(Window),
    FrameBuffer(FrameBuffer),
}

/// Headless backend.
pub struct HeadlessBackend {
    start: Instant,
    meshes: ResourceTable<HeadlessMesh>,
    shaders: ResourceTable<HeadlessShader>,
    textures: ResourceTable<TextureDescriptor>,
    framebuffers: ResourceTable<FrameBufferDescriptor>,
    windows: ResourceTable<HeadlessWindow>,
    events: EventQueue,
    bound_shader: Option<Shader>,
    render_window: Option<Window>,
    render_target: Option<FrameBuffer>,
    viewport: Option<Viewport>,
    last_clear: Option<(Color, ClearMask)>,
    last_draw: Option<(Mesh, u32)>,
    stats: ResourceStats,
}

impl HeadlessBackend {
    /// Create a new headless backend.
    pub fn new() -> Self {
        log::debug!("HeadlessBackend: created");
        Self {
            start: Instant::now(),
            meshes: ResourceTable::new("mesh"),
            shaders: ResourceTable::new("shader"),
            textures: ResourceTable::new("texture"),
            framebuffers: ResourceTable::new("framebuffer"),
            windows: ResourceTable::new("window"),
            events: EventQueue::default(),
            bound_shader: None,
            render_window: None,
            render_target: None,
            viewport: None,
            last_clear: None,
            last_draw: None,
            stats: ResourceStats::default(),
        }
    }

    /// Queue feeding this backend's `poll_events`.
    pub fn event_queue(&self) -> EventQueue {
        self.events.clone()
    }

    /// Current size of a virtual window.
    pub fn window_size(&self, window: Window) -> Option<(u32, u32)> {
        self.windows
            .get(window.raw())
            .ok()
            .map(|w| (w.width, w.height))
    }

    pub fn window_title(&self, window: Window) -> Option<&str> {
        self.windows.get(window.raw()).ok().map(|w| w.title.as_str())
    }

    /// Value last written to a uniform, `None` for unknown shaders or locations.
    pub fn uniform_value(&self, shader: Shader, location: i32) -> Option<Vec4> {
        let state = self.shaders.get(shader.raw()).ok()?;
        let index = state.reflection.as_ref()?.slot_index(location)?;
        state.uniform_values.get(index).copied()
    }

    pub fn bound_shader(&self) -> Option<Shader> {
        self.bound_shader
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn last_clear(&self) -> Option<(Color, ClearMask)> {
        self.last_clear
    }

    /// Mesh and vertex count of the last successful draw.
    pub fn last_draw(&self) -> Option<(Mesh, u32)> {
        self.last_draw
    }

    pub fn render_window(&self) -> Option<Window> {
        self.render_window
    }

    /// Target draws and clears currently land on.
    pub fn current_target(&self) -> Option<RenderTarget> {
        match (self.render_target, self.render_window) {
            (Some(fb), _) => Some(RenderTarget::FrameBuffer(fb)),
            (None, Some(window)) => Some(RenderTarget::Window(window)),
            (None, None) => None,
        }
    }

    /// Vertex stride recorded by the last successful upload of `mesh`.
    pub fn uploaded_stride(&self, mesh: Mesh) -> Option<usize> {
        let state = self.meshes.get(mesh.raw()).ok()?;
        state.uploaded.as_ref().map(|u| u.stride)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBackend for HeadlessBackend {
    fn create_mesh(&mut self) -> BackendResult<Mesh> {
        let mesh = Mesh::from_raw(self.meshes.insert(HeadlessMesh::default()));
        log::trace!("HeadlessBackend: created {}", mesh);
        Ok(mesh)
    }

    fn upload_mesh_data(&mut self, mesh: Mesh, data: &MeshData<'_>) -> BackendResult<()> {
        let state = self.meshes.get_mut(mesh.raw())?;
        state.uploaded = None;
        check_vertex_formats(data)?;
        state.uploaded = Some(UploadedMesh {
            attribs: data.attribs().to_vec(),
            stride: data.vertex_stride(),
            vert_count: data.vert_count,
            index_count: data.indices_count(),
        });

        self.stats.mesh_uploads += 1;
        self.stats.vertex_bytes_uploaded += data.data_size() as u64;
        self.stats.index_bytes_uploaded +=
            (data.indices_count() * std::mem::size_of::<u32>()) as u64;
        log::trace!(
            "HeadlessBackend: upload {} ({} vertices, {} bytes)",
            mesh,
            data.vert_count,
            data.data_size()
        );
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: Mesh) -> BackendResult<()> {
        let state = self.meshes.get(mesh.raw())?;
        let Some(uploaded) = &state.uploaded else {
            return Err(BackendError::MeshNotCreated(mesh));
        };

        let shader = self.bound_shader.ok_or(BackendError::NoShaderBound)?;
        if self.shaders.get(shader.raw())?.reflection.is_none() {
            return Err(BackendError::ShaderNotCompiled(shader));
        }
        let target = self.current_target().ok_or(BackendError::NoRenderTarget)?;

        log::trace!(
            "HeadlessBackend: draw {} ({} attribs, {} vertices, {} indices unused) into {:?}",
            mesh,
            uploaded.attribs.len(),
            uploaded.vert_count,
            uploaded.index_count,
            target
        );
        self.last_draw = Some((mesh, uploaded.vert_count));
        self.stats.draw_calls += 1;
        Ok(())
    }

    fn destroy_mesh(&mut self, mesh: Mesh) -> BackendResult<()> {
        self.meshes.remove(mesh.raw())?;
        log::trace!("HeadlessBackend: destroyed {}", mesh);
        Ok(())
    }
}

impl ShaderBackend for HeadlessBackend {
    fn create_shader(&mut self) -> BackendResult<Shader> {
        Ok(Shader::from_raw(self.shaders.insert(HeadlessShader::default())))
    }

    fn compile_shader(&mut self, shader: Shader, source: &str) -> ShaderCompileOutput {
        let state = match self.shaders.get_mut(shader.raw()) {
            Ok(state) => state,
            Err(e) => {
                return ShaderCompileOutput {
                    result: Err(e.into()),
                    log: String::new(),
                }
            }
        };

        match shader::reflect(source) {
            Ok(reflection) => {
                state.uniform_values = vec![Vec4::ZERO; reflection.uniforms().len()];
                state.reflection = Some(reflection);
                ShaderCompileOutput::success()
            }
            Err(log) => {
                state.reflection = None;
                state.uniform_values.clear();
                ShaderCompileOutput {
                    result: Err(RenderError::Internal),
                    log,
                }
            }
        }
    }

    fn uniform_location(&mut self, shader: Shader, name: &str) -> BackendResult<i32> {
        let state = self.shaders.get(shader.raw())?;
        let reflection = state
            .reflection
            .as_ref()
            .ok_or(BackendError::ShaderNotCompiled(shader))?;
        Ok(reflection.uniform_location(name))
    }

    fn set_uniform_vec4(
        &mut self,
        shader: Shader,
        location: i32,
        value: Vec4,
    ) -> BackendResult<()> {
        let state = self.shaders.get_mut(shader.raw())?;
        let reflection = state
            .reflection
            .as_ref()
            .ok_or(BackendError::ShaderNotCompiled(shader))?;
        if location == -1 {
            return Ok(());
        }
        let index = reflection.slot_index(location).ok_or_else(|| {
            BackendError::Native(format!("{} has no uniform at location {}", shader, location))
        })?;
        state.uniform_values[index] = value;
        Ok(())
    }

    fn use_shader(&mut self, shader: Shader) -> BackendResult<()> {
        if self.shaders.get(shader.raw())?.reflection.is_none() {
            return Err(BackendError::ShaderNotCompiled(shader));
        }
        self.bound_shader = Some(shader);
        Ok(())
    }

    fn destroy_shader(&mut self, shader: Shader) -> BackendResult<()> {
        self.shaders.remove(shader.raw())?;
        if self.bound_shader == Some(shader) {
            self.bound_shader = None;
        }
        Ok(())
    }
}

impl TextureBackend for HeadlessBackend {
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<Texture> {
        log::trace!(
            "HeadlessBackend: creating texture {}x{} {:?}",
            desc.width,
            desc.height,
            desc.format
        );
        Ok(Texture::from_raw(self.textures.insert(*desc)))
    }

    fn destroy_texture(&mut self, texture: Texture) {
        if let Err(e) = self.textures.remove(texture.raw()) {
            log::warn!("HeadlessBackend: destroy_texture: {}", e);
        }
    }
}

impl FrameBufferBackend for HeadlessBackend {
    fn create_framebuffer(&mut self, desc: &FrameBufferDescriptor) -> BackendResult<FrameBuffer> {
        Ok(FrameBuffer::from_raw(self.framebuffers.insert(*desc)))
    }

    fn destroy_framebuffer(&mut self, framebuffer: FrameBuffer) {
        if let Err(e) = self.framebuffers.remove(framebuffer.raw()) {
            log::warn!("HeadlessBackend: destroy_framebuffer: {}", e);
        }
        if self.render_target == Some(framebuffer) {
            self.render_target = None;
        }
    }

    fn set_render_target(&mut self, framebuffer: Option<FrameBuffer>) {
        if let Some(fb) = framebuffer {
            if !self.framebuffers.contains(fb.raw()) {
                log::warn!("HeadlessBackend: set_render_target: unknown {}", fb);
                return;
            }
        }
        self.render_target = framebuffer;
    }
}

impl WindowBackend for HeadlessBackend {
    fn create_window(&mut self, width: u32, height: u32, title: &str) -> BackendResult<Window> {
        let window = Window::from_raw(self.windows.insert(HeadlessWindow {
            title: title.to_string(),
            width,
            height,
            close_requested: false,
            resize_callback: None,
        }));
        if self.render_window.is_none() {
            self.render_window = Some(window);
        }
        log::debug!("HeadlessBackend: created {} '{}' ({}x{})", window, title, width, height);
        Ok(window)
    }

    fn destroy_window(&mut self, window: Window) {
        if let Err(e) = self.windows.remove(window.raw()) {
            log::warn!("HeadlessBackend: destroy_window: {}", e);
        }
        if self.render_window == Some(window) {
            self.render_window = None;
        }
    }

    fn register_resize_callback(&mut self, window: Window, callback: ResizeCallback) {
        match self.windows.get_mut(window.raw()) {
            Ok(state) => state.resize_callback = Some(callback),
            Err(e) => log::warn!("HeadlessBackend: register_resize_callback: {}", e),
        }
    }

    fn should_close(&self, window: Window) -> bool {
        self.windows
            .get(window.raw())
            .map_or(true, |state| state.close_requested)
    }

    fn swap_buffers(&mut self, window: Window) {
        if self.windows.contains(window.raw()) {
            self.stats.presents += 1;
        } else {
            log::warn!("HeadlessBackend: swap_buffers: unknown {}", window);
        }
    }

    fn poll_events(&mut self) {
        while let Some((window, event)) = self.events.pop() {
            let Ok(state) = self.windows.get_mut(window.raw()) else {
                log::trace!("HeadlessBackend: dropping event for unknown {}", window);
                continue;
            };
            match event {
                HeadlessEvent::Resized { width, height } => {
                    state.width = width;
                    state.height = height;
                    if let Some(callback) = state.resize_callback.as_mut() {
                        callback(width, height);
                    }
                }
                HeadlessEvent::CloseRequested => state.close_requested = true,
            }
        }
    }

    fn set_render_window(&mut self, window: Window) {
        if self.windows.contains(window.raw()) {
            self.render_window = Some(window);
        } else {
            log::warn!("HeadlessBackend: set_render_window: unknown {}", window);
        }
    }
}

impl RenderControl for HeadlessBackend {
    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn clear(&mut self, color: Color, mask: ClearMask) {
        if self.current_target().is_none() {
            log::warn!("HeadlessBackend: clear without a render target");
            return;
        }
        self.last_clear = Some((color, mask));
        self.stats.clears += 1;
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn time(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    fn stats(&self) -> ResourceStats {
        ResourceStats {
            meshes: self.meshes.len(),
            textures: self.textures.len(),
            shaders: self.shaders.len(),
            framebuffers: self.framebuffers.len(),
            windows: self.windows.len(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexAttribType;

    const SHADER: &str = r#"
@group(0) @binding(0) var<uniform> tint: vec4<f32>;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return tint;
}
"#;

    fn triangle<'a>(bytes: &'a [u8], indices: &'a [u32]) -> MeshData<'a> {
        let mut data = MeshData::new();
        data.append_attrib(VertexAttribType::Float, 3, false).unwrap();
        data.with_vertices(bytes, 3).with_indices(indices)
    }

    #[test]
    fn test_draw_requires_upload() {
        let mut backend = HeadlessBackend::new();
        let mesh = backend.create_mesh().unwrap();
        assert_eq!(
            backend.draw_mesh(mesh),
            Err(BackendError::MeshNotCreated(mesh))
        );
    }

    #[test]
    fn test_draw_after_upload() {
        let mut backend = HeadlessBackend::new();
        backend.create_window(64, 64, "test").unwrap();
        let shader = backend.create_shader().unwrap();
        assert!(backend.compile_shader(shader, SHADER).is_ok());
        backend.use_shader(shader).unwrap();

        let bytes = [0u8; 36];
        let indices = [0, 1, 2];
        let mesh = backend.create_mesh().unwrap();
        backend
            .upload_mesh_data(mesh, &triangle(&bytes, &indices))
            .unwrap();
        backend.draw_mesh(mesh).unwrap();

        let stats = backend.stats();
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.vertex_bytes_uploaded, 36);
        assert_eq!(stats.index_bytes_uploaded, 12);
        assert_eq!(backend.uploaded_stride(mesh), Some(12));
    }

    #[test]
    fn test_destroyed_handle_misses() {
        let mut backend = HeadlessBackend::new();
        let mesh = backend.create_mesh().unwrap();
        backend.destroy_mesh(mesh).unwrap();
        assert!(matches!(
            backend.draw_mesh(mesh),
            Err(BackendError::UnknownHandle { kind: "mesh", .. })
        ));
        assert!(backend.destroy_mesh(mesh).is_err());
    }

    #[test]
    fn test_uniforms() {
        let mut backend = HeadlessBackend::new();
        let shader = backend.create_shader().unwrap();
        assert!(backend.compile_shader(shader, SHADER).is_ok());

        let location = backend.uniform_location(shader, "tint").unwrap();
        assert_eq!(location, 0);
        assert_eq!(backend.uniform_location(shader, "nope").unwrap(), -1);

        let value = Vec4::new(0.5, 0.25, 1.0, 1.0);
        backend.set_uniform_vec4(shader, location, value).unwrap();
        assert_eq!(backend.uniform_value(shader, location), Some(value));

        // -1 is silently ignored, an undeclared location is an error
        backend.set_uniform_vec4(shader, -1, Vec4::ONE).unwrap();
        assert!(backend.set_uniform_vec4(shader, 5, Vec4::ONE).is_err());
    }

    #[test]
    fn test_failed_compile_reports_log() {
        let mut backend = HeadlessBackend::new();
        let shader = backend.create_shader().unwrap();
        let output = backend.compile_shader(shader, "this is not wgsl");
        assert!(!output.is_ok());
        assert!(!output.log.is_empty());
        assert!(backend.use_shader(shader).is_err());
    }

    #[test]
    fn test_resize_delivered_on_poll() {
        let mut backend = HeadlessBackend::new();
        let window = backend.create_window(100, 50, "resize").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        backend.register_resize_callback(window, Box::new(move |w, h| sink.borrow_mut().push((w, h))));

        let queue = backend.event_queue();
        queue.push_resize(window, 200, 100);
        assert_eq!(queue.len(), 1);
        assert!(seen.borrow().is_empty());

        backend.poll_events();
        assert_eq!(*seen.borrow(), vec![(200, 100)]);
        assert_eq!(backend.window_size(window), Some((200, 100)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_close_request() {
        let mut backend = HeadlessBackend::new();
        let window = backend.create_window(10, 10, "close").unwrap();
        assert!(!backend.should_close(window));
        backend.event_queue().push_close(window);
        backend.poll_events();
        assert!(backend.should_close(window));
    }

    #[test]
    fn test_render_target_switch() {
        let mut backend = HeadlessBackend::new();
        let window = backend.create_window(10, 10, "main").unwrap();
        let fb = backend
            .create_framebuffer(&FrameBufferDescriptor::new(32, 32, TextureFormat::Rgba8))
            .unwrap();

        assert_eq!(backend.current_target(), Some(RenderTarget::Window(window)));
        backend.set_render_target(Some(fb));
        assert_eq!(backend.current_target(), Some(RenderTarget::FrameBuffer(fb)));
        backend.set_render_target(None);
        assert_eq!(backend.current_target(), Some(RenderTarget::Window(window)));
    }

    #[test]
    fn test_first_window_renders_until_switched() {
        let mut backend = HeadlessBackend::new();
        let first = backend.create_window(10, 10, "first").unwrap();
        let second = backend.create_window(20, 20, "second").unwrap();
        assert_eq!(backend.render_window(), Some(first));
        assert_eq!(backend.window_title(second), Some("second"));

        backend.set_render_window(second);
        assert_eq!(backend.current_target(), Some(RenderTarget::Window(second)));

        backend.destroy_window(first);
        backend.set_render_window(first);
        assert_eq!(backend.render_window(), Some(second));
        assert_eq!(backend.window_title(first), None);

        backend.destroy_window(second);
        assert_eq!(backend.render_window(), None);
        assert_eq!(backend.current_target(), None);
        assert!(backend.should_close(second));
    }

    #[test]
    fn test_destroyed_framebuffer_falls_back_to_window() {
        let mut backend = HeadlessBackend::new();
        let window = backend.create_window(10, 10, "main").unwrap();
        let fb = backend
            .create_framebuffer(&FrameBufferDescriptor::new(8, 8, TextureFormat::RgbaFloat))
            .unwrap();
        backend.set_render_target(Some(fb));
        backend.destroy_framebuffer(fb);
        assert_eq!(backend.current_target(), Some(RenderTarget::Window(window)));

        // an unknown framebuffer leaves the target alone
        backend.set_render_target(Some(fb));
        assert_eq!(backend.current_target(), Some(RenderTarget::Window(window)));
    }

    #[test]
    fn test_viewport_and_clear_state() {
        let mut backend = HeadlessBackend::new();
        let color = Color::new(0.2, 0.3, 0.3, 1.0);

        // nothing to clear into yet
        backend.clear(color, ClearMask::COLOR);
        assert_eq!(backend.last_clear(), None);
        assert_eq!(backend.stats().clears, 0);

        backend.create_window(64, 32, "clear").unwrap();
        let viewport = Viewport {
            x: -4,
            y: 8,
            width: 32,
            height: 16,
        };
        backend.set_viewport(viewport);
        assert_eq!(backend.viewport(), Some(viewport));

        backend.clear(color, ClearMask::COLOR);
        backend.clear(Color::BLACK, ClearMask::DEPTH);
        assert_eq!(backend.last_clear(), Some((Color::BLACK, ClearMask::DEPTH)));
        assert_eq!(backend.stats().clears, 2);
    }

    #[test]
    fn test_destroy_shader_unbinds() {
        let mut backend = HeadlessBackend::new();
        backend.create_window(10, 10, "bind").unwrap();
        let shader = backend.create_shader().unwrap();
        assert!(backend.compile_shader(shader, SHADER).is_ok());
        backend.use_shader(shader).unwrap();
        assert_eq!(backend.bound_shader(), Some(shader));

        let bytes = [0u8; 36];
        let indices = [0, 1, 2];
        let mesh = backend.create_mesh().unwrap();
        backend
            .upload_mesh_data(mesh, &triangle(&bytes, &indices))
            .unwrap();

        backend.destroy_shader(shader).unwrap();
        assert_eq!(backend.bound_shader(), None);
        assert_eq!(backend.draw_mesh(mesh), Err(BackendError::NoShaderBound));
    }

    #[test]
    fn test_draw_walks_vertices_not_indices() {
        let mut backend = HeadlessBackend::new();
        backend.create_window(10, 10, "draw").unwrap();
        let shader = backend.create_shader().unwrap();
        assert!(backend.compile_shader(shader, SHADER).is_ok());
        backend.use_shader(shader).unwrap();

        let bytes = [0u8; 36];
        let mesh = backend.create_mesh().unwrap();
        backend
            .upload_mesh_data(mesh, &triangle(&bytes, &[0]))
            .unwrap();
        backend.draw_mesh(mesh).unwrap();
        assert_eq!(backend.last_draw(), Some((mesh, 3)));
    }

    #[test]
    fn test_undrawable_layout_rejected_at_upload() {
        let mut backend = HeadlessBackend::new();
        let bytes36 = [0u8; 36];
        let indices = [0, 1, 2];
        let mesh = backend.create_mesh().unwrap();
        backend
            .upload_mesh_data(mesh, &triangle(&bytes36, &indices))
            .unwrap();

        let bytes60 = [0u8; 60];
        let mut wide = MeshData::new();
        wide.append_attrib(VertexAttribType::Float, 5, false).unwrap();
        let wide = wide.with_vertices(&bytes60, 3).with_indices(&indices);
        assert_eq!(
            backend.upload_mesh_data(mesh, &wide),
            Err(BackendError::UnsupportedVertexFormat { ty: "Float", count: 5 })
        );

        // the failed upload drops the previous data
        assert_eq!(backend.draw_mesh(mesh), Err(BackendError::MeshNotCreated(mesh)));
        assert_eq!(backend.uploaded_stride(mesh), None);
        assert_eq!(backend.stats().mesh_uploads, 1);
    }
}
