//! wgpu backend implementation
//!
//! wgpu does the rendering, winit owns the windows. The device is created up
//! front without a surface; every window gets its own surface and depth
//! attachment when it is created.
//!
//! Work is recorded into one command encoder per frame: each clear and each
//! draw is a render pass on the current target. The encoder is submitted by
//! `swap_buffers`, before uniform writes, and before anything it may reference
//! is reconfigured or destroyed.

mod conversion;
mod resources;
mod window;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use glam::Vec4;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopBuilder};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowId;

use crate::backend::check_vertex_formats;
use crate::backend::table::ResourceTable;
use crate::backend::traits::*;
use crate::backend::types::*;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::handle::{FrameBuffer, Mesh, Shader, Texture, Window};
use crate::math::Color;
use crate::mesh::MeshData;
use resources::{GpuFrameBuffer, GpuMesh, GpuShader, GpuTexture, MeshBuffers};
use window::WindowState;

/// Instance, adapter, device and queue shared by every resource
pub(super) struct GpuContext {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuContext {
    async fn new(config: &RendererConfig) -> BackendResult<Self> {
        let backends = wgpu::util::backend_bits_from_env().unwrap_or(wgpu::Backends::all());
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: conversion::power_preference(config.power_preference),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BackendError::InitializationFailed("No suitable adapter found".into()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some(config.app_name.as_str()),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;

        device.on_uncaptured_error(Box::new(|e: wgpu::Error| log::error!("wgpu: {}", e)));

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Run `f` inside error scopes and turn captured errors into `BackendError`s.
    pub(super) fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> BackendResult<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        if out_of_memory.is_some() {
            return Err(BackendError::OutOfMemory);
        }
        if let Some(e) = validation {
            return Err(BackendError::Native(e.to_string()));
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    shader: u64,
    mesh: u64,
    format: wgpu::TextureFormat,
}

/// Attachments of the current render target
struct TargetViews<'a> {
    color: &'a wgpu::TextureView,
    depth: &'a wgpu::TextureView,
    width: u32,
    height: u32,
}

fn target_views<'a>(
    windows: &'a ResourceTable<WindowState>,
    framebuffers: &'a ResourceTable<GpuFrameBuffer>,
    render_target: Option<FrameBuffer>,
    render_window: Option<Window>,
) -> BackendResult<TargetViews<'a>> {
    match (render_target, render_window) {
        (Some(fb), _) => {
            let fb = framebuffers.get(fb.raw())?;
            Ok(TargetViews {
                color: &fb.color_view,
                depth: &fb.depth_view,
                width: fb.width,
                height: fb.height,
            })
        }
        (None, Some(window)) => {
            let state = windows.get(window.raw())?;
            let frame = state.frame.as_ref().ok_or(BackendError::SurfaceLost)?;
            let (width, height) = state.size();
            Ok(TargetViews {
                color: &frame.view,
                depth: &state.depth_view,
                width,
                height,
            })
        }
        (None, None) => Err(BackendError::NoRenderTarget),
    }
}

fn build_event_loop() -> BackendResult<EventLoop<()>> {
    let mut builder = EventLoopBuilder::new();
    // the renderer may live on any thread, tests run off the main thread
    #[cfg(target_os = "linux")]
    winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    #[cfg(target_os = "windows")]
    winit::platform::windows::EventLoopBuilderExtWindows::with_any_thread(&mut builder, true);
    builder
        .build()
        .map_err(|e| BackendError::InitializationFailed(e.to_string()))
}

/// wgpu backend implementation
pub struct WgpuBackend {
    start: Instant,
    vsync: bool,

    // Resource storage
    meshes: ResourceTable<GpuMesh>,
    shaders: ResourceTable<GpuShader>,
    textures: ResourceTable<GpuTexture>,
    framebuffers: ResourceTable<GpuFrameBuffer>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    // Command encoding
    encoder: Option<wgpu::CommandEncoder>,
    bound_shader: Option<Shader>,
    render_window: Option<Window>,
    render_target: Option<FrameBuffer>,
    viewport: Option<Viewport>,
    stats: ResourceStats,

    // Windows go before the event loop, the device goes last
    windows: ResourceTable<WindowState>,
    window_ids: HashMap<WindowId, u64>,
    event_loop: EventLoop<()>,
    gpu: GpuContext,
}

impl WgpuBackend {
    /// Create the event loop and the device.
    ///
    /// Fails without a display or a usable adapter. winit allows one event
    /// loop per process, so creating a second backend fails as well.
    pub fn new(config: &RendererConfig) -> BackendResult<Self> {
        let event_loop = build_event_loop()?;
        let gpu = pollster::block_on(GpuContext::new(config))?;

        Ok(Self {
            start: Instant::now(),
            vsync: config.vsync,
            meshes: ResourceTable::new("mesh"),
            shaders: ResourceTable::new("shader"),
            textures: ResourceTable::new("texture"),
            framebuffers: ResourceTable::new("framebuffer"),
            pipelines: HashMap::new(),
            encoder: None,
            bound_shader: None,
            render_window: None,
            render_target: None,
            viewport: None,
            stats: ResourceStats::default(),
            windows: ResourceTable::new("window"),
            window_ids: HashMap::new(),
            event_loop,
            gpu,
        })
    }

    /// Submit recorded passes.
    fn flush(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.gpu.queue.submit(std::iter::once(encoder.finish()));
        }
    }

    /// Make sure the current target has an image to render into.
    fn acquire_target(&mut self) -> BackendResult<wgpu::TextureFormat> {
        match (self.render_target, self.render_window) {
            (Some(fb), _) => Ok(self.framebuffers.get(fb.raw())?.format),
            (None, Some(window)) => {
                let state = self.windows.get_mut(window.raw())?;
                state.acquire(&self.gpu.device)?;
                Ok(state.config.format)
            }
            (None, None) => Err(BackendError::NoRenderTarget),
        }
    }

    fn clear_target(&mut self, color: Color, mask: ClearMask) -> BackendResult<()> {
        self.acquire_target()?;

        let Self {
            gpu,
            encoder,
            windows,
            framebuffers,
            render_target,
            render_window,
            stats,
            ..
        } = self;
        let target = target_views(windows, framebuffers, *render_target, *render_window)?;
        let encoder = encoder.get_or_insert_with(|| {
            gpu.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                })
        });

        let color_load = if mask.contains(ClearMask::COLOR) {
            wgpu::LoadOp::Clear(conversion::color(color))
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if mask.contains(ClearMask::DEPTH) {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };

        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        stats.clears += 1;
        Ok(())
    }

    fn forget_pipelines(&mut self, keep: impl Fn(&PipelineKey) -> bool) {
        self.pipelines.retain(|key, _| keep(key));
    }
}

impl MeshBackend for WgpuBackend {
    fn create_mesh(&mut self) -> BackendResult<Mesh> {
        let mesh = Mesh::from_raw(self.meshes.insert(GpuMesh::default()));
        log::debug!("WgpuBackend: created {}", mesh);
        Ok(mesh)
    }

    fn upload_mesh_data(&mut self, mesh: Mesh, data: &MeshData<'_>) -> BackendResult<()> {
        self.flush();
        let state = self.meshes.get_mut(mesh.raw())?;
        state.buffers = None;
        check_vertex_formats(data)?;
        state.buffers = Some(MeshBuffers::upload(&self.gpu, data)?);
        self.forget_pipelines(|key| key.mesh != mesh.raw());

        self.stats.mesh_uploads += 1;
        self.stats.vertex_bytes_uploaded += data.data_size() as u64;
        self.stats.index_bytes_uploaded +=
            (data.indices_count() * std::mem::size_of::<u32>()) as u64;
        log::trace!(
            "WgpuBackend: upload {} ({} vertices, stride {})",
            mesh,
            data.vert_count,
            data.vertex_stride()
        );
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: Mesh) -> BackendResult<()> {
        if self.meshes.get(mesh.raw())?.buffers.is_none() {
            return Err(BackendError::MeshNotCreated(mesh));
        }
        let shader = self.bound_shader.ok_or(BackendError::NoShaderBound)?;
        if self.shaders.get(shader.raw())?.program.is_none() {
            return Err(BackendError::ShaderNotCompiled(shader));
        }

        let format = self.acquire_target()?;
        let key = PipelineKey {
            shader: shader.raw(),
            mesh: mesh.raw(),
            format,
        };
        if !self.pipelines.contains_key(&key) {
            let pipeline = match (
                &self.shaders.get(shader.raw())?.program,
                &self.meshes.get(mesh.raw())?.buffers,
            ) {
                (Some(program), Some(buffers)) => program.pipeline(&self.gpu, buffers, format)?,
                _ => return Err(BackendError::ShaderNotCompiled(shader)),
            };
            log::debug!("WgpuBackend: pipeline for {} + {} ({:?})", shader, mesh, format);
            self.pipelines.insert(key, pipeline);
        }

        let Self {
            gpu,
            encoder,
            meshes,
            shaders,
            pipelines,
            windows,
            framebuffers,
            render_target,
            render_window,
            viewport,
            stats,
            ..
        } = self;
        let target = target_views(windows, framebuffers, *render_target, *render_window)?;
        let buffers = meshes
            .get(mesh.raw())?
            .buffers
            .as_ref()
            .ok_or(BackendError::MeshNotCreated(mesh))?;
        let program = shaders
            .get(shader.raw())?
            .program
            .as_ref()
            .ok_or(BackendError::ShaderNotCompiled(shader))?;
        let pipeline = pipelines
            .get(&key)
            .ok_or_else(|| BackendError::Native("pipeline cache miss".into()))?;

        let viewport = match viewport {
            Some(vp) => match conversion::clip_viewport(*vp, target.width, target.height) {
                Some(rect) => Some(rect),
                None => {
                    log::trace!("WgpuBackend: viewport outside target, {} skipped", mesh);
                    return Ok(());
                }
            },
            None => None,
        };

        let encoder = encoder.get_or_insert_with(|| {
            gpu.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                })
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Draw Mesh"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some([x, y, width, height]) = viewport {
                pass.set_viewport(x, y, width, height, 0.0, 1.0);
            }
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &program.bind_group, &[]);
            pass.set_vertex_buffer(0, buffers.vertex.slice(..));
            pass.draw(0..buffers.vert_count, 0..1);
        }

        stats.draw_calls += 1;
        Ok(())
    }

    fn destroy_mesh(&mut self, mesh: Mesh) -> BackendResult<()> {
        self.flush();
        self.meshes.remove(mesh.raw())?;
        self.forget_pipelines(|key| key.mesh != mesh.raw());
        log::debug!("WgpuBackend: destroyed {}", mesh);
        Ok(())
    }
}

impl ShaderBackend for WgpuBackend {
    fn create_shader(&mut self) -> BackendResult<Shader> {
        Ok(Shader::from_raw(self.shaders.insert(GpuShader::default())))
    }

    fn compile_shader(&mut self, shader: Shader, source: &str) -> ShaderCompileOutput {
        self.flush();
        self.forget_pipelines(|key| key.shader != shader.raw());

        let state = match self.shaders.get_mut(shader.raw()) {
            Ok(state) => state,
            Err(e) => {
                return ShaderCompileOutput {
                    result: Err(e.into()),
                    log: String::new(),
                }
            }
        };

        match state.compile(&self.gpu, source) {
            Ok(()) => ShaderCompileOutput::success(),
            Err(log) => ShaderCompileOutput {
                result: Err(RenderError::Internal),
                log,
            },
        }
    }

    fn uniform_location(&mut self, shader: Shader, name: &str) -> BackendResult<i32> {
        let program = self
            .shaders
            .get(shader.raw())?
            .program
            .as_ref()
            .ok_or(BackendError::ShaderNotCompiled(shader))?;
        Ok(program.reflection.uniform_location(name))
    }

    fn set_uniform_vec4(
        &mut self,
        shader: Shader,
        location: i32,
        value: Vec4,
    ) -> BackendResult<()> {
        let program = self
            .shaders
            .get(shader.raw())?
            .program
            .as_ref()
            .ok_or(BackendError::ShaderNotCompiled(shader))?;
        if location == -1 {
            return Ok(());
        }
        let index = program.reflection.slot_index(location).ok_or_else(|| {
            BackendError::Native(format!("{} has no uniform at location {}", shader, location))
        })?;

        // queue writes land before the next submit, keep recorded draws on the old value
        if let Some(encoder) = self.encoder.take() {
            self.gpu.queue.submit(std::iter::once(encoder.finish()));
        }
        self.gpu
            .queue
            .write_buffer(&program.uniform_buffers[index], 0, bytemuck::bytes_of(&value));
        Ok(())
    }

    fn use_shader(&mut self, shader: Shader) -> BackendResult<()> {
        if self.shaders.get(shader.raw())?.program.is_none() {
            return Err(BackendError::ShaderNotCompiled(shader));
        }
        self.bound_shader = Some(shader);
        Ok(())
    }

    fn destroy_shader(&mut self, shader: Shader) -> BackendResult<()> {
        self.flush();
        self.shaders.remove(shader.raw())?;
        self.forget_pipelines(|key| key.shader != shader.raw());
        if self.bound_shader == Some(shader) {
            self.bound_shader = None;
        }
        Ok(())
    }
}

impl TextureBackend for WgpuBackend {
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<Texture> {
        let texture = GpuTexture::new(&self.gpu, desc)?;
        log::debug!(
            "WgpuBackend: texture {}x{} {:?}",
            texture.desc.width,
            texture.desc.height,
            texture.desc.format
        );
        Ok(Texture::from_raw(self.textures.insert(texture)))
    }

    fn destroy_texture(&mut self, texture: Texture) {
        if let Err(e) = self.textures.remove(texture.raw()) {
            log::warn!("WgpuBackend: destroy_texture: {}", e);
        }
    }
}

impl FrameBufferBackend for WgpuBackend {
    fn create_framebuffer(&mut self, desc: &FrameBufferDescriptor) -> BackendResult<FrameBuffer> {
        let framebuffer = GpuFrameBuffer::new(&self.gpu, desc)?;
        Ok(FrameBuffer::from_raw(self.framebuffers.insert(framebuffer)))
    }

    fn destroy_framebuffer(&mut self, framebuffer: FrameBuffer) {
        self.flush();
        if let Err(e) = self.framebuffers.remove(framebuffer.raw()) {
            log::warn!("WgpuBackend: destroy_framebuffer: {}", e);
        }
        if self.render_target == Some(framebuffer) {
            self.render_target = None;
        }
    }

    fn set_render_target(&mut self, framebuffer: Option<FrameBuffer>) {
        if let Some(fb) = framebuffer {
            if !self.framebuffers.contains(fb.raw()) {
                log::warn!("WgpuBackend: set_render_target: unknown {}", fb);
                return;
            }
        }
        self.render_target = framebuffer;
    }
}

impl WindowBackend for WgpuBackend {
    fn create_window(&mut self, width: u32, height: u32, title: &str) -> BackendResult<Window> {
        let state = WindowState::new(&self.event_loop, &self.gpu, width, height, title, self.vsync)?;
        let winit_id = state.window.id();
        let window = Window::from_raw(self.windows.insert(state));
        self.window_ids.insert(winit_id, window.raw());

        if self.render_window.is_none() {
            self.render_window = Some(window);
        }
        log::debug!("WgpuBackend: created {} '{}' ({}x{})", window, title, width, height);
        Ok(window)
    }

    fn destroy_window(&mut self, window: Window) {
        self.flush();
        match self.windows.remove(window.raw()) {
            Ok(mut state) => {
                state.discard();
                self.window_ids.remove(&state.window.id());
            }
            Err(e) => log::warn!("WgpuBackend: destroy_window: {}", e),
        }
        if self.render_window == Some(window) {
            self.render_window = None;
        }
    }

    fn register_resize_callback(&mut self, window: Window, callback: ResizeCallback) {
        match self.windows.get_mut(window.raw()) {
            Ok(state) => state.resize_callback = Some(callback),
            Err(e) => log::warn!("WgpuBackend: register_resize_callback: {}", e),
        }
    }

    fn should_close(&self, window: Window) -> bool {
        self.windows
            .get(window.raw())
            .map_or(true, |state| state.close_requested)
    }

    fn swap_buffers(&mut self, window: Window) {
        self.flush();
        match self.windows.get_mut(window.raw()) {
            Ok(state) => {
                if state.present() {
                    self.stats.presents += 1;
                } else {
                    log::trace!("WgpuBackend: nothing rendered into {}", window);
                }
            }
            Err(e) => log::warn!("WgpuBackend: swap_buffers: {}", e),
        }
    }

    fn poll_events(&mut self) {
        // resizes drop acquired images
        self.flush();

        let Self {
            gpu,
            event_loop,
            windows,
            window_ids,
            ..
        } = self;
        let status = event_loop.pump_events(Some(Duration::ZERO), |event, _elwt| {
            let Event::WindowEvent { window_id, event } = event else {
                return;
            };
            let Some(state) = window_ids
                .get(&window_id)
                .and_then(|id| windows.get_mut(*id).ok())
            else {
                return;
            };

            match event {
                WindowEvent::Resized(size) => {
                    state.resize(&gpu.device, size.width, size.height);
                    if let Some(callback) = state.resize_callback.as_mut() {
                        callback(size.width, size.height);
                    }
                }
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    state.close_requested = true;
                }
                _ => {}
            }
        });

        if let PumpStatus::Exit(code) = status {
            log::debug!("WgpuBackend: event loop exited ({})", code);
        }
    }

    fn set_render_window(&mut self, window: Window) {
        if self.windows.contains(window.raw()) {
            self.render_window = Some(window);
        } else {
            log::warn!("WgpuBackend: set_render_window: unknown {}", window);
        }
    }
}

impl RenderControl for WgpuBackend {
    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn clear(&mut self, color: Color, mask: ClearMask) {
        if let Err(e) = self.clear_target(color, mask) {
            log::error!("WgpuBackend: clear: {}", e);
        }
    }
}

impl GraphicsBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu"
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
