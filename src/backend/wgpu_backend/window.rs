//! winit windows with their wgpu surfaces

use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::{Window as WinitWindow, WindowBuilder};

use super::{conversion, GpuContext};
use crate::backend::traits::{BackendError, BackendResult, ResizeCallback};

/// Acquired swapchain image of a window
pub(super) struct Frame {
    texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

/// A window, its surface and the depth attachment matching the surface size
///
/// Fields drop in declaration order: an unpresented frame must go before its surface.
pub(super) struct WindowState {
    pub frame: Option<Frame>,
    surface: wgpu::Surface<'static>,
    pub window: Arc<WinitWindow>,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_view: wgpu::TextureView,
    pub resize_callback: Option<ResizeCallback>,
    pub close_requested: bool,
}

impl WindowState {
    pub fn new(
        event_loop: &EventLoop<()>,
        gpu: &GpuContext,
        width: u32,
        height: u32,
        title: &str,
        vsync: bool,
    ) -> BackendResult<Self> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(width, height))
                .build(event_loop)
                .map_err(|e| BackendError::WindowCreationFailed(e.to_string()))?,
        );

        let device = &gpu.device;
        let surface = gpu
            .instance
            .create_surface(window.clone())
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;

        let caps = surface.get_capabilities(&gpu.adapter);
        let Some(&fallback_format) = caps.formats.first() else {
            return Err(BackendError::SurfaceCreationFailed(
                "surface is not supported by the adapter".into(),
            ));
        };
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(fallback_format);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let (width, height) = clamp_size(device, size.width, size.height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: conversion::present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(device, &config);

        let depth_view = create_depth_view(device, width, height, "Window Depth");

        Ok(Self {
            frame: None,
            surface,
            window,
            config,
            depth_view,
            resize_callback: None,
            close_requested: false,
        })
    }

    /// Reconfigure the surface after a resize. Zero sizes (minimized) are skipped.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = clamp_size(device, width, height);
        if width == self.config.width && height == self.config.height {
            return;
        }

        // an acquired image belongs to the old configuration
        self.frame = None;
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(device, &self.config);
        self.depth_view = create_depth_view(device, width, height, "Window Depth");
    }

    /// Acquire the next swapchain image unless one is held already.
    pub fn acquire(&mut self, device: &wgpu::Device) -> BackendResult<()> {
        if self.frame.is_some() {
            return Ok(());
        }

        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface outdated, reconfiguring");
                self.surface.configure(device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| BackendError::SurfaceLost)?
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(BackendError::OutOfMemory),
            Err(e) => return Err(BackendError::Native(e.to_string())),
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.frame = Some(Frame { texture, view });
        Ok(())
    }

    /// Present the held image. Returns whether there was one.
    pub fn present(&mut self) -> bool {
        match self.frame.take() {
            Some(frame) => {
                self.window.pre_present_notify();
                frame.texture.present();
                true
            }
            None => false,
        }
    }

    /// Give back an acquired image without presenting it.
    pub fn discard(&mut self) {
        if self.frame.take().is_some() {
            log::trace!("Discarding unpresented frame");
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

/// Clamp to device limits while maintaining aspect ratio
fn clamp_size(device: &wgpu::Device, width: u32, height: u32) -> (u32, u32) {
    let max_size = device.limits().max_texture_dimension_2d;
    if width > max_size || height > max_size {
        let scale = (max_size as f32 / width as f32).min(max_size as f32 / height as f32);
        (
            ((width as f32 * scale) as u32).max(1),
            ((height as f32 * scale) as u32).max(1),
        )
    } else {
        (width.max(1), height.max(1))
    }
}

pub(super) fn create_depth_view(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    label: &str,
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: conversion::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}
