//! GPU-side objects behind the facade handles

use wgpu::util::DeviceExt;

use super::{conversion, window::create_depth_view, GpuContext};
use crate::backend::traits::BackendResult;
use crate::backend::types::{FrameBufferDescriptor, TextureDescriptor};
use crate::mesh::MeshData;
use crate::shader::{self, ShaderReflection};

/// Vertex and index buffers plus the layout they were uploaded with
///
/// Draws walk the first `vert_count` vertices in order. The index buffer is
/// uploaded with the mesh but not drawn with.
pub(super) struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    #[allow(dead_code)]
    index: wgpu::Buffer,
    pub vert_count: u32,
    pub stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl MeshBuffers {
    pub fn upload(gpu: &GpuContext, data: &MeshData<'_>) -> BackendResult<Self> {
        let attributes = conversion::vertex_attributes(data)?;
        let vertices = data.data.unwrap_or_default();
        let indices = data.indices.unwrap_or_default();

        let (vertex, index) = gpu.scoped(|device| {
            let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertices"),
                contents: vertices,
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (vertex, index)
        })?;

        Ok(Self {
            vertex,
            index,
            vert_count: data.vert_count,
            stride: data.vertex_stride() as u64,
            attributes,
        })
    }
}

#[derive(Default)]
pub(super) struct GpuMesh {
    pub buffers: Option<MeshBuffers>,
}

/// A compiled shader: module, one 16-byte uniform buffer per reflected uniform,
/// and the group 0 bind group tying them together.
pub(super) struct Program {
    pub module: wgpu::ShaderModule,
    pub reflection: ShaderReflection,
    pub uniform_buffers: Vec<wgpu::Buffer>,
    pub pipeline_layout: wgpu::PipelineLayout,
    pub bind_group: wgpu::BindGroup,
}

impl Program {
    pub fn compile(gpu: &GpuContext, source: &str, reflection: ShaderReflection) -> BackendResult<Self> {
        gpu.scoped(|device| {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Facade Shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

            let uniform_buffers: Vec<wgpu::Buffer> = reflection
                .uniforms()
                .iter()
                .map(|slot| {
                    device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(slot.name.as_str()),
                        size: std::mem::size_of::<[f32; 4]>() as u64,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    })
                })
                .collect();

            let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = reflection
                .uniforms()
                .iter()
                .map(|slot| wgpu::BindGroupLayoutEntry {
                    binding: slot.location,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                })
                .collect();
            let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniforms Layout"),
                entries: &layout_entries,
            });

            let entries: Vec<wgpu::BindGroupEntry> = reflection
                .uniforms()
                .iter()
                .zip(&uniform_buffers)
                .map(|(slot, buffer)| wgpu::BindGroupEntry {
                    binding: slot.location,
                    resource: buffer.as_entire_binding(),
                })
                .collect();
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Uniforms"),
                layout: &bind_group_layout,
                entries: &entries,
            });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Facade Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            Self {
                module,
                reflection,
                uniform_buffers,
                pipeline_layout,
                bind_group,
            }
        })
    }

    /// Build the pipeline drawing `mesh` into a `format` color target.
    ///
    /// Depth is attached but neither tested nor written.
    pub fn pipeline(
        &self,
        gpu: &GpuContext,
        mesh: &MeshBuffers,
        format: wgpu::TextureFormat,
    ) -> BackendResult<wgpu::RenderPipeline> {
        gpu.scoped(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Facade Pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.module,
                    entry_point: shader::VERTEX_ENTRY,
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: mesh.stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &mesh.attributes,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.module,
                    entry_point: shader::FRAGMENT_ENTRY,
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: conversion::DEPTH_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        })
    }
}

#[derive(Default)]
pub(super) struct GpuShader {
    pub program: Option<Program>,
}

impl GpuShader {
    /// Validate and compile `source`, returning the diagnostic log on failure.
    pub fn compile(&mut self, gpu: &GpuContext, source: &str) -> Result<(), String> {
        self.program = None;
        let reflection = shader::reflect(source)?;
        self.program = Some(Program::compile(gpu, source, reflection).map_err(|e| e.to_string())?);
        Ok(())
    }
}

pub(super) struct GpuTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    pub desc: TextureDescriptor,
}

impl GpuTexture {
    pub fn new(gpu: &GpuContext, desc: &TextureDescriptor) -> BackendResult<Self> {
        let texture = gpu.scoped(|device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Facade Texture"),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: conversion::texture_format(desc.format),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            })
        })?;
        Ok(Self {
            texture,
            desc: *desc,
        })
    }
}

/// Offscreen target owning a color and a depth attachment
pub(super) struct GpuFrameBuffer {
    #[allow(dead_code)]
    color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl GpuFrameBuffer {
    pub fn new(gpu: &GpuContext, desc: &FrameBufferDescriptor) -> BackendResult<Self> {
        let format = conversion::texture_format(desc.color_format);
        let (color, depth_view) = gpu.scoped(|device| {
            let color = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("FrameBuffer Color"),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            });
            let depth_view = create_depth_view(device, desc.width, desc.height, "FrameBuffer Depth");
            (color, depth_view)
        })?;
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            color,
            color_view,
            depth_view,
            format,
            width: desc.width,
            height: desc.height,
        })
    }
}
