//! Conversions between facade types and wgpu types

use crate::backend::traits::{BackendError, BackendResult};
use crate::backend::types::{TextureFormat, Viewport};
use crate::config::PowerPreference;
use crate::math::Color;
use crate::mesh::{MeshData, VertexAttribDescription, VertexAttribType};

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(super) fn texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::RgbaFloat => wgpu::TextureFormat::Rgba32Float,
    }
}

pub(super) fn power_preference(preference: PowerPreference) -> wgpu::PowerPreference {
    match preference {
        PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
        PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
    }
}

pub(super) fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

pub(super) fn color(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: color.r as f64,
        g: color.g as f64,
        b: color.b as f64,
        a: color.a as f64,
    }
}

pub(super) fn vertex_format(attrib: &VertexAttribDescription) -> BackendResult<wgpu::VertexFormat> {
    match (attrib.ty, attrib.count) {
        (VertexAttribType::Float, 1) => Ok(wgpu::VertexFormat::Float32),
        (VertexAttribType::Float, 2) => Ok(wgpu::VertexFormat::Float32x2),
        (VertexAttribType::Float, 3) => Ok(wgpu::VertexFormat::Float32x3),
        (VertexAttribType::Float, 4) => Ok(wgpu::VertexFormat::Float32x4),
        (ty, count) => Err(BackendError::UnsupportedVertexFormat {
            ty: ty.name(),
            count,
        }),
    }
}

/// Attribute `i` of the descriptor feeds shader input `@location(i)`.
pub(super) fn vertex_attributes(data: &MeshData<'_>) -> BackendResult<Vec<wgpu::VertexAttribute>> {
    data.attrib_offsets()
        .enumerate()
        .map(|(location, (attrib, offset))| {
            Ok(wgpu::VertexAttribute {
                format: vertex_format(&attrib)?,
                offset: offset as u64,
                shader_location: location as u32,
            })
        })
        .collect()
}

/// Clip a viewport to a `width` x `height` target.
///
/// wgpu rejects viewports reaching outside the target; `None` when nothing is left.
pub(super) fn clip_viewport(viewport: Viewport, width: u32, height: u32) -> Option<[f32; 4]> {
    let x0 = (viewport.x as i64).clamp(0, width as i64);
    let y0 = (viewport.y as i64).clamp(0, height as i64);
    let x1 = (viewport.x as i64 + viewport.width as i64).clamp(0, width as i64);
    let y1 = (viewport.y as i64 + viewport.height as i64).clamp(0, height as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some([x0 as f32, y0 as f32, (x1 - x0) as f32, (y1 - y0) as f32])
}
