//! Common types shared between backends

use bitflags::bitflags;

use crate::error::RenderResult;

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8 bits per channel, normalized.
    #[default]
    Rgba8,
    /// 32-bit float per channel.
    RgbaFloat,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8 => 4,
            TextureFormat::RgbaFloat => 16,
        }
    }
}

/// Texture descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl TextureDescriptor {
    pub fn new(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
        }
    }

    /// Size of the full image in bytes.
    pub fn byte_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            format: TextureFormat::Rgba8,
            width: 1,
            height: 1,
        }
    }
}

/// Framebuffer descriptor. The framebuffer owns one color and one depth attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBufferDescriptor {
    pub width: u32,
    pub height: u32,
    pub color_format: TextureFormat,
}

impl FrameBufferDescriptor {
    pub fn new(width: u32, height: u32, color_format: TextureFormat) -> Self {
        Self {
            width,
            height,
            color_format,
        }
    }
}

bitflags! {
    /// Which attachments a clear affects
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const COLOR_AND_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
    }
}

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Outcome of a shader compilation: status plus the diagnostic log.
///
/// The log is empty on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderCompileOutput {
    pub result: RenderResult<()>,
    pub log: String,
}

impl ShaderCompileOutput {
    pub fn success() -> Self {
        Self {
            result: Ok(()),
            log: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Live backend resources and cumulative work counters.
///
/// Every backend keeps these, so callers can observe whether an operation
/// reached the native layer at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub meshes: usize,
    pub textures: usize,
    pub shaders: usize,
    pub framebuffers: usize,
    pub windows: usize,
    pub mesh_uploads: u64,
    pub vertex_bytes_uploaded: u64,
    pub index_bytes_uploaded: u64,
    pub draw_calls: u64,
    pub clears: u64,
    pub presents: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_mask() {
        assert!(ClearMask::COLOR_AND_DEPTH.contains(ClearMask::COLOR));
        assert!(ClearMask::COLOR_AND_DEPTH.contains(ClearMask::DEPTH));
        assert!(!ClearMask::COLOR.contains(ClearMask::DEPTH));
        assert_eq!(ClearMask::COLOR | ClearMask::DEPTH, ClearMask::COLOR_AND_DEPTH);
        assert_eq!(ClearMask::COLOR_AND_DEPTH.bits(), 0b11);
    }

    #[test]
    fn test_texture_byte_size() {
        let desc = TextureDescriptor::new(TextureFormat::RgbaFloat, 4, 2);
        assert_eq!(desc.byte_size(), 128);
    }
}
