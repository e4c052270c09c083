//! Vertex attribute element kinds and the attribute size table.

/// Maximum number of attributes a [`MeshData`](super::MeshData) can hold.
///
/// Mirrors the bindable vertex attribute ceiling of the native APIs.
pub const MAX_VERTEX_ATTRIBS: usize = 10;

/// Element kind of a vertex attribute channel.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexAttribType {
    /// 32-bit float.
    #[default]
    Float,
}

impl VertexAttribType {
    /// Stable tag used when attribute types cross a serialization boundary.
    pub fn raw(self) -> u32 {
        match self {
            Self::Float => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Float => "Float",
        }
    }

    /// Resolve a raw tag, `None` for tags naming no known kind.
    pub fn from_raw(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::Float),
            _ => None,
        }
    }
}

/// Size in bytes of one element of `ty`.
pub fn attrib_size(ty: VertexAttribType) -> usize {
    match ty {
        VertexAttribType::Float => std::mem::size_of::<f32>(),
    }
}

/// Size in bytes of the element kind named by a raw tag.
///
/// Unknown tags size to 0 so a stride computed from them collapses to a
/// detectable length mismatch instead of a crash.
pub fn attrib_size_raw(tag: u32) -> usize {
    VertexAttribType::from_raw(tag).map_or(0, attrib_size)
}

/// One interleaved per-vertex channel, e.g. "3 floats, not normalized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexAttribDescription {
    pub ty: VertexAttribType,
    pub count: u32,
    pub normalize: bool,
}

impl VertexAttribDescription {
    pub fn new(ty: VertexAttribType, count: u32, normalize: bool) -> Self {
        Self {
            ty,
            count,
            normalize,
        }
    }

    /// Byte width of this channel within one vertex.
    pub fn byte_width(&self) -> usize {
        self.count as usize * attrib_size(self.ty)
    }

    /// Whether a shader input can be fed from this channel: 1 to 4 elements.
    pub fn is_drawable(&self) -> bool {
        matches!(self.ty, VertexAttribType::Float) && (1..=4).contains(&self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_size() {
        assert_eq!(attrib_size(VertexAttribType::Float), 4);
    }

    #[test]
    fn test_unknown_raw_tag_sizes_to_zero() {
        assert_eq!(attrib_size_raw(VertexAttribType::Float.raw()), 4);
        assert_eq!(attrib_size_raw(17), 0);
        assert_eq!(VertexAttribType::from_raw(17), None);
    }

    #[test]
    fn test_byte_width() {
        let desc = VertexAttribDescription::new(VertexAttribType::Float, 3, false);
        assert_eq!(desc.byte_width(), 12);
        let empty = VertexAttribDescription::new(VertexAttribType::Float, 0, true);
        assert_eq!(empty.byte_width(), 0);
    }

    #[test]
    fn test_drawable_counts() {
        let drawable: Vec<u32> = (0..=5)
            .filter(|&count| {
                VertexAttribDescription::new(VertexAttribType::Float, count, false).is_drawable()
            })
            .collect();
        assert_eq!(drawable, vec![1, 2, 3, 4]);
    }
}
