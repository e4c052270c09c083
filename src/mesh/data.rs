//! Caller-built mesh descriptor and its structural verification.
//!
//! A [`MeshData`] borrows the vertex bytes and the index buffer; the caller
//! keeps them alive for the duration of the upload call. Attributes live in a
//! fixed inline array of [`MAX_VERTEX_ATTRIBS`] slots.
//!
//! # Example
//!
//! ```ignore
//! let vertices: [f32; 18] = [/* 3 x (position, color) */];
//! let mut data = MeshData::new();
//! data.append_attrib(VertexAttribType::Float, 3, false)?; // position
//! data.append_attrib(VertexAttribType::Float, 3, false)?; // color
//! let data = data
//!     .with_vertices(bytemuck::cast_slice(&vertices), 3)
//!     .with_indices(&[0, 1, 2]);
//! data.verify()?;
//! ```

use crate::error::{RenderError, RenderResult};

use super::attrib::{VertexAttribDescription, VertexAttribType, MAX_VERTEX_ATTRIBS};

/// Element type of a mesh index buffer.
pub type VertexIndex = u32;

/// Descriptor of a mesh's vertex layout, vertex bytes and index buffer.
#[derive(Clone, Copy, Default)]
pub struct MeshData<'a> {
    attribs: [VertexAttribDescription; MAX_VERTEX_ATTRIBS],
    attrib_count: usize,
    /// Number of vertices in `data`.
    pub vert_count: u32,
    /// Interleaved vertex bytes.
    pub data: Option<&'a [u8]>,
    /// Index buffer.
    pub indices: Option<&'a [VertexIndex]>,
}

impl<'a> MeshData<'a> {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the vertex bytes and the number of vertices they hold.
    pub fn with_vertices(mut self, data: &'a [u8], vert_count: u32) -> Self {
        self.data = Some(data);
        self.vert_count = vert_count;
        self
    }

    /// Attach the index buffer.
    pub fn with_indices(mut self, indices: &'a [VertexIndex]) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Append an attribute channel to the vertex layout.
    ///
    /// Refused with [`RenderError::MeshDataAttribOverflow`] once all
    /// [`MAX_VERTEX_ATTRIBS`] slots are taken; the descriptor is unchanged in
    /// that case. `count` is not checked here: a zero count shows up later as a
    /// stride mismatch.
    pub fn append_attrib(
        &mut self,
        ty: VertexAttribType,
        count: u32,
        normalize: bool,
    ) -> RenderResult<()> {
        if self.attrib_count >= MAX_VERTEX_ATTRIBS {
            return Err(RenderError::MeshDataAttribOverflow);
        }

        self.attribs[self.attrib_count] = VertexAttribDescription::new(ty, count, normalize);
        self.attrib_count += 1;
        Ok(())
    }

    /// Attributes appended so far, in append order.
    pub fn attribs(&self) -> &[VertexAttribDescription] {
        &self.attribs[..self.attrib_count]
    }

    pub fn attrib_count(&self) -> usize {
        self.attrib_count
    }

    /// Length of the vertex bytes, 0 when absent.
    pub fn data_size(&self) -> usize {
        self.data.map_or(0, <[u8]>::len)
    }

    /// Number of indices, 0 when absent.
    pub fn indices_count(&self) -> usize {
        self.indices.map_or(0, <[VertexIndex]>::len)
    }

    /// Byte width of one interleaved vertex.
    ///
    /// Pure; callable on a partially built descriptor.
    pub fn vertex_stride(&self) -> usize {
        self.attribs()
            .iter()
            .map(VertexAttribDescription::byte_width)
            .sum()
    }

    /// Each attribute with its byte offset inside a vertex.
    pub fn attrib_offsets(&self) -> impl Iterator<Item = (VertexAttribDescription, usize)> + '_ {
        self.attribs().iter().scan(0usize, |offset, desc| {
            let start = *offset;
            *offset += desc.byte_width();
            Some((*desc, start))
        })
    }

    /// Structural-correctness gate run before any backend sees the descriptor.
    ///
    /// Checks, in order:
    /// 1. fewer than [`MAX_VERTEX_ATTRIBS`] attributes, at least one vertex,
    ///    non-empty vertex bytes and index buffer, else `MeshDataBroken`
    /// 2. `vertex_stride() * vert_count == data_size()`, else `MeshDataLengthError`
    pub fn verify(&self) -> RenderResult<()> {
        if self.attrib_count >= MAX_VERTEX_ATTRIBS
            || self.vert_count == 0
            || self.data.is_none()
            || self.indices.is_none()
            || self.data_size() == 0
            || self.indices_count() == 0
        {
            return Err(RenderError::MeshDataBroken);
        }

        let expected = self.vertex_stride().checked_mul(self.vert_count as usize);
        if expected != Some(self.data_size()) {
            return Err(RenderError::MeshDataLengthError);
        }

        Ok(())
    }
}

impl std::fmt::Debug for MeshData<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshData")
            .field("attribs", &self.attribs())
            .field("vert_count", &self.vert_count)
            .field("data_size", &self.data_size())
            .field("indices_count", &self.indices_count())
            .finish()
    }
}
