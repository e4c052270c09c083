//! Mesh descriptor model.
//!
//! - [`VertexAttribType`] / [`attrib_size`] - element kinds and their byte size
//! - [`VertexAttribDescription`] - one interleaved per-vertex channel
//! - [`MeshData`] - caller-built descriptor of vertex layout, vertex bytes and indices
//!
//! A [`MeshData`] must pass [`MeshData::verify`] before any backend consumes
//! it. Verification guarantees that the vertex bytes match the declared layout
//! exactly, so no backend can read past the caller's buffer during upload.

mod attrib;
mod data;

pub use attrib::{
    attrib_size, attrib_size_raw, VertexAttribDescription, VertexAttribType, MAX_VERTEX_ATTRIBS,
};
pub use data::{MeshData, VertexIndex};
