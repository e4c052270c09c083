//! Opaque resource handles.
//!
//! A handle is a backend-assigned id with no public accessor. It is obtained
//! from a `create_*` call and invalidated by the matching `destroy_*` call.
//! Backends never reuse ids, so a stale handle resolves to nothing instead of
//! aliasing a newer resource.

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u64);

        impl $name {
            pub(crate) fn from_raw(id: u64) -> Self {
                Self(id)
            }

            pub(crate) fn raw(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $kind, self.0)
            }
        }
    };
}

resource_handle!(
    /// Handle to a mesh (vertex + index buffers and their layout)
    Mesh,
    "mesh"
);
resource_handle!(
    /// Handle to a texture
    Texture,
    "texture"
);
resource_handle!(
    /// Handle to a shader program
    Shader,
    "shader"
);
resource_handle!(
    /// Handle to a window and its presentation surface
    Window,
    "window"
);
resource_handle!(
    /// Handle to an offscreen render target
    FrameBuffer,
    "framebuffer"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_kind() {
        assert_eq!(Mesh::from_raw(7).to_string(), "mesh#7");
        assert_eq!(FrameBuffer::from_raw(1).to_string(), "framebuffer#1");
    }

    #[test]
    fn test_raw_roundtrip() {
        assert_eq!(Shader::from_raw(42).raw(), 42);
    }
}
