//! Common utilities for renderer integration tests.
//!
//! Tests are parameterized over [`Backend`] with `rstest`. The headless
//! backend is always available. The wgpu backend needs a display and an
//! adapter; winit also allows a single event loop per process, so at most one
//! wgpu test per test binary gets a working renderer and the rest skip.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gfx_facade::backend::headless::EventQueue;
use gfx_facade::{
    BackendType, GraphicsBackend, HeadlessBackend, MeshData, Renderer, RendererConfig,
    VertexAttribType,
};

/// Tinted vertex-color shader, `tint` at location 0.
pub const TINTED_SHADER: &str = r#"
@group(0) @binding(0) var<uniform> tint: vec4<f32>;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0) * tint;
}
"#;

/// Position + color triangle, 3 vertices of 6 floats.
pub static TRIANGLE_VERTICES: [f32; 18] = [
    -0.5, -0.5, 0.0, 1.0, 0.0, 0.0, //
    0.5, -0.5, 0.0, 0.0, 1.0, 0.0, //
    0.0, 0.5, 0.0, 0.0, 0.0, 1.0, //
];

pub static TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

/// Layout with two `(Float, 3, false)` channels, stride 24.
pub fn position_color_layout<'a>() -> MeshData<'a> {
    let mut data = MeshData::new();
    data.append_attrib(VertexAttribType::Float, 3, false)
        .expect("first attribute");
    data.append_attrib(VertexAttribType::Float, 3, false)
        .expect("second attribute");
    data
}

/// The full triangle descriptor.
pub fn triangle<'a>() -> MeshData<'a> {
    position_color_layout()
        .with_vertices(bytemuck::cast_slice(&TRIANGLE_VERTICES), 3)
        .with_indices(&TRIANGLE_INDICES)
}

/// Available backends for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Headless,
    Wgpu,
}

impl Backend {
    /// Check if this backend can be brought up in this environment.
    pub fn is_available(&self) -> bool {
        match self {
            Backend::Headless => true,
            Backend::Wgpu => {
                cfg!(feature = "wgpu-backend")
                    && (std::env::var_os("DISPLAY").is_some()
                        || std::env::var_os("WAYLAND_DISPLAY").is_some())
            }
        }
    }

    pub fn backend_type(self) -> BackendType {
        match self {
            Backend::Headless => BackendType::Headless,
            Backend::Wgpu => BackendType::Wgpu,
        }
    }
}

/// An initialized renderer plus hooks into the headless backend.
pub struct TestContext {
    #[allow(dead_code)]
    pub backend: Backend,
    pub renderer: Renderer,
    /// Event queue of the headless backend, `None` for wgpu.
    #[allow(dead_code)]
    pub events: Option<EventQueue>,
    /// Number of backends the factory built.
    #[allow(dead_code)]
    pub backends_built: Rc<Cell<usize>>,
}

impl TestContext {
    /// Create an initialized renderer for `backend`.
    ///
    /// Returns `None` if the backend is not available.
    pub fn new(backend: Backend) -> Option<Self> {
        if !backend.is_available() {
            return None;
        }

        let config = RendererConfig::default().with_backend(backend.backend_type());
        let events = Rc::new(RefCell::new(None));
        let backends_built = Rc::new(Cell::new(0));

        let mut renderer = match backend {
            Backend::Headless => {
                let events = events.clone();
                let built = backends_built.clone();
                Renderer::with_factory(config, move |_| {
                    let headless = HeadlessBackend::new();
                    *events.borrow_mut() = Some(headless.event_queue());
                    built.set(built.get() + 1);
                    Ok(Box::new(headless) as Box<dyn GraphicsBackend>)
                })
            }
            Backend::Wgpu => Renderer::new(config),
        };

        if !renderer.init() {
            return None;
        }
        if backend == Backend::Headless {
            assert_eq!(backends_built.get(), 1);
        }

        let events = events.borrow_mut().take();
        Some(Self {
            backend,
            renderer,
            events,
            backends_built,
        })
    }
}
