//! Tinted triangle demo
//!
//! Run with:
//!   cargo run --example triangle
//!   cargo run --example triangle -- --backend headless --frames 60
//!   cargo run --example triangle -- --shader my_shader.wgsl --no-vsync
//!
//! The tint uniform pulses with the renderer clock, once per second.

use std::path::PathBuf;

use clap::Parser;
use gfx_facade::logging::{init_logging, LoggingConfig};
use gfx_facade::{
    BackendType, ClearMask, Color, MeshData, RenderResult, Renderer, RendererConfig,
    VertexAttribType,
};

const TRIANGLE_SHADER: &str = r#"
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

#[rustfmt::skip]
const VERTICES: [f32; 18] = [
    // positions       // colors
     0.5, -0.5, 0.0,   1.0, 0.0, 0.0, // bottom right
    -0.5, -0.5, 0.0,   0.0, 1.0, 0.0, // bottom left
     0.0,  0.5, 0.0,   0.0, 0.0, 1.0, // top
];

const INDICES: [u32; 3] = [0, 1, 2];

const HEADLESS_FRAMES: u64 = 120;

/// Draw a tinted triangle through the rendering facade
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Backend: auto, wgpu or headless
    #[arg(short, long, default_value = "auto")]
    backend: BackendType,

    /// Stop after this many frames (headless default: 120)
    #[arg(short, long)]
    frames: Option<u64>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// WGSL file with `vs_main`, `fs_main` and a `tint` uniform
    #[arg(short, long)]
    shader: Option<PathBuf>,

    /// Present without waiting for vertical blank
    #[arg(long)]
    no_vsync: bool,
}

fn main() {
    init_logging(LoggingConfig::default());
    let args = Args::parse();

    let config = RendererConfig {
        backend: args.backend,
        vsync: !args.no_vsync,
        app_name: "triangle".to_string(),
        ..RendererConfig::from_env()
    };

    let mut renderer = Renderer::new(config);
    if !renderer.init() {
        eprintln!("Failed to initialize the renderer");
        std::process::exit(1);
    }

    if let Err(e) = run(&mut renderer, &args) {
        log::error!("triangle demo failed: {} ({:?})", e, e.code());
        std::process::exit(1);
    }

    let stats = renderer.stats();
    log::info!(
        "{} backend: {} draws, {} presents",
        renderer.backend_name().unwrap_or("no"),
        stats.draw_calls,
        stats.presents
    );
    renderer.terminate();
}

fn run(renderer: &mut Renderer, args: &Args) -> RenderResult<()> {
    let window = renderer.create_window(args.width, args.height, "Triangle")?;
    renderer.register_resize_callback(window, |width, height| {
        log::info!("window resized to {}x{}", width, height);
    });

    let mesh = renderer.create_mesh()?;
    let mut data = MeshData::new();
    data.append_attrib(VertexAttribType::Float, 3, false)?; // position
    data.append_attrib(VertexAttribType::Float, 3, false)?; // color
    let data = data
        .with_vertices(bytemuck::cast_slice(&VERTICES), 3)
        .with_indices(&INDICES);
    renderer.upload_mesh_data(mesh, &data)?;

    let source = match &args.shader {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            log::warn!("Can't read {}: {}, using the built-in shader", path.display(), e);
            TRIANGLE_SHADER.to_string()
        }),
        None => TRIANGLE_SHADER.to_string(),
    };

    let shader = renderer.create_shader()?;
    let output = renderer.compile_shader(shader, &source);
    if !output.log.is_empty() {
        println!("{}", output.log);
    }
    output.result?;
    let tint = renderer.uniform_location(shader, "tint")?;

    // headless windows only close when asked to
    let limit = args
        .frames
        .or_else(|| (renderer.backend_name() == Some("headless")).then_some(HEADLESS_FRAMES));

    let mut frame = 0u64;
    while !renderer.should_close(window) {
        if limit.is_some_and(|limit| frame >= limit) {
            break;
        }

        renderer.clear(Color::new(0.2, 0.3, 0.3, 1.0), ClearMask::COLOR_AND_DEPTH);
        let pulse = renderer.time() % 1.0;
        renderer.set_uniform_vec4(shader, tint, Color::new(pulse, pulse, pulse, pulse))?;
        renderer.use_shader(shader)?;
        renderer.draw_mesh(mesh)?;
        renderer.swap_buffers(window);
        renderer.poll_events();
        frame += 1;
    }

    renderer.destroy_shader(shader)?;
    renderer.destroy_mesh(mesh)?;
    renderer.destroy_window(window);
    Ok(())
}
