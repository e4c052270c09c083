//! WGSL shader validation and reflection.
//!
//! A shader is one WGSL source holding both stages: a vertex entry point
//! [`VERTEX_ENTRY`] and a fragment entry point [`FRAGMENT_ENTRY`]. Uniforms are
//! `var<uniform>` globals of type `vec4<f32>` in `@group(0)`; a uniform's
//! `@binding` number is its location.
//!
//! ```wgsl
//! @group(0) @binding(0) var<uniform> tint: vec4<f32>;
//!
//! @vertex
//! fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
//!     return vec4<f32>(position, 1.0);
//! }
//!
//! @fragment
//! fn fs_main() -> @location(0) vec4<f32> {
//!     return tint;
//! }
//! ```

use std::fmt::Write;

/// Vertex stage entry point name.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment stage entry point name.
pub const FRAGMENT_ENTRY: &str = "fs_main";
/// Bind group holding the uniforms.
pub const UNIFORM_GROUP: u32 = 0;
/// Maximum number of uniforms per shader (the portable per-stage uniform buffer limit).
pub const MAX_UNIFORMS: usize = 12;

/// A `vec4<f32>` uniform declared by the shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub location: u32,
}

/// Result of reflecting a validated shader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderReflection {
    uniforms: Vec<UniformSlot>,
}

impl ShaderReflection {
    /// Uniforms sorted by location.
    pub fn uniforms(&self) -> &[UniformSlot] {
        &self.uniforms
    }

    /// Location of the uniform called `name`, -1 if there is none.
    pub fn uniform_location(&self, name: &str) -> i32 {
        self.uniforms
            .iter()
            .find(|slot| slot.name == name)
            .map_or(-1, |slot| slot.location as i32)
    }

    /// Index into [`uniforms`](Self::uniforms) of the slot at `location`.
    pub fn slot_index(&self, location: i32) -> Option<usize> {
        let location = u32::try_from(location).ok()?;
        self.uniforms.iter().position(|slot| slot.location == location)
    }
}

/// Parse, validate and reflect `source`.
///
/// On failure returns the human-readable diagnostic log.
pub fn reflect(source: &str) -> Result<ShaderReflection, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("validation error: {}", error_chain(&e)))?;

    let mut log = String::new();
    check_entry_point(&module, naga::ShaderStage::Vertex, VERTEX_ENTRY, &mut log);
    check_entry_point(&module, naga::ShaderStage::Fragment, FRAGMENT_ENTRY, &mut log);

    let mut uniforms = Vec::new();
    for (_, var) in module.global_variables.iter() {
        let name = var.name.clone().unwrap_or_default();
        match var.space {
            naga::AddressSpace::Uniform => {}
            naga::AddressSpace::Private | naga::AddressSpace::WorkGroup => continue,
            _ => {
                let _ = writeln!(
                    log,
                    "error: global `{name}`: only `var<uniform>` vec4<f32> resources are supported"
                );
                continue;
            }
        }

        let Some(binding) = &var.binding else {
            continue;
        };
        if binding.group != UNIFORM_GROUP {
            let _ = writeln!(
                log,
                "error: uniform `{name}` must be declared in @group({UNIFORM_GROUP})"
            );
            continue;
        }

        let is_vec4 = matches!(
            module.types[var.ty].inner,
            naga::TypeInner::Vector {
                size: naga::VectorSize::Quad,
                scalar,
            } if scalar == naga::Scalar::F32
        );
        if !is_vec4 {
            let _ = writeln!(log, "error: uniform `{name}` must have type vec4<f32>");
            continue;
        }

        uniforms.push(UniformSlot {
            name,
            location: binding.binding,
        });
    }

    if uniforms.len() > MAX_UNIFORMS {
        let _ = writeln!(
            log,
            "error: {} uniforms declared, at most {MAX_UNIFORMS} are supported",
            uniforms.len()
        );
    }

    if !log.is_empty() {
        return Err(log);
    }

    uniforms.sort_by_key(|slot| slot.location);
    Ok(ShaderReflection { uniforms })
}

fn check_entry_point(module: &naga::Module, stage: naga::ShaderStage, name: &str, log: &mut String) {
    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage && ep.name == name);
    if !found {
        let _ = writeln!(log, "error: missing {stage:?} entry point `{name}`");
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let _ = write!(message, ": {inner}");
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINTED: &str = r#"
@group(0) @binding(0) var<uniform> tint: vec4<f32>;
@group(0) @binding(3) var<uniform> offset: vec4<f32>;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(position, 1.0) + offset;
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0) * tint;
}
"#;

    #[test]
    fn test_reflect_uniforms() {
        let reflection = reflect(TINTED).unwrap();
        assert_eq!(reflection.uniforms().len(), 2);
        assert_eq!(reflection.uniform_location("tint"), 0);
        assert_eq!(reflection.uniform_location("offset"), 3);
        assert_eq!(reflection.uniform_location("missing"), -1);
        assert_eq!(reflection.slot_index(3), Some(1));
        assert_eq!(reflection.slot_index(-1), None);
    }

    #[test]
    fn test_syntax_error_produces_log() {
        let log = reflect("fn vs_main( {").unwrap_err();
        assert!(!log.is_empty());
    }

    #[test]
    fn test_missing_fragment_entry() {
        let source = r#"
@vertex
fn vs_main() -> @builtin(position) vec4<f32> {
    return vec4<f32>(0.0, 0.0, 0.0, 1.0);
}
"#;
        let log = reflect(source).unwrap_err();
        assert!(log.contains("fs_main"), "{log}");
    }

    #[test]
    fn test_non_vec4_uniform_rejected() {
        let source = r#"
@group(0) @binding(0) var<uniform> scale: f32;

@vertex
fn vs_main() -> @builtin(position) vec4<f32> {
    return vec4<f32>(scale, 0.0, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let log = reflect(source).unwrap_err();
        assert!(log.contains("scale"), "{log}");
    }
}
