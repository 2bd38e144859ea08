use bytemuck::{Pod, Zeroable};

/// Instanced gallery shader: lambert-ish shading with a warm highlight
/// mix driven by the per-instance emphasis weight.
pub(crate) const GALLERY_SHADER_SOURCE: &str = r#"
struct Uniforms {
    view_projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) emphasis: f32,
};

@vertex
fn gallery_vs_main(input: VertexIn) -> VertexOutput {
    let model = mat4x4<f32>(input.model_0, input.model_1, input.model_2, input.model_3);
    let world = model * vec4<f32>(input.position, 1.0);
    var out: VertexOutput;
    out.position = uniforms.view_projection * world;
    out.normal = normalize((model * vec4<f32>(input.normal, 0.0)).xyz);
    out.color = input.color;
    out.emphasis = input.params.x;
    return out;
}

@fragment
fn gallery_fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.4, 0.8, 0.6));
    let diffuse = max(dot(normalize(input.normal), light_dir), 0.0);
    let shade = 0.35 + 0.65 * diffuse;
    let glow = vec3<f32>(1.0, 0.85, 0.45);
    let color = mix(input.color.rgb * shade, glow, input.emphasis * 0.5);
    if input.color.a < 0.01 {
        discard;
    }
    return vec4<f32>(color, input.color.a);
}
"#;

/// Screen-space textured quad for the playback panel and photo overlay.
pub(crate) const PANEL_SHADER_SOURCE: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(input.position, 0.0, 1.0);
    out.uv = input.uv;
    return out;
}

@group(0) @binding(0)
var panel_texture: texture_2d<f32>;
@group(0) @binding(1)
var panel_sampler: sampler;

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let uv = clamp(input.uv, vec2<f32>(0.0, 0.0), vec2<f32>(1.0, 1.0));
    return textureSample(panel_texture, panel_sampler, uv);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct PanelVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

pub(crate) const PANEL_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

/// Quad vertices for a panel rectangle given in NDC.
pub(crate) fn panel_vertices(left: f32, top: f32, right: f32, bottom: f32) -> [PanelVertex; 4] {
    [
        PanelVertex {
            position: [left, top],
            uv: [0.0, 0.0],
        },
        PanelVertex {
            position: [right, top],
            uv: [1.0, 0.0],
        },
        PanelVertex {
            position: [left, bottom],
            uv: [0.0, 1.0],
        },
        PanelVertex {
            position: [right, bottom],
            uv: [1.0, 1.0],
        },
    ]
}
