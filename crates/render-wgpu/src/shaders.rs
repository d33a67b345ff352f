/// Textured static batches. Vertices arrive in world space.
pub const BATCH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var block_texture: texture_2d<f32>;
@group(1) @binding(1)
var block_sampler: sampler;

struct BatchInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct BatchOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) height: f32,
};

@vertex
fn vs_batch(vertex: BatchInput) -> BatchOutput {
    var out: BatchOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.uv = vertex.uv;
    out.height = vertex.position.y;
    return out;
}

@fragment
fn fs_batch(in: BatchOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(block_texture, block_sampler, in.uv);
    // Slightly darken lower courses so stacked blocks read apart.
    let shade = clamp(0.75 + in.height * 0.08, 0.75, 1.0);
    return vec4<f32>(texel.rgb * shade, texel.a);
}
"#;

/// Flat-colored unit cubes, one instance per actor part.
pub const PART_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_part(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * model * vec4<f32>(vertex.position, 1.0);
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_part(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let diffuse = max(dot(in.world_normal, light_dir), 0.0);
    return vec4<f32>(in.color.rgb * (0.35 + diffuse * 0.65), in.color.a);
}
"#;
