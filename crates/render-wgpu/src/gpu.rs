use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use pasture_common::{Material, TextureId};
use pasture_render::{BatchVertex, CubeBatch, DrawBackend};
use wgpu::util::DeviceExt;

use crate::error::GpuError;
use crate::shaders;
use crate::texture::{TEXTURE_SIZE, texture_pixels};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MAX_PARTS: u32 = 4096;
const SKY: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.76,
    b: 0.92,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PartVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PartInstance {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

/// Unit cube with per-face normals, 4 corners and 6 indices per face.
fn part_mesh() -> (Vec<PartVertex>, Vec<u16>) {
    let axes = [Vec3::Z, Vec3::NEG_Z, Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for normal in axes {
        // Two in-face axes forming a right-handed basis with the normal.
        let u = if normal.y.abs() > 0.5 { Vec3::X } else { Vec3::Y.cross(normal) };
        let v = normal.cross(u);
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * 0.5;
            vertices.push(PartVertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
    }
    (vertices, indices)
}

struct BatchBuffer {
    generation: u64,
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Batch(TextureId),
    Part(u32),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bound {
    Batch,
    Part,
}

/// Draw lists for the frame in flight. Owned by the renderer and cleared at
/// the start of every frame, so capacity carries over between frames.
struct FrameLists {
    instances: Vec<PartInstance>,
    pending: Vec<Pending>,
    dropped: usize,
}

impl FrameLists {
    fn new() -> Self {
        Self {
            instances: Vec::with_capacity(MAX_PARTS as usize),
            pending: Vec::with_capacity(MAX_PARTS as usize),
            dropped: 0,
        }
    }

    fn clear(&mut self) {
        self.instances.clear();
        self.pending.clear();
        self.dropped = 0;
    }

    fn push_batch(&mut self, texture: TextureId) {
        self.pending.push(Pending::Batch(texture));
    }

    /// Queue one part instance; counted as dropped once the buffer is full.
    fn push_part(&mut self, instance: PartInstance) {
        if self.instances.len() >= MAX_PARTS as usize {
            self.dropped += 1;
            return;
        }
        let slot = self.instances.len() as u32;
        self.instances.push(instance);
        self.pending.push(Pending::Part(slot));
    }
}

/// GPU resources that outlive a frame: pipelines, textures, cached batch
/// buffers, the part instance buffer and the depth target.
pub struct WgpuRenderer {
    batch_pipeline: wgpu::RenderPipeline,
    part_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_groups: Vec<wgpu::BindGroup>,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,
    batch_buffers: BTreeMap<TextureId, BatchBuffer>,
    lists: FrameLists,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let batch_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("batch_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BATCH_SHADER.into()),
        });
        let part_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("part_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PART_SHADER.into()),
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::Shader(err.to_string()));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("block_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let texture_bind_groups = TextureId::ALL
            .iter()
            .map(|&id| {
                let texture = device.create_texture_with_data(
                    queue,
                    &wgpu::TextureDescriptor {
                        label: Some("block_texture"),
                        size: wgpu::Extent3d {
                            width: TEXTURE_SIZE,
                            height: TEXTURE_SIZE,
                            depth_or_array_layers: 1,
                        },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: wgpu::TextureFormat::Rgba8UnormSrgb,
                        usage: wgpu::TextureUsages::TEXTURE_BINDING
                            | wgpu::TextureUsages::COPY_DST,
                        view_formats: &[],
                    },
                    wgpu::util::TextureDataOrder::LayerMajor,
                    &texture_pixels(id),
                );
                let view = texture.create_view(&Default::default());
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("texture_bind_group"),
                    layout: &texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                })
            })
            .collect();

        let batch_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("batch_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let part_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("part_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let batch_pipeline = create_pipeline(
            device,
            "batch_pipeline",
            &batch_layout,
            &batch_shader,
            ("vs_batch", "fs_batch"),
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<BatchVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2],
            }],
            surface_format,
        );

        let part_pipeline = create_pipeline(
            device,
            "part_pipeline",
            &part_layout,
            &part_shader,
            ("vs_part", "fs_part"),
            &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PartVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PartInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x4,
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                    ],
                },
            ],
            surface_format,
        );

        let (cube_verts, cube_indices) = part_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("part_instance_buffer"),
            size: u64::from(MAX_PARTS) * std::mem::size_of::<PartInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = create_depth_texture(device, width, height);

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::Pipeline(err.to_string()));
        }

        Ok(Self {
            batch_pipeline,
            part_pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_groups,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            instance_buffer,
            batch_buffers: BTreeMap::new(),
            lists: FrameLists::new(),
            depth_texture,
            surface_format,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Start collecting one frame's draw calls.
    pub fn frame<'a>(&'a mut self, device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> GpuFrame<'a> {
        self.lists.clear();
        GpuFrame {
            renderer: self,
            device,
            queue,
        }
    }

    /// Upload a batch unless the cached copy is already at its generation.
    fn sync_batch(&mut self, device: &wgpu::Device, batch: &CubeBatch) {
        let texture = batch.texture();
        if let Some(cached) = self.batch_buffers.get(&texture) {
            if cached.generation == batch.generation() {
                return;
            }
        }
        if let Some(stale) = self.batch_buffers.remove(&texture) {
            stale.buffer.destroy();
        }
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("batch_vertex_buffer"),
            contents: bytemuck::cast_slice(batch.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        tracing::debug!(
            ?texture,
            generation = batch.generation(),
            vertices = batch.vertex_count(),
            "batch uploaded"
        );
        self.batch_buffers.insert(
            texture,
            BatchBuffer {
                generation: batch.generation(),
                buffer,
                vertex_count: batch.vertex_count() as u32,
            },
        );
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    (vs, fs): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout<'_>],
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            compilation_options: Default::default(),
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

/// One frame in flight. Collects draw calls in order, then encodes them into
/// a single render pass on [`GpuFrame::finish`].
pub struct GpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
}

impl DrawBackend for GpuFrame<'_> {
    fn upload_view(&mut self, view_proj: Mat4) {
        self.queue.write_buffer(
            &self.renderer.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: view_proj.to_cols_array_2d(),
            }),
        );
    }

    fn draw_batch(&mut self, batch: &CubeBatch) {
        self.renderer.sync_batch(self.device, batch);
        self.renderer.lists.push_batch(batch.texture());
    }

    fn draw_part(&mut self, model: Mat4, material: Material) {
        self.renderer.lists.push_part(PartInstance {
            model: model.to_cols_array_2d(),
            color: material.color(),
        });
    }
}

impl GpuFrame<'_> {
    /// Encode and submit everything collected, drawing into `target`.
    pub fn finish(self, target: &wgpu::TextureView) {
        let r = &*self.renderer;
        let lists = &r.lists;
        if lists.dropped > 0 {
            tracing::warn!(dropped = lists.dropped, "part instance buffer full");
        }
        if !lists.instances.is_empty() {
            self.queue
                .write_buffer(&r.instance_buffer, 0, bytemuck::cast_slice(&lists.instances));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &r.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // Pipeline and shared buffers are rebound only when the kind of
            // draw changes.
            let mut bound = None;
            for item in &lists.pending {
                match *item {
                    Pending::Batch(texture) => {
                        let Some(batch) = r.batch_buffers.get(&texture) else {
                            continue;
                        };
                        if bound != Some(Bound::Batch) {
                            pass.set_pipeline(&r.batch_pipeline);
                            pass.set_bind_group(0, &r.uniform_bind_group, &[]);
                            bound = Some(Bound::Batch);
                        }
                        pass.set_bind_group(1, &r.texture_bind_groups[texture.index()], &[]);
                        pass.set_vertex_buffer(0, batch.buffer.slice(..));
                        pass.draw(0..batch.vertex_count, 0..1);
                    }
                    Pending::Part(slot) => {
                        if bound != Some(Bound::Part) {
                            pass.set_pipeline(&r.part_pipeline);
                            pass.set_bind_group(0, &r.uniform_bind_group, &[]);
                            pass.set_vertex_buffer(0, r.cube_vertex_buffer.slice(..));
                            pass.set_vertex_buffer(1, r.instance_buffer.slice(..));
                            pass.set_index_buffer(
                                r.cube_index_buffer.slice(..),
                                wgpu::IndexFormat::Uint16,
                            );
                            bound = Some(Bound::Part);
                        }
                        pass.draw_indexed(0..r.cube_index_count, 0, slot..slot + 1);
                    }
                }
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}
