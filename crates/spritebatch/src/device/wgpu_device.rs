use std::collections::HashMap;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{TextureId, Vertex};

use super::state::BindState;
use super::{DeviceError, GraphicsDevice, SpriteDeviceInit};

// ── gpu types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    viewport: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Unorm8x4,  // color
    2 => Float32x2  // uv
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

/// Capacity (in vertices) for a buffer that must hold `required` vertices.
///
/// Rounds up to a power of two but never past `max`; callers reject
/// `required > max` before asking.
fn grown_capacity(required: u32, minimum: u32, max: u32) -> u32 {
    required
        .max(minimum)
        .max(64)
        .checked_next_power_of_two()
        .unwrap_or(u32::MAX)
        .min(max)
}

/// Largest vertex count a single buffer may hold under `limits`.
fn max_vertices(limits: &wgpu::Limits) -> u32 {
    let max = limits.max_buffer_size / std::mem::size_of::<Vertex>() as u64;
    u32::try_from(max).unwrap_or(u32::MAX)
}

/// Operation recorded between `upload_vertices` and `encode`.
#[derive(Debug, Clone)]
enum PassOp {
    Bind(TextureId),
    Draw(Range<u32>),
}

/// Pass command produced by [`replay_ops`].
#[derive(Debug, PartialEq)]
enum PassStep<G> {
    Bind(G),
    Draw(Range<u32>),
}

/// Resolves recorded ops into pass commands.
///
/// A bind whose texture no longer resolves leaves nothing bound, and draws are
/// skipped until the next bind that resolves.
fn replay_ops<G>(
    ops: &[PassOp],
    mut resolve: impl FnMut(TextureId) -> Option<G>,
    mut emit: impl FnMut(PassStep<G>),
) {
    let mut bound = false;
    for op in ops {
        match op {
            PassOp::Bind(id) => match resolve(*id) {
                Some(group) => {
                    bound = true;
                    emit(PassStep::Bind(group));
                }
                None => bound = false,
            },
            PassOp::Draw(range) if bound => emit(PassStep::Draw(range.clone())),
            PassOp::Draw(_) => {}
        }
    }
}

// ── device ────────────────────────────────────────────────────────────────

/// wgpu implementation of [`GraphicsDevice`].
///
/// All pipeline state is created in [`WgpuDevice::new`]; the vertex buffer is
/// created by `create_vertex_buffer` (called once by `SpriteBatch::new`) and
/// replaced with a larger one when a frame outgrows it.
///
/// Textures are registered up front with [`WgpuDevice::register_texture`],
/// which returns the [`TextureId`] used in draw calls.
///
/// wgpu draws only happen inside a render pass, so `bind_texture` and
/// `draw_range` are validated and recorded; [`WgpuDevice::encode`] replays them
/// into a pass on the caller's encoder.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    label: &'static str,

    pipeline: wgpu::RenderPipeline,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,

    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: u32,
    min_vertex_capacity: u32,
    max_vertex_capacity: u32,

    textures: HashMap<TextureId, wgpu::BindGroup>,
    next_texture: u32,

    state: BindState,
    ops: Vec<PassOp>,
}

impl WgpuDevice {
    pub fn new(ctx: &RenderCtx<'_>, init: SpriteDeviceInit) -> Self {
        let SpriteDeviceInit {
            label,
            initial_vertex_capacity,
            filter_mode,
            address_mode,
            blend,
        } = init;

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let viewport_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("spritebatch viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ViewportUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("spritebatch texture bgl"),
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

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spritebatch pipeline layout"),
            bind_group_layouts: &[&viewport_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: Some(blend.to_wgpu()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The two triangles of a quad wind in opposite directions.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("spritebatch sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter_mode,
            min_filter: filter_mode,
            ..Default::default()
        });

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spritebatch viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spritebatch viewport bind group"),
            layout: &viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        log::debug!("{label}: pipeline created for {:?}", ctx.target_format);

        let mut this = Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            label,
            pipeline,
            texture_bgl,
            sampler,
            viewport_ubo,
            viewport_bind_group,
            vertex_buffer: None,
            vertex_capacity: 0,
            min_vertex_capacity: initial_vertex_capacity,
            max_vertex_capacity: max_vertices(&ctx.device.limits()),
            textures: HashMap::new(),
            next_texture: 1,
            state: BindState::default(),
            ops: Vec::new(),
        };
        this.set_viewport(ctx.viewport);
        this
    }

    /// Writes the viewport uniform used to map logical pixels to NDC.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let u = ViewportUniform {
            viewport: viewport.clamped_extent(),
            _pad: [0.0; 2],
        };
        self.queue.write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&u));
    }

    /// Makes a texture view drawable and returns its handle.
    ///
    /// The view must be a filterable 2D float texture.
    pub fn register_texture(&mut self, view: &wgpu::TextureView) -> TextureId {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spritebatch texture bind group"),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.textures.insert(id, bind_group);
        log::debug!("{}: registered texture {id:?}", self.label);
        id
    }

    /// Releases a texture's bind group. Returns `false` for unknown ids.
    ///
    /// Later `bind_texture` calls with this id fail with
    /// [`DeviceError::UnknownTexture`].
    pub fn unregister_texture(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }

    /// Current vertex buffer capacity in vertices.
    #[inline]
    pub fn vertex_capacity(&self) -> u32 {
        self.vertex_capacity
    }

    /// Encodes the recorded binds and draws into one render pass on `target`.
    ///
    /// Recorded operations are consumed. With nothing recorded, a pass is only
    /// opened when the target asks for a clear.
    pub fn encode(&mut self, target: &mut RenderTarget<'_>) {
        if self.ops.is_empty() && target.clear.is_none() {
            return;
        }

        let mut ops = std::mem::take(&mut self.ops);
        let load = target.load_op();

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("spritebatch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(vertex_buffer) = self.vertex_buffer.as_ref() {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.viewport_bind_group, &[]);
                rpass.set_vertex_buffer(0, vertex_buffer.slice(..));

                let (textures, label) = (&self.textures, self.label);
                replay_ops(
                    &ops,
                    |id| {
                        let group = textures.get(&id);
                        if group.is_none() {
                            // Unregistered after the draw was recorded.
                            log::warn!("{label}: texture {id:?} vanished before encode, skipping its draws");
                        }
                        group
                    },
                    |step| match step {
                        PassStep::Bind(group) => rpass.set_bind_group(1, group, &[]),
                        PassStep::Draw(range) => rpass.draw(range, 0..1),
                    },
                );
            }
        }

        ops.clear();
        self.ops = ops;
    }
}

impl GraphicsDevice for WgpuDevice {
    type Error = DeviceError;

    fn create_vertex_buffer(&mut self) -> Result<(), DeviceError> {
        let capacity = grown_capacity(0, self.min_vertex_capacity, self.max_vertex_capacity);
        self.vertex_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spritebatch vertex buffer"),
            size: capacity as u64 * std::mem::size_of::<Vertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vertex_capacity = capacity;
        Ok(())
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<(), DeviceError> {
        let max = self.max_vertex_capacity;
        let required = u32::try_from(vertices.len())
            .ok()
            .filter(|&n| n <= max)
            .ok_or(DeviceError::VertexBufferTooLarge {
                required: vertices.len(),
                max,
            })?;

        if self.vertex_buffer.is_none() || required > self.vertex_capacity {
            // Orphan: drop the old buffer and allocate a larger one.
            self.min_vertex_capacity = grown_capacity(required, self.min_vertex_capacity, max);
            self.create_vertex_buffer()?;
            log::debug!("{}: vertex buffer grown to {} vertices", self.label, self.vertex_capacity);
        }

        self.ops.clear();
        self.state.uploaded(required);

        if let Some(vertex_buffer) = self.vertex_buffer.as_ref() {
            if !vertices.is_empty() {
                self.queue.write_buffer(vertex_buffer, 0, bytemuck::cast_slice(vertices));
            }
        }
        Ok(())
    }

    fn bind_texture(&mut self, texture: TextureId) -> Result<(), DeviceError> {
        if !self.textures.contains_key(&texture) {
            return Err(DeviceError::UnknownTexture(texture));
        }
        self.state.bind(texture);
        self.ops.push(PassOp::Bind(texture));
        Ok(())
    }

    fn draw_range(&mut self, offset: u32, count: u32) -> Result<(), DeviceError> {
        self.state.check_draw(offset, count)?;
        self.ops.push(PassOp::Draw(offset..offset + count));
        Ok(())
    }
}
