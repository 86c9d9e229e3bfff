use anyhow::{bail, Result};
use glam::{Mat4, Vec3, Vec4};
use std::collections::{HashMap, HashSet};

use super::buffers::GpuScene;
use super::vertex_arrays::{AttributeSource, IndexSource, VertexLayoutKey};
use crate::core::GpuContext;
use crate::scene::{ComponentType, PrimitiveMode, SceneDocument};
use crate::traits::{GraphicsContext, Uniform};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-draw uniform block, laid out as `Object` in `forward.wgsl`
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniforms {
    model_view_projection: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
    light_direction: [f32; 4],
    light_intensity: [f32; 4],
    emissive: [f32; 4],
    /// x: lighting enabled, y: metallic, z: roughness
    params: [f32; 4],
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model_view_projection: identity,
            model_view: identity,
            normal_matrix: identity,
            base_color: [1.0; 4],
            light_direction: [0.0, 0.0, 1.0, 0.0],
            light_intensity: [1.0, 1.0, 1.0, 0.0],
            emissive: [0.0; 4],
            params: [0.0, 1.0, 1.0, 0.0],
        }
    }
}

const OBJECT_SIZE: u64 = std::mem::size_of::<ObjectUniforms>() as u64;

/// Device topology for a glTF mode; loops and fans have none
fn topology(mode: PrimitiveMode) -> Option<wgpu::PrimitiveTopology> {
    match mode {
        PrimitiveMode::Points => Some(wgpu::PrimitiveTopology::PointList),
        PrimitiveMode::Lines => Some(wgpu::PrimitiveTopology::LineList),
        PrimitiveMode::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
        PrimitiveMode::Triangles => Some(wgpu::PrimitiveTopology::TriangleList),
        PrimitiveMode::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
        PrimitiveMode::LineLoop | PrimitiveMode::TriangleFan => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    topology: wgpu::PrimitiveTopology,
    layout: VertexLayoutKey,
}

#[derive(Debug, Clone, Copy)]
enum DrawCall {
    Indexed {
        source: IndexSource,
        byte_offset: u64,
        count: u32,
    },
    Arrays {
        first: u32,
        count: u32,
    },
}

#[derive(Debug, Clone, Copy)]
struct RecordedDraw {
    pipeline: PipelineKey,
    vertex_array: usize,
    object: usize,
    call: DrawCall,
}

struct DepthTarget {
    size: (u32, u32),
    view: wgpu::TextureView,
}

/// `GraphicsContext` over wgpu.
///
/// Uniform writes update a pending block. Each draw snapshots that block and
/// is recorded; `finish_frame` uploads all snapshots into one dynamic-offset
/// uniform buffer and encodes a single depth-tested pass.
pub struct SceneRenderer {
    gpu: GpuContext,
    scene: GpuScene,
    color_format: wgpu::TextureFormat,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_capacity: usize,
    uniform_stride: u64,
    bind_group: wgpu::BindGroup,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    depth: Option<DepthTarget>,
    pending: ObjectUniforms,
    bound: Option<usize>,
    objects: Vec<ObjectUniforms>,
    draws: Vec<RecordedDraw>,
    skipped_modes: HashSet<PrimitiveMode>,
    last_draw_count: usize,
}

impl SceneRenderer {
    /// Upload `document` and build the forward pipeline state.
    ///
    /// `shader_source` replaces the built-in WGSL; it must declare the same
    /// bindings, vertex inputs and entry points.
    pub fn new(
        gpu: GpuContext,
        document: &SceneDocument,
        color_format: wgpu::TextureFormat,
        shader_source: Option<&str>,
    ) -> Result<Self> {
        let device = gpu.device();
        let scene = GpuScene::upload(device, document);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Forward Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.unwrap_or(include_str!("../forward.wgsl")).into()),
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            bail!("Failed to compile shader: {}", error);
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(OBJECT_SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Forward Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = OBJECT_SIZE.next_multiple_of(alignment);
        let uniform_capacity = document.primitive_count().max(1);
        let (uniform_buffer, bind_group) =
            Self::create_uniform_buffer(device, &bind_group_layout, uniform_capacity, uniform_stride);

        Ok(Self {
            gpu,
            scene,
            color_format,
            shader,
            pipeline_layout,
            bind_group_layout,
            uniform_buffer,
            uniform_capacity,
            uniform_stride,
            bind_group,
            pipelines: HashMap::new(),
            depth: None,
            pending: ObjectUniforms::default(),
            bound: None,
            objects: Vec::new(),
            draws: Vec::new(),
            skipped_modes: HashSet::new(),
            last_draw_count: 0,
        })
    }

    fn create_uniform_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
        stride: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniforms"),
            size: capacity as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(OBJECT_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Vertex array ranges of the uploaded scene, one per mesh
    pub fn vertex_array_ranges(&self) -> &[crate::gpu::VaoRange] {
        &self.scene.ranges
    }

    /// Number of draws encoded by the last `finish_frame`
    pub fn last_draw_count(&self) -> usize {
        self.last_draw_count
    }

    /// Drop draws recorded since the last frame and reset uniform state
    pub fn begin_frame(&mut self) {
        self.objects.clear();
        self.draws.clear();
        self.pending = ObjectUniforms::default();
        self.bound = None;
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        log::debug!("Creating pipeline for {:?}", key);

        let attributes: [[wgpu::VertexAttribute; 1]; 3] = std::array::from_fn(|slot| {
            [wgpu::VertexAttribute {
                format: key.layout[slot].1,
                offset: 0,
                shader_location: slot as u32,
            }]
        });
        let buffers: [wgpu::VertexBufferLayout; 3] = std::array::from_fn(|slot| wgpu::VertexBufferLayout {
            array_stride: key.layout[slot].0,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes[slot],
        });

        let pipeline = self.gpu.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Forward Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: key.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });
        self.pipelines.insert(key, pipeline);
    }

    fn record(&mut self, mode: PrimitiveMode, call: DrawCall) {
        let Some(topology) = topology(mode) else {
            if self.skipped_modes.insert(mode) {
                log::warn!("{:?} primitives are not supported and will not be drawn", mode);
            }
            return;
        };
        let Some(vertex_array) = self.bound else {
            log::warn!("Draw issued without a bound vertex array");
            return;
        };

        let pipeline = PipelineKey {
            topology,
            layout: self.scene.vertex_arrays[vertex_array].layout_key(),
        };
        self.ensure_pipeline(pipeline);

        self.objects.push(self.pending);
        self.draws.push(RecordedDraw {
            pipeline,
            vertex_array,
            object: self.objects.len() - 1,
            call,
        });
    }

    fn ensure_depth(&mut self, size: (u32, u32)) {
        if self.depth.as_ref().is_some_and(|depth| depth.size == size) {
            return;
        }
        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthTarget { size, view });
    }

    fn upload_objects(&mut self) {
        if self.objects.len() > self.uniform_capacity {
            self.uniform_capacity = self.objects.len().next_power_of_two();
            log::debug!("Growing object uniform buffer to {} entries", self.uniform_capacity);
            let (buffer, bind_group) = Self::create_uniform_buffer(
                self.gpu.device(),
                &self.bind_group_layout,
                self.uniform_capacity,
                self.uniform_stride,
            );
            self.uniform_buffer = buffer;
            self.bind_group = bind_group;
        }
        if self.objects.is_empty() {
            return;
        }

        let stride = self.uniform_stride as usize;
        let mut bytes = vec![0u8; self.objects.len() * stride];
        for (i, object) in self.objects.iter().enumerate() {
            bytes[i * stride..i * stride + OBJECT_SIZE as usize].copy_from_slice(bytemuck::bytes_of(object));
        }
        self.gpu.queue().write_buffer(&self.uniform_buffer, 0, &bytes);
    }

    /// Encode every draw recorded since `begin_frame` into one pass that
    /// clears `target` (of `size` pixels) and the depth buffer
    pub fn finish_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        size: (u32, u32),
        clear_color: wgpu::Color,
    ) {
        self.ensure_depth(size);
        self.upload_objects();

        self.last_draw_count = self.draws.len();

        let Some(depth) = self.depth.as_ref() else {
            return;
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        for draw in &self.draws {
            let Some(pipeline) = self.pipelines.get(&draw.pipeline) else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[(draw.object as u64 * self.uniform_stride) as u32]);

            let vertex_array = &self.scene.vertex_arrays[draw.vertex_array];
            for (slot, attribute) in vertex_array.attributes.iter().enumerate() {
                let slice = match attribute.source {
                    AttributeSource::Buffer { buffer, byte_offset, .. } => {
                        self.scene.buffers[buffer].slice(byte_offset..)
                    }
                    AttributeSource::Default { byte_offset } => self.scene.default_attributes.slice(byte_offset..),
                };
                render_pass.set_vertex_buffer(slot as u32, slice);
            }

            match draw.call {
                DrawCall::Indexed {
                    source,
                    byte_offset,
                    count,
                } => {
                    let (buffer, format) = match source {
                        IndexSource::Buffer { buffer, format } => (&self.scene.buffers[buffer], format),
                        IndexSource::Widened { accessor } => {
                            let Some(buffer) = self.scene.widened_indices.get(&accessor) else {
                                continue;
                            };
                            (buffer, wgpu::IndexFormat::Uint16)
                        }
                    };
                    render_pass.set_index_buffer(buffer.slice(byte_offset..), format);
                    render_pass.draw_indexed(0..count, 0, 0..1);
                }
                DrawCall::Arrays { first, count } => render_pass.draw(first..first + count, 0..1),
            }
        }
    }
}

impl GraphicsContext for SceneRenderer {
    fn set_uniform_mat4(&mut self, uniform: Uniform, value: Mat4) {
        let value = value.to_cols_array_2d();
        match uniform {
            Uniform::ModelViewProjMatrix => self.pending.model_view_projection = value,
            Uniform::ModelViewMatrix => self.pending.model_view = value,
            Uniform::NormalMatrix => self.pending.normal_matrix = value,
            other => log::debug!("{:?} is not a matrix uniform", other),
        }
    }

    fn set_uniform_vec3(&mut self, uniform: Uniform, value: Vec3) {
        let value = value.extend(0.0).to_array();
        match uniform {
            Uniform::LightDirection => self.pending.light_direction = value,
            Uniform::LightIntensity => self.pending.light_intensity = value,
            Uniform::EmissiveFactor => self.pending.emissive = value,
            other => log::debug!("{:?} is not a vec3 uniform", other),
        }
    }

    fn set_uniform_vec4(&mut self, uniform: Uniform, value: Vec4) {
        match uniform {
            Uniform::BaseColorFactor => self.pending.base_color = value.to_array(),
            other => log::debug!("{:?} is not a vec4 uniform", other),
        }
    }

    fn set_uniform_f32(&mut self, uniform: Uniform, value: f32) {
        match uniform {
            Uniform::LightingEnabled => self.pending.params[0] = value,
            Uniform::MetallicFactor => self.pending.params[1] = value,
            Uniform::RoughnessFactor => self.pending.params[2] = value,
            other => log::debug!("{:?} is not a scalar uniform", other),
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: usize) {
        self.bound = (vertex_array < self.scene.vertex_arrays.len()).then_some(vertex_array);
    }

    fn draw_indexed(&mut self, mode: PrimitiveMode, count: u32, index_type: ComponentType, byte_offset: u64) {
        let indices = self.bound.and_then(|index| self.scene.vertex_arrays[index].indices);
        let call = match (index_type, indices) {
            (ComponentType::U8, Some(source @ IndexSource::Widened { .. })) => DrawCall::Indexed {
                source,
                byte_offset: 0,
                count,
            },
            (ComponentType::U16 | ComponentType::U32, Some(source @ IndexSource::Buffer { .. })) => {
                DrawCall::Indexed {
                    source,
                    byte_offset,
                    count,
                }
            }
            _ => {
                log::warn!("Skipping indexed draw with {:?} indices", index_type);
                return;
            }
        };
        self.record(mode, call);
    }

    fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32) {
        self.record(mode, DrawCall::Arrays { first, count });
    }
}
