use glam::{Mat4, Vec3};

use super::lighting::LightSettings;
use crate::gpu::VaoRange;
use crate::scene::{visit_node, visit_scene, ComponentType, Node, Primitive, PrimitiveMode, SceneDocument};
use crate::traits::{GraphicsContext, Uniform};

/// View-dependent inputs shared by every draw of one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub lighting_enabled: bool,
    /// Already expressed in view space
    pub light_direction: Vec3,
    pub light_intensity: Vec3,
}

impl FrameUniforms {
    pub fn new(view: Mat4, projection: Mat4, light: &LightSettings) -> Self {
        Self {
            view,
            projection,
            lighting_enabled: light.enabled,
            light_direction: light.view_space_direction(&view),
            light_intensity: light.intensity,
        }
    }
}

/// Transforms written for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMatrices {
    pub model_view: Mat4,
    pub model_view_projection: Mat4,
    pub normal: Mat4,
}

impl NodeMatrices {
    pub fn new(frame: &FrameUniforms, local_to_world: &Mat4) -> Self {
        let model_view = frame.view * *local_to_world;
        Self {
            model_view,
            model_view_projection: frame.projection * model_view,
            normal: model_view.inverse().transpose(),
        }
    }
}

/// Parameters of the single draw issued for a primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Indexed {
        mode: PrimitiveMode,
        count: u32,
        index_type: ComponentType,
        byte_offset: u64,
    },
    Arrays {
        mode: PrimitiveMode,
        first: u32,
        count: u32,
    },
}

impl DrawCommand {
    /// Indexed when the primitive has indices, otherwise one vertex per
    /// element of its first attribute
    pub fn resolve(document: &SceneDocument, primitive: &Primitive) -> Self {
        match primitive.indices {
            Some(indices) => {
                let accessor = &document.accessors[indices];
                DrawCommand::Indexed {
                    mode: primitive.mode,
                    count: accessor.count as u32,
                    index_type: accessor.component_type,
                    byte_offset: document.accessor_buffer_offset(indices) as u64,
                }
            }
            None => {
                let count = primitive
                    .attributes
                    .values()
                    .next()
                    .map_or(0, |&accessor| document.accessors[accessor].count);
                DrawCommand::Arrays {
                    mode: primitive.mode,
                    first: 0,
                    count: count as u32,
                }
            }
        }
    }

    pub fn submit(&self, context: &mut dyn GraphicsContext) {
        match *self {
            DrawCommand::Indexed {
                mode,
                count,
                index_type,
                byte_offset,
            } => context.draw_indexed(mode, count, index_type, byte_offset),
            DrawCommand::Arrays { mode, first, count } => context.draw_arrays(mode, first, count),
        }
    }
}

/// Issue the uniform writes and draws of every primitive below `node_index`
pub fn draw_node(
    document: &SceneDocument,
    node_index: usize,
    parent: &Mat4,
    vertex_arrays: &[VaoRange],
    frame: &FrameUniforms,
    context: &mut dyn GraphicsContext,
) {
    visit_node(document, node_index, parent, &mut |_: usize, node: &Node, local_to_world: &Mat4| {
        let Some(mesh) = node.mesh else {
            return;
        };
        let matrices = NodeMatrices::new(frame, local_to_world);
        let range = vertex_arrays[mesh];

        for (p, primitive) in document.meshes[mesh].primitives.iter().enumerate() {
            context.set_uniform_mat4(Uniform::ModelViewProjMatrix, matrices.model_view_projection);
            context.set_uniform_mat4(Uniform::ModelViewMatrix, matrices.model_view);
            context.set_uniform_mat4(Uniform::NormalMatrix, matrices.normal);

            context.set_uniform_f32(Uniform::LightingEnabled, if frame.lighting_enabled { 1.0 } else { 0.0 });
            if frame.lighting_enabled {
                context.set_uniform_vec3(Uniform::LightDirection, frame.light_direction);
                context.set_uniform_vec3(Uniform::LightIntensity, frame.light_intensity);
            }

            let material = document.material(primitive);
            context.set_uniform_vec4(Uniform::BaseColorFactor, material.base_color_factor);
            context.set_uniform_f32(Uniform::MetallicFactor, material.metallic_factor);
            context.set_uniform_f32(Uniform::RoughnessFactor, material.roughness_factor);
            context.set_uniform_vec3(Uniform::EmissiveFactor, material.emissive_factor);

            context.bind_vertex_array(range.offset + p);
            DrawCommand::resolve(document, primitive).submit(context);
        }
    });
}

/// Draw every root of `scene_index` from the identity transform
pub fn draw_scene(
    document: &SceneDocument,
    scene_index: usize,
    vertex_arrays: &[VaoRange],
    frame: &FrameUniforms,
    context: &mut dyn GraphicsContext,
) {
    for &root in &document.scenes[scene_index].nodes {
        draw_node(document, root, &Mat4::IDENTITY, vertex_arrays, frame, context);
    }
}

/// Number of primitives `draw_scene` would submit
pub fn count_draws(document: &SceneDocument, scene_index: usize) -> usize {
    let mut draws = 0;
    visit_scene(document, scene_index, |_, node, _| {
        if let Some(mesh) = node.mesh {
            draws += document.meshes[mesh].primitives.len();
        }
    });
    draws
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{GraphicsCall, RecordingContext};
    use crate::scene::{Accessor, Buffer, BufferView, ElementType, Mesh, NodeTransform, Scene};
    use std::collections::BTreeMap;

    fn accessor(view: usize, byte_offset: usize, component_type: ComponentType, count: usize) -> Accessor {
        Accessor {
            buffer_view: Some(view),
            byte_offset,
            component_type,
            element_type: if component_type == ComponentType::F32 {
                ElementType::Vec3
            } else {
                ElementType::Scalar
            },
            normalized: false,
            count,
        }
    }

    fn document() -> SceneDocument {
        let mut indexed = BTreeMap::new();
        indexed.insert("POSITION".to_string(), 0);
        let mut plain = BTreeMap::new();
        plain.insert("POSITION".to_string(), 0);

        SceneDocument {
            scenes: vec![Scene {
                name: None,
                nodes: vec![0],
            }],
            nodes: vec![Node {
                transform: NodeTransform::from_translation(Vec3::X),
                mesh: Some(0),
                ..Default::default()
            }],
            meshes: vec![Mesh {
                name: None,
                primitives: vec![
                    Primitive {
                        attributes: indexed,
                        indices: Some(1),
                        ..Default::default()
                    },
                    Primitive {
                        attributes: plain,
                        mode: PrimitiveMode::Lines,
                        ..Default::default()
                    },
                ],
            }],
            accessors: vec![
                accessor(0, 0, ComponentType::F32, 4),
                accessor(1, 2, ComponentType::U16, 6),
            ],
            buffer_views: vec![
                BufferView {
                    buffer: 0,
                    byte_offset: 0,
                    byte_length: 48,
                    byte_stride: None,
                    target: None,
                },
                BufferView {
                    buffer: 0,
                    byte_offset: 48,
                    byte_length: 14,
                    byte_stride: None,
                    target: None,
                },
            ],
            buffers: vec![Buffer { data: vec![0; 62] }],
            ..Default::default()
        }
    }

    #[test]
    fn resolves_indexed_and_plain_draws() {
        let document = document();
        let primitives = &document.meshes[0].primitives;

        assert_eq!(
            DrawCommand::resolve(&document, &primitives[0]),
            DrawCommand::Indexed {
                mode: PrimitiveMode::Triangles,
                count: 6,
                index_type: ComponentType::U16,
                byte_offset: 50,
            }
        );
        assert_eq!(
            DrawCommand::resolve(&document, &primitives[1]),
            DrawCommand::Arrays {
                mode: PrimitiveMode::Lines,
                first: 0,
                count: 4,
            }
        );
    }

    #[test]
    fn lighting_disabled_skips_light_uniforms() {
        let document = document();
        let light = LightSettings {
            enabled: false,
            ..Default::default()
        };
        let frame = FrameUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, &light);
        let mut context = RecordingContext::default();
        draw_scene(&document, 0, &[VaoRange { offset: 0, count: 2 }], &frame, &mut context);

        assert!(!context
            .calls()
            .iter()
            .any(|call| matches!(call, GraphicsCall::Vec3(Uniform::LightDirection, _))));
        assert!(context
            .calls()
            .iter()
            .any(|call| *call == GraphicsCall::F32(Uniform::LightingEnabled, 0.0)));
        assert_eq!(context.draw_count(), 2);
    }

    #[test]
    fn binds_vertex_array_of_each_primitive() {
        let document = document();
        let frame = FrameUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, &LightSettings::default());
        let mut context = RecordingContext::default();
        draw_scene(&document, 0, &[VaoRange { offset: 3, count: 2 }], &frame, &mut context);

        let bound: Vec<usize> = context
            .calls()
            .iter()
            .filter_map(|call| match call {
                GraphicsCall::BindVertexArray(index) => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(bound, vec![3, 4]);
        assert_eq!(count_draws(&document, 0), 2);
    }

    #[test]
    fn normal_matrix_is_inverse_transpose() {
        let light = LightSettings::default();
        let frame = FrameUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, &light);
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let matrices = NodeMatrices::new(&frame, &world);

        let normal = matrices.normal.transform_vector3(Vec3::X);
        assert!(normal.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
    }
}
