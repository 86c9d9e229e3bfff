use glam::{Mat4, Quat, Vec3, Vec4};
use std::collections::BTreeMap;

use crate::math::AABB;

/// Attribute semantic bound to vertex slot 0
pub const POSITION: &str = "POSITION";
/// Attribute semantic bound to vertex slot 1
pub const NORMAL: &str = "NORMAL";
/// Attribute semantic bound to vertex slot 2
pub const TEXCOORD_0: &str = "TEXCOORD_0";

/// Scalar type of accessor components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// Size of one component in bytes
    pub fn size(&self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }
}

/// Shape of one accessor element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    pub fn component_count(&self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 | ElementType::Mat2 => 4,
            ElementType::Mat3 => 9,
            ElementType::Mat4 => 16,
        }
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Intended use of a buffer view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    ArrayBuffer,
    ElementArrayBuffer,
}

/// Node placement relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeTransform {
    Matrix(Mat4),
    Trs {
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
}

impl NodeTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        NodeTransform::Trs {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Local-to-parent matrix; a TRS triple composes as `T * R * S`
    pub fn matrix(&self) -> Mat4 {
        match *self {
            NodeTransform::Matrix(matrix) => matrix,
            NodeTransform::Trs {
                translation,
                rotation,
                scale,
            } => Mat4::from_scale_rotation_translation(scale, rotation, translation),
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        NodeTransform::Matrix(Mat4::IDENTITY)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: Option<String>,
    /// Root node indices, drawn in this order
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: Option<String>,
    pub transform: NodeTransform,
    pub mesh: Option<usize>,
    pub light: Option<usize>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Default)]
pub struct Primitive {
    /// Semantic name (`POSITION`, `NORMAL`, ...) to accessor index
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: PrimitiveMode,
    /// Local-space extent of the `POSITION` attribute
    pub bounds: Option<AABB>,
}

impl Primitive {
    pub fn attribute(&self, semantic: &str) -> Option<usize> {
        self.attributes.get(semantic).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Accessor {
    /// `None` for sparse accessors that are not backed by a buffer view
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub element_type: ElementType,
    pub normalized: bool,
    pub count: usize,
}

impl Accessor {
    /// Size of one element in bytes
    pub fn element_size(&self) -> usize {
        self.component_type.size() * self.element_type.component_count()
    }
}

#[derive(Debug, Clone)]
pub struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    /// `None` means tightly packed
    pub byte_stride: Option<usize>,
    pub target: Option<BufferTarget>,
}

#[derive(Debug, Clone, Default)]
pub struct Buffer {
    pub data: Vec<u8>,
}

/// Metallic-roughness material factors
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color_factor: Vec4,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: Vec4::ONE,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive_factor: Vec3::ZERO,
        }
    }
}

/// Directional light; it shines along the `-Z` axis of the node it is
/// attached to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// In-memory scene graph produced by the loader and read during rendering
#[derive(Debug, Clone, Default)]
pub struct SceneDocument {
    pub scenes: Vec<Scene>,
    pub default_scene: Option<usize>,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub accessors: Vec<Accessor>,
    pub buffer_views: Vec<BufferView>,
    pub buffers: Vec<Buffer>,
    pub materials: Vec<Material>,
    pub lights: Vec<DirectionalLight>,
}

impl SceneDocument {
    /// Scene to render: the declared default, else the first one
    pub fn active_scene(&self) -> Option<usize> {
        self.default_scene
            .or_else(|| (!self.scenes.is_empty()).then_some(0))
    }

    /// Byte offset of an accessor's first element inside its buffer
    pub fn accessor_buffer_offset(&self, accessor: usize) -> usize {
        let accessor = &self.accessors[accessor];
        let view_offset = accessor
            .buffer_view
            .map_or(0, |view| self.buffer_views[view].byte_offset);
        view_offset + accessor.byte_offset
    }

    /// Distance in bytes between consecutive elements of an accessor
    pub fn accessor_stride(&self, accessor: usize) -> usize {
        let accessor = &self.accessors[accessor];
        accessor
            .buffer_view
            .and_then(|view| self.buffer_views[view].byte_stride)
            .unwrap_or_else(|| accessor.element_size())
    }

    /// Material of a primitive, falling back to the default material
    pub fn material(&self, primitive: &Primitive) -> Material {
        primitive
            .material
            .and_then(|index| self.materials.get(index))
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of primitives across all meshes
    pub fn primitive_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.primitives.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trs_composes_translation_rotation_scale() {
        let transform = NodeTransform::Trs {
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };

        // scale first: (1,0,0) -> (2,0,0); rotate: -> (0,2,0); translate: -> (1,2,0)
        let point = transform.matrix().transform_point3(Vec3::X);
        assert!(point.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5), "point = {:?}", point);
    }

    #[test]
    fn default_transform_is_identity() {
        assert_eq!(NodeTransform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn element_sizes() {
        let accessor = Accessor {
            buffer_view: None,
            byte_offset: 0,
            component_type: ComponentType::F32,
            element_type: ElementType::Vec3,
            normalized: false,
            count: 3,
        };
        assert_eq!(accessor.element_size(), 12);
        assert_eq!(ComponentType::U16.size(), 2);
        assert_eq!(ElementType::Mat4.component_count(), 16);
    }

    #[test]
    fn active_scene_prefers_default() {
        let mut document = SceneDocument::default();
        assert_eq!(document.active_scene(), None);

        document.scenes = vec![Scene::default(), Scene::default()];
        assert_eq!(document.active_scene(), Some(0));

        document.default_scene = Some(1);
        assert_eq!(document.active_scene(), Some(1));
    }

    #[test]
    fn missing_material_uses_default() {
        let document = SceneDocument::default();
        let primitive = Primitive {
            material: Some(3),
            ..Default::default()
        };
        assert_eq!(document.material(&primitive), Material::default());
    }
}
