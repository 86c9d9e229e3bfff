use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3, Vec4};
use gltf::khr_lights_punctual::Kind;
use gltf::Semantic;
use std::collections::HashMap;
use std::path::Path;

use crate::math::AABB;
use crate::scene::{
    Accessor, Buffer, BufferTarget, BufferView, ComponentType, DirectionalLight, ElementType, Material, Mesh,
    Node, NodeTransform, Primitive, PrimitiveMode, Scene, SceneDocument,
};

/// Loads a `.gltf` or `.glb` file and checks it can be drawn
pub fn load_scene(path: impl AsRef<Path>) -> Result<SceneDocument> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (gltf, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    let document = convert(&gltf, buffers);
    document
        .validate()
        .with_context(|| format!("Invalid scene in {:?}", path))?;
    Ok(document)
}

/// Same as `load_scene` for an in-memory file with embedded buffers
pub fn load_scene_from_slice(bytes: &[u8]) -> Result<SceneDocument> {
    let (gltf, buffers, _images) = gltf::import_slice(bytes).context("Failed to parse glTF data")?;

    let document = convert(&gltf, buffers);
    document.validate().context("Invalid scene")?;
    Ok(document)
}

fn convert(gltf: &gltf::Document, buffers: Vec<gltf::buffer::Data>) -> SceneDocument {
    log::info!("glTF loaded:");
    log::info!("  Scenes: {}", gltf.scenes().count());
    log::info!("  Nodes: {}", gltf.nodes().count());
    log::info!("  Meshes: {}", gltf.meshes().count());
    log::info!("  Materials: {}", gltf.materials().count());

    // Only directional lights are kept; remember where each one lands
    let mut lights = Vec::new();
    let mut light_slots = HashMap::new();
    for light in gltf.lights().into_iter().flatten() {
        if let Kind::Directional = light.kind() {
            light_slots.insert(light.index(), lights.len());
            lights.push(DirectionalLight {
                color: Vec3::from(light.color()),
                intensity: light.intensity(),
            });
        } else {
            log::debug!("Ignoring non-directional light {}", light.index());
        }
    }

    let document = SceneDocument {
        scenes: gltf.scenes().map(convert_scene).collect(),
        default_scene: gltf.default_scene().map(|scene| scene.index()),
        nodes: gltf.nodes().map(|node| convert_node(&node, &light_slots)).collect(),
        meshes: gltf.meshes().map(|mesh| convert_mesh(&mesh)).collect(),
        accessors: gltf.accessors().map(|accessor| convert_accessor(&accessor)).collect(),
        buffer_views: gltf.views().map(|view| convert_view(&view)).collect(),
        buffers: buffers.into_iter().map(|data| Buffer { data: data.0 }).collect(),
        materials: gltf.materials().map(|material| convert_material(&material)).collect(),
        lights,
    };

    log::info!(
        "Scene document: {} primitives, {} buffers ({} bytes), {} directional lights",
        document.primitive_count(),
        document.buffers.len(),
        document.buffers.iter().map(|b| b.data.len()).sum::<usize>(),
        document.lights.len()
    );
    document
}

fn convert_scene(scene: gltf::Scene) -> Scene {
    Scene {
        name: scene.name().map(str::to_owned),
        nodes: scene.nodes().map(|node| node.index()).collect(),
    }
}

fn convert_node(node: &gltf::Node, light_slots: &HashMap<usize, usize>) -> Node {
    let transform = match node.transform() {
        gltf::scene::Transform::Matrix { matrix } => NodeTransform::Matrix(Mat4::from_cols_array_2d(&matrix)),
        gltf::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => NodeTransform::Trs {
            translation: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
        },
    };

    Node {
        name: node.name().map(str::to_owned),
        transform,
        mesh: node.mesh().map(|mesh| mesh.index()),
        light: node.light().and_then(|light| light_slots.get(&light.index()).copied()),
        children: node.children().map(|child| child.index()).collect(),
    }
}

fn convert_mesh(mesh: &gltf::Mesh) -> Mesh {
    let primitives = mesh
        .primitives()
        .map(|primitive| {
            let attributes = primitive
                .attributes()
                .filter_map(|(semantic, accessor)| semantic_name(&semantic).map(|name| (name, accessor.index())))
                .collect();

            // bounding_box() reads the POSITION accessor and requires it
            let bounds = primitive.get(&Semantic::Positions).map(|_| {
                let bounds = primitive.bounding_box();
                AABB::new(Vec3::from(bounds.min), Vec3::from(bounds.max))
            });

            Primitive {
                attributes,
                indices: primitive.indices().map(|accessor| accessor.index()),
                material: primitive.material().index(),
                mode: convert_mode(primitive.mode()),
                bounds,
            }
        })
        .collect();

    Mesh {
        name: mesh.name().map(str::to_owned),
        primitives,
    }
}

fn semantic_name(semantic: &Semantic) -> Option<String> {
    let name = match semantic {
        Semantic::Positions => "POSITION".to_string(),
        Semantic::Normals => "NORMAL".to_string(),
        Semantic::Tangents => "TANGENT".to_string(),
        Semantic::Colors(set) => format!("COLOR_{}", set),
        Semantic::TexCoords(set) => format!("TEXCOORD_{}", set),
        Semantic::Joints(set) => format!("JOINTS_{}", set),
        Semantic::Weights(set) => format!("WEIGHTS_{}", set),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(name)
}

fn convert_mode(mode: gltf::mesh::Mode) -> PrimitiveMode {
    match mode {
        gltf::mesh::Mode::Points => PrimitiveMode::Points,
        gltf::mesh::Mode::Lines => PrimitiveMode::Lines,
        gltf::mesh::Mode::LineLoop => PrimitiveMode::LineLoop,
        gltf::mesh::Mode::LineStrip => PrimitiveMode::LineStrip,
        gltf::mesh::Mode::Triangles => PrimitiveMode::Triangles,
        gltf::mesh::Mode::TriangleStrip => PrimitiveMode::TriangleStrip,
        gltf::mesh::Mode::TriangleFan => PrimitiveMode::TriangleFan,
    }
}

fn convert_accessor(accessor: &gltf::Accessor) -> Accessor {
    use gltf::accessor::{DataType, Dimensions};

    let component_type = match accessor.data_type() {
        DataType::I8 => ComponentType::I8,
        DataType::U8 => ComponentType::U8,
        DataType::I16 => ComponentType::I16,
        DataType::U16 => ComponentType::U16,
        DataType::U32 => ComponentType::U32,
        DataType::F32 => ComponentType::F32,
    };
    let element_type = match accessor.dimensions() {
        Dimensions::Scalar => ElementType::Scalar,
        Dimensions::Vec2 => ElementType::Vec2,
        Dimensions::Vec3 => ElementType::Vec3,
        Dimensions::Vec4 => ElementType::Vec4,
        Dimensions::Mat2 => ElementType::Mat2,
        Dimensions::Mat3 => ElementType::Mat3,
        Dimensions::Mat4 => ElementType::Mat4,
    };

    Accessor {
        buffer_view: accessor.view().map(|view| view.index()),
        byte_offset: accessor.offset(),
        component_type,
        element_type,
        normalized: accessor.normalized(),
        count: accessor.count(),
    }
}

fn convert_view(view: &gltf::buffer::View) -> BufferView {
    BufferView {
        buffer: view.buffer().index(),
        byte_offset: view.offset(),
        byte_length: view.length(),
        byte_stride: view.stride(),
        target: view.target().map(|target| match target {
            gltf::buffer::Target::ArrayBuffer => BufferTarget::ArrayBuffer,
            gltf::buffer::Target::ElementArrayBuffer => BufferTarget::ElementArrayBuffer,
        }),
    }
}

fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    Material {
        name: material.name().map(str::to_owned),
        base_color_factor: Vec4::from(pbr.base_color_factor()),
        metallic_factor: pbr.metallic_factor(),
        roughness_factor: pbr.roughness_factor(),
        emissive_factor: Vec3::from(material.emissive_factor()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_names_follow_gltf_keys() {
        assert_eq!(semantic_name(&Semantic::Positions).as_deref(), Some("POSITION"));
        assert_eq!(semantic_name(&Semantic::TexCoords(0)).as_deref(), Some("TEXCOORD_0"));
        assert_eq!(semantic_name(&Semantic::Colors(1)).as_deref(), Some("COLOR_1"));
    }

    #[test]
    fn fan_and_loop_modes_survive_conversion() {
        assert_eq!(convert_mode(gltf::mesh::Mode::TriangleFan), PrimitiveMode::TriangleFan);
        assert_eq!(convert_mode(gltf::mesh::Mode::LineLoop), PrimitiveMode::LineLoop);
    }
}
