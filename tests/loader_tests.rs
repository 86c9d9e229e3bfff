use glam::{Vec3, Vec4};
use gltf_viewer::loaders::{load_scene, load_scene_from_slice};
use gltf_viewer::render::{scene_light, DrawCommand};
use gltf_viewer::scene::{scene_bounds, ComponentType, NodeTransform, PrimitiveMode, SceneDocument, SceneFraming};

const TRIANGLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/triangle.gltf");

#[cfg(test)]
mod loader_tests {
    use super::*;

    fn triangle() -> SceneDocument {
        load_scene(TRIANGLE).expect("fixture loads")
    }

    #[test]
    fn test_structure_counts() {
        let document = triangle();
        assert_eq!(document.scenes.len(), 1);
        assert_eq!(document.scenes[0].name.as_deref(), Some("Main"));
        assert_eq!(document.scenes[0].nodes, vec![0, 2]);
        assert_eq!(document.default_scene, Some(0));
        assert_eq!(document.nodes.len(), 3);
        assert_eq!(document.nodes[0].children, vec![1]);
        assert_eq!(document.primitive_count(), 2);
        assert_eq!(document.buffers[0].data.len(), 44);
    }

    #[test]
    fn test_node_transforms() {
        let document = triangle();
        match document.nodes[0].transform {
            NodeTransform::Trs { translation, .. } => assert_eq!(translation, Vec3::X),
            other => panic!("expected TRS, got {:?}", other),
        }
        assert_eq!(document.nodes[1].mesh, Some(0));
    }

    #[test]
    fn test_only_directional_lights_kept() {
        let document = triangle();
        assert_eq!(document.lights.len(), 1);
        assert_eq!(document.lights[0].color, Vec3::new(1.0, 0.5, 0.25));
        assert_eq!(document.lights[0].intensity, 2.0);
        assert_eq!(document.nodes[2].light, Some(0));
    }

    #[test]
    fn test_material_factors() {
        let document = triangle();
        let material = document.material(&document.meshes[0].primitives[0]);
        assert_eq!(material.name.as_deref(), Some("Red"));
        assert_eq!(material.base_color_factor, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(material.metallic_factor, 0.0);
        assert_eq!(material.roughness_factor, 0.5);
        assert_eq!(material.emissive_factor, Vec3::new(0.0, 0.0, 0.25));

        // second primitive has no material
        let fallback = document.material(&document.meshes[0].primitives[1]);
        assert_eq!(fallback.metallic_factor, 1.0);
    }

    #[test]
    fn test_primitive_draw_commands() {
        let document = triangle();
        let primitives = &document.meshes[0].primitives;

        assert_eq!(
            DrawCommand::resolve(&document, &primitives[0]),
            DrawCommand::Indexed {
                mode: PrimitiveMode::Triangles,
                count: 3,
                index_type: ComponentType::U16,
                byte_offset: 36,
            }
        );
        assert_eq!(
            DrawCommand::resolve(&document, &primitives[1]),
            DrawCommand::Arrays {
                mode: PrimitiveMode::Lines,
                first: 0,
                count: 3,
            }
        );
    }

    #[test]
    fn test_bounds_and_framing() {
        let document = triangle();
        let local = document.meshes[0].primitives[0].bounds.expect("position bounds");
        assert_eq!(local.min, Vec3::ZERO);
        assert_eq!(local.max, Vec3::new(1.0, 1.0, 0.0));

        let world = scene_bounds(&document, 0).expect("scene bounds");
        assert!(world.min.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
        assert!(world.max.abs_diff_eq(Vec3::new(2.0, 3.0, 0.0), 1e-6));

        // flat scene: viewed from the side, along +Z
        let camera = SceneFraming::new(&document, Some(0)).default_camera();
        assert!(camera.center().abs_diff_eq(Vec3::new(1.5, 2.5, 0.0), 1e-6));
        assert!(camera.eye().abs_diff_eq(Vec3::new(1.5, 2.5, 2.0), 1e-6));
    }

    #[test]
    fn test_scene_light_from_node() {
        let document = triangle();
        let (direction, intensity) = scene_light(&document, 0).expect("scene has a light");
        assert!(direction.abs_diff_eq(Vec3::Y, 1e-5), "direction = {:?}", direction);
        assert!(intensity.abs_diff_eq(Vec3::new(2.0, 1.0, 0.5), 1e-6));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_scene(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/missing.gltf")).is_err());
    }

    #[test]
    fn test_cyclic_hierarchy_is_rejected() {
        let json = br#"{
            "asset": { "version": "2.0" },
            "scenes": [ { "nodes": [] } ],
            "nodes": [ { "children": [1] }, { "children": [0] } ]
        }"#;
        assert!(load_scene_from_slice(json).is_err());
    }

    #[test]
    fn test_minimal_document_loads() {
        let json = br#"{
            "asset": { "version": "2.0" },
            "scenes": [ { "nodes": [0] } ],
            "nodes": [ { "matrix": [2,0,0,0, 0,2,0,0, 0,0,2,0, 0,0,0,1] } ]
        }"#;
        let document = load_scene_from_slice(json).expect("loads");
        assert_eq!(document.active_scene(), Some(0));
        assert!(matches!(document.nodes[0].transform, NodeTransform::Matrix(_)));
        assert!(scene_bounds(&document, 0).is_none());
    }
}
