use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Mat4, Quat, Vec3};
use gltf_viewer::camera::Camera;
use gltf_viewer::gpu::create_vertex_arrays;
use gltf_viewer::render::{draw_scene, FrameUniforms, LightSettings, RecordingContext};
use gltf_viewer::scene::{
    scene_bounds, Accessor, Buffer, BufferView, ComponentType, ElementType, Mesh, Node, NodeTransform, Primitive,
    Scene, SceneDocument,
};
use std::collections::BTreeMap;

/// Tree of `depth` levels where every node has `fanout` children and draws
/// a single indexed triangle
fn generate_tree(depth: usize, fanout: usize) -> SceneDocument {
    let mut attributes = BTreeMap::new();
    attributes.insert("POSITION".to_string(), 0);

    let mut document = SceneDocument {
        meshes: vec![Mesh {
            name: None,
            primitives: vec![Primitive {
                attributes,
                indices: Some(1),
                ..Default::default()
            }],
        }],
        accessors: vec![
            Accessor {
                buffer_view: Some(0),
                byte_offset: 0,
                component_type: ComponentType::F32,
                element_type: ElementType::Vec3,
                normalized: false,
                count: 3,
            },
            Accessor {
                buffer_view: Some(1),
                byte_offset: 0,
                component_type: ComponentType::U16,
                element_type: ElementType::Scalar,
                normalized: false,
                count: 3,
            },
        ],
        buffer_views: vec![
            BufferView {
                buffer: 0,
                byte_offset: 0,
                byte_length: 36,
                byte_stride: None,
                target: None,
            },
            BufferView {
                buffer: 0,
                byte_offset: 36,
                byte_length: 6,
                byte_stride: None,
                target: None,
            },
        ],
        buffers: vec![Buffer { data: vec![0; 44] }],
        ..Default::default()
    };

    let mut level = vec![push_node(&mut document, 0)];
    for d in 1..depth {
        let mut next = Vec::with_capacity(level.len() * fanout);
        for &parent in &level {
            for c in 0..fanout {
                let child = push_node(&mut document, d * fanout + c);
                document.nodes[parent].children.push(child);
                next.push(child);
            }
        }
        level = next;
    }

    document.scenes.push(Scene {
        name: None,
        nodes: vec![0],
    });
    document
}

fn push_node(document: &mut SceneDocument, seed: usize) -> usize {
    let angle = seed as f32 * 0.37;
    document.nodes.push(Node {
        transform: NodeTransform::Trs {
            translation: Vec3::new(angle.cos(), 1.0, angle.sin()),
            rotation: Quat::from_rotation_y(angle),
            scale: Vec3::splat(0.9),
        },
        mesh: Some(0),
        ..Default::default()
    });
    document.nodes.len() - 1
}

fn frame() -> FrameUniforms {
    let camera = Camera::new(Vec3::new(0.0, 5.0, 20.0), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(70f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    FrameUniforms::new(camera.view_matrix(), projection, &LightSettings::default())
}

/// Benchmark: uniform writes and draws for one frame
fn bench_draw_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_scene");
    let frame = frame();

    for (depth, fanout) in [(4, 4), (6, 3), (64, 1)] {
        let document = generate_tree(depth, fanout);
        let (_, ranges) = create_vertex_arrays(&document);
        let mut context = RecordingContext::default();

        group.bench_with_input(
            BenchmarkId::new("nodes", document.nodes.len()),
            &document,
            |b, document| {
                b.iter(|| {
                    context.clear();
                    draw_scene(black_box(document), 0, &ranges, &frame, &mut context);
                    black_box(context.draw_count())
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: world-space bounds used for the initial camera
fn bench_scene_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_bounds");

    for (depth, fanout) in [(4, 4), (6, 3)] {
        let mut document = generate_tree(depth, fanout);
        for primitive in &mut document.meshes[0].primitives {
            primitive.bounds = Some(gltf_viewer::math::AABB::new(Vec3::ZERO, Vec3::ONE));
        }

        group.bench_with_input(
            BenchmarkId::new("nodes", document.nodes.len()),
            &document,
            |b, document| b.iter(|| scene_bounds(black_box(document), 0)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_draw_scene, bench_scene_bounds);
criterion_main!(benches);
