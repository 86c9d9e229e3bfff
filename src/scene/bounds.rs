use glam::{Mat4, Vec3};

use super::document::SceneDocument;
use super::traverse::visit_scene;
use crate::camera::Camera;
use crate::math::AABB;

/// Scene extent used when the scene has no measurable geometry
pub const FALLBACK_MAX_DISTANCE: f32 = 100.0;
/// Vertical field of view of the viewer projection
pub const FIELD_OF_VIEW_Y: f32 = 70.0 * std::f32::consts::PI / 180.0;

/// World-space box around every primitive drawn by `scene_index`
pub fn scene_bounds(document: &SceneDocument, scene_index: usize) -> Option<AABB> {
    let mut bounds: Option<AABB> = None;
    visit_scene(document, scene_index, |_, node, local_to_world| {
        let Some(mesh) = node.mesh else {
            return;
        };
        for primitive in &document.meshes[mesh].primitives {
            if let Some(local) = primitive.bounds {
                let world = local.transformed(local_to_world);
                bounds = Some(bounds.map_or(world, |b| b.union(&world)));
            }
        }
    });
    bounds
}

/// Camera placement, projection and motion speed derived from scene size
#[derive(Debug, Clone, Copy)]
pub struct SceneFraming {
    bounds: Option<AABB>,
}

impl SceneFraming {
    pub fn new(document: &SceneDocument, scene_index: Option<usize>) -> Self {
        let bounds = scene_index
            .and_then(|scene| scene_bounds(document, scene))
            .filter(|b| b.diagonal() != Vec3::ZERO);
        if let Some(b) = bounds {
            log::info!("Scene bounds: min {:?}, max {:?}", b.min, b.max);
        } else {
            log::warn!("Scene has no measurable geometry, using default framing");
        }
        Self { bounds }
    }

    pub fn bounds(&self) -> Option<AABB> {
        self.bounds
    }

    /// Length of the scene diagonal
    pub fn max_distance(&self) -> f32 {
        self.bounds
            .map(|b| b.diagonal().length())
            .unwrap_or(FALLBACK_MAX_DISTANCE)
    }

    /// Camera looking at the scene center from one corner of its bounds.
    /// Flat scenes (no depth) are viewed from the side instead.
    pub fn default_camera(&self) -> Camera {
        let Some(bounds) = self.bounds else {
            return Camera::default();
        };

        let up = Vec3::Y;
        let center = bounds.center();
        let diagonal = bounds.diagonal();
        let eye = if diagonal.z > 0.0 {
            center + diagonal
        } else {
            center + 2.0 * diagonal.cross(up)
        };
        Camera::new(eye, center, up)
    }

    /// Perspective projection with near/far planes scaled to the scene
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let max_distance = self.max_distance();
        Mat4::perspective_rh(
            FIELD_OF_VIEW_Y,
            aspect_ratio,
            0.001 * max_distance,
            1.5 * max_distance,
        )
    }

    /// Camera translation speed in world units per second
    pub fn controller_speed(&self) -> f32 {
        0.5 * self.max_distance()
    }
}
