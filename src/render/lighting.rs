use glam::{Mat4, Vec3};

use crate::scene::{visit_scene, SceneDocument};

/// Light parameters shared by every draw of a frame.
///
/// `direction` is the world-space unit vector pointing *toward* the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSettings {
    pub enabled: bool,
    /// Ignore `direction` and light the scene from the viewpoint
    pub from_camera: bool,
    pub direction: Vec3,
    pub intensity: Vec3,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            from_camera: false,
            direction: Vec3::ONE.normalize(),
            intensity: Vec3::ONE,
        }
    }
}

impl LightSettings {
    /// Settings seeded from the first directional light found in the scene
    pub fn from_scene(document: &SceneDocument, scene_index: Option<usize>) -> Self {
        let found = scene_index.and_then(|scene| scene_light(document, scene));
        match found {
            Some((direction, intensity)) => {
                log::info!("Using scene light: direction {:?}, intensity {:?}", direction, intensity);
                Self {
                    direction,
                    intensity,
                    ..Default::default()
                }
            }
            None => Self::default(),
        }
    }

    /// Direction from polar angle `theta` (from +Y) and azimuth `phi`
    pub fn direction_from_angles(theta: f32, phi: f32) -> Vec3 {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi)
    }

    /// Inverse of `direction_from_angles`
    pub fn angles(&self) -> (f32, f32) {
        let d = self.direction.normalize();
        (d.y.clamp(-1.0, 1.0).acos(), d.z.atan2(d.x))
    }

    /// Light direction expressed in view space
    pub fn view_space_direction(&self, view_matrix: &Mat4) -> Vec3 {
        if self.from_camera {
            Vec3::Z
        } else {
            view_matrix.transform_vector3(self.direction).normalize()
        }
    }
}

/// Direction toward and intensity of the first directional light attached
/// to a node of the scene
pub fn scene_light(document: &SceneDocument, scene_index: usize) -> Option<(Vec3, Vec3)> {
    let mut found = None;
    visit_scene(document, scene_index, |_, node, local_to_world| {
        if found.is_some() {
            return;
        }
        if let Some(light) = node.light.map(|index| document.lights[index]) {
            // lights shine along their local -Z
            let toward = local_to_world.transform_vector3(Vec3::Z).normalize();
            found = Some((toward, light.color * light.intensity));
        }
    });
    found
}
