use glam::{Mat4, Quat, Vec3};

/// Look-at camera described by an eye point, a target point and an up vector.
///
/// The stored up vector is always orthogonal to the view direction: the
/// constructor re-derives it from the hint with two cross products.
/// Motion methods return a new camera instead of mutating in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    eye: Vec3,
    center: Vec3,
    up: Vec3,
}

impl Camera {
    /// Build a camera at `eye` looking at `center`; `up` only needs to be
    /// non-parallel to the view direction
    pub fn new(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        let front = (center - eye).normalize();
        let left = up.cross(front).normalize();
        Self {
            eye,
            center,
            up: front.cross(left),
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit view direction
    pub fn front(&self) -> Vec3 {
        (self.center - self.eye).normalize()
    }

    /// Unit vector pointing to the left of the view direction
    pub fn left(&self) -> Vec3 {
        self.up.cross(self.front()).normalize()
    }

    /// Right-handed world-to-view matrix. `eye` and `center` must differ.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.center, self.up)
    }

    /// Translate eye and center together along the camera's own axes
    #[must_use]
    pub fn move_local(&self, truck_left: f32, pedestal_up: f32, dolly_in: f32) -> Camera {
        let translation =
            truck_left * self.left() + pedestal_up * self.up + dolly_in * self.front();
        Camera {
            eye: self.eye + translation,
            center: self.center + translation,
            up: self.up,
        }
    }

    /// Rotate about the camera's front (roll), left (tilt) and up (pan) axes,
    /// in that order, keeping the eye fixed
    #[must_use]
    pub fn rotate_local(&self, roll_angle: f32, tilt_angle: f32, pan_angle: f32) -> Camera {
        let view = self.center - self.eye;
        let left = self.left();

        let roll = Quat::from_axis_angle(self.front(), roll_angle);
        let up = roll * self.up;

        let tilt = Quat::from_axis_angle(left, tilt_angle);
        let view = tilt * view;
        let up = tilt * up;

        let pan = Quat::from_axis_angle(up.normalize(), pan_angle);
        let view = pan * view;

        Camera::new(self.eye, self.eye + view, up)
    }

    /// Rotate the view direction and up vector about a world-space axis,
    /// keeping the eye fixed
    #[must_use]
    pub fn rotate_world(&self, angle: f32, axis: Vec3) -> Camera {
        let rotation = Quat::from_axis_angle(axis.normalize(), angle);
        let view = rotation * (self.center - self.eye);
        let up = rotation * self.up;
        Camera::new(self.eye, self.eye + view, up)
    }

    /// Camera as the comma-separated value accepted by `--lookat`
    pub fn look_at_args(&self) -> String {
        [self.eye, self.center, self.up]
            .iter()
            .flat_map(|v| v.to_array())
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
    }
}
