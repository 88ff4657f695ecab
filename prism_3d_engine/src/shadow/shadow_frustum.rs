/// Light-space box fitted around the shadowed part of the camera frustum.
///
/// Only the slice `[near, shadow_distance + transition_distance]` of the
/// camera frustum receives shadows. Its 8 corners are transformed into the
/// light's rotation frame and bounded by an axis-aligned box, which becomes
/// the orthographic volume of the shadow depth pass.
///
/// The transition band past `shadow_distance` is where the forward shader
/// fades shadows out, so it has to be covered by the depth map too.

use glam::{Mat4, Vec3};

use crate::renderer::RendererConfig;

/// Default light direction: straight down with a slight slant
const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::new(-0.3, -1.0, -0.2);

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowFrustum {
    /// Vertical field of view of the camera, in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub shadow_distance: f32,
    pub transition_distance: f32,
    light_direction: Vec3,
    corners: [Vec3; 8],
    min: Vec3,
    max: Vec3,
}

impl ShadowFrustum {
    pub fn new(fov_y: f32, aspect: f32, near: f32, shadow_distance: f32, transition_distance: f32) -> Self {
        Self {
            fov_y,
            aspect,
            near,
            shadow_distance,
            transition_distance,
            light_direction: DEFAULT_LIGHT_DIRECTION.normalize(),
            corners: [Vec3::ZERO; 8],
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }

    /// Frustum for a 45 degree camera covering the configured viewport
    pub fn from_config(config: &RendererConfig) -> Self {
        let (width, height) = config.viewport_size;
        Self::new(
            45f32.to_radians(),
            width as f32 / height.max(1) as f32,
            0.1,
            config.shadow_distance,
            config.shadow_transition_distance,
        )
    }

    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    /// Zero-length directions are ignored
    pub fn set_light_direction(&mut self, direction: Vec3) {
        if let Some(direction) = direction.try_normalize() {
            self.light_direction = direction;
        }
    }

    /// Far end of the fitted slice
    pub fn far(&self) -> f32 {
        self.shadow_distance + self.transition_distance
    }

    /// Refit the box around the camera slice seen through `camera_inverse_view`
    pub fn update(&mut self, camera_inverse_view: &Mat4) {
        let rotation = light_rotation(self.light_direction);
        let tan_half_fov = (self.fov_y * 0.5).tan();

        let mut index = 0;
        for distance in [self.near, self.far()] {
            let half_height = distance * tan_half_fov;
            let half_width = half_height * self.aspect;
            for (x, y) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let view_corner = Vec3::new(x * half_width, y * half_height, -distance);
                self.corners[index] = camera_inverse_view.transform_point3(view_corner);
                index += 1;
            }
        }

        self.min = Vec3::splat(f32::MAX);
        self.max = Vec3::splat(f32::MIN);
        for corner in &self.corners {
            let light = rotation.transform_point3(*corner);
            self.min = self.min.min(light);
            self.max = self.max.max(light);
        }
    }

    /// World-space corners of the last fitted slice (near quad, then far quad)
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Orthographic projection enclosing the box, centred on it
    pub fn ortho(&self) -> Mat4 {
        let half_width = self.width() * 0.5;
        let half_height = self.height() * 0.5;
        let half_length = self.length() * 0.5;
        Mat4::orthographic_rh_gl(-half_width, half_width, -half_height, half_height, -half_length, half_length)
    }

    /// World-space centre of the box
    pub fn center(&self) -> Vec3 {
        let rotation = light_rotation(self.light_direction);
        rotation.inverse().transform_point3((self.min + self.max) * 0.5)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn length(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// View matrix looking along `direction` from the centre of the box
    pub fn light_view(&self, direction: Vec3) -> Mat4 {
        let direction = direction.try_normalize().unwrap_or(self.light_direction);
        let center = self.center();
        Mat4::look_at_rh(center, center + direction, light_up(direction))
    }
}

/// Rotation part of the light view
fn light_rotation(direction: Vec3) -> Mat4 {
    Mat4::look_at_rh(Vec3::ZERO, direction, light_up(direction))
}

fn light_up(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

#[cfg(test)]
#[path = "shadow_frustum_tests.rs"]
mod tests;
