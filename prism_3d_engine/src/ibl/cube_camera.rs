/// Six 90 degree views from the origin, one per cube face
///
/// Face order and up vectors follow the cube map convention
/// (+X, -X, +Y, -Y, +Z, -Z).

use glam::{Mat4, Vec3};

use crate::graphics_device::CubeFace;

#[derive(Debug, Clone, PartialEq)]
pub struct CubeCamera {
    pub projection: Mat4,
    pub views: [Mat4; 6],
}

impl CubeCamera {
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 10.0;

    pub fn new() -> Self {
        let look = |target: Vec3, up: Vec3| Mat4::look_at_rh(Vec3::ZERO, target, up);
        Self {
            projection: Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, Self::NEAR, Self::FAR),
            views: [
                look(Vec3::X, Vec3::NEG_Y),
                look(Vec3::NEG_X, Vec3::NEG_Y),
                look(Vec3::Y, Vec3::Z),
                look(Vec3::NEG_Y, Vec3::NEG_Z),
                look(Vec3::Z, Vec3::NEG_Y),
                look(Vec3::NEG_Z, Vec3::NEG_Y),
            ],
        }
    }

    pub fn view(&self, face: CubeFace) -> Mat4 {
        self.views[face.index()]
    }
}

impl Default for CubeCamera {
    fn default() -> Self {
        Self::new()
    }
}
