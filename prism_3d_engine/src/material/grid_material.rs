/// Procedural ground grid with fading distance and highlighted lines

use glam::Vec3;

use crate::error::Result;
use crate::material::{Material, MaterialContext, MaterialId};
use crate::shader::{shader_source, ShaderSource};

#[derive(Debug, Clone)]
pub struct GridMaterial {
    id: MaterialId,
    /// Fade-out distance from the camera
    pub distance: f32,
    /// Lines per world unit
    pub frequency: f32,
    /// Every n-th line drawn in the grid color at full strength
    pub highlight_frequency: f32,
    pub base_color: Vec3,
    pub grid_color: Vec3,
}

impl Default for GridMaterial {
    fn default() -> Self {
        Self {
            id: MaterialId::next(),
            distance: 100.0,
            frequency: 1.0,
            highlight_frequency: 10.0,
            base_color: Vec3::splat(0.1),
            grid_color: Vec3::splat(0.6),
        }
    }
}

impl GridMaterial {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Material for GridMaterial {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn shader_source(&self) -> &'static ShaderSource {
        &shader_source::GRID
    }

    fn activate(&self, context: &mut MaterialContext<'_>) -> Result<()> {
        context.set_uniform("u_material.distance", self.distance)?;
        context.set_uniform("u_material.frequency", self.frequency)?;
        context.set_uniform("u_material.highlight_frequency", self.highlight_frequency)?;
        context.set_uniform("u_material.base_color", self.base_color)?;
        context.set_uniform("u_material.grid_color", self.grid_color)
    }
}
