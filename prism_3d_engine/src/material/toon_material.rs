/// Cel shaded material quantizing diffuse light into bands

use std::sync::Arc;

use glam::Vec3;

use crate::error::Result;
use crate::material::{Material, MaterialContext, MaterialId};
use crate::resource::Texture2D;
use crate::shader::{shader_source, ShaderSource};

#[derive(Debug)]
pub struct ToonMaterial {
    id: MaterialId,
    pub albedo: Vec3,
    /// Number of light bands
    pub shade_steps: f32,
    pub albedo_texture: Option<Arc<Texture2D>>,
}

impl ToonMaterial {
    pub fn new(albedo: Vec3, shade_steps: f32) -> Self {
        Self {
            id: MaterialId::next(),
            albedo,
            shade_steps,
            albedo_texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture2D>) -> Self {
        self.albedo_texture = Some(texture);
        self
    }
}

impl Default for ToonMaterial {
    fn default() -> Self {
        Self::new(Vec3::ONE, 4.0)
    }
}

impl Material for ToonMaterial {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn shader_source(&self) -> &'static ShaderSource {
        &shader_source::TOON
    }

    fn activate(&self, context: &mut MaterialContext<'_>) -> Result<()> {
        context.set_uniform("u_material.albedo", self.albedo)?;
        context.set_uniform("u_material.shade_steps", self.shade_steps)?;
        let active = context.bind_texture(0, self.albedo_texture.as_deref())?;
        context.set_uniform("u_material.albedo_texture_active", active)
    }
}
