/// Unlit material: flat color, 2D texture or cube map lookup
///
/// A 2D texture flagged `equirectangular` is sampled with the view
/// direction as a panorama, which is how skyboxes are drawn from an HDR
/// image without baking.

use std::sync::Arc;

use glam::Vec3;

use crate::error::Result;
use crate::graphics_device::TextureTarget;
use crate::material::{Material, MaterialContext, MaterialId};
use crate::resource::{Texture2D, TextureCubeMap};
use crate::shader::{shader_source, ShaderSource};

#[derive(Debug, Clone)]
pub enum BasicAlbedo {
    Color,
    Texture(Arc<Texture2D>),
    /// Panorama sampled by direction
    Equirectangular(Arc<Texture2D>),
    CubeMap(Arc<TextureCubeMap>),
}

#[derive(Debug)]
pub struct BasicMaterial {
    id: MaterialId,
    pub albedo: Vec3,
    pub source: BasicAlbedo,
}

impl BasicMaterial {
    pub fn new(albedo: Vec3) -> Self {
        Self {
            id: MaterialId::next(),
            albedo,
            source: BasicAlbedo::Color,
        }
    }

    pub fn with_source(mut self, source: BasicAlbedo) -> Self {
        self.source = source;
        self
    }
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

impl Material for BasicMaterial {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn shader_source(&self) -> &'static ShaderSource {
        &shader_source::BASIC
    }

    fn activate(&self, context: &mut MaterialContext<'_>) -> Result<()> {
        context.set_uniform("u_material.albedo", self.albedo)?;

        let (texture, cube, equirectangular) = match &self.source {
            BasicAlbedo::Color => (None, None, false),
            BasicAlbedo::Texture(texture) => (Some(texture.as_ref()), None, false),
            BasicAlbedo::Equirectangular(texture) => (Some(texture.as_ref()), None, true),
            BasicAlbedo::CubeMap(cube) => (None, cube.handle(), false),
        };

        let texture_active = context.bind_texture(0, texture)?;
        let cube_active = context.bind_handle(1, TextureTarget::CubeMap, cube)?;

        context.set_uniform("u_material.albedo_texture_active", texture_active)?;
        context.set_uniform("u_material.albedo_cube_active", cube_active)?;
        context.set_uniform("u_material.equirectangular_texture", equirectangular && texture_active)
    }
}
