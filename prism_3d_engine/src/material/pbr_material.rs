/// Metallic/roughness physically based material
///
/// Texture slots fall back to the scalar factors while unset or still
/// loading. Image based lighting is enabled once an environment with baked
/// maps is attached and the BRDF table is available.

use std::sync::Arc;

use glam::Vec3;

use crate::error::Result;
use crate::graphics_device::{TextureTarget, UniformValue};
use crate::ibl::IblEnvironment;
use crate::material::{Material, MaterialContext, MaterialId};
use crate::resource::Texture2D;
use crate::shader::{shader_source, ShaderSource};

const ALBEDO_UNIT: u32 = 0;
const IRRADIANCE_UNIT: u32 = 1;
const SPECULAR_UNIT: u32 = 2;
const NORMAL_UNIT: u32 = 3;
const OCCLUSION_UNIT: u32 = 4;
const METAL_ROUGHNESS_UNIT: u32 = 5;
const EMISSIVE_UNIT: u32 = 6;
const BRDF_UNIT: u32 = 7;

#[derive(Debug)]
pub struct PbrMaterial {
    id: MaterialId,
    pub albedo: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub ao: f32,
    pub emissive_factor: Vec3,
    pub albedo_texture: Option<Arc<Texture2D>>,
    pub normal_texture: Option<Arc<Texture2D>>,
    pub occlusion_texture: Option<Arc<Texture2D>>,
    pub metal_roughness_texture: Option<Arc<Texture2D>>,
    pub emissive_texture: Option<Arc<Texture2D>>,
    pub environment: Option<Arc<IblEnvironment>>,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            id: MaterialId::next(),
            albedo: Vec3::ONE,
            metallic: 0.0,
            roughness: 0.5,
            ao: 1.0,
            emissive_factor: Vec3::ZERO,
            albedo_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            metal_roughness_texture: None,
            emissive_texture: None,
            environment: None,
        }
    }
}

impl PbrMaterial {
    pub fn new(albedo: Vec3, metallic: f32, roughness: f32) -> Self {
        Self {
            albedo,
            metallic,
            roughness,
            ..Self::default()
        }
    }

    pub fn with_albedo_texture(mut self, texture: Arc<Texture2D>) -> Self {
        self.albedo_texture = Some(texture);
        self
    }

    pub fn with_environment(mut self, environment: Arc<IblEnvironment>) -> Self {
        self.environment = Some(environment);
        self
    }
}

impl Material for PbrMaterial {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn shader_source(&self) -> &'static ShaderSource {
        &shader_source::PBR
    }

    fn activate(&self, context: &mut MaterialContext<'_>) -> Result<()> {
        context.set_uniform("u_material.albedo", self.albedo)?;
        context.set_uniform("u_material.roughness", self.roughness)?;
        context.set_uniform("u_material.metallic", self.metallic)?;
        context.set_uniform("u_material.ao", self.ao)?;
        context.set_uniform("u_material.emissive_factor", self.emissive_factor)?;

        let mut active = [false; 6];
        active[0] = context.bind_texture(ALBEDO_UNIT, self.albedo_texture.as_deref())?;
        active[1] = context.bind_texture(NORMAL_UNIT, self.normal_texture.as_deref())?;
        active[2] = context.bind_texture(OCCLUSION_UNIT, self.occlusion_texture.as_deref())?;
        active[3] = context.bind_texture(METAL_ROUGHNESS_UNIT, self.metal_roughness_texture.as_deref())?;
        active[4] = context.bind_texture(EMISSIVE_UNIT, self.emissive_texture.as_deref())?;

        let ibl = self.environment.as_ref().and_then(|environment| environment.handles());
        let brdf_lut = context.brdf_lut;
        context.bind_handle(IRRADIANCE_UNIT, TextureTarget::CubeMap, ibl.map(|h| h.irradiance))?;
        context.bind_handle(SPECULAR_UNIT, TextureTarget::CubeMap, ibl.map(|h| h.specular))?;
        context.bind_handle(BRDF_UNIT, TextureTarget::Texture2D, brdf_lut)?;
        active[5] = ibl.is_some() && brdf_lut.is_some();

        context.set_uniform("u_material.active_textures", UniformValue::BoolArray(active.to_vec()))
    }
}
