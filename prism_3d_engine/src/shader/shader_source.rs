//! Built-in shader variants
//!
//! Each `ShaderSource` names a vertex/fragment pair, the texture unit of
//! every sampler uniform and the loose uniform defaults applied at link
//! time. Programs are compiled on demand by the renderer and memoized by
//! `name`.

use crate::graphics_device::{TextureTarget, UniformValue};

/// Texture unit assignment of a sampler uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerBinding {
    pub uniform: &'static str,
    pub unit: u32,
    pub target: TextureTarget,
}

impl SamplerBinding {
    pub const fn new(uniform: &'static str, unit: u32, target: TextureTarget) -> Self {
        Self { uniform, unit, target }
    }
}

/// Link-time default of a loose uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderDefault {
    Float(f32),
    Int(i32),
    Bool(bool),
}

impl From<ShaderDefault> for UniformValue {
    fn from(value: ShaderDefault) -> Self {
        match value {
            ShaderDefault::Float(v) => UniformValue::Float(v),
            ShaderDefault::Int(v) => UniformValue::Int(v),
            ShaderDefault::Bool(v) => UniformValue::Bool(v),
        }
    }
}

/// A shader variant: program sources plus sampler units and defaults
#[derive(Debug, PartialEq)]
pub struct ShaderSource {
    /// Cache key of the compiled program
    pub name: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub samplers: &'static [SamplerBinding],
    pub defaults: &'static [(&'static str, ShaderDefault)],
}

const STANDARD_VERT: &str = include_str!("glsl/standard.vert");
const QUAD_VERT: &str = include_str!("glsl/quad.vert");

const GAMMA: (&str, ShaderDefault) = ("gamma", ShaderDefault::Float(2.2));

// ===== SHADER VARIANTS =====

pub static BASIC: ShaderSource = ShaderSource {
    name: "basic",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/basic.frag"),
    samplers: &[
        SamplerBinding::new("u_material.albedo_sampler", 0, TextureTarget::Texture2D),
        SamplerBinding::new("u_material.albedo_cube_sampler", 1, TextureTarget::CubeMap),
    ],
    defaults: &[GAMMA],
};

/// Physically based shading with image based lighting
///
/// | unit | sampler                  |
/// |------|--------------------------|
/// | 0    | albedo                   |
/// | 1    | irradiance (cube)        |
/// | 2    | specular env (cube)      |
/// | 3    | normal                   |
/// | 4    | occlusion                |
/// | 5    | metal / roughness        |
/// | 6    | emissive                 |
/// | 7    | BRDF LUT                 |
/// | 8    | shadow map               |
pub static PBR: ShaderSource = ShaderSource {
    name: "pbr",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/pbr.frag"),
    samplers: &[
        SamplerBinding::new("u_material.albedo_sampler", 0, TextureTarget::Texture2D),
        SamplerBinding::new("u_material.irradiance_sampler", 1, TextureTarget::CubeMap),
        SamplerBinding::new("u_material.env_sampler", 2, TextureTarget::CubeMap),
        SamplerBinding::new("u_material.normal_sampler", 3, TextureTarget::Texture2D),
        SamplerBinding::new("u_material.occlusion_sampler", 4, TextureTarget::Texture2D),
        SamplerBinding::new("u_material.metal_roughness_sampler", 5, TextureTarget::Texture2D),
        SamplerBinding::new("u_material.emissive_sampler", 6, TextureTarget::Texture2D),
        SamplerBinding::new("u_material.brdf_LUT_sampler", 7, TextureTarget::Texture2D),
        SamplerBinding::new("u_shadow_map", 8, TextureTarget::Texture2D),
    ],
    defaults: &[GAMMA, ("u_shadows_enabled", ShaderDefault::Bool(false))],
};

pub static NORMAL_ONLY: ShaderSource = ShaderSource {
    name: "normal_only",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/normal_only.frag"),
    samplers: &[],
    defaults: &[],
};

pub static EQUI_TO_CUBEMAP: ShaderSource = ShaderSource {
    name: "equi_to_cubemap",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/equirect_to_cubemap.frag"),
    samplers: &[SamplerBinding::new("equirectangular_map", 0, TextureTarget::Texture2D)],
    defaults: &[],
};

pub static CUBEMAP_TO_IRRADIANCE: ShaderSource = ShaderSource {
    name: "cubemap_to_irradiance",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/irradiance.frag"),
    samplers: &[SamplerBinding::new("environment_map", 0, TextureTarget::CubeMap)],
    defaults: &[],
};

pub static CUBEMAP_SPECULAR_PREFILTER: ShaderSource = ShaderSource {
    name: "cubemap_specular_prefilter",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/specular_prefilter.frag"),
    samplers: &[SamplerBinding::new("environment_map", 0, TextureTarget::CubeMap)],
    defaults: &[("roughness", ShaderDefault::Float(0.0))],
};

pub static GRID: ShaderSource = ShaderSource {
    name: "grid",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/grid.frag"),
    samplers: &[],
    defaults: &[],
};

pub static BRDF: ShaderSource = ShaderSource {
    name: "brdf",
    vertex: include_str!("glsl/brdf.vert"),
    fragment: include_str!("glsl/brdf.frag"),
    samplers: &[],
    defaults: &[],
};

pub static TOON: ShaderSource = ShaderSource {
    name: "toon",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/toon.frag"),
    samplers: &[SamplerBinding::new("u_material.albedo_sampler", 0, TextureTarget::Texture2D)],
    defaults: &[GAMMA],
};

/// Depth-only output (shadow passes)
pub static DEPTH: ShaderSource = ShaderSource {
    name: "depth",
    vertex: STANDARD_VERT,
    fragment: include_str!("glsl/depth.frag"),
    samplers: &[],
    defaults: &[],
};

/// Screen-space textured quad
pub static QUAD: ShaderSource = ShaderSource {
    name: "quad",
    vertex: QUAD_VERT,
    fragment: include_str!("glsl/quad.frag"),
    samplers: &[SamplerBinding::new("u_texture", 0, TextureTarget::Texture2D)],
    defaults: &[],
};

pub static TONEMAPPING: ShaderSource = ShaderSource {
    name: "tonemapping",
    vertex: QUAD_VERT,
    fragment: include_str!("glsl/tonemapping.frag"),
    samplers: &[SamplerBinding::new("u_texture", 0, TextureTarget::Texture2D)],
    defaults: &[GAMMA, ("exposure", ShaderDefault::Float(1.0)), ("u_mode", ShaderDefault::Int(1))],
};

pub static GAUSSIAN_BLUR: ShaderSource = ShaderSource {
    name: "gaussian_blur",
    vertex: QUAD_VERT,
    fragment: include_str!("glsl/gaussian_blur.frag"),
    samplers: &[SamplerBinding::new("u_texture", 0, TextureTarget::Texture2D)],
    defaults: &[("u_blur_factor", ShaderDefault::Float(7.0))],
};

/// Every built-in variant
pub static ALL: [&ShaderSource; 13] = [
    &BASIC,
    &PBR,
    &NORMAL_ONLY,
    &EQUI_TO_CUBEMAP,
    &CUBEMAP_TO_IRRADIANCE,
    &CUBEMAP_SPECULAR_PREFILTER,
    &GRID,
    &BRDF,
    &TOON,
    &DEPTH,
    &QUAD,
    &TONEMAPPING,
    &GAUSSIAN_BLUR,
];
