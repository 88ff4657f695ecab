/// Point light fed to the lit shader variants

use glam::Vec3;

use crate::graphics_device::UniformValue;

/// Lights beyond this count are ignored by the shaders
pub const MAX_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
}

impl Light {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

/// Loose uniforms describing a light list (`u_lights[n].*`, `u_light_count`)
pub fn light_uniforms(lights: &[Light]) -> Vec<(String, UniformValue)> {
    let used = &lights[..lights.len().min(MAX_LIGHTS)];
    let mut uniforms = Vec::with_capacity(used.len() * 2 + 1);
    for (i, light) in used.iter().enumerate() {
        uniforms.push((format!("u_lights[{}].position", i), UniformValue::Vec3(light.position)));
        uniforms.push((format!("u_lights[{}].color", i), UniformValue::Vec3(light.color)));
    }
    uniforms.push(("u_light_count".to_string(), UniformValue::Int(used.len() as i32)));
    uniforms
}
