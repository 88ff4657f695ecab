/// Tests for Shader linking, uniform lookup and activation

use super::*;
use crate::graphics_device::{
    MockGraphicsDevice, TextureDesc, TextureFormat, TextureTarget, UniformValue,
};
use crate::shader::shader_source;

fn placeholders(device: &mut MockGraphicsDevice) -> PlaceholderTextures {
    PlaceholderTextures {
        texture_2d: device.create_texture(&TextureDesc::texture_2d(8, 8, TextureFormat::Rgba8)).unwrap(),
        cube_map: device.create_texture(&TextureDesc::cube_map(8, TextureFormat::Rgba8)).unwrap(),
    }
}

#[test]
fn test_pbr_sampler_units_set_at_link() {
    let mut device = MockGraphicsDevice::new();
    let shader = Shader::new(&mut device, &shader_source::PBR).unwrap();
    let program = shader.program().unwrap();

    assert_eq!(device.uniform_value(program, "u_material.albedo_sampler"), Some(&UniformValue::Int(0)));
    assert_eq!(device.uniform_value(program, "u_material.env_sampler"), Some(&UniformValue::Int(2)));
    assert_eq!(device.uniform_value(program, "u_material.brdf_LUT_sampler"), Some(&UniformValue::Int(7)));
    assert_eq!(device.uniform_value(program, "gamma"), Some(&UniformValue::Float(2.2)));
}

#[test]
fn test_pbr_reflects_blocks_and_light_array() {
    let mut device = MockGraphicsDevice::new();
    let shader = Shader::new(&mut device, &shader_source::PBR).unwrap();

    let per_frame = shader.block("ubo_per_frame").unwrap();
    assert_eq!(per_frame.data_size, 320);
    let per_model = shader.block("ubo_per_model").unwrap();
    assert_eq!(per_model.data_size, 240);

    assert!(shader.has_uniform("u_lights[3].color"));
    assert!(!shader.has_uniform("u_lights[4].color"));
    assert!(shader.has_uniform("u_material.active_textures[0]"));
    assert!(shader.has_uniform("u_material.active_textures"));
}

#[test]
fn test_unknown_uniform_warns_once() {
    let mut device = MockGraphicsDevice::new();
    let mut shader = Shader::new(&mut device, &shader_source::PBR).unwrap();

    shader.set_uniform(&mut device, "u_material.albdeo", glam::Vec3::ONE).unwrap();
    shader.set_uniform(&mut device, "u_material.albdeo", glam::Vec3::ONE).unwrap();
    shader.set_uniform(&mut device, "u_typo", 1.0f32).unwrap();
    assert_eq!(shader.unknown_uniform_count(), 2);
}

#[test]
fn test_all_builtin_sources_link() {
    let mut device = MockGraphicsDevice::new();
    for source in shader_source::ALL.iter() {
        let shader = Shader::new(&mut device, source).unwrap();
        assert_eq!(shader.unknown_uniform_count(), 0, "shader '{}' has unknown defaults", source.name);
        for sampler in source.samplers {
            assert!(shader.has_uniform(sampler.uniform), "{} missing {}", source.name, sampler.uniform);
        }
    }
}

#[test]
fn test_irradiance_bake_avoids_degenerate_frame() {
    let fragment = shader_source::CUBEMAP_TO_IRRADIANCE.fragment;
    assert!(fragment.contains("abs(normal.z) < 0.999 ? vec3(0.0, 0.0, 1.0) : vec3(1.0, 0.0, 0.0)"));
    assert!(!fragment.contains("vec3 up = vec3(0.0, 1.0, 0.0);"));
}

#[test]
fn test_activate_binds_placeholders() {
    let mut device = MockGraphicsDevice::new();
    let placeholders = placeholders(&mut device);
    let shader = Shader::new(&mut device, &shader_source::BASIC).unwrap();

    shader.activate(&mut device, &placeholders).unwrap();
    assert_eq!(device.current_program(), shader.program());
    assert_eq!(device.bound_texture(0), Some(placeholders.texture_2d));
    assert_eq!(device.bound_texture(1), Some(placeholders.cube_map));
    assert_eq!(placeholders.for_target(TextureTarget::CubeMap), placeholders.cube_map);
}

#[test]
fn test_bind_blocks_routes_declared_blocks() {
    let mut device = MockGraphicsDevice::new();
    let shader = Shader::new(&mut device, &shader_source::NORMAL_ONLY).unwrap();
    shader
        .bind_blocks(&mut device, &[("ubo_per_frame", 0), ("ubo_per_model", 1), ("ubo_missing", 2)])
        .unwrap();

    let program = device.program(shader.program().unwrap()).unwrap();
    assert_eq!(program.block_bindings.len(), 2);
}

#[test]
fn test_destroyed_shader_rejects_use() {
    let mut device = MockGraphicsDevice::new();
    let placeholders = placeholders(&mut device);
    let mut shader = Shader::new(&mut device, &shader_source::QUAD).unwrap();
    shader.destroy(&mut device);

    assert!(shader.program().is_none());
    assert!(shader.activate(&mut device, &placeholders).is_err());
    assert_eq!(device.program_count(), 0);
}
