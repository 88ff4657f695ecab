/// Tests for uniform types, values and std140 layout

use super::*;
use glam::{Mat3, Mat4, Vec3};

// ============================================================================
// STD140 TESTS
// ============================================================================

#[test]
fn test_std140_per_frame_layout() {
    let mut builder = Std140Builder::new();
    assert_eq!(builder.push("view", UniformType::Mat4, None), 0);
    assert_eq!(builder.push("view_inverse", UniformType::Mat4, None), 64);
    assert_eq!(builder.push("projection", UniformType::Mat4, None), 128);
    assert_eq!(builder.push("view_projection", UniformType::Mat4, None), 192);
    assert_eq!(builder.push("shadow_map_space", UniformType::Mat4, None), 256);
    assert_eq!(builder.size(), 320);
}

#[test]
fn test_std140_mat3_occupies_three_rows() {
    let mut builder = Std140Builder::new();
    builder.push("model_view", UniformType::Mat4, None);
    assert_eq!(builder.push("normal_view", UniformType::Mat3, None), 64);
    assert_eq!(builder.push("mvp", UniformType::Mat4, None), 112);
    let (members, size) = builder.finish();
    assert_eq!(members[1].size, 48);
    assert_eq!(size, 176);
}

#[test]
fn test_std140_vec3_followed_by_float_packs() {
    let mut builder = Std140Builder::new();
    assert_eq!(builder.push("color", UniformType::Vec3, None), 0);
    assert_eq!(builder.push("intensity", UniformType::Float, None), 12);
    assert_eq!(builder.push("direction", UniformType::Vec3, None), 16);
    assert_eq!(builder.size(), 32);
}

#[test]
fn test_std140_scalar_array_pads_rows() {
    let mut builder = Std140Builder::new();
    builder.push("flag", UniformType::Float, None);
    assert_eq!(builder.push("weights", UniformType::Float, Some(4)), 16);
    let (members, size) = builder.finish();
    assert_eq!(members[1].size, 64);
    assert_eq!(members[1].array_count, 4);
    assert_eq!(size, 80);
}

#[test]
fn test_std140_vec2_alignment() {
    let mut builder = Std140Builder::new();
    builder.push("a", UniformType::Float, None);
    assert_eq!(builder.push("uv", UniformType::Vec2, None), 8);
}

// ============================================================================
// UNIFORM VALUE TESTS
// ============================================================================

#[test]
fn test_uniform_value_words() {
    assert_eq!(UniformValue::Bool(true).words(), vec![1]);
    assert_eq!(UniformValue::Int(-1).words(), vec![u32::MAX]);
    assert_eq!(UniformValue::Float(1.0).words(), vec![1.0f32.to_bits()]);
    assert_eq!(UniformValue::Mat4(Mat4::IDENTITY).words().len(), 16);
    assert_eq!(UniformValue::Mat3(Mat3::IDENTITY).words().len(), 9);
}

#[test]
fn test_uniform_value_items_per_row() {
    assert_eq!(UniformValue::Mat3(Mat3::IDENTITY).items_per_row(), 3);
    assert_eq!(UniformValue::Vec3Array(vec![Vec3::ZERO; 2]).items_per_row(), 3);
    assert_eq!(UniformValue::FloatArray(vec![0.0; 3]).items_per_row(), 1);
    assert_eq!(UniformValue::Mat4(Mat4::IDENTITY).items_per_row(), 4);
}

#[test]
fn test_uniform_value_compatibility() {
    assert!(UniformValue::Int(0).is_compatible(UniformType::Sampler2D));
    assert!(UniformValue::Bool(true).is_compatible(UniformType::Bool));
    assert!(UniformValue::from(Vec3::ONE).is_compatible(UniformType::Vec3));
    assert!(!UniformValue::Float(1.0).is_compatible(UniformType::Vec3));
    assert!(!UniformValue::Mat3(Mat3::IDENTITY).is_compatible(UniformType::Mat4));
}

#[test]
fn test_uniform_type_from_glsl() {
    assert_eq!(UniformType::from_glsl("samplerCube"), Some(UniformType::SamplerCube));
    assert_eq!(UniformType::from_glsl("mat3"), Some(UniformType::Mat3));
    assert_eq!(UniformType::from_glsl("Material"), None);
    assert!(UniformType::Sampler2DShadow.is_sampler());
}

#[test]
fn test_reflection_lookup() {
    let reflection = ProgramReflection {
        uniforms: vec![ActiveUniform {
            name: "u_gamma".to_string(),
            uniform_type: UniformType::Float,
            array_size: 1,
            location: 0,
        }],
        blocks: Vec::new(),
    };
    assert_eq!(reflection.uniform("u_gamma").map(|u| u.location), Some(0));
    assert!(reflection.uniform("u_exposure").is_none());
    assert!(reflection.block("ubo_per_frame").is_none());
}
