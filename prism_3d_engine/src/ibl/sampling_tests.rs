/// Unit tests for the CPU IBL integrators

use approx::assert_relative_eq;
use glam::{Vec2, Vec3};

use super::*;

#[test]
fn test_radical_inverse_mirrors_bits() {
    assert_eq!(radical_inverse_vdc(0), 0.0);
    assert_eq!(radical_inverse_vdc(1), 0.5);
    assert_eq!(radical_inverse_vdc(2), 0.25);
    assert_eq!(radical_inverse_vdc(3), 0.75);
    assert_eq!(hammersley(3, 4), Vec2::new(0.75, 0.75));
}

#[test]
fn test_smooth_surface_samples_the_normal() {
    let normal = Vec3::new(1.0, 1.0, 1.0).normalize();
    let h = importance_sample_ggx(Vec2::new(0.3, 0.6), normal, 0.0);
    assert_relative_eq!(h.dot(normal), 1.0, epsilon = 1e-5);
}

#[test]
fn test_rough_samples_stay_in_hemisphere() {
    for i in 0..64 {
        let h = importance_sample_ggx(hammersley(i, 64), Vec3::Y, 0.8);
        assert!(h.dot(Vec3::Y) >= 0.0);
        assert_relative_eq!(h.length(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_geometry_term_is_one_head_on() {
    for roughness in [0.0, 0.3, 1.0] {
        assert_relative_eq!(geometry_smith_ibl(1.0, 1.0, roughness), 1.0);
    }
    assert!(geometry_smith_ibl(0.2, 0.2, 1.0) < geometry_smith_ibl(0.2, 0.2, 0.1));
}

#[test]
fn test_brdf_mirror_head_on() {
    let brdf = integrate_brdf(1.0, 0.0, 64);
    assert_relative_eq!(brdf.x, 1.0, epsilon = 1e-4);
    assert_relative_eq!(brdf.y, 0.0, epsilon = 1e-4);
}

#[test]
fn test_brdf_scale_and_bias_bounded() {
    for (n_dot_v, roughness) in [(0.5, 0.5), (0.1, 0.9), (0.9, 0.2)] {
        let brdf = integrate_brdf(n_dot_v, roughness, 256);
        assert!(brdf.x >= 0.0 && brdf.y >= 0.0);
        assert!(brdf.x + brdf.y <= 1.0 + 1e-4, "{:?} at ({}, {})", brdf, n_dot_v, roughness);
    }
}

#[test]
fn test_white_environment_irradiance_is_one() {
    let irradiance = irradiance_at(Vec3::Z, |_| Vec3::ONE);
    assert_relative_eq!(irradiance.x, 1.0, epsilon = 0.01);
    assert_relative_eq!(irradiance.y, irradiance.x);
}

#[test]
fn test_irradiance_only_integrates_the_hemisphere() {
    let sky = |d: Vec3| if d.y > 0.0 { Vec3::ONE } else { Vec3::ZERO };
    assert_relative_eq!(irradiance_at(Vec3::Y, sky).x, 1.0, epsilon = 0.01);
    assert_relative_eq!(irradiance_at(Vec3::NEG_Y, sky).x, 0.0, epsilon = 0.01);
}

#[test]
fn test_prefilter_constant_environment() {
    let color = Vec3::new(0.2, 0.4, 0.8);
    let filtered = prefilter_at(Vec3::X, 0.7, 128, |_| color);
    assert_relative_eq!(filtered.x, color.x, epsilon = 1e-5);
    assert_relative_eq!(filtered.z, color.z, epsilon = 1e-5);
}

#[test]
fn test_cubemap_sample_hits_texel_centers() {
    let cubemap = CpuCubemap::from_fn(4, |d| d);
    for face in CubeFace::ALL {
        for (x, y) in [(0, 0), (3, 1), (2, 3)] {
            let direction = texel_direction(face, x, y, 4);
            assert_eq!(cubemap.sample(direction), cubemap.texel(face, x, y), "{:?} ({}, {})", face, x, y);
        }
    }
}

#[test]
fn test_face_directions_point_outward() {
    assert!(texel_direction(CubeFace::PositiveX, 1, 1, 4).x > 0.5);
    assert!(texel_direction(CubeFace::NegativeY, 1, 1, 4).y < -0.5);
    assert!(texel_direction(CubeFace::NegativeZ, 2, 2, 4).z < -0.5);
}

#[test]
fn test_white_cubemap_convolves_to_white() {
    let irradiance = CpuCubemap::solid(4, Vec3::ONE).convolve_irradiance(2);
    assert_eq!(irradiance.size(), 2);
    for face in CubeFace::ALL {
        let texel = irradiance.texel(face, 1, 0);
        assert_relative_eq!(texel.x, 1.0, epsilon = 0.01);
    }
}

#[test]
fn test_irradiance_defined_along_every_axis() {
    for normal in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
        let (tangent, bitangent) = tangent_frame(normal);
        assert!(tangent.is_finite() && bitangent.is_finite(), "{:?}", normal);
        assert_relative_eq!(irradiance_at(normal, |_| Vec3::ONE).x, 1.0, epsilon = 0.01);
    }
}
