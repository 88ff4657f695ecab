//! Integration tests for image based lighting bakes
//!
//! GPU bakes are recorded by MockGraphicsDevice; the CPU integrators give
//! the reference answers.
//!
//! Run with: cargo test --test ibl_integration_tests


use std::sync::Arc;

use approx::assert_relative_eq;
use mock_test_utils::{create_mesh, create_test_renderer, create_test_renderer_with};
use prism_3d_engine::glam::Vec3;
use prism_3d_engine::prism3d::device::{CubeFace, DeviceCapabilities, TextureTarget};
use prism_3d_engine::prism3d::ibl::{CpuCubemap, CubemapBaker, EquirectSource, IblEnvironment};
use prism_3d_engine::prism3d::material::PbrMaterial;
use prism_3d_engine::prism3d::resource::{BufferedGeometry, HdrImage};
use prism_3d_engine::prism3d::RendererConfig;

fn sky() -> HdrImage {
    HdrImage::solid(32, 16, [0.6, 0.7, 1.0])
}

// ============================================================================
// RESOLUTION CLAMPING
// ============================================================================

#[test]
fn test_integration_specular_clamped_to_device_limit() {
    let (mock, mut renderer) = create_test_renderer();
    mock.lock().unwrap().set_capabilities(DeviceCapabilities {
        max_cube_map_size: 1024,
        ..DeviceCapabilities::default()
    });
    let mut baker = CubemapBaker::new(&renderer).unwrap();
    let hdr = sky();
    let environment = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 64).unwrap();

    let specular = baker.specular_prefilter(&mut renderer, &environment, 2048, 5).unwrap();

    assert_eq!(specular.size(), 1024);
    let device = mock.lock().unwrap();
    assert_eq!(device.texture(specular.handle().unwrap()).unwrap().desc.width, 1024);
}

#[test]
fn test_integration_resolution_below_limit_honored() {
    let (_mock, mut renderer) = create_test_renderer();
    let mut baker = CubemapBaker::new(&renderer).unwrap();
    let hdr = sky();
    let environment = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 64).unwrap();

    for requested in [8, 48, 256] {
        let irradiance = baker.irradiance(&mut renderer, &environment, requested).unwrap();
        assert_eq!(irradiance.size(), requested);
    }
}

// ============================================================================
// FULL BAKE
// ============================================================================

#[test]
fn test_integration_baked_environment_lights_pbr() {
    let config = RendererConfig {
        equirect_resolution: 64,
        irradiance_resolution: 16,
        specular_resolution: 32,
        specular_mip_levels: 4,
        brdf_resolution: 64,
        ..RendererConfig::default()
    };
    let (mock, mut renderer) = create_test_renderer_with(config);
    let mut baker = CubemapBaker::new(&renderer).unwrap();
    let hdr = sky();
    let maps = baker.bake(&mut renderer, EquirectSource::Hdr(&hdr)).unwrap();
    baker.destroy(&renderer).unwrap();

    let environment = Arc::new(IblEnvironment::with_maps(maps));
    let handles = environment.handles().unwrap();
    let material = PbrMaterial::default().with_environment(Arc::clone(&environment));
    let cube = create_mesh(&mock, &BufferedGeometry::capture_box());
    mock.lock().unwrap().draws.clear();

    cube.draw(&mut renderer, Some(&material)).unwrap();

    let lut = renderer.cache().brdf_lut();
    let device = mock.lock().unwrap();
    let draw = &device.draws[0];
    let bound: Vec<_> = draw.textures.iter().map(|(_, handle)| *handle).collect();
    assert!(bound.contains(&handles.irradiance));
    assert!(bound.contains(&handles.specular));
    assert!(lut.is_some() && bound.contains(&lut.unwrap()));
    assert_eq!(environment.specular_mip_levels(), 4);
    assert_eq!(device.framebuffer_count(), 0);
}

#[test]
fn test_integration_replacing_environment_frees_old_maps() {
    let (mock, mut renderer) = create_test_renderer_with(RendererConfig {
        equirect_resolution: 32,
        irradiance_resolution: 8,
        specular_resolution: 16,
        specular_mip_levels: 2,
        brdf_resolution: 32,
        ..RendererConfig::default()
    });
    let mut baker = CubemapBaker::new(&renderer).unwrap();
    let hdr = sky();
    let environment = IblEnvironment::with_maps(baker.bake(&mut renderer, EquirectSource::Hdr(&hdr)).unwrap());
    let before = environment.handles().unwrap();
    let textures = mock.lock().unwrap().texture_count();

    let maps = baker.bake(&mut renderer, EquirectSource::Hdr(&hdr)).unwrap();
    environment.replace(&mut *mock.lock().unwrap(), maps).unwrap();

    let device = mock.lock().unwrap();
    assert_eq!(device.texture_count(), textures);
    assert!(device.texture(before.environment).is_none());
    assert_ne!(environment.handles(), Some(before));
    assert_eq!(device.texture(environment.handles().unwrap().irradiance).unwrap().desc.target, TextureTarget::CubeMap);
}

// ============================================================================
// CPU REFERENCE
// ============================================================================

#[test]
fn test_integration_white_environment_convolves_to_white() {
    let environment = CpuCubemap::solid(8, Vec3::ONE);
    let irradiance = environment.convolve_irradiance(4);

    for face in CubeFace::ALL {
        for y in 0..4 {
            for x in 0..4 {
                let texel = irradiance.texel(face, x, y);
                assert_relative_eq!(texel.x, 1.0, epsilon = 0.01);
                assert_relative_eq!(texel.y, 1.0, epsilon = 0.01);
                assert_relative_eq!(texel.z, 1.0, epsilon = 0.01);
            }
        }
    }
}

#[test]
fn test_integration_prefilter_keeps_uniform_color() {
    let color = Vec3::new(0.25, 0.5, 1.0);
    let prefiltered = CpuCubemap::solid(4, color).prefilter(2, 0.6, 64);
    for face in CubeFace::ALL {
        let texel = prefiltered.texel(face, 0, 1);
        assert_relative_eq!(texel.x, color.x, epsilon = 1e-4);
        assert_relative_eq!(texel.z, color.z, epsilon = 1e-4);
    }
}
