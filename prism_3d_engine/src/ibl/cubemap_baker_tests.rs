/// Unit tests for CubemapBaker
///
/// Uses MockGraphicsDevice for testing.

use std::sync::{Arc, Mutex};

use super::*;
use crate::graphics_device::{DeviceCapabilities, MockGraphicsDevice, UniformValue};
use crate::renderer::RendererConfig;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn setup() -> (Arc<Mutex<MockGraphicsDevice>>, Renderer, CubemapBaker) {
    let (mock, shared) = MockGraphicsDevice::new().shared();
    let renderer = Renderer::new(shared, RendererConfig::default()).unwrap();
    let baker = CubemapBaker::new(&renderer).unwrap();
    (mock, renderer, baker)
}

fn panorama() -> HdrImage {
    HdrImage::solid(16, 8, [1.0, 1.0, 1.0])
}

fn program(renderer: &Renderer, source: &ShaderSource) -> Option<crate::graphics_device::ProgramHandle> {
    renderer.cache().shader(source.name).and_then(|s| s.program())
}

fn limit_cube_size(mock: &Arc<Mutex<MockGraphicsDevice>>, max_cube_map_size: u32) {
    mock.lock().unwrap().set_capabilities(DeviceCapabilities {
        max_cube_map_size,
        ..DeviceCapabilities::default()
    });
}

// ============================================================================
// EQUIRECT TO CUBEMAP
// ============================================================================

#[test]
fn test_equirect_renders_six_faces_and_mipmaps() {
    let (mock, mut renderer, mut baker) = setup();
    let hdr = panorama();
    mock.lock().unwrap().clear_commands();

    let cubemap = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 64).unwrap();

    let equi = program(&renderer, &shader_source::EQUI_TO_CUBEMAP);
    let device = mock.lock().unwrap();
    assert_eq!(device.draws.len(), 6);
    assert!(device.draws.iter().all(|d| d.program == equi && d.viewport == Viewport::full(64, 64)));
    assert_eq!(device.count_commands("attach_texture Color(0) CubeFace"), 6);
    assert_eq!(device.count_commands("upload_texture Texture2D level=0 16x8"), 1);

    let texture = device.texture(cubemap.handle().unwrap()).unwrap();
    assert_eq!(texture.desc.format, TextureFormat::Rgba16F);
    assert_eq!(texture.desc.mip_levels, full_mip_levels(64, 64));
    assert!(texture.mipmaps_generated);
    // panorama released after the bake
    assert_eq!(device.count_commands("delete_texture"), 1);
}

#[test]
fn test_equirect_clamps_to_device_limit() {
    let (mock, mut renderer, mut baker) = setup();
    limit_cube_size(&mock, 1024);

    let hdr = panorama();
    let cubemap = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 2048).unwrap();

    assert_eq!(cubemap.size(), 1024);
    assert_eq!(mock.lock().unwrap().draws[0].viewport, Viewport::full(1024, 1024));
}

#[test]
fn test_equirect_from_ldr_image() {
    let (mock, mut renderer, mut baker) = setup();
    let image = ImageData::solid(8, 4, [255, 128, 0, 255]);

    let cubemap = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Image(&image), 16).unwrap();
    assert_eq!(cubemap.size(), 16);
    assert_eq!(mock.lock().unwrap().draws.len(), 6);
}

#[test]
fn test_ldr_panorama_converted_to_rgb32f() {
    let image = ImageData::solid(2, 1, [255, 0, 51, 255]);
    let converted = EquirectSource::Image(&image).to_rgb32f().unwrap();
    assert_eq!(converted.format, TextureFormat::Rgb32F);
    let texels: Vec<f32> = converted
        .pixels
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    assert_eq!(texels, vec![1.0, 0.0, 0.2, 1.0, 0.0, 0.2]);
}

#[test]
fn test_bake_restores_device_state() {
    let (mock, mut renderer, mut baker) = setup();
    mock.lock().unwrap().set_cull_mode(Some(CullFace::Back));

    let hdr = panorama();
    baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 32).unwrap();

    let device = mock.lock().unwrap();
    assert!(device.draws.iter().all(|d| d.cull_mode.is_none()));
    assert_eq!(device.cull_mode(), Some(CullFace::Back));
    assert_eq!(device.current_framebuffer(), None);
    assert_eq!(device.viewport(), renderer.viewport());
}

#[test]
fn test_incomplete_float_target_is_fatal() {
    let (mock, mut renderer, mut baker) = setup();
    mock.lock().unwrap().set_capabilities(DeviceCapabilities {
        color_buffer_float: false,
        ..DeviceCapabilities::default()
    });
    let textures_before = mock.lock().unwrap().texture_count();

    let hdr = panorama();
    let err = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 32).unwrap_err();

    assert!(matches!(err, Error::FramebufferIncomplete(_)));
    let device = mock.lock().unwrap();
    assert_eq!(device.texture_count(), textures_before);
    assert_eq!(device.cull_mode(), None);
    assert_eq!(device.current_framebuffer(), None);
}

#[test]
fn test_missing_float_linear_is_fatal() {
    let (mock, mut renderer, mut baker) = setup();
    mock.lock().unwrap().set_capabilities(DeviceCapabilities {
        float_linear: false,
        ..DeviceCapabilities::default()
    });

    let hdr = panorama();
    let err = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 32).unwrap_err();
    assert!(matches!(err, Error::MissingExtension(_)));
}

// ============================================================================
// IRRADIANCE / SPECULAR
// ============================================================================

#[test]
fn test_irradiance_samples_environment() {
    let (mock, mut renderer, mut baker) = setup();
    let hdr = panorama();
    let environment = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 64).unwrap();
    mock.lock().unwrap().draws.clear();

    let irradiance = baker.irradiance(&mut renderer, &environment, 32).unwrap();

    let device = mock.lock().unwrap();
    assert_eq!(irradiance.size(), 32);
    assert_eq!(irradiance.mip_levels(), 1);
    assert_eq!(device.draws.len(), 6);
    assert!(device.draws.iter().all(|d| d.texture_at(0) == environment.handle()));
    assert!(device.draws.iter().all(|d| d.viewport == Viewport::full(32, 32)));
}

#[test]
fn test_irradiance_clamped_like_every_bake() {
    let (mock, mut renderer, mut baker) = setup();
    let hdr = panorama();
    let environment = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 64).unwrap();
    limit_cube_size(&mock, 16);

    let irradiance = baker.irradiance(&mut renderer, &environment, 32).unwrap();
    assert_eq!(irradiance.size(), 16);
}

#[test]
fn test_specular_mips_and_roughness() {
    let (mock, mut renderer, mut baker) = setup();
    let hdr = panorama();
    let environment = baker.equirect_to_cubemap(&mut renderer, EquirectSource::Hdr(&hdr), 64).unwrap();
    {
        let mut device = mock.lock().unwrap();
        device.draws.clear();
        device.clear_commands();
    }

    let specular = baker.specular_prefilter(&mut renderer, &environment, 128, 5).unwrap();

    let prefilter = program(&renderer, &shader_source::CUBEMAP_SPECULAR_PREFILTER).unwrap();
    let device = mock.lock().unwrap();
    assert_eq!(specular.mip_levels(), 5);
    assert_eq!(device.draws.len(), 30);
    let sizes: Vec<u32> = device.draws.iter().step_by(6).map(|d| d.viewport.width).collect();
    assert_eq!(sizes, vec![128, 64, 32, 16, 8]);
    assert_eq!(device.count_commands("attach_texture Color(0) CubeFace(PositiveX) level=4"), 1);
    assert_eq!(device.count_commands("resize_renderbuffer"), 5);
    assert_eq!(device.uniform_value(prefilter, "roughness"), Some(&UniformValue::Float(1.0)));
    assert_eq!(device.uniform_value(prefilter, "resolution"), Some(&UniformValue::Float(64.0)));
    assert!(device.draws.iter().all(|d| d.texture_at(0) == environment.handle()));
}

// ============================================================================
// BRDF LUT
// ============================================================================

#[test]
fn test_brdf_lut_baked_once() {
    let (mock, mut renderer, mut baker) = setup();

    let lut = baker.brdf_lut(&mut renderer, 512).unwrap();
    assert_eq!(renderer.cache().brdf_lut(), Some(lut));
    {
        let device = mock.lock().unwrap();
        let texture = device.texture(lut).unwrap();
        assert_eq!(texture.desc.format, TextureFormat::Rg16F);
        assert_eq!((texture.desc.width, texture.desc.height), (512, 512));
        assert_eq!(device.draws.len(), 1);
        assert_eq!(device.draws[0].mode, crate::graphics_device::DrawMode::TriangleStrip);
        assert_eq!(device.draws[0].count, 4);
    }

    assert_eq!(baker.brdf_lut(&mut renderer, 512).unwrap(), lut);
    assert_eq!(mock.lock().unwrap().draws.len(), 1);
}

// ============================================================================
// FULL BAKE
// ============================================================================

#[test]
fn test_bake_uses_configured_resolutions() {
    let (mock, mut renderer, mut baker) = setup();
    let hdr = panorama();

    let maps = baker.bake(&mut renderer, EquirectSource::Hdr(&hdr)).unwrap();

    assert_eq!(maps.environment.size(), 512);
    assert_eq!(maps.irradiance.size(), 32);
    assert_eq!(maps.specular.size(), 128);
    assert_eq!(maps.specular.mip_levels(), 5);
    assert!(renderer.cache().brdf_lut().is_some());
    // 6 + 6 + 30 faces and the BRDF quad
    assert_eq!(mock.lock().unwrap().draws.len(), 43);
}

#[test]
fn test_destroy_releases_capture_objects() {
    let (mock, renderer, mut baker) = setup();
    baker.destroy(&renderer).unwrap();

    let device = mock.lock().unwrap();
    assert_eq!(device.framebuffer_count(), 0);
    assert_eq!(device.renderbuffer_count(), 0);
}
