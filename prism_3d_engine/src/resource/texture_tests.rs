/// Unit tests for Texture2D, TextureCubeMap and async resolution

use super::*;
use crate::graphics_device::MockGraphicsDevice;
use std::time::Duration;

fn placeholder(device: &mut MockGraphicsDevice) -> TextureHandle {
    Texture2D::checkerboard(device).unwrap().handle().unwrap()
}

// ============================================================================
// CHECKERBOARD
// ============================================================================

#[test]
fn test_checkerboard_pattern() {
    let pixels = checkerboard_pixels();
    assert_eq!(pixels.len(), 8 * 8 * 4);
    assert_eq!(&pixels[0..4], &[255, 0, 255, 255]);
    assert_eq!(&pixels[4..8], &[0, 0, 0, 255]);
    // second row starts black
    assert_eq!(&pixels[32..36], &[0, 0, 0, 255]);
}

#[test]
fn test_checkerboard_texture_is_nearest() {
    let mut device = MockGraphicsDevice::new();
    let texture = Texture2D::checkerboard(&mut device).unwrap();
    let mock = device.texture(texture.handle().unwrap()).unwrap();
    assert_eq!(mock.desc.min_filter, TextureFilter::Nearest);
    assert_eq!(mock.desc.wrap_t, TextureWrap::MirroredRepeat);
    assert_eq!(mock.desc.mip_levels, 1);
    assert_eq!(texture.size(), (8, 8));
}

#[test]
fn test_full_mip_levels() {
    assert_eq!(full_mip_levels(1, 1), 1);
    assert_eq!(full_mip_levels(512, 256), 10);
    assert_eq!(full_mip_levels(0, 0), 1);
}

// ============================================================================
// TEXTURE 2D
// ============================================================================

#[test]
fn test_image_upload_generates_mipmaps() {
    let mut device = MockGraphicsDevice::new();
    let image = ImageData::solid(16, 16, [1, 2, 3, 255]);
    let texture = Texture2D::from_image(&mut device, &image, TextureOptions::default()).unwrap();

    let mock = device.texture(texture.handle().unwrap()).unwrap();
    assert!(mock.mipmaps_generated);
    assert_eq!(mock.desc.mip_levels, 5);
    assert_eq!(mock.data.get(&(TextureImageTarget::Texture2D, 0)), Some(&image.pixels));
}

#[test]
fn test_image_size_mismatch_rejected() {
    let mut device = MockGraphicsDevice::new();
    let image = ImageData::new(4, 4, TextureFormat::Rgba8, vec![0; 10]);
    assert!(Texture2D::from_image(&mut device, &image, TextureOptions::default()).is_err());
    assert_eq!(device.texture_count(), 0);
}

#[test]
fn test_float_linear_requires_extension() {
    let mut device = MockGraphicsDevice::with_capabilities(DeviceCapabilities {
        float_linear: false,
        ..DeviceCapabilities::default()
    });
    let hdr = HdrImage::solid(4, 2, [1.0, 1.0, 1.0]);

    let err = Texture2D::from_hdr(&mut device, &hdr, TextureOptions::clamped_linear()).unwrap_err();
    assert_eq!(err, Error::MissingExtension("OES_texture_float_linear".to_string()));
    assert_eq!(device.texture_count(), 0);

    // nearest sampling of float data is always allowed
    assert!(Texture2D::from_hdr(&mut device, &hdr, TextureOptions::nearest()).is_ok());
}

#[test]
fn test_hdr_exposure_applied() {
    let hdr = HdrImage {
        width: 1,
        height: 1,
        exposure: 2.0,
        data: vec![0.5, 1.0, 1.5],
    };
    let image = hdr.to_image_data();
    assert_eq!(image.format, TextureFormat::Rgb32F);
    let values: Vec<f32> = image
        .pixels
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
}

// ============================================================================
// ASYNC RESOLUTION
// ============================================================================

#[test]
fn test_pending_texture_binds_placeholder() {
    let mut device = MockGraphicsDevice::new();
    let fallback = placeholder(&mut device);
    let (texture, _sender) = Texture2D::deferred(TextureOptions::default());

    assert!(texture.is_pending());
    assert_eq!(texture.resolve(&mut device).unwrap(), None);
    assert!(!texture.bind_or_placeholder(&mut device, 0, fallback).unwrap());
    assert_eq!(device.bound_texture(0), Some(fallback));
}

#[test]
fn test_resolved_texture_swaps_in() {
    let mut device = MockGraphicsDevice::new();
    let fallback = placeholder(&mut device);
    let (texture, sender) = Texture2D::deferred(TextureOptions::clamped_linear());

    sender.send(Ok(ImageData::solid(4, 4, [255, 255, 255, 255]))).unwrap();
    assert!(texture.bind_or_placeholder(&mut device, 3, fallback).unwrap());

    let handle = texture.handle().unwrap();
    assert_ne!(handle, fallback);
    assert_eq!(device.bound_texture(3), Some(handle));
    assert!(!texture.is_pending());
    assert_eq!(texture.size(), (4, 4));
}

#[test]
fn test_failed_load_keeps_placeholder() {
    let mut device = MockGraphicsDevice::new();
    let fallback = placeholder(&mut device);
    let (texture, sender) = Texture2D::deferred(TextureOptions::default());

    sender.send(Err(Error::InvalidResource("decode failed".to_string()))).unwrap();
    assert_eq!(texture.resolve(&mut device).unwrap(), None);
    assert!(!texture.is_pending());
    assert!(!texture.bind_or_placeholder(&mut device, 0, fallback).unwrap());
}

#[test]
fn test_malformed_late_image_keeps_placeholder() {
    let mut device = MockGraphicsDevice::new();
    let fallback = placeholder(&mut device);
    let textures = device.texture_count();
    let (texture, sender) = Texture2D::deferred(TextureOptions::default());

    sender.send(Ok(ImageData::new(4, 4, TextureFormat::Rgba8, vec![0; 3]))).unwrap();
    assert!(!texture.bind_or_placeholder(&mut device, 0, fallback).unwrap());
    assert_eq!(device.bound_texture(0), Some(fallback));
    assert!(!texture.is_pending());
    assert_eq!(texture.handle(), None);
    assert_eq!(device.texture_count(), textures);
}

#[test]
fn test_dropped_sender_stops_polling() {
    let mut device = MockGraphicsDevice::new();
    let (texture, sender) = Texture2D::deferred(TextureOptions::default());
    drop(sender);
    assert_eq!(texture.resolve(&mut device).unwrap(), None);
    assert!(!texture.is_pending());
}

#[test]
fn test_load_async_resolves_eventually() {
    let mut device = MockGraphicsDevice::new();
    let texture = Texture2D::load_async(TextureOptions::nearest(), || Ok(ImageData::solid(2, 2, [9, 9, 9, 255])));

    let mut handle = None;
    for _ in 0..200 {
        handle = texture.resolve(&mut device).unwrap();
        if handle.is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(handle.is_some());
}

#[test]
fn test_destroy_texture() {
    let mut device = MockGraphicsDevice::new();
    let texture = Texture2D::checkerboard(&mut device).unwrap();
    texture.destroy(&mut device).unwrap();
    assert!(texture.handle().is_none());
    assert_eq!(device.texture_count(), 0);
}

// ============================================================================
// CUBE MAPS
// ============================================================================

#[test]
fn test_placeholder_cube_uploads_every_face() {
    let mut device = MockGraphicsDevice::new();
    let cube = TextureCubeMap::placeholder(&mut device).unwrap();
    let mock = device.texture(cube.handle().unwrap()).unwrap();

    for face in CubeFace::ALL {
        assert_eq!(mock.image_size(TextureImageTarget::CubeFace(face), 0), Some((8, 8)));
    }
    assert_eq!(cube.size(), 8);
}

#[test]
fn test_empty_cube_allocates_mip_chain() {
    let mut device = MockGraphicsDevice::new();
    let cube = TextureCubeMap::empty(&mut device, 128, TextureFormat::Rgba16F, 5, TextureFilter::LinearMipmapLinear).unwrap();
    let mock = device.texture(cube.handle().unwrap()).unwrap();

    assert_eq!(cube.mip_levels(), 5);
    assert_eq!(mock.level_count(TextureImageTarget::CubeFace(CubeFace::NegativeZ)), 5);
    assert_eq!(mock.image_size(TextureImageTarget::CubeFace(CubeFace::PositiveX), 4), Some((8, 8)));
}

#[test]
fn test_non_square_faces_rejected() {
    let mut device = MockGraphicsDevice::new();
    let face = ImageData::solid(4, 2, [0, 0, 0, 255]);
    let faces: [ImageData; 6] = std::array::from_fn(|_| face.clone());
    assert!(TextureCubeMap::from_faces(&mut device, &faces, TextureOptions::nearest()).is_err());
}
