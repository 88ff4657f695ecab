//! Engine textures: 2D images (optionally loaded in the background) and
//! cube maps.
//!
//! A `Texture2D` created with `deferred` or `load_async` starts without a
//! device texture. `resolve` polls the load channel without blocking; on
//! arrival the image is uploaded and the handle fills in. Until then
//! callers bind a placeholder in its place. A failed load logs a warning
//! and leaves the texture unresolved for good.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Mutex;
use std::thread;

use crate::error::{Error, Result};
use crate::{engine_debug, engine_warn};
use crate::graphics_device::{
    CompareFunc, CubeFace, DeviceCapabilities, GraphicsDevice, TextureDesc, TextureFilter, TextureFormat,
    TextureHandle, TextureImageTarget, TextureTarget, TextureWrap,
};
use crate::resource::{lock_state, ResourceId};

const SOURCE: &str = "prism3d::Texture";

/// Side of the placeholder checkerboard
pub const CHECKERBOARD_SIZE: u32 = 8;

/// 8x8 RGBA8 pink/black checkerboard
pub fn checkerboard_pixels() -> Vec<u8> {
    const PINK: [u8; 4] = [255, 0, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];
    let mut pixels = Vec::with_capacity((CHECKERBOARD_SIZE * CHECKERBOARD_SIZE * 4) as usize);
    for row in 0..CHECKERBOARD_SIZE {
        for column in 0..CHECKERBOARD_SIZE {
            let pink = (row + column) % 2 == 0;
            pixels.extend_from_slice(if pink { &PINK } else { &BLACK });
        }
    }
    pixels
}

/// Levels in a complete mip chain for the given size
pub fn full_mip_levels(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Float formats may only be linearly filtered when the device supports it
pub(crate) fn check_float_filtering(capabilities: &DeviceCapabilities, desc: &TextureDesc) -> Result<()> {
    if desc.format.is_float() && desc.uses_linear_filtering() && !capabilities.float_linear {
        return Err(Error::MissingExtension("OES_texture_float_linear".to_string()).logged(SOURCE));
    }
    Ok(())
}

// ============================================================================
// IMAGE DATA
// ============================================================================

/// Decoded image handed over by a loader
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, format: TextureFormat, pixels: Vec<u8>) -> Self {
        Self { width, height, format, pixels }
    }

    /// Single-color RGBA8 image
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat((width * height) as usize);
        Self::new(width, height, TextureFormat::Rgba8, pixels)
    }

    fn validate(&self) -> Result<()> {
        let expected = self.width as usize * self.height as usize * self.format.bytes_per_pixel();
        if self.width == 0 || self.height == 0 || self.pixels.len() != expected {
            return Err(Error::InvalidResource(format!(
                "{}x{} {:?} image carries {} bytes, expected {}",
                self.width,
                self.height,
                self.format,
                self.pixels.len(),
                expected
            )));
        }
        Ok(())
    }
}

/// Decoded HDR panorama: RGB floats, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    pub exposure: f32,
    pub data: Vec<f32>,
}

impl HdrImage {
    /// Uniform-color panorama
    pub fn solid(width: u32, height: u32, rgb: [f32; 3]) -> Self {
        Self {
            width,
            height,
            exposure: 1.0,
            data: rgb.repeat((width * height) as usize),
        }
    }

    /// RGB32F image with exposure applied
    pub fn to_image_data(&self) -> ImageData {
        let scaled: Vec<f32> = self.data.iter().map(|v| v * self.exposure).collect();
        ImageData::new(
            self.width,
            self.height,
            TextureFormat::Rgb32F,
            bytemuck::cast_slice(&scaled).to_vec(),
        )
    }
}

// ============================================================================
// TEXTURE OPTIONS
// ============================================================================

/// Sampling parameters applied to a new texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureOptions {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub wrap_r: TextureWrap,
    /// Depth compare sampling, depth formats only
    pub compare: Option<CompareFunc>,
}

impl Default for TextureOptions {
    /// Trilinear filtering with repeat wrapping
    fn default() -> Self {
        Self {
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::Repeat,
            wrap_t: TextureWrap::Repeat,
            wrap_r: TextureWrap::Repeat,
            compare: None,
        }
    }
}

impl TextureOptions {
    /// Bilinear filtering, clamp to edge, no mip chain
    pub fn clamped_linear() -> Self {
        Self {
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
            wrap_r: TextureWrap::ClampToEdge,
            compare: None,
        }
    }

    pub fn nearest() -> Self {
        Self {
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            ..Self::default()
        }
    }

    /// Nearest sampled, clamped depth texture
    pub fn depth(compare: Option<CompareFunc>) -> Self {
        Self {
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            compare,
            ..Self::clamped_linear()
        }
    }

    fn describe(&self, target: TextureTarget, width: u32, height: u32, format: TextureFormat) -> TextureDesc {
        let base = match target {
            TextureTarget::CubeMap => TextureDesc::cube_map(width, format),
            _ => TextureDesc::texture_2d(width, height, format),
        };
        let mut desc = base.with_filter(self.min_filter, self.mag_filter);
        desc.wrap_s = self.wrap_s;
        desc.wrap_t = self.wrap_t;
        desc.wrap_r = self.wrap_r;
        desc.compare = self.compare;
        if self.min_filter.uses_mipmaps() {
            desc = desc.with_mip_levels(full_mip_levels(width, height));
        }
        desc
    }
}

// ============================================================================
// TEXTURE 2D
// ============================================================================

/// Sender half of a deferred texture load
pub type TextureSender = Sender<Result<ImageData>>;

#[derive(Default)]
struct Texture2DState {
    handle: Option<TextureHandle>,
    width: u32,
    height: u32,
    pending: Option<Receiver<Result<ImageData>>>,
}

pub struct Texture2D {
    id: ResourceId,
    options: TextureOptions,
    state: Mutex<Texture2DState>,
}

impl Texture2D {
    /// Upload a decoded image
    pub fn from_image(device: &mut dyn GraphicsDevice, image: &ImageData, options: TextureOptions) -> Result<Self> {
        let handle = upload_image(device, image, &options)?;
        Ok(Self::resolved(handle, image.width, image.height, options))
    }

    /// Upload an HDR float image as RGB32F
    pub fn from_hdr(device: &mut dyn GraphicsDevice, image: &HdrImage, options: TextureOptions) -> Result<Self> {
        Self::from_image(device, &image.to_image_data(), options)
    }

    /// Allocate an uninitialized texture to render into
    pub fn empty(
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        format: TextureFormat,
        options: TextureOptions,
    ) -> Result<Self> {
        let desc = options.describe(TextureTarget::Texture2D, width, height, format);
        check_float_filtering(&device.capabilities(), &desc)?;
        let handle = device.create_texture(&desc)?;
        if let Err(e) = device.upload_texture(handle, TextureImageTarget::Texture2D, 0, width, height, None) {
            device.delete_texture(handle);
            return Err(e);
        }
        Ok(Self::resolved(handle, width, height, options))
    }

    /// 8x8 pink/black checkerboard, nearest filtering
    pub fn checkerboard(device: &mut dyn GraphicsDevice) -> Result<Self> {
        let image = ImageData::new(
            CHECKERBOARD_SIZE,
            CHECKERBOARD_SIZE,
            TextureFormat::Rgba8,
            checkerboard_pixels(),
        );
        let options = TextureOptions {
            wrap_t: TextureWrap::MirroredRepeat,
            ..TextureOptions::nearest()
        };
        Self::from_image(device, &image, options)
    }

    /// Texture whose image arrives later through the returned sender
    ///
    /// # Example
    ///
    /// ```
    /// use prism_3d_engine::prism3d::resource::{ImageData, Texture2D, TextureOptions};
    ///
    /// let (texture, sender) = Texture2D::deferred(TextureOptions::default());
    /// assert!(texture.is_pending());
    /// sender.send(Ok(ImageData::solid(2, 2, [255, 255, 255, 255]))).unwrap();
    /// ```
    pub fn deferred(options: TextureOptions) -> (Self, TextureSender) {
        let (sender, receiver) = mpsc::channel();
        let texture = Self {
            id: ResourceId::next(),
            options,
            state: Mutex::new(Texture2DState {
                pending: Some(receiver),
                ..Texture2DState::default()
            }),
        };
        (texture, sender)
    }

    /// Decode on a background thread; the result is picked up by `resolve`
    pub fn load_async<F>(options: TextureOptions, decode: F) -> Self
    where
        F: FnOnce() -> Result<ImageData> + Send + 'static,
    {
        let (texture, sender) = Self::deferred(options);
        let spawned = thread::Builder::new()
            .name("prism3d-texture-load".to_string())
            .spawn(move || {
                // receiver may be gone if the texture was dropped
                let _ = sender.send(decode());
            });
        if let Err(e) = spawned {
            engine_warn!(SOURCE, "Failed to start texture load thread: {}", e);
        }
        texture
    }

    fn resolved(handle: TextureHandle, width: u32, height: u32, options: TextureOptions) -> Self {
        Self {
            id: ResourceId::next(),
            options,
            state: Mutex::new(Texture2DState {
                handle: Some(handle),
                width,
                height,
                pending: None,
            }),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn options(&self) -> &TextureOptions {
        &self.options
    }

    /// Device texture once available
    pub fn handle(&self) -> Option<TextureHandle> {
        self.state.lock().ok()?.handle
    }

    /// True while a load is still in flight
    pub fn is_pending(&self) -> bool {
        self.state.lock().map(|s| s.pending.is_some()).unwrap_or(false)
    }

    pub fn size(&self) -> (u32, u32) {
        self.state.lock().map(|s| (s.width, s.height)).unwrap_or((0, 0))
    }

    /// Pick up a finished load without blocking
    ///
    /// Returns the current device texture, `None` while unresolved.
    pub fn resolve(&self, device: &mut dyn GraphicsDevice) -> Result<Option<TextureHandle>> {
        let mut state = lock_state(&self.state, SOURCE)?;
        let Some(receiver) = state.pending.as_ref() else {
            return Ok(state.handle);
        };
        match receiver.try_recv() {
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                engine_warn!(SOURCE, "Texture {} load was abandoned, keeping placeholder", self.id.value());
                state.pending = None;
                Ok(None)
            }
            Ok(Err(e)) => {
                engine_warn!(SOURCE, "Texture {} failed to load ({}), keeping placeholder", self.id.value(), e);
                state.pending = None;
                Ok(None)
            }
            Ok(Ok(image)) => {
                state.pending = None;
                let handle = match upload_image(device, &image, &self.options) {
                    Ok(handle) => handle,
                    Err(e) => {
                        engine_warn!(SOURCE, "Texture {} upload failed ({}), keeping placeholder", self.id.value(), e);
                        return Ok(None);
                    }
                };
                state.handle = Some(handle);
                state.width = image.width;
                state.height = image.height;
                engine_debug!(
                    SOURCE,
                    "Texture {} resolved ({}x{})",
                    self.id.value(),
                    image.width,
                    image.height
                );
                Ok(Some(handle))
            }
        }
    }

    /// Bind this texture, or `placeholder` while it is unresolved
    ///
    /// Returns true when the real texture was bound.
    pub fn bind_or_placeholder(
        &self,
        device: &mut dyn GraphicsDevice,
        unit: u32,
        placeholder: TextureHandle,
    ) -> Result<bool> {
        let handle = self.resolve(device)?;
        device.bind_texture(unit, TextureTarget::Texture2D, Some(handle.unwrap_or(placeholder)))?;
        Ok(handle.is_some())
    }

    pub fn destroy(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let mut state = lock_state(&self.state, SOURCE)?;
        state.pending = None;
        if let Some(handle) = state.handle.take() {
            device.delete_texture(handle);
        }
        Ok(())
    }
}

impl fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture2D")
            .field("id", &self.id)
            .field("handle", &self.handle())
            .field("pending", &self.is_pending())
            .finish()
    }
}

fn upload_image(device: &mut dyn GraphicsDevice, image: &ImageData, options: &TextureOptions) -> Result<TextureHandle> {
    image.validate().map_err(|e| e.logged(SOURCE))?;
    let desc = options.describe(TextureTarget::Texture2D, image.width, image.height, image.format);
    check_float_filtering(&device.capabilities(), &desc)?;

    let handle = device.create_texture(&desc)?;
    let uploaded = device
        .upload_texture(
            handle,
            TextureImageTarget::Texture2D,
            0,
            image.width,
            image.height,
            Some(&image.pixels),
        )
        .and_then(|_| {
            if desc.min_filter.uses_mipmaps() {
                device.generate_mipmaps(handle)
            } else {
                Ok(())
            }
        });
    if let Err(e) = uploaded {
        device.delete_texture(handle);
        return Err(e);
    }
    Ok(handle)
}

// ============================================================================
// TEXTURE CUBE MAP
// ============================================================================

#[derive(Debug)]
pub struct TextureCubeMap {
    id: ResourceId,
    handle: Option<TextureHandle>,
    size: u32,
    mip_levels: u32,
    format: TextureFormat,
}

impl TextureCubeMap {
    /// Checkerboard on every face
    pub fn placeholder(device: &mut dyn GraphicsDevice) -> Result<Self> {
        let face = ImageData::new(
            CHECKERBOARD_SIZE,
            CHECKERBOARD_SIZE,
            TextureFormat::Rgba8,
            checkerboard_pixels(),
        );
        let faces: [ImageData; 6] = std::array::from_fn(|_| face.clone());
        Self::from_faces(device, &faces, TextureOptions::nearest())
    }

    /// Upload six square faces in +X, -X, +Y, -Y, +Z, -Z order
    pub fn from_faces(device: &mut dyn GraphicsDevice, faces: &[ImageData; 6], options: TextureOptions) -> Result<Self> {
        let first = &faces[0];
        for face in faces {
            face.validate().map_err(|e| e.logged(SOURCE))?;
            if face.width != first.width || face.height != first.width || face.format != first.format {
                return Err(Error::InvalidResource("cube map faces must be square and alike".to_string()).logged(SOURCE));
            }
        }
        let desc = options.describe(TextureTarget::CubeMap, first.width, first.width, first.format);
        check_float_filtering(&device.capabilities(), &desc)?;

        let handle = device.create_texture(&desc)?;
        let mut result = Ok(());
        for (face, image) in CubeFace::ALL.iter().zip(faces) {
            result = device.upload_texture(
                handle,
                TextureImageTarget::CubeFace(*face),
                0,
                image.width,
                image.height,
                Some(&image.pixels),
            );
            if result.is_err() {
                break;
            }
        }
        if result.is_ok() && desc.min_filter.uses_mipmaps() {
            result = device.generate_mipmaps(handle);
        }
        if let Err(e) = result {
            device.delete_texture(handle);
            return Err(e);
        }

        Ok(Self {
            id: ResourceId::next(),
            handle: Some(handle),
            size: first.width,
            mip_levels: desc.mip_levels,
            format: first.format,
        })
    }

    /// Allocate every face and mip level without data (bake target)
    pub fn empty(
        device: &mut dyn GraphicsDevice,
        size: u32,
        format: TextureFormat,
        mip_levels: u32,
        min_filter: TextureFilter,
    ) -> Result<Self> {
        let desc = TextureDesc::cube_map(size, format)
            .with_filter(min_filter, TextureFilter::Linear)
            .with_mip_levels(mip_levels);
        check_float_filtering(&device.capabilities(), &desc)?;

        let handle = device.create_texture(&desc)?;
        for level in 0..desc.mip_levels {
            let (width, height) = desc.mip_size(level);
            for face in CubeFace::ALL {
                if let Err(e) = device.upload_texture(
                    handle,
                    TextureImageTarget::CubeFace(face),
                    level,
                    width,
                    height,
                    None,
                ) {
                    device.delete_texture(handle);
                    return Err(e);
                }
            }
        }

        Ok(Self {
            id: ResourceId::next(),
            handle: Some(handle),
            size,
            mip_levels: desc.mip_levels,
            format,
        })
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }

    /// Face size of mip 0
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn bind(&self, device: &mut dyn GraphicsDevice, unit: u32) -> Result<()> {
        let Some(handle) = self.handle else {
            return Err(Error::InvalidResource(format!("cube map {} was destroyed", self.id.value())));
        };
        device.bind_texture(unit, TextureTarget::CubeMap, Some(handle))
    }

    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(handle) = self.handle.take() {
            device.delete_texture(handle);
        }
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
