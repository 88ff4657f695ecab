/// Cubemap baker - image based lighting precomputation on the GPU
///
/// Every bake renders a 2x2x2 box from the inside with a `CubeCamera` into
/// one shared capture framebuffer, swapping the color attachment per face
/// and mip level and resizing the depth renderbuffer to match. Resolutions
/// are clamped to the device cube map limit.
///
/// A bake leaves the device as it found it: culling is restored, the
/// default framebuffer is bound, the renderer viewport is re-applied and
/// the renderer's cached bindings are forgotten.

use std::sync::Arc;

use glam::Mat4;

use crate::error::{Error, Result};
use crate::{engine_debug, engine_info};
use crate::graphics_device::{
    lock_device, Attachment, ClearFlags, CubeFace, CullFace, FramebufferHandle, GraphicsDevice,
    RenderbufferFormat, RenderbufferHandle, TextureFilter, TextureFormat, TextureHandle, TextureImageTarget,
    TextureTarget, Viewport,
};
use crate::ibl::{CubeCamera, IblMaps};
use crate::render_queue::check_complete;
use crate::renderer::Renderer;
use crate::resource::{
    full_mip_levels, BufferedGeometry, HdrImage, ImageData, Mesh, Texture2D, TextureCubeMap, TextureOptions,
};
use crate::shader::{shader_source, ShaderSource};

const SOURCE: &str = "prism3d::CubemapBaker";

/// Panorama converted by `CubemapBaker::equirect_to_cubemap`
#[derive(Debug, Clone, Copy)]
pub enum EquirectSource<'a> {
    /// HDR float buffer (exposure applied on upload)
    Hdr(&'a HdrImage),
    /// Decoded LDR or float image
    Image(&'a ImageData),
}

impl EquirectSource<'_> {
    /// The panorama as RGB32F texels
    fn to_rgb32f(self) -> Result<ImageData> {
        let image = match self {
            EquirectSource::Hdr(hdr) => return Ok(hdr.to_image_data()),
            EquirectSource::Image(image) => image,
        };
        let texels: Vec<f32> = match image.format {
            TextureFormat::Rgb32F => return Ok(image.clone()),
            TextureFormat::Rgba8 => image
                .pixels
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]].map(|c| c as f32 / 255.0))
                .collect(),
            TextureFormat::Rgb8 => image.pixels.iter().map(|c| *c as f32 / 255.0).collect(),
            TextureFormat::Rgba32F => image
                .pixels
                .chunks_exact(16)
                .flat_map(|p| {
                    [0, 4, 8].map(|i| f32::from_ne_bytes([p[i], p[i + 1], p[i + 2], p[i + 3]]))
                })
                .collect(),
            other => {
                return Err(Error::InvalidResource(format!("{:?} panorama cannot be baked", other)).logged(SOURCE));
            }
        };
        Ok(ImageData::new(
            image.width,
            image.height,
            TextureFormat::Rgb32F,
            bytemuck::cast_slice(&texels).to_vec(),
        ))
    }
}

pub struct CubemapBaker {
    framebuffer: FramebufferHandle,
    depth: RenderbufferHandle,
    depth_size: (u32, u32),
    cube: Mesh,
    quad: Mesh,
    camera: CubeCamera,
}

impl CubemapBaker {
    /// Create the capture framebuffer and the box and quad meshes
    pub fn new(renderer: &Renderer) -> Result<Self> {
        let mut guard = lock_device(renderer.device())?;
        let device: &mut dyn GraphicsDevice = &mut *guard;

        let framebuffer = device.create_framebuffer()?;
        let depth = device.create_renderbuffer(RenderbufferFormat::Depth24, 1, 1)?;
        device.attach_renderbuffer(framebuffer, Attachment::Depth, depth)?;
        let cube = Mesh::new(device, &BufferedGeometry::capture_box())?;
        let quad = Mesh::new(device, &BufferedGeometry::screen_quad())?;

        Ok(Self {
            framebuffer,
            depth,
            depth_size: (1, 1),
            cube,
            quad,
            camera: CubeCamera::new(),
        })
    }

    /// Render an equirectangular panorama into an RGBA16F cubemap
    ///
    /// The full mip chain is generated from mip 0 once the six faces are
    /// drawn.
    pub fn equirect_to_cubemap(
        &mut self,
        renderer: &mut Renderer,
        source: EquirectSource<'_>,
        resolution: u32,
    ) -> Result<TextureCubeMap> {
        let size = clamp_resolution(renderer, resolution)?;
        let image = source.to_rgb32f()?;

        let (panorama, mut cubemap) = {
            let mut device = lock_device(renderer.device())?;
            let panorama = Texture2D::from_image(&mut *device, &image, TextureOptions::clamped_linear())?;
            let cubemap = TextureCubeMap::empty(
                &mut *device,
                size,
                TextureFormat::Rgba16F,
                full_mip_levels(size, size),
                TextureFilter::LinearMipmapLinear,
            );
            match cubemap {
                Ok(cubemap) => (panorama, cubemap),
                Err(e) => {
                    panorama.destroy(&mut *device)?;
                    return Err(e);
                }
            }
        };

        let result = self.run(renderer, |baker, renderer| {
            let panorama = panorama
                .handle()
                .ok_or_else(|| Error::InvalidResource("panorama texture missing".to_string()))?;
            let target = cube_handle(&cubemap)?;
            baker.bind_variant(renderer, &shader_source::EQUI_TO_CUBEMAP, &[(0, TextureTarget::Texture2D, panorama)])?;
            baker.draw_faces(renderer, target, 0, size)?;
            lock_device(renderer.device())?.generate_mipmaps(target)
        });

        let mut device = lock_device(renderer.device())?;
        panorama.destroy(&mut *device)?;
        if let Err(e) = result {
            cubemap.destroy(&mut *device);
            return Err(e);
        }
        engine_info!(SOURCE, "Environment cubemap baked at {}x{}", size, size);
        Ok(cubemap)
    }

    /// Convolve `environment` into a diffuse irradiance cubemap
    pub fn irradiance(
        &mut self,
        renderer: &mut Renderer,
        environment: &TextureCubeMap,
        resolution: u32,
    ) -> Result<TextureCubeMap> {
        let size = clamp_resolution(renderer, resolution)?;
        let source = cube_handle(environment)?;
        let mut irradiance = TextureCubeMap::empty(
            &mut *lock_device(renderer.device())?,
            size,
            TextureFormat::Rgba16F,
            1,
            TextureFilter::Linear,
        )?;

        let result = self.run(renderer, |baker, renderer| {
            let target = cube_handle(&irradiance)?;
            baker.bind_variant(renderer, &shader_source::CUBEMAP_TO_IRRADIANCE, &[(0, TextureTarget::CubeMap, source)])?;
            baker.draw_faces(renderer, target, 0, size)
        });

        if let Err(e) = result {
            irradiance.destroy(&mut *lock_device(renderer.device())?);
            return Err(e);
        }
        engine_info!(SOURCE, "Irradiance cubemap baked at {}x{}", size, size);
        Ok(irradiance)
    }

    /// Prefilter `environment` for `mip_levels` roughness levels
    ///
    /// Mip `m` holds roughness `m / (mip_levels - 1)`; its faces are
    /// rendered at `resolution >> m`.
    pub fn specular_prefilter(
        &mut self,
        renderer: &mut Renderer,
        environment: &TextureCubeMap,
        resolution: u32,
        mip_levels: u32,
    ) -> Result<TextureCubeMap> {
        let size = clamp_resolution(renderer, resolution)?;
        let mip_levels = mip_levels.clamp(1, full_mip_levels(size, size));
        let source = cube_handle(environment)?;
        let mut specular = TextureCubeMap::empty(
            &mut *lock_device(renderer.device())?,
            size,
            TextureFormat::Rgba16F,
            mip_levels,
            TextureFilter::LinearMipmapLinear,
        )?;

        let result = self.run(renderer, |baker, renderer| {
            let target = cube_handle(&specular)?;
            for mip in 0..mip_levels {
                let roughness = if mip_levels > 1 {
                    mip as f32 / (mip_levels - 1) as f32
                } else {
                    0.0
                };
                baker.bind_variant(
                    renderer,
                    &shader_source::CUBEMAP_SPECULAR_PREFILTER,
                    &[(0, TextureTarget::CubeMap, source)],
                )?;
                renderer.set_uniform("roughness", roughness)?;
                renderer.set_uniform("resolution", environment.size() as f32)?;
                baker.draw_faces(renderer, target, mip, (size >> mip).max(1))?;
            }
            Ok(())
        });

        if let Err(e) = result {
            specular.destroy(&mut *lock_device(renderer.device())?);
            return Err(e);
        }
        engine_info!(SOURCE, "Specular cubemap baked at {}x{} with {} mips", size, size, mip_levels);
        Ok(specular)
    }

    /// The split-sum BRDF table, baked on first use and kept in the cache
    pub fn brdf_lut(&mut self, renderer: &mut Renderer, resolution: u32) -> Result<TextureHandle> {
        if let Some(lut) = renderer.cache().brdf_lut() {
            return Ok(lut);
        }

        let size = resolution.min(lock_device(renderer.device())?.capabilities().max_texture_size).max(1);
        let lut = Texture2D::empty(
            &mut *lock_device(renderer.device())?,
            size,
            size,
            TextureFormat::Rg16F,
            TextureOptions::clamped_linear(),
        )?;

        let result = self.run(renderer, |baker, renderer| {
            let target = lut
                .handle()
                .ok_or_else(|| Error::InvalidResource("BRDF texture missing".to_string()))?;
            baker.resize_depth(renderer, size, size)?;
            {
                let mut device = lock_device(renderer.device())?;
                device.attach_texture(baker.framebuffer, Attachment::Color(0), TextureImageTarget::Texture2D, target, 0)?;
                check_complete(&*device, baker.framebuffer, "BRDF capture")?;
                device.set_viewport(Viewport::full(size, size));
                device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, [0.0, 0.0, 0.0, 1.0]);
            }
            renderer.use_shader(&shader_source::BRDF)?;
            baker.quad.draw(renderer, None)
        });

        let shared = Arc::clone(renderer.device());
        let mut device = lock_device(&shared)?;
        if let Err(e) = result {
            lut.destroy(&mut *device)?;
            return Err(e);
        }
        renderer.cache_mut().store_brdf_lut(&mut *device, lut)?;
        engine_info!(SOURCE, "BRDF LUT baked at {}x{}", size, size);
        renderer
            .cache()
            .brdf_lut()
            .ok_or_else(|| Error::InvalidResource("BRDF LUT was not stored".to_string()))
    }

    /// Run every bake at the renderer's configured resolutions
    pub fn bake(&mut self, renderer: &mut Renderer, source: EquirectSource<'_>) -> Result<IblMaps> {
        let config = renderer.config().clone();
        let mut environment = self.equirect_to_cubemap(renderer, source, config.equirect_resolution)?;

        let mut irradiance = match self.irradiance(renderer, &environment, config.irradiance_resolution) {
            Ok(irradiance) => irradiance,
            Err(e) => {
                environment.destroy(&mut *lock_device(renderer.device())?);
                return Err(e);
            }
        };

        let mut specular = match self.specular_prefilter(
            renderer,
            &environment,
            config.specular_resolution,
            config.specular_mip_levels,
        ) {
            Ok(specular) => specular,
            Err(e) => {
                let mut device = lock_device(renderer.device())?;
                environment.destroy(&mut *device);
                irradiance.destroy(&mut *device);
                return Err(e);
            }
        };

        if let Err(e) = self.brdf_lut(renderer, config.brdf_resolution) {
            let mut device = lock_device(renderer.device())?;
            environment.destroy(&mut *device);
            irradiance.destroy(&mut *device);
            specular.destroy(&mut *device);
            return Err(e);
        }

        Ok(IblMaps {
            environment,
            irradiance,
            specular,
        })
    }

    /// Free the capture framebuffer and meshes
    pub fn destroy(&mut self, renderer: &Renderer) -> Result<()> {
        let mut device = lock_device(renderer.device())?;
        device.delete_framebuffer(self.framebuffer);
        device.delete_renderbuffer(self.depth);
        self.cube.destroy(&mut *device)?;
        self.quad.destroy(&mut *device)
    }

    // ===== INTERNAL =====

    /// Run one bake step between state save and restore
    fn run<F>(&mut self, renderer: &mut Renderer, step: F) -> Result<()>
    where
        F: FnOnce(&mut Self, &mut Renderer) -> Result<()>,
    {
        let previous_cull: Option<CullFace> = {
            let mut device = lock_device(renderer.device())?;
            let previous = device.cull_mode();
            device.set_cull_mode(None);
            device.bind_framebuffer(Some(self.framebuffer))?;
            previous
        };

        let result = step(self, renderer);

        {
            let mut device = lock_device(renderer.device())?;
            device.bind_framebuffer(None)?;
            device.set_cull_mode(previous_cull);
        }
        renderer.reset_viewport()?;
        renderer.reset_save_bindings();
        result
    }

    /// Bind a bake variant, then its source textures over the placeholders
    fn bind_variant(
        &self,
        renderer: &mut Renderer,
        source: &'static ShaderSource,
        textures: &[(u32, TextureTarget, TextureHandle)],
    ) -> Result<()> {
        renderer.use_shader(source)?;
        let mut device = lock_device(renderer.device())?;
        for (unit, target, texture) in textures {
            device.bind_texture(*unit, *target, Some(*texture))?;
        }
        Ok(())
    }

    /// Draw the box once per face into `level` of `target`
    fn draw_faces(&mut self, renderer: &mut Renderer, target: TextureHandle, level: u32, size: u32) -> Result<()> {
        self.resize_depth(renderer, size, size)?;
        let projection = self.camera.projection;

        for face in CubeFace::ALL {
            let view = self.camera.view(face);
            renderer.set_per_frame_uniforms(&view, &projection, None)?;
            renderer.set_per_model_uniforms(&Mat4::IDENTITY, &view, &projection)?;
            {
                let mut device = lock_device(renderer.device())?;
                device.attach_texture(
                    self.framebuffer,
                    Attachment::Color(0),
                    TextureImageTarget::CubeFace(face),
                    target,
                    level,
                )?;
                if face == CubeFace::PositiveX {
                    check_complete(&*device, self.framebuffer, "cubemap capture")?;
                }
                device.set_viewport(Viewport::full(size, size));
                device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, [0.0, 0.0, 0.0, 1.0]);
            }
            self.cube.draw(renderer, None)?;
        }
        Ok(())
    }

    fn resize_depth(&mut self, renderer: &Renderer, width: u32, height: u32) -> Result<()> {
        if self.depth_size == (width, height) {
            return Ok(());
        }
        lock_device(renderer.device())?.resize_renderbuffer(self.depth, RenderbufferFormat::Depth24, width, height)?;
        self.depth_size = (width, height);
        Ok(())
    }
}

/// `resolution` limited to the device cube map size
fn clamp_resolution(renderer: &Renderer, resolution: u32) -> Result<u32> {
    let max = lock_device(renderer.device())?.capabilities().max_cube_map_size;
    if resolution > max {
        engine_debug!(SOURCE, "Resolution {} clamped to the device limit {}", resolution, max);
    }
    Ok(resolution.min(max).max(1))
}

fn cube_handle(cubemap: &TextureCubeMap) -> Result<TextureHandle> {
    cubemap
        .handle()
        .ok_or_else(|| Error::InvalidResource(format!("cube map {} was destroyed", cubemap.id().value())))
}

#[cfg(test)]
#[path = "cubemap_baker_tests.rs"]
mod tests;
