/// Offscreen framebuffer with its attachments
///
/// A color target owns a color texture and a depth renderbuffer; a depth
/// target owns a single depth texture (shadow maps). Completeness is
/// checked at creation and an incomplete framebuffer is fatal.

use crate::error::{Error, Result};
use crate::graphics_device::{
    Attachment, CompareFunc, FramebufferHandle, GraphicsDevice, RenderbufferFormat, RenderbufferHandle,
    TextureFilter, TextureFormat, TextureHandle, TextureImageTarget, Viewport,
};
use crate::resource::{Texture2D, TextureOptions};

/// Framebuffer and size a pass renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBinding {
    pub framebuffer: FramebufferHandle,
    pub width: u32,
    pub height: u32,
}

impl TargetBinding {
    pub fn viewport(&self) -> Viewport {
        Viewport::full(self.width, self.height)
    }
}

#[derive(Debug)]
pub struct RenderTarget {
    framebuffer: Option<FramebufferHandle>,
    color: Option<Texture2D>,
    depth_texture: Option<Texture2D>,
    depth_buffer: Option<RenderbufferHandle>,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Color texture plus depth renderbuffer
    ///
    /// Float formats fall back to RGBA8 when the device cannot render into
    /// them.
    pub fn color(device: &mut dyn GraphicsDevice, width: u32, height: u32, format: TextureFormat) -> Result<Self> {
        let capabilities = device.capabilities();
        let format = if format.is_float() && !capabilities.color_buffer_float {
            TextureFormat::Rgba8
        } else {
            format
        };
        let options = if format.is_float() && !capabilities.float_linear {
            TextureOptions {
                min_filter: TextureFilter::Nearest,
                mag_filter: TextureFilter::Nearest,
                ..TextureOptions::clamped_linear()
            }
        } else {
            TextureOptions::clamped_linear()
        };

        let color = Texture2D::empty(device, width, height, format, options)?;
        let mut target = Self {
            framebuffer: None,
            color: Some(color),
            depth_texture: None,
            depth_buffer: None,
            width,
            height,
        };
        if let Err(e) = target.attach_color(device) {
            target.destroy(device)?;
            return Err(e);
        }
        Ok(target)
    }

    /// Single depth texture, optionally sampled with depth compare
    pub fn depth(device: &mut dyn GraphicsDevice, width: u32, height: u32, compare: Option<CompareFunc>) -> Result<Self> {
        let depth = Texture2D::empty(device, width, height, TextureFormat::Depth24, TextureOptions::depth(compare))?;
        let mut target = Self {
            framebuffer: None,
            color: None,
            depth_texture: Some(depth),
            depth_buffer: None,
            width,
            height,
        };
        if let Err(e) = target.attach_depth(device) {
            target.destroy(device)?;
            return Err(e);
        }
        Ok(target)
    }

    pub fn binding(&self) -> Option<TargetBinding> {
        self.framebuffer.map(|framebuffer| TargetBinding {
            framebuffer,
            width: self.width,
            height: self.height,
        })
    }

    pub fn color_texture(&self) -> Option<&Texture2D> {
        self.color.as_ref()
    }

    pub fn color_handle(&self) -> Option<TextureHandle> {
        self.color.as_ref().and_then(|texture| texture.handle())
    }

    pub fn depth_handle(&self) -> Option<TextureHandle> {
        self.depth_texture.as_ref().and_then(|texture| texture.handle())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if let Some(framebuffer) = self.framebuffer.take() {
            device.delete_framebuffer(framebuffer);
        }
        if let Some(renderbuffer) = self.depth_buffer.take() {
            device.delete_renderbuffer(renderbuffer);
        }
        if let Some(color) = self.color.take() {
            color.destroy(device)?;
        }
        if let Some(depth) = self.depth_texture.take() {
            depth.destroy(device)?;
        }
        Ok(())
    }

    fn attach_color(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let framebuffer = device.create_framebuffer()?;
        self.framebuffer = Some(framebuffer);
        let Some(color) = self.color_handle() else {
            return Err(Error::InvalidResource("render target color texture missing".to_string()));
        };
        device.attach_texture(framebuffer, Attachment::Color(0), TextureImageTarget::Texture2D, color, 0)?;
        let depth = device.create_renderbuffer(RenderbufferFormat::Depth24, self.width, self.height)?;
        self.depth_buffer = Some(depth);
        device.attach_renderbuffer(framebuffer, Attachment::Depth, depth)?;
        check_complete(device, framebuffer, "render target")
    }

    fn attach_depth(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let framebuffer = device.create_framebuffer()?;
        self.framebuffer = Some(framebuffer);
        let Some(depth) = self.depth_handle() else {
            return Err(Error::InvalidResource("render target depth texture missing".to_string()));
        };
        device.attach_texture(framebuffer, Attachment::Depth, TextureImageTarget::Texture2D, depth, 0)?;
        check_complete(device, framebuffer, "depth target")
    }
}

/// Fail with `Error::FramebufferIncomplete` unless `framebuffer` is complete
pub fn check_complete(device: &dyn GraphicsDevice, framebuffer: FramebufferHandle, label: &str) -> Result<()> {
    let status = device.framebuffer_status(framebuffer);
    if status.is_complete() {
        return Ok(());
    }
    Err(Error::FramebufferIncomplete(format!("{}: {}", label, status)).logged("prism3d::RenderTarget"))
}
