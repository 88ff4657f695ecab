//! Material trait and the activation context handed to materials.
//!
//! A material names the shader variant it draws with and, when activated,
//! binds its textures and writes its `u_material.*` uniforms into that
//! variant. The renderer activates a material only when it differs from
//! the last one bound, so activation must leave nothing behind that a
//! later material would rely on: every sampler a material owns is bound,
//! to the placeholder when the material has no texture for it.

use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, TextureHandle, TextureTarget, UniformValue};
use crate::resource::{ResourceId, Texture2D};
use crate::shader::{PlaceholderTextures, Shader, ShaderSource};

/// Identity compared by the renderer's bind cache
pub type MaterialId = ResourceId;

/// State a material may touch while it is activated
pub struct MaterialContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    /// Variant the material draws with, already current
    pub shader: &'a mut Shader,
    pub placeholders: PlaceholderTextures,
    /// Shared BRDF lookup table, once baked
    pub brdf_lut: Option<TextureHandle>,
}

impl<'a> MaterialContext<'a> {
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        self.shader.set_uniform(&mut *self.device, name, value)
    }

    /// Bind a material texture or the 2D placeholder
    ///
    /// Returns true when a real (resolved) texture was bound.
    pub fn bind_texture(&mut self, unit: u32, texture: Option<&Texture2D>) -> Result<bool> {
        match texture {
            Some(texture) => texture.bind_or_placeholder(&mut *self.device, unit, self.placeholders.texture_2d),
            None => {
                self.device
                    .bind_texture(unit, TextureTarget::Texture2D, Some(self.placeholders.texture_2d))?;
                Ok(false)
            }
        }
    }

    /// Bind a raw texture handle or the placeholder for `target`
    pub fn bind_handle(&mut self, unit: u32, target: TextureTarget, handle: Option<TextureHandle>) -> Result<bool> {
        let bound = handle.unwrap_or(self.placeholders.for_target(target));
        self.device.bind_texture(unit, target, Some(bound))?;
        Ok(handle.is_some())
    }
}

/// Surface description drawn by the renderer
pub trait Material: Send + Sync {
    fn id(&self) -> MaterialId;

    /// Variant this material draws with
    fn shader_source(&self) -> &'static ShaderSource;

    /// Bind textures and write material uniforms into the current variant
    fn activate(&self, context: &mut MaterialContext<'_>) -> Result<()>;
}
