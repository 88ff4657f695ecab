//! Long-lived GPU resources shared by every draw of one renderer.
//!
//! Holds one linked `Shader` per shader source name, the placeholder
//! textures bound to unused sampler units and the BRDF lookup table once
//! it has been baked.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::engine_info;
use crate::graphics_device::{GraphicsDevice, TextureHandle};
use crate::resource::{Texture2D, TextureCubeMap};
use crate::shader::{PlaceholderTextures, Shader, ShaderSource};

pub struct ResourceCache {
    shaders: FxHashMap<&'static str, Shader>,
    placeholder_2d: Texture2D,
    placeholder_cube: TextureCubeMap,
    placeholders: PlaceholderTextures,
    brdf_lut: Option<Texture2D>,
}

impl ResourceCache {
    /// Create the placeholder textures
    pub fn new(device: &mut dyn GraphicsDevice) -> Result<Self> {
        let placeholder_2d = Texture2D::checkerboard(device)?;
        let placeholder_cube = TextureCubeMap::placeholder(device)?;
        let (Some(texture_2d), Some(cube_map)) = (placeholder_2d.handle(), placeholder_cube.handle()) else {
            return Err(Error::InitializationFailed("placeholder textures were not created".to_string()));
        };
        Ok(Self {
            shaders: FxHashMap::default(),
            placeholder_2d,
            placeholder_cube,
            placeholders: PlaceholderTextures { texture_2d, cube_map },
            brdf_lut: None,
        })
    }

    pub fn placeholders(&self) -> PlaceholderTextures {
        self.placeholders
    }

    pub fn shader(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    pub fn shader_mut(&mut self, name: &str) -> Option<&mut Shader> {
        self.shaders.get_mut(name)
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Cached variant for `source`, linked on first request
    ///
    /// A new program gets its uniform blocks routed to `block_bindings`.
    pub fn get_or_create_shader(
        &mut self,
        device: &mut dyn GraphicsDevice,
        source: &'static ShaderSource,
        block_bindings: &[(&str, u32)],
    ) -> Result<&mut Shader> {
        match self.shaders.entry(source.name) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let shader = Shader::new(device, source)?;
                shader.bind_blocks(device, block_bindings)?;
                engine_info!("prism3d::ResourceCache", "Cached shader '{}'", source.name);
                Ok(entry.insert(shader))
            }
        }
    }

    pub fn brdf_lut(&self) -> Option<TextureHandle> {
        self.brdf_lut.as_ref().and_then(|lut| lut.handle())
    }

    /// Store the baked BRDF table; a table already present is kept
    ///
    /// Returns false (and frees `lut`) when one was already stored.
    pub fn store_brdf_lut(&mut self, device: &mut dyn GraphicsDevice, lut: Texture2D) -> Result<bool> {
        if self.brdf_lut.is_some() {
            lut.destroy(device)?;
            return Ok(false);
        }
        self.brdf_lut = Some(lut);
        Ok(true)
    }

    /// Free every cached program and texture
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        for (_, mut shader) in self.shaders.drain() {
            shader.destroy(device);
        }
        if let Some(lut) = self.brdf_lut.take() {
            lut.destroy(device)?;
        }
        self.placeholder_2d.destroy(device)?;
        self.placeholder_cube.destroy(device);
        Ok(())
    }
}

#[cfg(test)]
#[path = "resource_cache_tests.rs"]
mod tests;
