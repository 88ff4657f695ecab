/// Linked shader variant with reflected uniform tables
///
/// Built from a `ShaderSource`: the program is linked, every sampler
/// uniform is pointed at its texture unit and the link-time defaults are
/// written. Uniform writes go through an O(1) name lookup; names missing
/// from the program are reported once and otherwise ignored.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::{engine_debug, engine_warn};
use crate::graphics_device::{
    GraphicsDevice, ProgramHandle, TextureHandle, TextureTarget,
    UniformBlockInfo, UniformValue,
};
use crate::shader::{ShaderSource, SamplerBinding, Uniform};

/// Textures bound to every sampler unit when a variant is activated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderTextures {
    pub texture_2d: TextureHandle,
    pub cube_map: TextureHandle,
}

impl PlaceholderTextures {
    pub fn for_target(&self, target: TextureTarget) -> TextureHandle {
        match target {
            TextureTarget::CubeMap => self.cube_map,
            _ => self.texture_2d,
        }
    }
}

#[derive(Debug)]
pub struct Shader {
    name: &'static str,
    program: Option<ProgramHandle>,
    uniforms: FxHashMap<String, Uniform>,
    blocks: FxHashMap<String, UniformBlockInfo>,
    samplers: &'static [SamplerBinding],
    reported_unknown: FxHashSet<String>,
}

impl Shader {
    /// Link a variant and apply its sampler units and defaults
    pub fn new(device: &mut dyn GraphicsDevice, source: &'static ShaderSource) -> Result<Self> {
        let (program, reflection) = device
            .create_program(source.vertex, source.fragment)
            .map_err(|e| Error::InitializationFailed(format!("shader '{}': {}", source.name, e)).logged("prism3d::Shader"))?;

        let uniforms = reflection
            .uniforms
            .iter()
            .map(|active| {
                let uniform = Uniform::from_active(active);
                (uniform.name.clone(), uniform)
            })
            .collect();
        let blocks = reflection
            .blocks
            .into_iter()
            .map(|block| (block.name.clone(), block))
            .collect();

        let mut shader = Self {
            name: source.name,
            program: Some(program),
            uniforms,
            blocks,
            samplers: source.samplers,
            reported_unknown: FxHashSet::default(),
        };

        device.use_program(Some(program))?;
        for sampler in source.samplers {
            shader.set_uniform(device, sampler.uniform, UniformValue::Int(sampler.unit as i32))?;
        }
        for (name, value) in source.defaults {
            shader.set_uniform(device, name, UniformValue::from(*value))?;
        }

        engine_debug!(
            "prism3d::Shader",
            "Linked shader '{}' ({} uniforms, {} blocks)",
            shader.name,
            shader.uniforms.len(),
            shader.blocks.len()
        );
        Ok(shader)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    pub fn samplers(&self) -> &'static [SamplerBinding] {
        self.samplers
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(Uniform::key(name))
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniform(name).is_some()
    }

    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    pub fn block(&self, name: &str) -> Option<&UniformBlockInfo> {
        self.blocks.get(name)
    }

    /// Route each named block the program declares to its binding point
    pub fn bind_blocks(&self, device: &mut dyn GraphicsDevice, bindings: &[(&str, u32)]) -> Result<()> {
        let program = self.linked_program()?;
        for (name, binding) in bindings {
            if let Some(block) = self.blocks.get(*name) {
                device.uniform_block_binding(program, block.index, *binding)?;
            }
        }
        Ok(())
    }

    /// Make the program current and bind placeholders on every sampler unit
    pub fn activate(&self, device: &mut dyn GraphicsDevice, placeholders: &PlaceholderTextures) -> Result<()> {
        device.use_program(Some(self.linked_program()?))?;
        for sampler in self.samplers {
            device.bind_texture(sampler.unit, sampler.target, Some(placeholders.for_target(sampler.target)))?;
        }
        Ok(())
    }

    /// Write a loose uniform of this (current) program
    ///
    /// Unknown names log a warning on first use and are ignored.
    pub fn set_uniform(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<()> {
        let program = self.linked_program()?;
        let Some(uniform) = self.uniforms.get(Uniform::key(name)) else {
            if self.reported_unknown.insert(name.to_string()) {
                engine_warn!(
                    "prism3d::Shader",
                    "Uniform '{}' not found in shader '{}'",
                    name,
                    self.name
                );
            }
            return Ok(());
        };
        uniform.set(device, program, &value.into())
    }

    /// Number of distinct unknown names reported so far
    pub fn unknown_uniform_count(&self) -> usize {
        self.reported_unknown.len()
    }

    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(program) = self.program.take() {
            device.delete_program(program);
        }
    }

    fn linked_program(&self) -> Result<ProgramHandle> {
        self.program
            .ok_or_else(|| Error::InvalidResource(format!("shader '{}' was destroyed", self.name)))
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
