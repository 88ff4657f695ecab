/// Named loose uniform of a linked program

use crate::error::Result;
use crate::graphics_device::{ActiveUniform, GraphicsDevice, ProgramHandle, UniformType, UniformValue};

/// A reflected loose uniform
///
/// Array uniforms are keyed without the `[0]` suffix the linker reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub uniform_type: UniformType,
    pub array_size: u32,
    pub location: u32,
}

impl Uniform {
    pub fn from_active(active: &ActiveUniform) -> Self {
        Self {
            name: Self::key(&active.name).to_string(),
            uniform_type: active.uniform_type,
            array_size: active.array_size,
            location: active.location,
        }
    }

    /// Lookup key of a uniform name (`lights[0]` and `lights` are the same uniform)
    pub fn key(name: &str) -> &str {
        name.strip_suffix("[0]").unwrap_or(name)
    }

    pub fn is_array(&self) -> bool {
        self.array_size > 1
    }

    /// Write the value through the device
    pub fn set(&self, device: &mut dyn GraphicsDevice, program: ProgramHandle, value: &UniformValue) -> Result<()> {
        device.set_uniform(program, self.location, value)
    }
}
