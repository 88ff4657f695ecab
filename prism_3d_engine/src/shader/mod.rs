/// Shader module - shader variants, uniform tables and uniform blocks

pub mod shader;
pub mod shader_source;
pub mod uniform;
pub mod uniform_buffer;

pub use shader::*;
pub use shader_source::{ShaderSource, SamplerBinding, ShaderDefault};
pub use uniform::*;
pub use uniform_buffer::*;
