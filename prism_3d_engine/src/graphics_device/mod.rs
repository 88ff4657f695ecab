/// Graphics device module - GPU context trait and device-level types

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod buffer;
pub mod shader;
pub mod pipeline;
pub mod frame_buffer;
mod glsl_reflect;

// Recording device (no GPU required)
pub mod mock_graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use buffer::*;
pub use shader::*;
pub use pipeline::*;
pub use frame_buffer::*;
pub use mock_graphics_device::MockGraphicsDevice;
