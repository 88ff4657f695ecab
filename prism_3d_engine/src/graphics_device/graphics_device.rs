/// GraphicsDevice trait - the GPU rasterization context
///
/// A GL-style immediate context: objects are created and addressed through
/// typed handles, state is set with explicit calls and draws are issued
/// against the currently bound program, vertex array and framebuffer.
///
/// The device is shared by the renderer and every resource object as a
/// `SharedGraphicsDevice` and accessed from a single control thread.

use std::sync::{Arc, Mutex, MutexGuard};
use slotmap::new_key_type;

use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferTarget, BufferUsage, IndexType, VertexAttributeBinding,
    TextureDesc, TextureImageTarget, TextureTarget,
    Attachment, FramebufferStatus, RenderbufferFormat,
    DrawMode, CullFace, ClearFlags, Viewport, PolygonOffset,
    ProgramReflection, UniformValue,
};

// ===== HANDLES =====

new_key_type! {
    /// GPU buffer object
    pub struct BufferHandle;
    /// GPU texture object
    pub struct TextureHandle;
    /// Linked shader program
    pub struct ProgramHandle;
    /// Framebuffer object
    pub struct FramebufferHandle;
    /// Renderbuffer object
    pub struct RenderbufferHandle;
    /// Vertex array object
    pub struct VertexArrayHandle;
}

// ===== CAPABILITIES =====

/// Limits and optional features reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Largest supported cube map face size
    pub max_cube_map_size: u32,
    /// Largest supported 2D texture size
    pub max_texture_size: u32,
    /// Number of texture units available to a fragment shader
    pub max_texture_units: u32,
    /// Linear filtering of float textures (OES_texture_float_linear)
    pub float_linear: bool,
    /// Rendering into float color attachments (EXT_color_buffer_float)
    pub color_buffer_float: bool,
    /// Depth compare sampling (hardware PCF)
    pub depth_compare: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_cube_map_size: 4096,
            max_texture_size: 8192,
            max_texture_units: 16,
            float_linear: true,
            color_buffer_float: true,
            depth_compare: true,
        }
    }
}

// ===== SHARED DEVICE =====

/// Device shared between the renderer and resource objects
pub type SharedGraphicsDevice = Arc<Mutex<dyn GraphicsDevice>>;

/// Lock the shared device, reporting poisoning as a backend error
pub fn lock_device(device: &SharedGraphicsDevice) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
    device
        .lock()
        .map_err(|_| Error::BackendError("GraphicsDevice lock poisoned".to_string()))
}

// ===== GRAPHICS DEVICE TRAIT =====

/// GPU context trait
///
/// Implemented by backend-specific devices. `MockGraphicsDevice` records
/// every call and is used for headless operation and tests.
pub trait GraphicsDevice: Send + Sync {
    /// Device limits and optional features
    fn capabilities(&self) -> DeviceCapabilities;

    // ----- buffers -----

    /// Create a buffer and upload its initial contents
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<BufferHandle>;

    /// Overwrite part of a buffer
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> Result<()>;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Bind a uniform buffer to an indexed binding point
    fn bind_uniform_buffer_base(&mut self, binding: u32, buffer: BufferHandle) -> Result<()>;

    /// Create a vertex array over `buffers` with the given enabled attributes
    fn create_vertex_array(
        &mut self,
        buffers: &[BufferHandle],
        attributes: &[VertexAttributeBinding],
    ) -> Result<VertexArrayHandle>;

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<()>;

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Bind the element buffer used by `draw_elements`
    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()>;

    // ----- programs -----

    /// Compile and link a program, returning its uniform reflection
    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<(ProgramHandle, ProgramReflection)>;

    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<()>;

    fn delete_program(&mut self, program: ProgramHandle);

    /// Write a loose uniform at a reflected location
    fn set_uniform(&mut self, program: ProgramHandle, location: u32, value: &UniformValue) -> Result<()>;

    /// Route a program's uniform block to a buffer binding point
    fn uniform_block_binding(&mut self, program: ProgramHandle, block_index: u32, binding: u32) -> Result<()>;

    // ----- textures -----

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle>;

    /// Allocate (and optionally fill) one image of a texture
    ///
    /// `data` = None allocates storage only (render targets, bake outputs).
    fn upload_texture(
        &mut self,
        texture: TextureHandle,
        target: TextureImageTarget,
        level: u32,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> Result<()>;

    /// Build the mip chain from level 0
    fn generate_mipmaps(&mut self, texture: TextureHandle) -> Result<()>;

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureHandle>) -> Result<()>;

    fn delete_texture(&mut self, texture: TextureHandle);

    // ----- framebuffers -----

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle>;

    /// Bind a framebuffer (None = default framebuffer)
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> Result<()>;

    fn attach_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        attachment: Attachment,
        target: TextureImageTarget,
        texture: TextureHandle,
        level: u32,
    ) -> Result<()>;

    fn create_renderbuffer(&mut self, format: RenderbufferFormat, width: u32, height: u32) -> Result<RenderbufferHandle>;

    fn resize_renderbuffer(
        &mut self,
        renderbuffer: RenderbufferHandle,
        format: RenderbufferFormat,
        width: u32,
        height: u32,
    ) -> Result<()>;

    fn attach_renderbuffer(
        &mut self,
        framebuffer: FramebufferHandle,
        attachment: Attachment,
        renderbuffer: RenderbufferHandle,
    ) -> Result<()>;

    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> FramebufferStatus;

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle);

    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferHandle);

    // ----- fixed-function state -----

    fn set_viewport(&mut self, viewport: Viewport);

    /// Currently culled faces (None = culling disabled)
    fn cull_mode(&self) -> Option<CullFace>;

    fn set_cull_mode(&mut self, mode: Option<CullFace>);

    fn set_depth_test(&mut self, enabled: bool);

    fn set_polygon_offset(&mut self, offset: Option<PolygonOffset>);

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]);

    // ----- draws -----

    /// Draw `count` vertices of the bound vertex array from `first`
    fn draw_arrays(&mut self, mode: DrawMode, first: u32, count: u32) -> Result<()>;

    /// Draw `count` indices of the bound index buffer from `byte_offset`
    fn draw_elements(&mut self, mode: DrawMode, count: u32, index_type: IndexType, byte_offset: usize) -> Result<()>;
}
