/// Mock graphics device (no GPU required)
///
/// Keeps slot-map backed records of every object it creates, tracks bound
/// state, and appends one entry per call to `commands`. Draw calls are also
/// captured as `DrawRecord`s with the state they were issued under.
///
/// Program reflection comes from parsing the GLSL stages, so
/// uniform names, locations and std140 block offsets match what the
/// sources declare.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::graphics_device::glsl_reflect;
use crate::graphics_device::{
    GraphicsDevice, DeviceCapabilities, SharedGraphicsDevice,
    BufferHandle, TextureHandle, ProgramHandle, FramebufferHandle,
    RenderbufferHandle, VertexArrayHandle,
    BufferTarget, BufferUsage, IndexType, VertexAttributeBinding,
    TextureDesc, TextureImageTarget, TextureTarget,
    Attachment, FramebufferStatus, RenderbufferFormat,
    DrawMode, CullFace, ClearFlags, Viewport, PolygonOffset,
    ProgramReflection, UniformValue,
};
use crate::engine_bail;

// ============================================================================
// Mock objects
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockBuffer {
    pub target: BufferTarget,
    pub usage: BufferUsage,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MockTexture {
    pub desc: TextureDesc,
    /// Allocated images: (image, level) -> (width, height)
    pub images: FxHashMap<(TextureImageTarget, u32), (u32, u32)>,
    /// Uploaded pixel data: (image, level) -> bytes
    pub data: FxHashMap<(TextureImageTarget, u32), Vec<u8>>,
    pub mipmaps_generated: bool,
}

impl MockTexture {
    /// Size of an allocated image
    pub fn image_size(&self, target: TextureImageTarget, level: u32) -> Option<(u32, u32)> {
        self.images.get(&(target, level)).copied()
    }

    /// Number of allocated mip levels of an image
    pub fn level_count(&self, target: TextureImageTarget) -> u32 {
        self.images.keys().filter(|(t, _)| *t == target).count() as u32
    }
}

#[derive(Debug, Clone)]
pub struct MockProgram {
    pub vertex_source: String,
    pub fragment_source: String,
    pub reflection: ProgramReflection,
    /// Loose uniform values by location
    pub uniform_values: FxHashMap<u32, UniformValue>,
    /// Block index -> binding point
    pub block_bindings: FxHashMap<u32, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAttachment {
    Texture {
        texture: TextureHandle,
        target: TextureImageTarget,
        level: u32,
    },
    Renderbuffer(RenderbufferHandle),
}

#[derive(Debug, Clone, Default)]
pub struct MockFramebuffer {
    pub attachments: FxHashMap<Attachment, MockAttachment>,
}

#[derive(Debug, Clone, Copy)]
pub struct MockRenderbuffer {
    pub format: RenderbufferFormat,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct MockVertexArray {
    pub buffers: Vec<BufferHandle>,
    pub attributes: Vec<VertexAttributeBinding>,
}

/// State captured at each draw call
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub mode: DrawMode,
    pub count: u32,
    /// Index byte offset (indexed) or first vertex (non-indexed)
    pub offset: usize,
    pub index_type: Option<IndexType>,
    pub program: Option<ProgramHandle>,
    pub vertex_array: Option<VertexArrayHandle>,
    pub index_buffer: Option<BufferHandle>,
    pub framebuffer: Option<FramebufferHandle>,
    pub viewport: Viewport,
    pub cull_mode: Option<CullFace>,
    pub polygon_offset: Option<PolygonOffset>,
    /// Texture bound on each unit at the time of the draw
    pub textures: Vec<(u32, TextureHandle)>,
}

impl DrawRecord {
    pub fn texture_at(&self, unit: u32) -> Option<TextureHandle> {
        self.textures.iter().find(|(u, _)| *u == unit).map(|(_, t)| *t)
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Recording graphics device that tracks created resources without GPU
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    /// One entry per device call, in call order
    pub commands: Vec<String>,
    /// Every draw call, in call order
    pub draws: Vec<DrawRecord>,

    capabilities: DeviceCapabilities,
    force_incomplete_framebuffers: bool,

    buffers: SlotMap<BufferHandle, MockBuffer>,
    textures: SlotMap<TextureHandle, MockTexture>,
    programs: SlotMap<ProgramHandle, MockProgram>,
    framebuffers: SlotMap<FramebufferHandle, MockFramebuffer>,
    renderbuffers: SlotMap<RenderbufferHandle, MockRenderbuffer>,
    vertex_arrays: SlotMap<VertexArrayHandle, MockVertexArray>,

    uniform_bindings: FxHashMap<u32, BufferHandle>,
    texture_units: FxHashMap<u32, (TextureTarget, TextureHandle)>,
    current_program: Option<ProgramHandle>,
    current_vertex_array: Option<VertexArrayHandle>,
    current_index_buffer: Option<BufferHandle>,
    current_framebuffer: Option<FramebufferHandle>,
    viewport: Viewport,
    cull_mode: Option<CullFace>,
    depth_test: bool,
    polygon_offset: Option<PolygonOffset>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device reporting the given capabilities
    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Wrap in the shared form while keeping a concrete handle for inspection
    pub fn shared(self) -> (Arc<Mutex<MockGraphicsDevice>>, SharedGraphicsDevice) {
        let concrete = Arc::new(Mutex::new(self));
        let shared: SharedGraphicsDevice = concrete.clone();
        (concrete, shared)
    }

    pub fn set_capabilities(&mut self, capabilities: DeviceCapabilities) {
        self.capabilities = capabilities;
    }

    /// Make every completeness check fail
    pub fn set_force_incomplete_framebuffers(&mut self, force: bool) {
        self.force_incomplete_framebuffers = force;
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    /// Number of recorded commands starting with `prefix`
    pub fn count_commands(&self, prefix: &str) -> usize {
        self.commands.iter().filter(|c| c.starts_with(prefix)).count()
    }

    // ----- inspection -----

    pub fn buffer(&self, handle: BufferHandle) -> Option<&MockBuffer> {
        self.buffers.get(handle)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&MockTexture> {
        self.textures.get(handle)
    }

    pub fn program(&self, handle: ProgramHandle) -> Option<&MockProgram> {
        self.programs.get(handle)
    }

    pub fn framebuffer(&self, handle: FramebufferHandle) -> Option<&MockFramebuffer> {
        self.framebuffers.get(handle)
    }

    pub fn renderbuffer(&self, handle: RenderbufferHandle) -> Option<&MockRenderbuffer> {
        self.renderbuffers.get(handle)
    }

    pub fn vertex_array(&self, handle: VertexArrayHandle) -> Option<&MockVertexArray> {
        self.vertex_arrays.get(handle)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn renderbuffer_count(&self) -> usize {
        self.renderbuffers.len()
    }

    pub fn vertex_array_count(&self) -> usize {
        self.vertex_arrays.len()
    }

    /// Texture currently bound on a unit
    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.texture_units.get(&unit).map(|(_, texture)| *texture)
    }

    /// Buffer bound to a uniform binding point
    pub fn uniform_buffer_binding(&self, binding: u32) -> Option<BufferHandle> {
        self.uniform_bindings.get(&binding).copied()
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub fn current_vertex_array(&self) -> Option<VertexArrayHandle> {
        self.current_vertex_array
    }

    pub fn current_index_buffer(&self) -> Option<BufferHandle> {
        self.current_index_buffer
    }

    pub fn current_framebuffer(&self) -> Option<FramebufferHandle> {
        self.current_framebuffer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    pub fn polygon_offset(&self) -> Option<PolygonOffset> {
        self.polygon_offset
    }

    /// Value last written to a named loose uniform of a program
    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<&UniformValue> {
        let program = self.programs.get(program)?;
        let location = program.reflection.uniform(name)?.location;
        program.uniform_values.get(&location)
    }

    fn attachment_size(&self, attachment: &MockAttachment) -> Option<(u32, u32)> {
        match attachment {
            MockAttachment::Texture { texture, target, level } => {
                self.textures.get(*texture)?.image_size(*target, *level)
            }
            MockAttachment::Renderbuffer(renderbuffer) => {
                let rb = self.renderbuffers.get(*renderbuffer)?;
                Some((rb.width, rb.height))
            }
        }
    }

    fn check_image_target(desc: &TextureDesc, target: TextureImageTarget) -> bool {
        matches!(
            (desc.target, target),
            (TextureTarget::Texture2D, TextureImageTarget::Texture2D)
                | (TextureTarget::CubeMap, TextureImageTarget::CubeFace(_))
        )
    }

    fn record_draw(&mut self, mode: DrawMode, count: u32, offset: usize, index_type: Option<IndexType>) {
        let mut textures: Vec<(u32, TextureHandle)> = self
            .texture_units
            .iter()
            .map(|(unit, (_, texture))| (*unit, *texture))
            .collect();
        textures.sort_by_key(|(unit, _)| *unit);
        self.draws.push(DrawRecord {
            mode,
            count,
            offset,
            index_type,
            program: self.current_program,
            vertex_array: self.current_vertex_array,
            index_buffer: self.current_index_buffer,
            framebuffer: self.current_framebuffer,
            viewport: self.viewport,
            cull_mode: self.cull_mode,
            polygon_offset: self.polygon_offset,
            textures,
        });
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    // ----- buffers -----

    fn create_buffer(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<BufferHandle> {
        self.commands.push(format!("create_buffer {:?} {}", target, data.len()));
        Ok(self.buffers.insert(MockBuffer { target, usage, data: data.to_vec() }))
    }

    fn update_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> Result<()> {
        self.commands.push(format!("update_buffer {}", data.len()));
        let Some(mock) = self.buffers.get_mut(buffer) else {
            engine_bail!("prism3d::MockGraphicsDevice", "update_buffer on deleted buffer");
        };
        let end = offset + data.len();
        if end > mock.data.len() {
            mock.data.resize(end, 0);
        }
        mock.data[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.commands.push("delete_buffer".to_string());
        self.buffers.remove(buffer);
        if self.current_index_buffer == Some(buffer) {
            self.current_index_buffer = None;
        }
    }

    fn bind_uniform_buffer_base(&mut self, binding: u32, buffer: BufferHandle) -> Result<()> {
        self.commands.push(format!("bind_uniform_buffer_base {}", binding));
        if !self.buffers.contains_key(buffer) {
            return Err(Error::InvalidResource("uniform buffer was deleted".to_string()));
        }
        self.uniform_bindings.insert(binding, buffer);
        Ok(())
    }

    fn create_vertex_array(
        &mut self,
        buffers: &[BufferHandle],
        attributes: &[VertexAttributeBinding],
    ) -> Result<VertexArrayHandle> {
        self.commands.push(format!("create_vertex_array {}", attributes.len()));
        for attribute in attributes {
            let Some(buffer) = buffers.get(attribute.buffer_slot) else {
                return Err(Error::InvalidResource(format!(
                    "attribute {} references missing buffer slot {}",
                    attribute.location, attribute.buffer_slot
                )));
            };
            if !self.buffers.contains_key(*buffer) {
                return Err(Error::InvalidResource("vertex buffer was deleted".to_string()));
            }
        }
        Ok(self.vertex_arrays.insert(MockVertexArray {
            buffers: buffers.to_vec(),
            attributes: attributes.to_vec(),
        }))
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<()> {
        self.commands.push("bind_vertex_array".to_string());
        if let Some(vao) = vertex_array {
            if !self.vertex_arrays.contains_key(vao) {
                return Err(Error::InvalidResource("vertex array was deleted".to_string()));
            }
        }
        self.current_vertex_array = vertex_array;
        Ok(())
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.commands.push("delete_vertex_array".to_string());
        self.vertex_arrays.remove(vertex_array);
        if self.current_vertex_array == Some(vertex_array) {
            self.current_vertex_array = None;
        }
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) -> Result<()> {
        self.commands.push("bind_index_buffer".to_string());
        if let Some(buffer) = buffer {
            if !self.buffers.contains_key(buffer) {
                return Err(Error::InvalidResource("index buffer was deleted".to_string()));
            }
        }
        self.current_index_buffer = buffer;
        Ok(())
    }

    // ----- programs -----

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<(ProgramHandle, ProgramReflection)> {
        self.commands.push("create_program".to_string());
        let reflection = glsl_reflect::reflect_program(vertex_source, fragment_source)?;
        let handle = self.programs.insert(MockProgram {
            vertex_source: vertex_source.to_string(),
            fragment_source: fragment_source.to_string(),
            reflection: reflection.clone(),
            uniform_values: FxHashMap::default(),
            block_bindings: FxHashMap::default(),
        });
        Ok((handle, reflection))
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<()> {
        self.commands.push("use_program".to_string());
        if let Some(program) = program {
            if !self.programs.contains_key(program) {
                return Err(Error::InvalidResource("program was deleted".to_string()));
            }
        }
        self.current_program = program;
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.commands.push("delete_program".to_string());
        self.programs.remove(program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn set_uniform(&mut self, program: ProgramHandle, location: u32, value: &UniformValue) -> Result<()> {
        let Some(mock) = self.programs.get_mut(program) else {
            return Err(Error::InvalidResource("set_uniform on deleted program".to_string()));
        };
        let Some(uniform) = mock.reflection.uniforms.iter().find(|u| u.location == location) else {
            return Err(Error::InvalidResource(format!("no uniform at location {}", location)));
        };
        if !value.is_compatible(uniform.uniform_type) {
            return Err(Error::InvalidResource(format!(
                "value {:?} does not match uniform '{}' of type {:?}",
                value, uniform.name, uniform.uniform_type
            )));
        }
        self.commands.push(format!("set_uniform {}", uniform.name));
        mock.uniform_values.insert(location, value.clone());
        Ok(())
    }

    fn uniform_block_binding(&mut self, program: ProgramHandle, block_index: u32, binding: u32) -> Result<()> {
        self.commands.push(format!("uniform_block_binding {} {}", block_index, binding));
        let Some(mock) = self.programs.get_mut(program) else {
            return Err(Error::InvalidResource("uniform_block_binding on deleted program".to_string()));
        };
        mock.block_bindings.insert(block_index, binding);
        Ok(())
    }

    // ----- textures -----

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        self.commands.push(format!("create_texture {} {}x{}", desc.target, desc.width, desc.height));
        match desc.target {
            TextureTarget::Texture2D => {
                if desc.width > self.capabilities.max_texture_size || desc.height > self.capabilities.max_texture_size {
                    return Err(Error::InvalidResource(format!(
                        "texture {}x{} exceeds max texture size {}",
                        desc.width, desc.height, self.capabilities.max_texture_size
                    )));
                }
            }
            TextureTarget::CubeMap => {
                if desc.width != desc.height {
                    return Err(Error::InvalidResource("cube map faces must be square".to_string()));
                }
                if desc.width > self.capabilities.max_cube_map_size {
                    return Err(Error::InvalidResource(format!(
                        "cube map size {} exceeds max cube map size {}",
                        desc.width, self.capabilities.max_cube_map_size
                    )));
                }
            }
            other => return Err(Error::UnsupportedTextureTarget(other.to_string())),
        }
        if desc.width == 0 || desc.height == 0 {
            return Err(Error::InvalidResource("texture has zero size".to_string()));
        }
        Ok(self.textures.insert(MockTexture {
            desc: desc.clone(),
            images: FxHashMap::default(),
            data: FxHashMap::default(),
            mipmaps_generated: false,
        }))
    }

    fn upload_texture(
        &mut self,
        texture: TextureHandle,
        target: TextureImageTarget,
        level: u32,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> Result<()> {
        self.commands.push(format!("upload_texture {:?} level={} {}x{}", target, level, width, height));
        let Some(mock) = self.textures.get_mut(texture) else {
            return Err(Error::InvalidResource("upload_texture on deleted texture".to_string()));
        };
        if !Self::check_image_target(&mock.desc, target) {
            return Err(Error::InvalidResource(format!(
                "image {:?} does not belong to a {} texture",
                target, mock.desc.target
            )));
        }
        if level >= mock.desc.mip_levels {
            return Err(Error::InvalidResource(format!(
                "mip level {} out of range ({} levels)",
                level, mock.desc.mip_levels
            )));
        }
        if let Some(bytes) = data {
            let expected = width as usize * height as usize * mock.desc.format.bytes_per_pixel();
            if bytes.len() != expected {
                return Err(Error::InvalidResource(format!(
                    "texture upload of {} bytes, expected {}",
                    bytes.len(),
                    expected
                )));
            }
            mock.data.insert((target, level), bytes.to_vec());
        }
        mock.images.insert((target, level), (width, height));
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> Result<()> {
        self.commands.push("generate_mipmaps".to_string());
        let Some(mock) = self.textures.get_mut(texture) else {
            return Err(Error::InvalidResource("generate_mipmaps on deleted texture".to_string()));
        };
        let images: Vec<TextureImageTarget> = match mock.desc.target {
            TextureTarget::CubeMap => crate::graphics_device::CubeFace::ALL
                .iter()
                .map(|face| TextureImageTarget::CubeFace(*face))
                .collect(),
            _ => vec![TextureImageTarget::Texture2D],
        };
        let level_count = 32 - mock.desc.width.max(mock.desc.height).leading_zeros();
        for image in images {
            let Some((width, height)) = mock.image_size(image, 0) else {
                return Err(Error::InvalidResource(format!("mip 0 of {:?} was never allocated", image)));
            };
            for level in 1..level_count {
                mock.images
                    .insert((image, level), ((width >> level).max(1), (height >> level).max(1)));
            }
        }
        mock.mipmaps_generated = true;
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureHandle>) -> Result<()> {
        self.commands.push(format!("bind_texture {} {}", unit, target));
        if unit >= self.capabilities.max_texture_units {
            return Err(Error::InvalidResource(format!(
                "texture unit {} exceeds {} units",
                unit, self.capabilities.max_texture_units
            )));
        }
        match texture {
            Some(texture) => {
                let Some(mock) = self.textures.get(texture) else {
                    return Err(Error::InvalidResource("bind_texture on deleted texture".to_string()));
                };
                if mock.desc.target != target {
                    return Err(Error::InvalidResource(format!(
                        "{} texture bound as {}",
                        mock.desc.target, target
                    )));
                }
                self.texture_units.insert(unit, (target, texture));
            }
            None => {
                self.texture_units.remove(&unit);
            }
        }
        Ok(())
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.commands.push("delete_texture".to_string());
        self.textures.remove(texture);
        self.texture_units.retain(|_, (_, bound)| *bound != texture);
    }

    // ----- framebuffers -----

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle> {
        self.commands.push("create_framebuffer".to_string());
        Ok(self.framebuffers.insert(MockFramebuffer::default()))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> Result<()> {
        self.commands.push("bind_framebuffer".to_string());
        if let Some(framebuffer) = framebuffer {
            if !self.framebuffers.contains_key(framebuffer) {
                return Err(Error::InvalidResource("framebuffer was deleted".to_string()));
            }
        }
        self.current_framebuffer = framebuffer;
        Ok(())
    }

    fn attach_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        attachment: Attachment,
        target: TextureImageTarget,
        texture: TextureHandle,
        level: u32,
    ) -> Result<()> {
        self.commands.push(format!("attach_texture {:?} {:?} level={}", attachment, target, level));
        let Some(mock_texture) = self.textures.get(texture) else {
            return Err(Error::InvalidResource("attach_texture with deleted texture".to_string()));
        };
        if !Self::check_image_target(&mock_texture.desc, target) {
            return Err(Error::InvalidResource(format!("image {:?} does not match texture target", target)));
        }
        let Some(mock) = self.framebuffers.get_mut(framebuffer) else {
            return Err(Error::InvalidResource("attach_texture on deleted framebuffer".to_string()));
        };
        mock.attachments.insert(attachment, MockAttachment::Texture { texture, target, level });
        Ok(())
    }

    fn create_renderbuffer(&mut self, format: RenderbufferFormat, width: u32, height: u32) -> Result<RenderbufferHandle> {
        self.commands.push(format!("create_renderbuffer {}x{}", width, height));
        Ok(self.renderbuffers.insert(MockRenderbuffer { format, width, height }))
    }

    fn resize_renderbuffer(
        &mut self,
        renderbuffer: RenderbufferHandle,
        format: RenderbufferFormat,
        width: u32,
        height: u32,
    ) -> Result<()> {
        self.commands.push(format!("resize_renderbuffer {}x{}", width, height));
        let Some(mock) = self.renderbuffers.get_mut(renderbuffer) else {
            return Err(Error::InvalidResource("resize_renderbuffer on deleted renderbuffer".to_string()));
        };
        *mock = MockRenderbuffer { format, width, height };
        Ok(())
    }

    fn attach_renderbuffer(
        &mut self,
        framebuffer: FramebufferHandle,
        attachment: Attachment,
        renderbuffer: RenderbufferHandle,
    ) -> Result<()> {
        self.commands.push(format!("attach_renderbuffer {:?}", attachment));
        if !self.renderbuffers.contains_key(renderbuffer) {
            return Err(Error::InvalidResource("attach_renderbuffer with deleted renderbuffer".to_string()));
        }
        let Some(mock) = self.framebuffers.get_mut(framebuffer) else {
            return Err(Error::InvalidResource("attach_renderbuffer on deleted framebuffer".to_string()));
        };
        mock.attachments.insert(attachment, MockAttachment::Renderbuffer(renderbuffer));
        Ok(())
    }

    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> FramebufferStatus {
        if self.force_incomplete_framebuffers {
            return FramebufferStatus::IncompleteAttachment;
        }
        let Some(mock) = self.framebuffers.get(framebuffer) else {
            return FramebufferStatus::MissingAttachment;
        };
        if mock.attachments.is_empty() {
            return FramebufferStatus::MissingAttachment;
        }

        let mut size: Option<(u32, u32)> = None;
        for (attachment, image) in &mock.attachments {
            let Some(image_size) = self.attachment_size(image) else {
                return FramebufferStatus::IncompleteAttachment;
            };
            if image_size.0 == 0 || image_size.1 == 0 {
                return FramebufferStatus::IncompleteAttachment;
            }
            if let (Attachment::Color(_), MockAttachment::Texture { texture, .. }) = (attachment, image) {
                let is_float = self
                    .textures
                    .get(*texture)
                    .map(|t| t.desc.format.is_float())
                    .unwrap_or(false);
                if is_float && !self.capabilities.color_buffer_float {
                    return FramebufferStatus::Unsupported;
                }
            }
            match size {
                None => size = Some(image_size),
                Some(existing) if existing != image_size => return FramebufferStatus::IncompleteDimensions,
                Some(_) => {}
            }
        }
        FramebufferStatus::Complete
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.commands.push("delete_framebuffer".to_string());
        self.framebuffers.remove(framebuffer);
        if self.current_framebuffer == Some(framebuffer) {
            self.current_framebuffer = None;
        }
    }

    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferHandle) {
        self.commands.push("delete_renderbuffer".to_string());
        self.renderbuffers.remove(renderbuffer);
    }

    // ----- fixed-function state -----

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(format!("set_viewport {}x{}", viewport.width, viewport.height));
        self.viewport = viewport;
    }

    fn cull_mode(&self) -> Option<CullFace> {
        self.cull_mode
    }

    fn set_cull_mode(&mut self, mode: Option<CullFace>) {
        self.commands.push(format!("set_cull_mode {:?}", mode));
        self.cull_mode = mode;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.commands.push(format!("set_depth_test {}", enabled));
        self.depth_test = enabled;
    }

    fn set_polygon_offset(&mut self, offset: Option<PolygonOffset>) {
        self.commands.push("set_polygon_offset".to_string());
        self.polygon_offset = offset;
    }

    fn clear(&mut self, flags: ClearFlags, _color: [f32; 4]) {
        self.commands.push(format!("clear {:?}", flags));
    }

    // ----- draws -----

    fn draw_arrays(&mut self, mode: DrawMode, first: u32, count: u32) -> Result<()> {
        self.commands.push(format!("draw_arrays {:?} {}", mode, count));
        if self.current_program.is_none() {
            return Err(Error::InvalidResource("draw_arrays without a program".to_string()));
        }
        self.record_draw(mode, count, first as usize, None);
        Ok(())
    }

    fn draw_elements(&mut self, mode: DrawMode, count: u32, index_type: IndexType, byte_offset: usize) -> Result<()> {
        self.commands.push(format!("draw_elements {:?} {}", mode, count));
        if self.current_program.is_none() {
            return Err(Error::InvalidResource("draw_elements without a program".to_string()));
        }
        if self.current_index_buffer.is_none() {
            return Err(Error::InvalidResource("draw_elements without an index buffer".to_string()));
        }
        self.record_draw(mode, count, byte_offset, Some(index_type));
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
