/// Unit tests for MockGraphicsDevice
///
/// Tests object bookkeeping, bound state tracking, reflection and
/// framebuffer completeness of the recording device.

use crate::graphics_device::mock_graphics_device::*;
use crate::graphics_device::{
    GraphicsDevice, DeviceCapabilities, lock_device,
    BufferTarget, BufferUsage, IndexType, VertexAttributeBinding, ComponentType,
    TextureDesc, TextureFormat, TextureImageTarget, TextureTarget, CubeFace,
    Attachment, FramebufferStatus, RenderbufferFormat,
    DrawMode, Viewport, UniformValue, UniformType,
};
use crate::error::Error;

const VERTEX: &str = "layout(std140) uniform ubo_per_model { mat4 mvp; };\nvoid main() {}";
const FRAGMENT: &str = "uniform float u_gamma;\nuniform sampler2D u_texture;\nvoid main() {}";

fn program(device: &mut MockGraphicsDevice) -> crate::graphics_device::ProgramHandle {
    device.create_program(VERTEX, FRAGMENT).unwrap().0
}

// ============================================================================
// Buffer Tests
// ============================================================================

#[test]
fn test_mock_buffer_create_update_delete() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device.create_buffer(BufferTarget::Vertex, &[0u8; 8], BufferUsage::Static).unwrap();
    assert_eq!(device.buffer_count(), 1);

    device.update_buffer(buffer, 4, &[1, 2, 3, 4]).unwrap();
    assert_eq!(device.buffer(buffer).unwrap().data, vec![0, 0, 0, 0, 1, 2, 3, 4]);

    device.delete_buffer(buffer);
    assert_eq!(device.buffer_count(), 0);
    assert!(device.update_buffer(buffer, 0, &[1]).is_err());
}

#[test]
fn test_mock_uniform_buffer_binding() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device.create_buffer(BufferTarget::Uniform, &[0u8; 64], BufferUsage::Dynamic).unwrap();
    device.bind_uniform_buffer_base(1, buffer).unwrap();
    assert_eq!(device.uniform_buffer_binding(1), Some(buffer));
    assert_eq!(device.uniform_buffer_binding(0), None);
}

#[test]
fn test_mock_vertex_array_validates_slots() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device.create_buffer(BufferTarget::Vertex, &[0u8; 36], BufferUsage::Static).unwrap();
    let attribute = VertexAttributeBinding {
        location: 0,
        buffer_slot: 1,
        components: 3,
        component_type: ComponentType::F32,
        normalized: false,
        stride: 0,
        offset: 0,
    };
    assert!(device.create_vertex_array(&[buffer], &[attribute]).is_err());

    let good = VertexAttributeBinding { buffer_slot: 0, ..attribute };
    let vao = device.create_vertex_array(&[buffer], &[good]).unwrap();
    assert_eq!(device.vertex_array(vao).unwrap().attributes.len(), 1);
}

// ============================================================================
// Program Tests
// ============================================================================

#[test]
fn test_mock_program_reflection() {
    let mut device = MockGraphicsDevice::new();
    let (handle, reflection) = device.create_program(VERTEX, FRAGMENT).unwrap();
    assert_eq!(reflection.uniforms.len(), 2);
    assert_eq!(reflection.block("ubo_per_model").unwrap().data_size, 64);
    assert_eq!(device.program(handle).unwrap().reflection, reflection);
}

#[test]
fn test_mock_program_link_failure() {
    let mut device = MockGraphicsDevice::new();
    let result = device.create_program("uniform float x;", FRAGMENT);
    assert!(matches!(result, Err(Error::BackendError(_))));
    assert_eq!(device.program_count(), 0);
}

#[test]
fn test_mock_set_uniform_type_checked() {
    let mut device = MockGraphicsDevice::new();
    let handle = program(&mut device);
    let gamma = device.program(handle).unwrap().reflection.uniform("u_gamma").unwrap().location;

    device.set_uniform(handle, gamma, &UniformValue::Float(2.2)).unwrap();
    assert_eq!(device.uniform_value(handle, "u_gamma"), Some(&UniformValue::Float(2.2)));

    assert!(device.set_uniform(handle, gamma, &UniformValue::Mat4(glam::Mat4::IDENTITY)).is_err());
    assert!(device.set_uniform(handle, 99, &UniformValue::Float(1.0)).is_err());
}

#[test]
fn test_mock_sampler_accepts_int() {
    let mut device = MockGraphicsDevice::new();
    let handle = program(&mut device);
    let uniform = device.program(handle).unwrap().reflection.uniform("u_texture").unwrap().clone();
    assert_eq!(uniform.uniform_type, UniformType::Sampler2D);
    device.set_uniform(handle, uniform.location, &UniformValue::Int(3)).unwrap();
}

// ============================================================================
// Texture Tests
// ============================================================================

#[test]
fn test_mock_texture_upload_validates_size() {
    let mut device = MockGraphicsDevice::new();
    let texture = device.create_texture(&TextureDesc::texture_2d(2, 2, TextureFormat::Rgba8)).unwrap();

    assert!(device.upload_texture(texture, TextureImageTarget::Texture2D, 0, 2, 2, Some(&[0u8; 15])).is_err());
    device.upload_texture(texture, TextureImageTarget::Texture2D, 0, 2, 2, Some(&[0u8; 16])).unwrap();
    assert_eq!(device.texture(texture).unwrap().image_size(TextureImageTarget::Texture2D, 0), Some((2, 2)));
}

#[test]
fn test_mock_texture_rejects_face_on_2d() {
    let mut device = MockGraphicsDevice::new();
    let texture = device.create_texture(&TextureDesc::texture_2d(2, 2, TextureFormat::Rgba8)).unwrap();
    let face = TextureImageTarget::CubeFace(CubeFace::PositiveX);
    assert!(device.upload_texture(texture, face, 0, 2, 2, None).is_err());
}

#[test]
fn test_mock_cube_map_size_limit() {
    let caps = DeviceCapabilities { max_cube_map_size: 1024, ..DeviceCapabilities::default() };
    let mut device = MockGraphicsDevice::with_capabilities(caps);
    assert!(device.create_texture(&TextureDesc::cube_map(2048, TextureFormat::Rgba16F)).is_err());
    assert!(device.create_texture(&TextureDesc::cube_map(1024, TextureFormat::Rgba16F)).is_ok());
}

#[test]
fn test_mock_unsupported_texture_target() {
    let mut device = MockGraphicsDevice::new();
    let mut desc = TextureDesc::texture_2d(4, 4, TextureFormat::Rgba8);
    desc.target = TextureTarget::Texture3D;
    assert!(matches!(device.create_texture(&desc), Err(Error::UnsupportedTextureTarget(_))));
}

#[test]
fn test_mock_generate_mipmaps_fills_chain() {
    let mut device = MockGraphicsDevice::new();
    let texture = device.create_texture(&TextureDesc::cube_map(8, TextureFormat::Rgba16F)).unwrap();
    for face in CubeFace::ALL {
        device.upload_texture(texture, TextureImageTarget::CubeFace(face), 0, 8, 8, None).unwrap();
    }
    device.generate_mipmaps(texture).unwrap();

    let mock = device.texture(texture).unwrap();
    assert!(mock.mipmaps_generated);
    let face = TextureImageTarget::CubeFace(CubeFace::NegativeZ);
    assert_eq!(mock.level_count(face), 4);
    assert_eq!(mock.image_size(face, 3), Some((1, 1)));
}

#[test]
fn test_mock_bind_texture_checks_target() {
    let mut device = MockGraphicsDevice::new();
    let texture = device.create_texture(&TextureDesc::cube_map(4, TextureFormat::Rgba8)).unwrap();
    assert!(device.bind_texture(0, TextureTarget::Texture2D, Some(texture)).is_err());
    device.bind_texture(0, TextureTarget::CubeMap, Some(texture)).unwrap();
    assert_eq!(device.bound_texture(0), Some(texture));

    device.delete_texture(texture);
    assert_eq!(device.bound_texture(0), None);
}

// ============================================================================
// Framebuffer Tests
// ============================================================================

#[test]
fn test_mock_framebuffer_completeness() {
    let mut device = MockGraphicsDevice::new();
    let framebuffer = device.create_framebuffer().unwrap();
    assert_eq!(device.framebuffer_status(framebuffer), FramebufferStatus::MissingAttachment);

    let texture = device.create_texture(&TextureDesc::texture_2d(16, 16, TextureFormat::Rgba8)).unwrap();
    device.attach_texture(framebuffer, Attachment::Color(0), TextureImageTarget::Texture2D, texture, 0).unwrap();
    assert_eq!(device.framebuffer_status(framebuffer), FramebufferStatus::IncompleteAttachment);

    device.upload_texture(texture, TextureImageTarget::Texture2D, 0, 16, 16, None).unwrap();
    let depth = device.create_renderbuffer(RenderbufferFormat::Depth24, 8, 8).unwrap();
    device.attach_renderbuffer(framebuffer, Attachment::Depth, depth).unwrap();
    assert_eq!(device.framebuffer_status(framebuffer), FramebufferStatus::IncompleteDimensions);

    device.resize_renderbuffer(depth, RenderbufferFormat::Depth24, 16, 16).unwrap();
    assert!(device.framebuffer_status(framebuffer).is_complete());

    device.set_force_incomplete_framebuffers(true);
    assert!(!device.framebuffer_status(framebuffer).is_complete());
}

#[test]
fn test_mock_float_color_attachment_requires_capability() {
    let caps = DeviceCapabilities { color_buffer_float: false, ..DeviceCapabilities::default() };
    let mut device = MockGraphicsDevice::with_capabilities(caps);
    let framebuffer = device.create_framebuffer().unwrap();
    let texture = device.create_texture(&TextureDesc::texture_2d(4, 4, TextureFormat::Rgba16F)).unwrap();
    device.upload_texture(texture, TextureImageTarget::Texture2D, 0, 4, 4, None).unwrap();
    device.attach_texture(framebuffer, Attachment::Color(0), TextureImageTarget::Texture2D, texture, 0).unwrap();
    assert_eq!(device.framebuffer_status(framebuffer), FramebufferStatus::Unsupported);
}

// ============================================================================
// Draw Tests
// ============================================================================

#[test]
fn test_mock_draw_records_state() {
    let mut device = MockGraphicsDevice::new();
    let handle = program(&mut device);
    let index = device.create_buffer(BufferTarget::Index, &[0u8; 12], BufferUsage::Static).unwrap();

    assert!(device.draw_arrays(DrawMode::Triangles, 0, 3).is_err());
    device.use_program(Some(handle)).unwrap();
    assert!(device.draw_elements(DrawMode::Triangles, 6, IndexType::U16, 0).is_err());

    device.bind_index_buffer(Some(index)).unwrap();
    device.set_viewport(Viewport::full(64, 32));
    device.draw_elements(DrawMode::Triangles, 6, IndexType::U16, 4).unwrap();

    assert_eq!(device.draws.len(), 1);
    let draw = &device.draws[0];
    assert_eq!(draw.count, 6);
    assert_eq!(draw.offset, 4);
    assert_eq!(draw.index_type, Some(IndexType::U16));
    assert_eq!(draw.program, Some(handle));
    assert_eq!(draw.viewport, Viewport::full(64, 32));
    assert_eq!(device.count_commands("draw_elements"), 2);
}

#[test]
fn test_mock_shared_coerces_to_trait_object() {
    let (concrete, shared) = MockGraphicsDevice::new().shared();
    {
        let mut device = lock_device(&shared).unwrap();
        device.create_buffer(BufferTarget::Vertex, &[0u8; 4], BufferUsage::Static).unwrap();
    }
    assert_eq!(concrete.lock().unwrap().buffer_count(), 1);
}
