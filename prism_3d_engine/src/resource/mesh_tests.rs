/// Unit tests for Mesh, SubMesh and the buffer reference rules
///
/// Uses MockGraphicsDevice for testing.

use super::*;
use crate::error::Error;
use crate::graphics_device::{IndexType, MockGraphicsDevice};
use crate::resource::AttributeSemantic;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn quad_geometry() -> BufferedGeometry {
    BufferedGeometry::new()
        .with_attribute(AttributeSemantic::Vertex, &[
            0.0, 0.0, 0.0,
            1.0, 0.0, 0.0,
            1.0, 1.0, 0.0,
            0.0, 1.0, 0.0,
        ])
        .with_attribute(AttributeSemantic::TexCoord, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
        .with_indices(&[0, 1, 2, 2, 3, 0])
}

// ============================================================================
// MESH CONSTRUCTION
// ============================================================================

#[test]
fn test_mesh_without_groups_has_single_submesh() {
    let mut device = MockGraphicsDevice::new();
    let mesh = Mesh::new(&mut device, &quad_geometry()).unwrap();

    assert_eq!(mesh.submeshes().len(), 1);
    assert_eq!(mesh.count(), 6);
    assert_eq!(mesh.submeshes()[0].material_index(), 0);
    assert_eq!(mesh.draw_mode(), DrawMode::Triangles);
    assert_eq!(mesh.vertex_buffer().references().count(), 1);
    assert_eq!(mesh.index_buffer().unwrap().references().count(), 1);
    assert_eq!(mesh.index_buffer().unwrap().index_type(), IndexType::U16);

    // two attribute buffers + one index buffer
    assert_eq!(device.buffer_count(), 3);
    assert_eq!(device.vertex_array_count(), 1);
}

#[test]
fn test_mesh_groups_become_submeshes() {
    let mut device = MockGraphicsDevice::new();
    let geometry = quad_geometry().with_group(0, 3, 0).with_group(3, 3, 1);
    let mesh = Mesh::new(&mut device, &geometry).unwrap();

    assert_eq!(mesh.submeshes().len(), 2);
    assert_eq!(mesh.count(), 6);
    assert_eq!(mesh.submeshes()[1].offset(), 3);
    assert_eq!(mesh.submeshes()[1].material_index(), 1);
    assert_eq!(mesh.vertex_buffer().references().count(), 2);
}

#[test]
fn test_non_indexed_count_is_vertex_count() {
    let mut device = MockGraphicsDevice::new();
    let geometry = BufferedGeometry::capture_box();
    let mesh = Mesh::new(&mut device, &geometry).unwrap();
    assert!(mesh.index_buffer().is_none());
    assert_eq!(mesh.count(), 36);
}

#[test]
fn test_missing_vertices_is_fatal() {
    let mut device = MockGraphicsDevice::new();
    let geometry = BufferedGeometry::new().with_indices(&[0, 1, 2]);
    let err = Mesh::new(&mut device, &geometry).unwrap_err();
    assert!(matches!(err, Error::MissingData(_)));
    // the index buffer built first was released again
    assert_eq!(device.buffer_count(), 0);
}

#[test]
fn test_index_buffer_requires_indices() {
    let mut device = MockGraphicsDevice::new();
    let geometry = BufferedGeometry::capture_box();
    let err = IndexBuffer::new(&mut device, &geometry).unwrap_err();
    assert_eq!(err, Error::MissingData("Geometry has no indices.".to_string()));
}

// ============================================================================
// REFERENCE COUNTING
// ============================================================================

#[test]
fn test_destroy_referenced_buffer_is_noop() {
    let mut device = MockGraphicsDevice::new();
    let mesh = Mesh::new(&mut device, &quad_geometry()).unwrap();

    assert!(!mesh.vertex_buffer().destroy(&mut device).unwrap());
    assert!(!mesh.index_buffer().unwrap().destroy(&mut device).unwrap());
    assert!(!mesh.vertex_buffer().is_destroyed());
    assert_eq!(device.buffer_count(), 3);
}

#[test]
fn test_mesh_destroy_releases_everything() {
    let mut device = MockGraphicsDevice::new();
    let mut mesh = Mesh::new(&mut device, &quad_geometry().with_group(0, 3, 0).with_group(3, 3, 0)).unwrap();
    mesh.destroy(&mut device).unwrap();

    assert_eq!(mesh.vertex_buffer().references().count(), 0);
    assert!(mesh.vertex_buffer().is_destroyed());
    assert!(mesh.index_buffer().unwrap().is_destroyed());
    assert_eq!(device.buffer_count(), 0);
    assert_eq!(device.vertex_array_count(), 0);

    // second destroy is harmless
    mesh.destroy(&mut device).unwrap();
}

#[test]
fn test_submesh_destroy_is_idempotent() {
    let mut device = MockGraphicsDevice::new();
    let mesh = Mesh::new(&mut device, &quad_geometry()).unwrap();
    let vertex_buffer = mesh.vertex_buffer.clone();
    let mut extra = SubMesh::new(0, 0, 3, vertex_buffer.clone(), None);
    assert_eq!(vertex_buffer.references().count(), 2);

    extra.destroy().unwrap();
    extra.destroy().unwrap();
    assert_eq!(vertex_buffer.references().count(), 1);
}

#[test]
fn test_update_geometry_buffer() {
    let mut device = MockGraphicsDevice::new();
    let geometry = BufferedGeometry::capture_box();
    let mesh = Mesh::new(&mut device, &geometry).unwrap();

    let moved = BufferedGeometry::new().with_attribute(AttributeSemantic::Vertex, &[0.5; 108]);
    mesh.update_geometry_buffer(&mut device, &moved).unwrap();
    assert!(device.count_commands("update_buffer") >= 1);

    let resized = BufferedGeometry::new().with_attribute(AttributeSemantic::Vertex, &[0.5; 9]);
    assert!(mesh.update_geometry_buffer(&mut device, &resized).is_err());
}

#[test]
fn test_bind_destroyed_buffer_fails() {
    let mut device = MockGraphicsDevice::new();
    let vertex_buffer = VertexBuffer::new(&mut device, &BufferedGeometry::capture_box()).unwrap();
    assert!(vertex_buffer.destroy(&mut device).unwrap());
    assert!(vertex_buffer.bind(&mut device).is_err());
    assert!(device.current_vertex_array().is_none());
}
