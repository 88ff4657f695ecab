//! Drawable GPU meshes.
//!
//! A `Mesh` owns the vertex and index buffers built from one geometry and
//! splits them into `SubMesh` ranges, one per geometry group.
//!
//! # Hierarchy
//!
//! ```text
//! Mesh
//! ├── vertex_buffer (Arc, owned)
//! ├── index_buffer  (Arc, owned, optional)
//! └── submeshes
//!     ├── SubMesh { material_index: 0, offset: 0,   count: 360 }
//!     └── SubMesh { material_index: 1, offset: 360, count: 96 }
//! ```
//!
//! Submeshes hold shared references to the mesh buffers and count
//! themselves on the buffers' reference counters. The buffers refuse
//! destruction until every submesh has been destroyed, which
//! `Mesh::destroy` does first.

use std::sync::Arc;

use crate::error::Result;
use crate::engine_debug;
use crate::graphics_device::{DrawMode, GraphicsDevice};
use crate::material::Material;
use crate::renderer::Renderer;
use crate::resource::{BufferedGeometry, IndexBuffer, VertexBuffer};

// ============================================================================
// SUBMESH
// ============================================================================

/// Element range of a mesh drawn with one material slot
#[derive(Debug)]
pub struct SubMesh {
    material_index: usize,
    /// First element (index for indexed meshes, vertex otherwise)
    offset: u32,
    count: u32,
    vertex_buffer: Arc<VertexBuffer>,
    index_buffer: Option<Arc<IndexBuffer>>,
    released: bool,
}

impl SubMesh {
    /// Create a range and take a reference on each buffer
    pub fn new(
        material_index: usize,
        offset: u32,
        count: u32,
        vertex_buffer: Arc<VertexBuffer>,
        index_buffer: Option<Arc<IndexBuffer>>,
    ) -> Self {
        vertex_buffer.references().increment();
        if let Some(index_buffer) = &index_buffer {
            index_buffer.references().increment();
        }
        Self {
            material_index,
            offset,
            count,
            vertex_buffer,
            index_buffer,
            released: false,
        }
    }

    pub fn material_index(&self) -> usize {
        self.material_index
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_deref()
    }

    /// Release the buffer references; later calls do nothing
    pub fn destroy(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.vertex_buffer.references().decrement()?;
        if let Some(index_buffer) = &self.index_buffer {
            index_buffer.references().decrement()?;
        }
        Ok(())
    }

    pub fn draw(&self, renderer: &mut Renderer, mode: DrawMode, material: Option<&dyn Material>) -> Result<()> {
        renderer.draw(
            mode,
            self.count,
            self.offset,
            self.index_buffer(),
            &self.vertex_buffer,
            material,
        )
    }
}

// ============================================================================
// MESH
// ============================================================================

#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: Arc<VertexBuffer>,
    index_buffer: Option<Arc<IndexBuffer>>,
    submeshes: Vec<SubMesh>,
    draw_mode: DrawMode,
}

impl Mesh {
    /// Upload a geometry and split it into submeshes
    ///
    /// A geometry without groups becomes a single submesh covering every
    /// index (or every vertex) with material slot 0.
    pub fn new(device: &mut dyn GraphicsDevice, geometry: &BufferedGeometry) -> Result<Self> {
        let index_buffer = match geometry.index {
            Some(_) => Some(Arc::new(IndexBuffer::new(device, geometry)?)),
            None => None,
        };
        let vertex_buffer = match VertexBuffer::new(device, geometry) {
            Ok(vertex_buffer) => Arc::new(vertex_buffer),
            Err(e) => {
                if let Some(index_buffer) = &index_buffer {
                    index_buffer.destroy(device)?;
                }
                return Err(e);
            }
        };

        let submeshes = if geometry.groups.is_empty() {
            vec![SubMesh::new(
                0,
                0,
                geometry.draw_count() as u32,
                vertex_buffer.clone(),
                index_buffer.clone(),
            )]
        } else {
            geometry
                .groups
                .iter()
                .map(|group| {
                    SubMesh::new(
                        group.material_index,
                        group.offset,
                        group.count,
                        vertex_buffer.clone(),
                        index_buffer.clone(),
                    )
                })
                .collect()
        };

        engine_debug!(
            "prism3d::Mesh",
            "Created mesh ({} submeshes, {} elements)",
            submeshes.len(),
            submeshes.iter().map(|s| s.count).sum::<u32>()
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            submeshes,
            draw_mode: geometry.draw_mode,
        })
    }

    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_deref()
    }

    pub fn submeshes(&self) -> &[SubMesh] {
        &self.submeshes
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn set_draw_mode(&mut self, draw_mode: DrawMode) {
        self.draw_mode = draw_mode;
    }

    /// Total elements across all submeshes
    pub fn count(&self) -> u32 {
        self.submeshes.iter().map(|s| s.count).sum()
    }

    /// Draw every submesh range in one call
    pub fn draw(&self, renderer: &mut Renderer, material: Option<&dyn Material>) -> Result<()> {
        renderer.draw(
            self.draw_mode,
            self.count(),
            0,
            self.index_buffer(),
            &self.vertex_buffer,
            material,
        )
    }

    /// Replace the vertex data in place (same buffer sizes)
    pub fn update_geometry_buffer(&self, device: &mut dyn GraphicsDevice, geometry: &BufferedGeometry) -> Result<()> {
        self.vertex_buffer.update(device, geometry)
    }

    /// Release the submeshes then free the buffers
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        for submesh in &mut self.submeshes {
            submesh.destroy()?;
        }
        self.submeshes.clear();
        if let Some(index_buffer) = &self.index_buffer {
            index_buffer.destroy(device)?;
        }
        self.vertex_buffer.destroy(device)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
