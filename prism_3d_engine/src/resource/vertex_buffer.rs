/// GPU vertex data of one geometry: one device buffer per geometry buffer
/// plus the vertex array describing the enabled attributes.
///
/// A vertex buffer is shared by the submeshes of its mesh. It can only be
/// destroyed once no submesh references it any more.

use std::fmt;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::{engine_debug, engine_warn};
use crate::graphics_device::{BufferHandle, BufferTarget, BufferUsage, GraphicsDevice, VertexArrayHandle};
use crate::resource::{lock_state, AttributeSemantic, BufferedGeometry, ReferenceCounter, ResourceId};

const SOURCE: &str = "prism3d::VertexBuffer";

struct VertexBufferGpu {
    buffers: Vec<BufferHandle>,
    vertex_array: VertexArrayHandle,
}

pub struct VertexBuffer {
    id: ResourceId,
    vertex_count: u32,
    buffer_sizes: Vec<usize>,
    references: ReferenceCounter,
    gpu: Mutex<Option<VertexBufferGpu>>,
}

impl VertexBuffer {
    /// Upload every geometry buffer and build the vertex array
    pub fn new(device: &mut dyn GraphicsDevice, geometry: &BufferedGeometry) -> Result<Self> {
        if geometry.attribute(AttributeSemantic::Vertex).is_none() || geometry.vertex_count() == 0 {
            return Err(Error::MissingData("Geometry has no vertices.".to_string()).logged(SOURCE));
        }
        if let Some(attribute) = geometry
            .attributes
            .iter()
            .find(|a| a.enabled && a.buffer_index >= geometry.buffers.len())
        {
            return Err(Error::InvalidResource(format!(
                "attribute {:?} references missing buffer {}",
                attribute.semantic, attribute.buffer_index
            ))
            .logged(SOURCE));
        }

        let mut buffers = Vec::with_capacity(geometry.buffers.len());
        for data in &geometry.buffers {
            match device.create_buffer(BufferTarget::Vertex, data, BufferUsage::Static) {
                Ok(buffer) => buffers.push(buffer),
                Err(e) => {
                    buffers.into_iter().for_each(|b| device.delete_buffer(b));
                    return Err(e);
                }
            }
        }

        let bindings: Vec<_> = geometry
            .attributes
            .iter()
            .filter(|a| a.enabled)
            .map(|a| a.binding())
            .collect();
        let vertex_array = match device.create_vertex_array(&buffers, &bindings) {
            Ok(vertex_array) => vertex_array,
            Err(e) => {
                buffers.into_iter().for_each(|b| device.delete_buffer(b));
                return Err(e);
            }
        };

        let buffer = Self {
            id: ResourceId::next(),
            vertex_count: geometry.vertex_count() as u32,
            buffer_sizes: geometry.buffers.iter().map(|b| b.len()).collect(),
            references: ReferenceCounter::new(),
            gpu: Mutex::new(Some(VertexBufferGpu { buffers, vertex_array })),
        };
        engine_debug!(
            SOURCE,
            "Created vertex buffer {} ({} vertices, {} attributes)",
            buffer.id.value(),
            buffer.vertex_count,
            bindings.len()
        );
        Ok(buffer)
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn references(&self) -> &ReferenceCounter {
        &self.references
    }

    pub fn vertex_array(&self) -> Option<VertexArrayHandle> {
        self.gpu.lock().ok()?.as_ref().map(|gpu| gpu.vertex_array)
    }

    pub fn is_destroyed(&self) -> bool {
        self.vertex_array().is_none()
    }

    /// Bind the vertex array
    pub fn bind(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let gpu = lock_state(&self.gpu, SOURCE)?;
        let Some(gpu) = gpu.as_ref() else {
            return Err(self.destroyed_error());
        };
        device.bind_vertex_array(Some(gpu.vertex_array))
    }

    /// Overwrite the device buffers with new contents of the same layout
    pub fn update(&self, device: &mut dyn GraphicsDevice, geometry: &BufferedGeometry) -> Result<()> {
        let gpu = lock_state(&self.gpu, SOURCE)?;
        let Some(gpu) = gpu.as_ref() else {
            return Err(self.destroyed_error());
        };
        let sizes: Vec<usize> = geometry.buffers.iter().map(|b| b.len()).collect();
        if sizes != self.buffer_sizes {
            return Err(Error::InvalidResource(format!(
                "vertex buffer {} expects buffer sizes {:?}, got {:?}",
                self.id.value(),
                self.buffer_sizes,
                sizes
            ))
            .logged(SOURCE));
        }
        for (buffer, data) in gpu.buffers.iter().zip(&geometry.buffers) {
            device.update_buffer(*buffer, 0, data)?;
        }
        Ok(())
    }

    /// Free the device resources
    ///
    /// Returns `false` without touching anything while submeshes still
    /// reference the buffer, or if it was already destroyed.
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) -> Result<bool> {
        if self.references.is_referenced() {
            engine_warn!(
                SOURCE,
                "Can't destroy while still being referenced (vertex buffer {}, {} references)",
                self.id.value(),
                self.references.count()
            );
            return Ok(false);
        }
        let Some(gpu) = lock_state(&self.gpu, SOURCE)?.take() else {
            return Ok(false);
        };
        device.delete_vertex_array(gpu.vertex_array);
        for buffer in gpu.buffers {
            device.delete_buffer(buffer);
        }
        Ok(true)
    }

    fn destroyed_error(&self) -> Error {
        Error::InvalidResource(format!("vertex buffer {} was destroyed", self.id.value()))
    }
}

impl fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("id", &self.id)
            .field("vertex_count", &self.vertex_count)
            .field("references", &self.references.count())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
