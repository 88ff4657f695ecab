/// GPU index data of one geometry

use std::fmt;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::{engine_debug, engine_warn};
use crate::graphics_device::{BufferHandle, BufferTarget, BufferUsage, GraphicsDevice, IndexType};
use crate::resource::{lock_state, BufferedGeometry, ReferenceCounter, ResourceId};

const SOURCE: &str = "prism3d::IndexBuffer";

pub struct IndexBuffer {
    id: ResourceId,
    index_type: IndexType,
    index_count: u32,
    references: ReferenceCounter,
    buffer: Mutex<Option<BufferHandle>>,
}

impl IndexBuffer {
    pub fn new(device: &mut dyn GraphicsDevice, geometry: &BufferedGeometry) -> Result<Self> {
        let Some(index) = geometry.index.as_ref() else {
            return Err(Error::MissingData("Geometry has no indices.".to_string()).logged(SOURCE));
        };
        let buffer = device.create_buffer(BufferTarget::Index, index.as_bytes(), BufferUsage::Static)?;

        let index_buffer = Self {
            id: ResourceId::next(),
            index_type: index.index_type(),
            index_count: index.len() as u32,
            references: ReferenceCounter::new(),
            buffer: Mutex::new(Some(buffer)),
        };
        engine_debug!(
            SOURCE,
            "Created index buffer {} ({} x {:?})",
            index_buffer.id.value(),
            index_buffer.index_count,
            index_buffer.index_type
        );
        Ok(index_buffer)
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn references(&self) -> &ReferenceCounter {
        &self.references
    }

    pub fn buffer(&self) -> Option<BufferHandle> {
        *self.buffer.lock().ok()?
    }

    pub fn is_destroyed(&self) -> bool {
        self.buffer().is_none()
    }

    /// Byte offset of the element at `offset`
    pub fn byte_offset(&self, offset: u32) -> usize {
        offset as usize * self.index_type.size_bytes()
    }

    pub fn bind(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let Some(buffer) = *lock_state(&self.buffer, SOURCE)? else {
            return Err(Error::InvalidResource(format!(
                "index buffer {} was destroyed",
                self.id.value()
            )));
        };
        device.bind_index_buffer(Some(buffer))
    }

    /// Free the device buffer unless submeshes still reference it
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) -> Result<bool> {
        if self.references.is_referenced() {
            engine_warn!(
                SOURCE,
                "Can't destroy while still being referenced (index buffer {}, {} references)",
                self.id.value(),
                self.references.count()
            );
            return Ok(false);
        }
        let Some(buffer) = lock_state(&self.buffer, SOURCE)?.take() else {
            return Ok(false);
        };
        device.delete_buffer(buffer);
        Ok(true)
    }
}

impl fmt::Debug for IndexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexBuffer")
            .field("id", &self.id)
            .field("index_type", &self.index_type)
            .field("index_count", &self.index_count)
            .field("references", &self.references.count())
            .finish()
    }
}
