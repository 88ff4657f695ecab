/// std140 uniform block layout and CPU-side staging buffer
///
/// A `UniformBlockLayout` maps member names to their reflected byte
/// offsets. A `UniformBuffer` stages member writes into a byte array laid
/// out by that map and uploads the whole block in one call.
///
/// Multi-row values whose rows hold fewer than four components (scalar and
/// vec3 arrays, mat3) are written row by row at a 16-byte stride; every
/// other value is written contiguously.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::engine_warn;
use crate::graphics_device::{
    BlockMember, BufferHandle, BufferTarget, BufferUsage, GraphicsDevice,
    Std140Builder, UniformBlockInfo, UniformType, UniformValue,
};
use crate::shader::Uniform;

const STD140_ROW: usize = 16;

// ===== UNIFORM BLOCK LAYOUT =====

/// Member offsets of one uniform block
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlockLayout {
    name: String,
    size: usize,
    members: FxHashMap<String, BlockMember>,
}

impl UniformBlockLayout {
    /// Layout reported by the linker
    pub fn from_block(block: &UniformBlockInfo) -> Self {
        let members = block
            .members
            .iter()
            .map(|m| (Uniform::key(&m.name).to_string(), m.clone()))
            .collect();
        Self {
            name: block.name.clone(),
            size: block.data_size,
            members,
        }
    }

    /// Layout computed with std140 rules from a member list
    ///
    /// # Example
    ///
    /// ```
    /// use prism_3d_engine::prism3d::device::UniformType;
    /// use prism_3d_engine::prism3d::shader::UniformBlockLayout;
    ///
    /// let layout = UniformBlockLayout::std140("ubo_light", &[
    ///     ("color", UniformType::Vec3, None),
    ///     ("intensity", UniformType::Float, None),
    /// ]);
    /// assert_eq!(layout.member("intensity").unwrap().offset, 12);
    /// ```
    pub fn std140(name: &str, members: &[(&str, UniformType, Option<u32>)]) -> Self {
        let mut builder = Std140Builder::new();
        for (member, uniform_type, array_count) in members {
            builder.push(member, *uniform_type, *array_count);
        }
        let (members, size) = builder.finish();
        Self::from_block(&UniformBlockInfo {
            name: name.to_string(),
            index: 0,
            data_size: size,
            members,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn member(&self, name: &str) -> Option<&BlockMember> {
        self.members.get(Uniform::key(name))
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Member names sorted by offset
    pub fn member_names(&self) -> Vec<&str> {
        let mut members: Vec<&BlockMember> = self.members.values().collect();
        members.sort_by_key(|m| m.offset);
        members.iter().map(|m| Uniform::key(&m.name)).collect()
    }
}

// ===== UNIFORM BUFFER =====

/// Staged uniform block backed by a GPU buffer bound to a fixed binding point
#[derive(Debug)]
pub struct UniformBuffer {
    layout: UniformBlockLayout,
    binding: u32,
    data: Vec<u8>,
    buffer: Option<BufferHandle>,
    reported_unknown: FxHashSet<String>,
}

impl UniformBuffer {
    /// Allocate the GPU buffer (zero-filled) and bind it to `binding`
    pub fn new(device: &mut dyn GraphicsDevice, layout: UniformBlockLayout, binding: u32) -> Result<Self> {
        let data = vec![0u8; layout.size()];
        let buffer = device.create_buffer(BufferTarget::Uniform, &data, BufferUsage::Dynamic)?;
        device.bind_uniform_buffer_base(binding, buffer)?;
        Ok(Self {
            layout,
            binding,
            data,
            buffer: Some(buffer),
            reported_unknown: FxHashSet::default(),
        })
    }

    pub fn layout(&self) -> &UniformBlockLayout {
        &self.layout
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn buffer(&self) -> Option<BufferHandle> {
        self.buffer
    }

    /// Staged block contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Staged bytes of one member
    pub fn member_bytes(&self, name: &str) -> Option<&[u8]> {
        let member = self.layout.member(name)?;
        self.data.get(member.offset..member.offset + member.size)
    }

    /// Stage a member value
    ///
    /// Unknown names are ignored with a warning (once per name). A value of
    /// the wrong type or size is an error.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        let value = value.into();
        let Some(member) = self.layout.member(name) else {
            if self.reported_unknown.insert(name.to_string()) {
                engine_warn!(
                    "prism3d::UniformBuffer",
                    "Uniform '{}' not found in block '{}'",
                    name,
                    self.layout.name()
                );
            }
            return Ok(());
        };
        if !value.is_compatible(member.uniform_type) {
            return Err(Error::InvalidResource(format!(
                "value {:?} does not match block member '{}' of type {:?}",
                value, name, member.uniform_type
            )));
        }

        let offset = member.offset;
        let size = member.size;
        let words = value.words();
        let items_per_row = value.items_per_row();
        let rows = words.len() / items_per_row;

        if rows > 1 && items_per_row < 4 {
            if (rows - 1) * STD140_ROW + items_per_row * 4 > size {
                return Err(Error::InvalidResource(format!(
                    "{} rows written to block member '{}' of {} bytes",
                    rows, name, size
                )));
            }
            for (row, chunk) in words.chunks(items_per_row).enumerate() {
                let start = offset + row * STD140_ROW;
                let bytes: &[u8] = bytemuck::cast_slice(chunk);
                self.data[start..start + bytes.len()].copy_from_slice(bytes);
            }
        } else {
            let bytes: &[u8] = bytemuck::cast_slice(&words);
            if bytes.len() > size {
                return Err(Error::InvalidResource(format!(
                    "{} bytes written to block member '{}' of {} bytes",
                    bytes.len(),
                    name,
                    size
                )));
            }
            self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
        Ok(())
    }

    /// Upload the staged block and re-bind it to its binding point
    pub fn upload(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let Some(buffer) = self.buffer else {
            return Err(Error::InvalidResource(format!(
                "uniform block '{}' was destroyed",
                self.layout.name()
            )));
        };
        device.update_buffer(buffer, 0, &self.data)?;
        device.bind_uniform_buffer_base(self.binding, buffer)
    }

    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(buffer) = self.buffer.take() {
            device.delete_buffer(buffer);
        }
    }
}

#[cfg(test)]
#[path = "uniform_buffer_tests.rs"]
mod tests;
