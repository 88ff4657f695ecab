/// Buffer targets, usages and vertex attribute layout

use std::fmt;

/// Buffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data (ARRAY_BUFFER)
    Vertex,
    /// Element indices (ELEMENT_ARRAY_BUFFER)
    Index,
    /// Uniform block storage (UNIFORM_BUFFER)
    Uniform,
}

/// Expected update frequency of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times
    Static,
    /// Rewritten every frame or every draw (uniform blocks)
    Dynamic,
}

/// Index element width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// 16-bit unsigned indices
    U16,
    /// 32-bit unsigned indices
    U32,
}

impl IndexType {
    /// Returns size in bytes of one index
    pub fn size_bytes(&self) -> usize {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Scalar type of one vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    F32,
    I8,
    U8,
    I16,
    U16,
    U32,
}

impl ComponentType {
    /// Returns size in bytes of one component
    pub fn size_bytes(&self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::F32 | ComponentType::U32 => 4,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentType::F32 => "f32",
            ComponentType::I8 => "i8",
            ComponentType::U8 => "u8",
            ComponentType::I16 => "i16",
            ComponentType::U16 => "u16",
            ComponentType::U32 => "u32",
        };
        write!(f, "{}", name)
    }
}

/// One enabled attribute of a vertex array
///
/// `buffer_slot` indexes the buffer list passed to
/// `GraphicsDevice::create_vertex_array`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttributeBinding {
    /// Shader attribute location
    pub location: u32,
    /// Index into the vertex array's buffer list
    pub buffer_slot: usize,
    /// Number of components (1 to 4)
    pub components: u32,
    /// Component scalar type
    pub component_type: ComponentType,
    /// Normalize integer components to [0, 1] / [-1, 1]
    pub normalized: bool,
    /// Byte stride between consecutive vertices (0 = tightly packed)
    pub stride: usize,
    /// Byte offset of the first component
    pub offset: usize,
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
