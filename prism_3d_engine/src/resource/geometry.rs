//! CPU-side geometry handed to the engine by loaders and generators.
//!
//! A `BufferedGeometry` is a list of attributes pointing into one or more
//! byte buffers, an optional index list and optional draw groups.
//!
//! # Layout
//!
//! ```text
//! BufferedGeometry
//! ├── buffers[0]  positions (tightly packed vec3)
//! ├── buffers[1]  uv + normal (interleaved, stride 20)
//! ├── attributes
//! │   ├── Vertex   → buffers[0], offset 0
//! │   ├── TexCoord → buffers[1], offset 0, stride 20
//! │   └── Normal   → buffers[1], offset 8, stride 20
//! ├── index (U16 or U32)
//! └── groups [{offset, count, material_index}, ...]
//! ```

use crate::graphics_device::{ComponentType, DrawMode, IndexType, VertexAttributeBinding};

/// Largest vertex count addressable by 16-bit indices
pub const MAX_U16_INDEXED_VERTICES: usize = 65536;

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Meaning of a vertex attribute; doubles as its shader location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    Vertex,
    TexCoord,
    Normal,
    Tangent,
    Bitangent,
}

impl AttributeSemantic {
    pub const ALL: [AttributeSemantic; 5] = [
        AttributeSemantic::Vertex,
        AttributeSemantic::TexCoord,
        AttributeSemantic::Normal,
        AttributeSemantic::Tangent,
        AttributeSemantic::Bitangent,
    ];

    /// Attribute location used by every shader variant
    pub fn location(&self) -> u32 {
        match self {
            AttributeSemantic::Vertex => 0,
            AttributeSemantic::TexCoord => 1,
            AttributeSemantic::Normal => 2,
            AttributeSemantic::Tangent => 3,
            AttributeSemantic::Bitangent => 4,
        }
    }

    /// Components per vertex
    pub fn components(&self) -> u32 {
        match self {
            AttributeSemantic::TexCoord => 2,
            _ => 3,
        }
    }
}

/// One attribute of a `BufferedGeometry`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryAttribute {
    pub semantic: AttributeSemantic,
    pub enabled: bool,
    /// Index into `BufferedGeometry::buffers`
    pub buffer_index: usize,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub byte_offset: usize,
    /// 0 = tightly packed
    pub byte_stride: usize,
}

impl GeometryAttribute {
    /// Enabled, tightly packed f32 attribute at the start of `buffer_index`
    pub fn new(semantic: AttributeSemantic, buffer_index: usize) -> Self {
        Self {
            semantic,
            enabled: true,
            buffer_index,
            component_type: ComponentType::F32,
            normalized: false,
            byte_offset: 0,
            byte_stride: 0,
        }
    }

    /// Bytes of one element
    pub fn element_size(&self) -> usize {
        self.semantic.components() as usize * self.component_type.size_bytes()
    }

    /// Distance between consecutive elements
    pub fn effective_stride(&self) -> usize {
        if self.byte_stride == 0 {
            self.element_size()
        } else {
            self.byte_stride
        }
    }

    /// Device binding for this attribute
    pub fn binding(&self) -> VertexAttributeBinding {
        VertexAttributeBinding {
            location: self.semantic.location(),
            buffer_slot: self.buffer_index,
            components: self.semantic.components(),
            component_type: self.component_type,
            normalized: self.normalized,
            stride: self.byte_stride,
            offset: self.byte_offset,
        }
    }
}

// ============================================================================
// INDICES
// ============================================================================

/// Index list with its element width
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    /// Pick the narrowest width able to address `vertex_count` vertices
    pub fn from_indices(indices: &[u32], vertex_count: usize) -> Self {
        if vertex_count > MAX_U16_INDEXED_VERTICES {
            IndexData::U32(indices.to_vec())
        } else {
            IndexData::U16(indices.iter().map(|i| *i as u16).collect())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(indices) => indices.len(),
            IndexData::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index_type(&self) -> IndexType {
        match self {
            IndexData::U16(_) => IndexType::U16,
            IndexData::U32(_) => IndexType::U32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(indices) => bytemuck::cast_slice(indices),
            IndexData::U32(indices) => bytemuck::cast_slice(indices),
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Drawable range bound to one material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    /// First element (index, or vertex for non-indexed geometry)
    pub offset: u32,
    pub count: u32,
    pub material_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferedGeometry {
    pub attributes: Vec<GeometryAttribute>,
    pub buffers: Vec<Vec<u8>>,
    pub index: Option<IndexData>,
    pub groups: Vec<GeometryGroup>,
    pub draw_mode: DrawMode,
}

impl BufferedGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tightly packed f32 attribute in its own buffer
    ///
    /// An existing attribute with the same semantic is replaced.
    pub fn with_attribute(mut self, semantic: AttributeSemantic, data: &[f32]) -> Self {
        self.attributes.retain(|a| a.semantic != semantic);
        self.buffers.push(bytemuck::cast_slice(data).to_vec());
        self.attributes.push(GeometryAttribute::new(semantic, self.buffers.len() - 1));
        self
    }

    /// Add one buffer holding several f32 attributes per vertex, in order
    pub fn with_interleaved(mut self, data: &[f32], layout: &[AttributeSemantic]) -> Self {
        let stride: usize = layout
            .iter()
            .map(|s| s.components() as usize * ComponentType::F32.size_bytes())
            .sum();
        self.buffers.push(bytemuck::cast_slice(data).to_vec());
        let buffer_index = self.buffers.len() - 1;

        let mut offset = 0;
        for semantic in layout {
            self.attributes.retain(|a| a.semantic != *semantic);
            let mut attribute = GeometryAttribute::new(*semantic, buffer_index);
            attribute.byte_offset = offset;
            attribute.byte_stride = stride;
            offset += attribute.element_size();
            self.attributes.push(attribute);
        }
        self
    }

    /// Set the index list, choosing its width from the current vertex count
    pub fn with_indices(mut self, indices: &[u32]) -> Self {
        self.index = Some(IndexData::from_indices(indices, self.vertex_count()));
        self
    }

    pub fn with_group(mut self, offset: u32, count: u32, material_index: usize) -> Self {
        self.groups.push(GeometryGroup { offset, count, material_index });
        self
    }

    pub fn with_draw_mode(mut self, draw_mode: DrawMode) -> Self {
        self.draw_mode = draw_mode;
        self
    }

    /// Enabled attribute with the given semantic
    pub fn attribute(&self, semantic: AttributeSemantic) -> Option<&GeometryAttribute> {
        self.attributes.iter().find(|a| a.enabled && a.semantic == semantic)
    }

    /// Bytes backing an attribute
    pub fn attribute_buffer(&self, semantic: AttributeSemantic) -> Option<&[u8]> {
        let attribute = self.attribute(semantic)?;
        self.buffers.get(attribute.buffer_index).map(|b| b.as_slice())
    }

    /// Number of vertices described by the position attribute
    pub fn vertex_count(&self) -> usize {
        let Some(attribute) = self.attribute(AttributeSemantic::Vertex) else {
            return 0;
        };
        let Some(buffer) = self.buffers.get(attribute.buffer_index) else {
            return 0;
        };
        let element = attribute.element_size();
        let stride = attribute.effective_stride();
        if buffer.len() < attribute.byte_offset + element {
            return 0;
        }
        (buffer.len() - attribute.byte_offset - element) / stride + 1
    }

    pub fn index_count(&self) -> usize {
        self.index.as_ref().map_or(0, |i| i.len())
    }

    /// Elements drawn for the whole geometry
    pub fn draw_count(&self) -> usize {
        match &self.index {
            Some(index) => index.len(),
            None => self.vertex_count(),
        }
    }

    /// 2x2x2 box centred on the origin, 36 non-indexed positions
    ///
    /// Rendered from inside by the cubemap bakes.
    pub fn capture_box() -> Self {
        #[rustfmt::skip]
        const POSITIONS: [f32; 108] = [
            // -Z
            -1.0, -1.0, -1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,
             1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,
            // +Z
            -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,
             1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,
            // -X
            -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,
            -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,
            // +X
             1.0,  1.0,  1.0,   1.0, -1.0, -1.0,   1.0,  1.0, -1.0,
             1.0, -1.0, -1.0,   1.0,  1.0,  1.0,   1.0, -1.0,  1.0,
            // -Y
            -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,   1.0, -1.0,  1.0,
             1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,  -1.0, -1.0, -1.0,
            // +Y
            -1.0,  1.0, -1.0,   1.0,  1.0,  1.0,   1.0,  1.0, -1.0,
             1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,
        ];
        Self::new().with_attribute(AttributeSemantic::Vertex, &POSITIONS)
    }

    /// Full-screen quad in clip space drawn as a 4-vertex triangle strip
    pub fn screen_quad() -> Self {
        #[rustfmt::skip]
        const VERTICES: [f32; 20] = [
            // position        uv
            -1.0,  1.0, 0.0,   0.0, 1.0,
            -1.0, -1.0, 0.0,   0.0, 0.0,
             1.0,  1.0, 0.0,   1.0, 1.0,
             1.0, -1.0, 0.0,   1.0, 0.0,
        ];
        Self::new()
            .with_interleaved(&VERTICES, &[AttributeSemantic::Vertex, AttributeSemantic::TexCoord])
            .with_draw_mode(DrawMode::TriangleStrip)
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
