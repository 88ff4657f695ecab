/// Fixed-function pipeline state: primitive modes, culling, clears, viewport

use bitflags::bitflags;

/// Primitive assembly mode of a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl DrawMode {
    /// Number of primitives assembled from `count` vertices
    pub fn primitive_count(&self, count: u32) -> u32 {
        match self {
            DrawMode::Points => count,
            DrawMode::Lines => count / 2,
            DrawMode::LineStrip => count.saturating_sub(1),
            DrawMode::Triangles => count / 3,
            DrawMode::TriangleStrip | DrawMode::TriangleFan => count.saturating_sub(2),
        }
    }
}

/// Faces discarded by culling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullFace {
    Back,
    Front,
    FrontAndBack,
}

bitflags! {
    /// Buffers cleared by `GraphicsDevice::clear`
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u32 {
        const COLOR   = 1 << 0;
        const DEPTH   = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a `width` x `height` target from the origin
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Depth bias applied to rasterized fragments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: f32,
}

impl PolygonOffset {
    pub fn new(factor: f32, units: f32) -> Self {
        Self { factor, units }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
