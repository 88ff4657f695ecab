/// Renderer statistics
///
/// Counters are reset by `Renderer::set_per_frame_uniforms` and
/// `Renderer::reset_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub shader_bind_count: u32,
    pub material_bind_count: u32,
    pub index_buffer_bind_count: u32,
    pub vertex_buffer_bind_count: u32,
    /// Indices drawn
    pub index_draw_count: u32,
    /// Vertices drawn without an index buffer
    pub vertex_draw_count: u32,
    pub draw_calls: u32,
    /// Triangles, lines or points produced
    pub primitives: u32,
}

impl RendererStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Sum of two counter sets
    pub fn accumulate(&mut self, other: &RendererStats) {
        self.shader_bind_count += other.shader_bind_count;
        self.material_bind_count += other.material_bind_count;
        self.index_buffer_bind_count += other.index_buffer_bind_count;
        self.vertex_buffer_bind_count += other.vertex_buffer_bind_count;
        self.index_draw_count += other.index_draw_count;
        self.vertex_draw_count += other.vertex_draw_count;
        self.draw_calls += other.draw_calls;
        self.primitives += other.primitives;
    }
}
