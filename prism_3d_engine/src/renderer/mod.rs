/// Renderer module - draw dispatch, binding cache and uniform blocks

pub mod renderer;
pub mod renderer_config;
pub mod renderer_stats;

pub use renderer::*;
pub use renderer_config::RendererConfig;
pub use renderer_stats::RendererStats;
