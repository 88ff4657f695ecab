//! Render queue module
//!
//! Named render passes executed in order, offscreen targets and the
//! post-process chain.

pub mod render_target;
pub mod render_pass;
pub mod post_process_pass;
pub mod render_queue;

pub use render_target::{check_complete, RenderTarget, TargetBinding};
pub use render_pass::{ClearState, RenderCommand, RenderHook, RenderPass};
pub use post_process_pass::{
    draw_fullscreen, GaussianBlurPass, PostProcessFrame, PostProcessPass, Tonemapping, TonemappingPass,
};
pub use render_queue::RenderQueue;
