/// Ordered render passes followed by a post-process chain
///
/// Passes run in insertion order. While at least one post-process stage is
/// registered, passes without their own target render into the scene color
/// target; each stage then reads the previous color output and writes into
/// a ping-pong target, the last stage writing to the default framebuffer.

use crate::{engine_debug, engine_err, engine_error};
use crate::error::Result;
use crate::graphics_device::{lock_device, GraphicsDevice, TextureFormat};
use crate::render_queue::{PostProcessFrame, PostProcessPass, RenderCommand, RenderPass, RenderTarget};
use crate::renderer::{Renderer, RendererStats};
use crate::resource::{BufferedGeometry, Mesh, MeshInstance};

pub struct RenderQueue {
    width: u32,
    height: u32,
    passes: Vec<(String, RenderPass)>,
    post_passes: Vec<(String, Box<dyn PostProcessPass>)>,
    scene_target: Option<RenderTarget>,
    ping_pong: [Option<RenderTarget>; 2],
    quad: Option<Mesh>,
    frame_stats: RendererStats,
}

impl RenderQueue {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            passes: Vec::new(),
            post_passes: Vec::new(),
            scene_target: None,
            ping_pong: [None, None],
            quad: None,
            frame_stats: RendererStats::default(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // ===== RENDER PASSES =====

    /// Append a pass; a pass already registered under `name` is replaced in place
    pub fn append_render_pass(&mut self, name: &str, pass: RenderPass) {
        match self.passes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = pass,
            None => self.passes.push((name.to_string(), pass)),
        }
    }

    pub fn render_pass(&self, name: &str) -> Option<&RenderPass> {
        self.passes.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn render_pass_mut(&mut self, name: &str) -> Option<&mut RenderPass> {
        self.passes.iter_mut().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn remove_render_pass(&mut self, name: &str) -> Option<RenderPass> {
        let index = self.passes.iter().position(|(n, _)| n == name)?;
        Some(self.passes.remove(index).1)
    }

    pub fn render_pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Queue `command` on every pass
    pub fn add_command_to_all_passes(&mut self, command: RenderCommand) {
        for (_, pass) in &mut self.passes {
            pass.add_command(command.clone());
        }
    }

    pub fn add_mesh_instance_to_all_passes(&mut self, instance: MeshInstance) {
        self.add_command_to_all_passes(RenderCommand::new(instance));
    }

    // ===== POST PROCESS =====

    pub fn append_post_process_pass(&mut self, name: &str, pass: impl PostProcessPass + 'static) {
        let pass: Box<dyn PostProcessPass> = Box::new(pass);
        match self.post_passes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = pass,
            None => self.post_passes.push((name.to_string(), pass)),
        }
    }

    pub fn post_process_pass(&self, name: &str) -> Option<&dyn PostProcessPass> {
        self.post_passes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_ref())
    }

    pub fn post_process_pass_mut(&mut self, name: &str) -> Option<&mut (dyn PostProcessPass + 'static)> {
        self.post_passes
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_mut())
    }

    /// Typed access to a registered stage
    ///
    /// # Example
    ///
    /// ```ignore
    /// if let Some(tonemapping) = queue.post_process_pass_as_mut::<TonemappingPass>("tonemapping") {
    ///     tonemapping.set_exposure(1.5);
    /// }
    /// ```
    pub fn post_process_pass_as_mut<T: PostProcessPass + 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.post_process_pass_mut(name)
            .and_then(|pass| pass.as_any_mut().downcast_mut::<T>())
    }

    /// Remove a stage; a missing name returns None
    ///
    /// GPU objects owned by the removed stage are released by the caller
    /// through `PostProcessPass::destroy`.
    pub fn remove_post_process_pass(&mut self, name: &str) -> Option<Box<dyn PostProcessPass>> {
        let index = self.post_passes.iter().position(|(n, _)| n == name)?;
        Some(self.post_passes.remove(index).1)
    }

    pub fn post_process_pass_names(&self) -> Vec<&str> {
        self.post_passes.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Statistics summed over every pass of the last `execute`
    pub fn frame_stats(&self) -> &RendererStats {
        &self.frame_stats
    }

    // ===== EXECUTION =====

    /// Render one frame
    ///
    /// The frame stops at the first failing pass. The default framebuffer
    /// and the renderer viewport are restored either way.
    pub fn execute(&mut self, renderer: &mut Renderer) -> Result<()> {
        let rendered = self.render_frame(renderer);
        let unbound = lock_device(renderer.device()).and_then(|mut device| device.bind_framebuffer(None));
        let viewport = renderer.reset_viewport();
        rendered.and(unbound).and(viewport)
    }

    fn render_frame(&mut self, renderer: &mut Renderer) -> Result<()> {
        let post_processing = !self.post_passes.is_empty();
        let scene = if post_processing {
            self.ensure_targets(renderer)?;
            self.scene_target.as_ref().and_then(|t| t.binding())
        } else {
            None
        };

        self.frame_stats.reset();
        for (name, pass) in &mut self.passes {
            pass.execute(renderer, scene).map_err(|e| {
                engine_error!("prism3d::RenderQueue", "Render pass '{}' failed: {}", name, e);
                e
            })?;
            self.frame_stats.accumulate(renderer.stats());
        }

        if post_processing {
            renderer.reset_stats();
            self.execute_post_process(renderer)?;
            self.frame_stats.accumulate(renderer.stats());
        }
        Ok(())
    }

    /// Resize the scene and ping-pong targets
    pub fn resize(&mut self, renderer: &mut Renderer, width: u32, height: u32) -> Result<()> {
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.destroy_targets(&mut *lock_device(renderer.device())?)?;
        engine_debug!("prism3d::RenderQueue", "Render queue resized to {}x{}", width, height);
        Ok(())
    }

    /// Release the targets, the screen quad and every post-process stage
    pub fn destroy(&mut self, renderer: &mut Renderer) -> Result<()> {
        let mut device = lock_device(renderer.device())?;
        self.destroy_targets(&mut *device)?;
        if let Some(mut quad) = self.quad.take() {
            quad.destroy(&mut *device)?;
        }
        for (_, pass) in &mut self.post_passes {
            pass.destroy(&mut *device)?;
        }
        self.post_passes.clear();
        self.passes.clear();
        Ok(())
    }

    fn execute_post_process(&mut self, renderer: &mut Renderer) -> Result<()> {
        let Some(mut input) = self.scene_target.as_ref().and_then(|t| t.color_handle()) else {
            return Err(engine_err!("prism3d::RenderQueue", "Scene target has no color texture"));
        };
        let Some(quad) = self.quad.as_ref() else {
            return Err(engine_err!("prism3d::RenderQueue", "Screen quad not created"));
        };

        let last = self.post_passes.len() - 1;
        for (index, (name, pass)) in self.post_passes.iter_mut().enumerate() {
            let ping_pong = self.ping_pong[index % 2].as_ref();
            let output = if index == last {
                None
            } else {
                ping_pong.and_then(|t| t.binding())
            };
            let frame = PostProcessFrame {
                quad,
                input,
                output,
                width: self.width,
                height: self.height,
            };
            pass.render(renderer, &frame).map_err(|e| {
                engine_error!("prism3d::RenderQueue", "Post-process pass '{}' failed: {}", name, e);
                e
            })?;
            if let Some(next) = ping_pong.and_then(|t| t.color_handle()) {
                input = next;
            }
        }
        Ok(())
    }

    fn ensure_targets(&mut self, renderer: &Renderer) -> Result<()> {
        let mut device = lock_device(renderer.device())?;
        let device: &mut dyn GraphicsDevice = &mut *device;
        let (width, height) = (self.width, self.height);

        if self.scene_target.is_none() {
            self.scene_target = Some(RenderTarget::color(device, width, height, TextureFormat::Rgba16F)?);
        }
        for slot in &mut self.ping_pong {
            if slot.is_none() {
                *slot = Some(RenderTarget::color(device, width, height, TextureFormat::Rgba16F)?);
            }
        }
        if self.quad.is_none() {
            self.quad = Some(Mesh::new(device, &BufferedGeometry::screen_quad())?);
        }
        Ok(())
    }

    fn destroy_targets(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if let Some(mut target) = self.scene_target.take() {
            target.destroy(device)?;
        }
        for slot in &mut self.ping_pong {
            if let Some(mut target) = slot.take() {
                target.destroy(device)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RenderQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderQueue")
            .field("size", &(self.width, self.height))
            .field("passes", &self.render_pass_names())
            .field("post_passes", &self.post_process_pass_names())
            .finish()
    }
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
