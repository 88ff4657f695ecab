/// One scheduled pass of a render queue
///
/// A pass binds its target, uploads its camera, runs its before-hook,
/// draws its queued commands in order, runs its after-hook and empties the
/// command list. Commands are re-queued every frame.

use std::fmt;
use std::sync::Arc;

use glam::Mat4;

use crate::error::Result;
use crate::graphics_device::{lock_device, ClearFlags, CullFace, PolygonOffset};
use crate::material::Material;
use crate::render_queue::TargetBinding;
use crate::renderer::Renderer;
use crate::resource::MeshInstance;

/// Callback run around a pass or a command
pub type RenderHook = Arc<dyn Fn(&mut Renderer) -> Result<()> + Send + Sync>;

/// A mesh instance to draw with optional hooks around its draw
#[derive(Clone)]
pub struct RenderCommand {
    pub instance: MeshInstance,
    pub on_before_render: Option<RenderHook>,
    pub on_after_render: Option<RenderHook>,
}

impl RenderCommand {
    pub fn new(instance: MeshInstance) -> Self {
        Self {
            instance,
            on_before_render: None,
            on_after_render: None,
        }
    }

    pub fn before_render(mut self, hook: impl Fn(&mut Renderer) -> Result<()> + Send + Sync + 'static) -> Self {
        self.on_before_render = Some(Arc::new(hook));
        self
    }

    pub fn after_render(mut self, hook: impl Fn(&mut Renderer) -> Result<()> + Send + Sync + 'static) -> Self {
        self.on_after_render = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for RenderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCommand")
            .field("model_matrix", &self.instance.model_matrix)
            .field("on_before_render", &self.on_before_render.is_some())
            .field("on_after_render", &self.on_after_render.is_some())
            .finish()
    }
}

/// Clear applied when a pass starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearState {
    pub flags: ClearFlags,
    pub color: [f32; 4],
}

impl Default for ClearState {
    fn default() -> Self {
        Self {
            flags: ClearFlags::COLOR | ClearFlags::DEPTH,
            color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

pub struct RenderPass {
    pub view: Mat4,
    pub projection: Mat4,
    /// Written to `shadow_map_space` of the per-frame block
    pub shadow_matrix: Option<Mat4>,
    /// None renders into the queue's scene target or the default framebuffer
    pub target: Option<TargetBinding>,
    /// Every command is drawn with this material instead of its own
    pub override_material: Option<Arc<dyn Material>>,
    pub polygon_offset: Option<PolygonOffset>,
    /// Faces culled during the pass; the previous cull mode is restored after
    pub cull_face: Option<CullFace>,
    pub clear: Option<ClearState>,
    pub on_before_pass: Option<RenderHook>,
    pub on_after_pass: Option<RenderHook>,
    commands: Vec<RenderCommand>,
}

impl RenderPass {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view,
            projection,
            shadow_matrix: None,
            target: None,
            override_material: None,
            polygon_offset: None,
            cull_face: None,
            clear: Some(ClearState::default()),
            on_before_pass: None,
            on_after_pass: None,
            commands: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: TargetBinding) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_override_material(mut self, material: Arc<dyn Material>) -> Self {
        self.override_material = Some(material);
        self
    }

    pub fn before_pass(mut self, hook: impl Fn(&mut Renderer) -> Result<()> + Send + Sync + 'static) -> Self {
        self.on_before_pass = Some(Arc::new(hook));
        self
    }

    pub fn after_pass(mut self, hook: impl Fn(&mut Renderer) -> Result<()> + Send + Sync + 'static) -> Self {
        self.on_after_pass = Some(Arc::new(hook));
        self
    }

    /// Update the camera matrices
    pub fn set_camera(&mut self, view: Mat4, projection: Mat4) {
        self.view = view;
        self.projection = projection;
    }

    pub fn add_command(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn add_mesh_instance(&mut self, instance: MeshInstance) {
        self.commands.push(RenderCommand::new(instance));
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Run the pass into its own target, else into `fallback`
    ///
    /// The command list is emptied even when a draw fails.
    pub fn execute(&mut self, renderer: &mut Renderer, fallback: Option<TargetBinding>) -> Result<()> {
        let commands = std::mem::take(&mut self.commands);
        let target = self.target.or(fallback);

        let previous_cull = {
            let mut device = lock_device(renderer.device())?;
            device.bind_framebuffer(target.map(|t| t.framebuffer))?;
            device.set_viewport(target.map(|t| t.viewport()).unwrap_or(renderer.viewport()));
            if let Some(clear) = self.clear {
                device.clear(clear.flags, clear.color);
            }
            if self.polygon_offset.is_some() {
                device.set_polygon_offset(self.polygon_offset);
            }
            let previous = device.cull_mode();
            if let Some(face) = self.cull_face {
                device.set_cull_mode(Some(face));
            }
            previous
        };

        let result = self.draw_commands(renderer, &commands);

        {
            let mut device = lock_device(renderer.device())?;
            if self.polygon_offset.is_some() {
                device.set_polygon_offset(None);
            }
            if self.cull_face.is_some() {
                device.set_cull_mode(previous_cull);
            }
        }
        result
    }

    fn draw_commands(&self, renderer: &mut Renderer, commands: &[RenderCommand]) -> Result<()> {
        renderer.set_per_frame_uniforms(&self.view, &self.projection, self.shadow_matrix)?;
        if let Some(hook) = &self.on_before_pass {
            hook(renderer)?;
        }

        for command in commands {
            if let Some(hook) = &command.on_before_render {
                hook(renderer)?;
            }
            match &self.override_material {
                Some(material) => command.instance.render_with_material(
                    renderer,
                    &self.view,
                    &self.projection,
                    material.as_ref(),
                )?,
                None => command.instance.render(renderer, &self.view, &self.projection)?,
            }
            if let Some(hook) = &command.on_after_render {
                hook(renderer)?;
            }
        }

        if let Some(hook) = &self.on_after_pass {
            hook(renderer)?;
        }
        Ok(())
    }
}

impl fmt::Debug for RenderPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPass")
            .field("target", &self.target)
            .field("commands", &self.commands.len())
            .field("override_material", &self.override_material.is_some())
            .field("polygon_offset", &self.polygon_offset)
            .field("cull_face", &self.cull_face)
            .finish()
    }
}
