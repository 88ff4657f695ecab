/// Full-screen passes chained after the scene passes
///
/// Each stage samples the previous stage's color output on unit 0 and
/// renders a screen quad into its output (a ping-pong target, or the
/// default framebuffer for the last stage).

use std::any::Any;

use glam::Vec2;

use crate::error::Result;
use crate::graphics_device::{lock_device, GraphicsDevice, TextureFormat, TextureHandle, TextureTarget, UniformValue};
use crate::render_queue::{RenderTarget, TargetBinding};
use crate::renderer::Renderer;
use crate::resource::Mesh;
use crate::shader::{shader_source, ShaderSource};

/// Inputs of one post-process stage
pub struct PostProcessFrame<'a> {
    /// Screen quad drawn by every stage
    pub quad: &'a Mesh,
    /// Color output of the previous stage
    pub input: TextureHandle,
    /// None writes to the default framebuffer
    pub output: Option<TargetBinding>,
    pub width: u32,
    pub height: u32,
}

pub trait PostProcessPass: Send {
    fn render(&mut self, renderer: &mut Renderer, frame: &PostProcessFrame<'_>) -> Result<()>;

    /// Free GPU objects owned by the stage
    fn destroy(&mut self, _device: &mut dyn GraphicsDevice) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Draw `quad` with `source` sampling `input`, into `output`
pub fn draw_fullscreen(
    renderer: &mut Renderer,
    source: &'static ShaderSource,
    quad: &Mesh,
    input: TextureHandle,
    output: Option<TargetBinding>,
    size: (u32, u32),
    uniforms: &[(&str, UniformValue)],
) -> Result<()> {
    {
        let mut device = lock_device(renderer.device())?;
        device.bind_framebuffer(output.map(|t| t.framebuffer))?;
        device.set_viewport(crate::graphics_device::Viewport::full(size.0, size.1));
        device.set_depth_test(false);
    }

    renderer.use_shader(source)?;
    for (name, value) in uniforms {
        renderer.set_uniform(name, value.clone())?;
    }
    lock_device(renderer.device())?.bind_texture(0, TextureTarget::Texture2D, Some(input))?;

    let result = quad.draw(renderer, None);
    lock_device(renderer.device())?.set_depth_test(true);
    result
}

// ===== TONEMAPPING =====

/// Tone curve applied by `TonemappingPass`
///
/// Discriminants match the `u_mode` values of the tonemapping shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tonemapping {
    None = 0,
    #[default]
    Reinhard = 1,
    Uncharted2 = 2,
    Aces = 3,
    Lottes = 4,
    Exposure = 5,
}

impl Tonemapping {
    pub const ALL: [Tonemapping; 6] = [
        Tonemapping::None,
        Tonemapping::Reinhard,
        Tonemapping::Uncharted2,
        Tonemapping::Aces,
        Tonemapping::Lottes,
        Tonemapping::Exposure,
    ];

    pub fn mode(&self) -> i32 {
        *self as i32
    }
}

#[derive(Debug, Clone)]
pub struct TonemappingPass {
    tonemapping: Tonemapping,
    gamma: f32,
    exposure: f32,
}

impl TonemappingPass {
    pub fn new(tonemapping: Tonemapping, gamma: f32) -> Self {
        Self {
            tonemapping,
            gamma,
            exposure: 1.0,
        }
    }

    pub fn tonemapping(&self) -> Tonemapping {
        self.tonemapping
    }

    pub fn set_tonemapping(&mut self, tonemapping: Tonemapping) {
        self.tonemapping = tonemapping;
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f32) {
        self.gamma = gamma;
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure;
    }
}

impl Default for TonemappingPass {
    fn default() -> Self {
        Self::new(Tonemapping::default(), 2.2)
    }
}

impl PostProcessPass for TonemappingPass {
    fn render(&mut self, renderer: &mut Renderer, frame: &PostProcessFrame<'_>) -> Result<()> {
        draw_fullscreen(
            renderer,
            &shader_source::TONEMAPPING,
            frame.quad,
            frame.input,
            frame.output,
            (frame.width, frame.height),
            &[
                ("u_mode", UniformValue::Int(self.tonemapping.mode())),
                ("gamma", UniformValue::Float(self.gamma)),
                ("exposure", UniformValue::Float(self.exposure)),
            ],
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===== GAUSSIAN BLUR =====

/// Separable gaussian blur: horizontal into an owned target, then vertical
#[derive(Debug)]
pub struct GaussianBlurPass {
    /// Standard deviation of the kernel in pixels
    pub blur_factor: f32,
    intermediate: Option<RenderTarget>,
}

impl GaussianBlurPass {
    pub fn new(blur_factor: f32) -> Self {
        Self {
            blur_factor,
            intermediate: None,
        }
    }

    /// Intermediate target sized to the frame, recreated on resize
    fn intermediate(&mut self, renderer: &Renderer, width: u32, height: u32) -> Result<TargetBinding> {
        let mut device = lock_device(renderer.device())?;
        if let Some(target) = &mut self.intermediate {
            if target.size() != (width, height) {
                target.destroy(&mut *device)?;
                self.intermediate = None;
            }
        }
        let target = match &mut self.intermediate {
            Some(target) => target,
            None => self
                .intermediate
                .insert(RenderTarget::color(&mut *device, width, height, TextureFormat::Rgba16F)?),
        };
        target.binding().ok_or_else(|| {
            crate::error::Error::InvalidResource("blur target has no framebuffer".to_string())
        })
    }
}

impl Default for GaussianBlurPass {
    fn default() -> Self {
        Self::new(7.0)
    }
}

impl PostProcessPass for GaussianBlurPass {
    fn render(&mut self, renderer: &mut Renderer, frame: &PostProcessFrame<'_>) -> Result<()> {
        let intermediate = self.intermediate(renderer, frame.width, frame.height)?;
        let resolution = UniformValue::Vec2(Vec2::new(frame.width as f32, frame.height as f32));
        let size = (frame.width, frame.height);

        draw_fullscreen(
            renderer,
            &shader_source::GAUSSIAN_BLUR,
            frame.quad,
            frame.input,
            Some(intermediate),
            size,
            &[
                ("u_direction", UniformValue::Vec2(Vec2::X)),
                ("u_resolution", resolution.clone()),
                ("u_blur_factor", UniformValue::Float(self.blur_factor)),
            ],
        )?;

        let horizontal = self
            .intermediate
            .as_ref()
            .and_then(|target| target.color_handle())
            .ok_or_else(|| crate::error::Error::InvalidResource("blur target has no color texture".to_string()))?;
        draw_fullscreen(
            renderer,
            &shader_source::GAUSSIAN_BLUR,
            frame.quad,
            horizontal,
            frame.output,
            size,
            &[("u_direction", UniformValue::Vec2(Vec2::Y)), ("u_resolution", resolution)],
        )
    }

    fn destroy(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if let Some(mut target) = self.intermediate.take() {
            target.destroy(device)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
