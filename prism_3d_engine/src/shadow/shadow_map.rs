/// Directional shadow map
///
/// Owns the depth target and the light frustum. Each frame the frustum is
/// refit to the camera, `depth_pass` renders the casters into the depth
/// texture and `bind_to` hands the texture to the PBR variant, which
/// samples it through `shadow_map_space`.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::error::{Error, Result};
use crate::graphics_device::{lock_device, ClearFlags, CompareFunc, CullFace, GraphicsDevice, TextureHandle, TextureTarget};
use crate::material::EmptyMaterial;
use crate::render_queue::{ClearState, RenderPass, RenderTarget, TargetBinding};
use crate::renderer::Renderer;
use crate::shader::shader_source;
use crate::shadow::ShadowFrustum;
use crate::{engine_debug, engine_warn};

const SOURCE: &str = "prism3d::ShadowMap";

/// Sampler unit of `u_shadow_map` in the PBR variant
pub const SHADOW_MAP_UNIT: u32 = 8;

#[derive(Debug)]
pub struct ShadowMap {
    target: RenderTarget,
    size: u32,
    frustum: ShadowFrustum,
    depth_material: Arc<EmptyMaterial>,
    /// Cull front faces while rendering depth
    pub cull_front_faces: bool,
}

impl ShadowMap {
    /// Square depth target of `size` texels
    ///
    /// Depth compare sampling is enabled when the device supports it.
    pub fn new(renderer: &Renderer, size: u32) -> Result<Self> {
        let target = {
            let mut device = lock_device(renderer.device())?;
            let capabilities = device.capabilities();
            let size = size.min(capabilities.max_texture_size).max(1);
            let compare = if capabilities.depth_compare {
                Some(CompareFunc::LessEqual)
            } else {
                engine_warn!(SOURCE, "Depth compare sampling unsupported, shadows sample raw depth");
                None
            };
            RenderTarget::depth(&mut *device, size, size, compare)?
        };
        let (size, _) = target.size();
        engine_debug!(SOURCE, "Shadow map created ({}x{})", size, size);

        Ok(Self {
            target,
            size,
            frustum: ShadowFrustum::from_config(renderer.config()),
            depth_material: Arc::new(EmptyMaterial::depth()),
            cull_front_faces: true,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn frustum(&self) -> &ShadowFrustum {
        &self.frustum
    }

    pub fn frustum_mut(&mut self) -> &mut ShadowFrustum {
        &mut self.frustum
    }

    pub fn set_light_direction(&mut self, direction: Vec3) {
        self.frustum.set_light_direction(direction);
    }

    /// Refit the light volume to the camera seen through `camera_inverse_view`
    pub fn update(&mut self, camera_inverse_view: &Mat4) {
        self.frustum.update(camera_inverse_view);
    }

    pub fn light_view(&self) -> Mat4 {
        self.frustum.light_view(self.frustum.light_direction())
    }

    pub fn light_projection(&self) -> Mat4 {
        self.frustum.ortho()
    }

    /// Light projection × light view
    pub fn shadow_matrix(&self) -> Mat4 {
        self.light_projection() * self.light_view()
    }

    pub fn depth_texture(&self) -> Option<TextureHandle> {
        self.target.depth_handle()
    }

    pub fn binding(&self) -> Option<TargetBinding> {
        self.target.binding()
    }

    /// Empty pass drawing into the depth target from the light
    ///
    /// All commands are drawn with the depth-only material, biased by the
    /// configured polygon offset. Only depth is cleared.
    pub fn depth_pass(&self, renderer: &Renderer) -> Result<RenderPass> {
        let Some(target) = self.binding() else {
            return Err(Error::InvalidResource("shadow map has been destroyed".to_string()).logged(SOURCE));
        };
        let mut pass = RenderPass::new(self.light_view(), self.light_projection())
            .with_target(target)
            .with_override_material(self.depth_material.clone());
        pass.polygon_offset = Some(renderer.config().shadow_polygon_offset);
        pass.cull_face = self.cull_front_faces.then_some(CullFace::Front);
        pass.clear = Some(ClearState {
            flags: ClearFlags::DEPTH,
            ..ClearState::default()
        });
        Ok(pass)
    }

    /// Give `pass` the light-space matrix its shaders sample shadows with
    pub fn apply_to(&self, pass: &mut RenderPass) {
        pass.shadow_matrix = Some(self.shadow_matrix());
    }

    /// Stage the depth texture and enable shadows on the PBR variant
    pub fn bind_to(&self, renderer: &mut Renderer) -> Result<()> {
        let Some(depth) = self.depth_texture() else {
            return Err(Error::InvalidResource("shadow map has been destroyed".to_string()).logged(SOURCE));
        };
        renderer.add_shader_variant_texture(&shader_source::PBR, SHADOW_MAP_UNIT, TextureTarget::Texture2D, depth);
        renderer.add_shader_variant_uniform(&shader_source::PBR, "u_shadows_enabled", true);
        Ok(())
    }

    /// Undo `bind_to`
    pub fn unbind_from(&self, renderer: &mut Renderer) {
        renderer.remove_shader_variant_texture(&shader_source::PBR, SHADOW_MAP_UNIT);
        renderer.add_shader_variant_uniform(&shader_source::PBR, "u_shadows_enabled", false);
    }

    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        self.target.destroy(device)
    }
}

#[cfg(test)]
#[path = "shadow_map_tests.rs"]
mod tests;
