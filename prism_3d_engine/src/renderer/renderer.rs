/// Renderer - draw dispatch with GPU state caching
///
/// The renderer owns the resource cache and the two uniform blocks every
/// standard shader reads (`ubo_per_frame`, `ubo_per_model`). It remembers
/// the last bound shader, material, vertex buffer and index buffer, and a
/// draw only rebinds what differs from them.
///
/// Device access: every method locks the shared device for its own
/// duration. Callers holding a lock of `device()` must release it before
/// calling back into the renderer.

use std::sync::Arc;

use glam::{Mat3, Mat4};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::{engine_debug, engine_info};
use crate::graphics_device::{
    lock_device, DrawMode, GraphicsDevice, SharedGraphicsDevice, TextureHandle, TextureTarget,
    UniformValue, Viewport,
};
use crate::material::{light_uniforms, Light, Material, MaterialContext, MaterialId};
use crate::renderer::{RendererConfig, RendererStats};
use crate::resource::{IndexBuffer, ResourceCache, ResourceId, VertexBuffer};
use crate::shader::{shader_source, Shader, ShaderSource, UniformBlockLayout, UniformBuffer};

pub const PER_FRAME_BLOCK: &str = "ubo_per_frame";
pub const PER_MODEL_BLOCK: &str = "ubo_per_model";

/// Identities of the last bound state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SavedBindings {
    shader: Option<&'static str>,
    material: Option<MaterialId>,
    vertex_buffer: Option<ResourceId>,
    index_buffer: Option<ResourceId>,
}

/// Uniforms and textures applied each time a shader variant is bound
#[derive(Debug, Default)]
struct VariantState {
    uniforms: FxHashMap<String, UniformValue>,
    textures: FxHashMap<u32, (TextureTarget, TextureHandle)>,
}

pub struct Renderer {
    device: SharedGraphicsDevice,
    config: RendererConfig,
    cache: ResourceCache,
    per_frame: UniformBuffer,
    per_model: UniformBuffer,
    stats: RendererStats,
    bindings: SavedBindings,
    viewport: Viewport,
    variants: FxHashMap<&'static str, VariantState>,
}

impl Renderer {
    /// Create the resource cache, both uniform blocks and the initial viewport
    ///
    /// The PBR variant is linked here; its `ubo_per_frame` and
    /// `ubo_per_model` declarations define both block layouts.
    pub fn new(device: SharedGraphicsDevice, config: RendererConfig) -> Result<Self> {
        let shared = Arc::clone(&device);
        let mut guard = lock_device(&shared)?;
        let gpu: &mut dyn GraphicsDevice = &mut *guard;

        let mut cache = ResourceCache::new(gpu)?;
        let bindings = [
            (PER_FRAME_BLOCK, config.per_frame_binding),
            (PER_MODEL_BLOCK, config.per_model_binding),
        ];
        let standard = cache.get_or_create_shader(gpu, &shader_source::PBR, &bindings)?;
        let per_frame_layout = reflected_layout(standard, PER_FRAME_BLOCK)?;
        let per_model_layout = reflected_layout(standard, PER_MODEL_BLOCK)?;
        gpu.use_program(None)?;

        let per_frame = UniformBuffer::new(gpu, per_frame_layout, config.per_frame_binding)?;
        let per_model = UniformBuffer::new(gpu, per_model_layout, config.per_model_binding)?;

        let (width, height) = config.viewport_size;
        let viewport = Viewport::full(width, height);
        gpu.set_viewport(viewport);
        gpu.set_depth_test(true);

        engine_info!("prism3d::Renderer", "Renderer initialized ({}x{})", width, height);
        drop(guard);

        Ok(Self {
            device,
            config,
            cache,
            per_frame,
            per_model,
            stats: RendererStats::default(),
            bindings: SavedBindings::default(),
            viewport,
            variants: FxHashMap::default(),
        })
    }

    pub fn device(&self) -> &SharedGraphicsDevice {
        &self.device
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResourceCache {
        &mut self.cache
    }

    pub fn stats(&self) -> &RendererStats {
        &self.stats
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Staged contents of the per-frame block
    pub fn per_frame_block(&self) -> &UniformBuffer {
        &self.per_frame
    }

    /// Staged contents of the per-model block
    pub fn per_model_block(&self) -> &UniformBuffer {
        &self.per_model
    }

    // ===== UNIFORM BLOCKS =====

    /// Write the camera matrices and reset the frame statistics
    ///
    /// `shadow_matrix` is the light view-projection used by shadowed
    /// variants; the previous one is kept when None.
    pub fn set_per_frame_uniforms(&mut self, view: &Mat4, projection: &Mat4, shadow_matrix: Option<Mat4>) -> Result<()> {
        self.per_frame.set("view", *view)?;
        self.per_frame.set("view_inverse", view.inverse())?;
        self.per_frame.set("projection", *projection)?;
        self.per_frame.set("view_projection", *projection * *view)?;
        if let Some(shadow_matrix) = shadow_matrix {
            self.per_frame.set("shadow_map_space", shadow_matrix)?;
        }
        {
            let mut device = lock_device(&self.device)?;
            self.per_frame.upload(&mut *device)?;
        }
        self.reset_stats();
        Ok(())
    }

    /// Write the model transforms of the next draws
    ///
    /// Fails with `Error::SingularMatrix` when the model-view has no
    /// inverse (the normal matrix would be undefined).
    pub fn set_per_model_uniforms(&mut self, model: &Mat4, view: &Mat4, projection: &Mat4) -> Result<()> {
        let model_view = *view * *model;
        let normal_view = normal_matrix(&model_view)?;

        self.per_model.set("model", *model)?;
        self.per_model.set("model_view", model_view)?;
        self.per_model.set("normal_view", normal_view)?;
        self.per_model.set("mvp", *projection * model_view)?;

        let mut device = lock_device(&self.device)?;
        self.per_model.upload(&mut *device)
    }

    // ===== DRAW =====

    /// Issue one draw, binding only the state that changed
    ///
    /// # Arguments
    ///
    /// * `count` - Number of indices (indexed) or vertices to draw
    /// * `offset` - First index or vertex
    /// * `material` - None draws with whatever shader is current
    pub fn draw(
        &mut self,
        mode: DrawMode,
        count: u32,
        offset: u32,
        index_buffer: Option<&IndexBuffer>,
        vertex_buffer: &VertexBuffer,
        material: Option<&dyn Material>,
    ) -> Result<()> {
        let shared = Arc::clone(&self.device);
        let mut guard = lock_device(&shared)?;
        let device: &mut dyn GraphicsDevice = &mut *guard;

        if let Some(material) = material {
            let source = material.shader_source();
            if self.bindings.shader != Some(source.name) {
                self.bind_shader(device, source)?;
            }
            if self.bindings.material != Some(material.id()) {
                self.activate_material(device, material)?;
            }
        }

        if self.bindings.vertex_buffer != Some(vertex_buffer.id()) {
            vertex_buffer.bind(device)?;
            self.bindings.vertex_buffer = Some(vertex_buffer.id());
            self.stats.vertex_buffer_bind_count += 1;
        }

        match index_buffer {
            Some(index_buffer) => {
                if self.bindings.index_buffer != Some(index_buffer.id()) {
                    index_buffer.bind(device)?;
                    self.bindings.index_buffer = Some(index_buffer.id());
                    self.stats.index_buffer_bind_count += 1;
                }
                device.draw_elements(mode, count, index_buffer.index_type(), index_buffer.byte_offset(offset))?;
                self.stats.index_draw_count += count;
            }
            None => {
                device.draw_arrays(mode, offset, count)?;
                self.stats.vertex_draw_count += count;
            }
        }

        self.stats.draw_calls += 1;
        self.stats.primitives += mode.primitive_count(count);
        Ok(())
    }

    /// Forget the last bound shader, material and buffers
    pub fn reset_save_bindings(&mut self) {
        self.bindings = SavedBindings::default();
    }

    /// Zero the statistics and forget the last bound state
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        self.reset_save_bindings();
    }

    // ===== SHADERS =====

    /// Cached variant for `source`, linked and block-bound on first use
    pub fn get_or_create_shader(&mut self, source: &'static ShaderSource) -> Result<&mut Shader> {
        let shared = Arc::clone(&self.device);
        let mut device = lock_device(&shared)?;
        let bindings = self.block_bindings();
        self.cache.get_or_create_shader(&mut *device, source, &bindings)
    }

    /// Bind a variant without a material (bakes, full-screen passes)
    ///
    /// The next material draw re-activates its material.
    pub fn use_shader(&mut self, source: &'static ShaderSource) -> Result<()> {
        if self.bindings.shader == Some(source.name) {
            return Ok(());
        }
        let shared = Arc::clone(&self.device);
        let mut device = lock_device(&shared)?;
        self.bind_shader(&mut *device, source)
    }

    /// Write a loose uniform into the current variant
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        let Some(current) = self.bindings.shader else {
            return Err(Error::InvalidResource(format!("set_uniform '{}' with no shader bound", name)));
        };
        let shared = Arc::clone(&self.device);
        let mut device = lock_device(&shared)?;
        match self.cache.shader_mut(current) {
            Some(shader) => shader.set_uniform(&mut *device, name, value),
            None => Err(Error::InvalidResource(format!("shader '{}' is not cached", current))),
        }
    }

    /// Stage a uniform applied whenever `source` is bound by the renderer
    ///
    /// Staged values persist until overwritten. Staging against the current
    /// variant forces it to be rebound on the next draw.
    pub fn add_shader_variant_uniform(
        &mut self,
        source: &'static ShaderSource,
        name: &str,
        value: impl Into<UniformValue>,
    ) {
        self.variants
            .entry(source.name)
            .or_default()
            .uniforms
            .insert(name.to_string(), value.into());
        self.invalidate_shader(source);
    }

    /// Stage a texture bound on `unit` whenever `source` is bound
    pub fn add_shader_variant_texture(
        &mut self,
        source: &'static ShaderSource,
        unit: u32,
        target: TextureTarget,
        texture: TextureHandle,
    ) {
        self.variants
            .entry(source.name)
            .or_default()
            .textures
            .insert(unit, (target, texture));
        self.invalidate_shader(source);
    }

    /// Drop a staged texture; the unit falls back to the placeholder
    pub fn remove_shader_variant_texture(&mut self, source: &'static ShaderSource, unit: u32) {
        if let Some(variant) = self.variants.get_mut(source.name) {
            if variant.textures.remove(&unit).is_some() {
                self.invalidate_shader(source);
            }
        }
    }

    /// Stage the light list of a lit variant
    pub fn set_lights(&mut self, source: &'static ShaderSource, lights: &[Light]) {
        for (name, value) in light_uniforms(lights) {
            self.add_shader_variant_uniform(source, &name, value);
        }
    }

    // ===== VIEWPORT / STATE =====

    pub fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<()> {
        self.viewport = Viewport::new(x, y, width, height);
        lock_device(&self.device)?.set_viewport(self.viewport);
        Ok(())
    }

    /// Re-apply the stored viewport after rendering at another size
    pub fn reset_viewport(&mut self) -> Result<()> {
        lock_device(&self.device)?.set_viewport(self.viewport);
        Ok(())
    }

    /// Unbind vertex array, index buffer and program
    pub fn cleanup_state(&mut self) -> Result<()> {
        {
            let mut device = lock_device(&self.device)?;
            device.bind_vertex_array(None)?;
            device.bind_index_buffer(None)?;
            device.use_program(None)?;
        }
        self.reset_save_bindings();
        Ok(())
    }

    /// Release the cache and uniform blocks
    pub fn destroy(&mut self) -> Result<()> {
        let shared = Arc::clone(&self.device);
        let mut device = lock_device(&shared)?;
        self.cache.destroy(&mut *device)?;
        self.per_frame.destroy(&mut *device);
        self.per_model.destroy(&mut *device);
        self.variants.clear();
        self.reset_save_bindings();
        engine_debug!("prism3d::Renderer", "Renderer destroyed");
        Ok(())
    }

    // ===== INTERNAL =====

    fn block_bindings(&self) -> [(&'static str, u32); 2] {
        [
            (PER_FRAME_BLOCK, self.config.per_frame_binding),
            (PER_MODEL_BLOCK, self.config.per_model_binding),
        ]
    }

    fn invalidate_shader(&mut self, source: &'static ShaderSource) {
        if self.bindings.shader == Some(source.name) {
            self.bindings.shader = None;
        }
    }

    fn bind_shader(&mut self, device: &mut dyn GraphicsDevice, source: &'static ShaderSource) -> Result<()> {
        let placeholders = self.cache.placeholders();
        let bindings = self.block_bindings();
        let shader = self.cache.get_or_create_shader(device, source, &bindings)?;
        shader.activate(device, &placeholders)?;

        if let Some(variant) = self.variants.get(source.name) {
            for (name, value) in &variant.uniforms {
                shader.set_uniform(device, name, value.clone())?;
            }
            for (unit, (target, texture)) in &variant.textures {
                device.bind_texture(*unit, *target, Some(*texture))?;
            }
        }

        // activation rebinds placeholders over the material's textures
        self.bindings.shader = Some(source.name);
        self.bindings.material = None;
        self.stats.shader_bind_count += 1;
        Ok(())
    }

    fn activate_material(&mut self, device: &mut dyn GraphicsDevice, material: &dyn Material) -> Result<()> {
        let placeholders = self.cache.placeholders();
        let brdf_lut = self.cache.brdf_lut();
        let name = material.shader_source().name;
        let Some(shader) = self.cache.shader_mut(name) else {
            return Err(Error::InvalidResource(format!("shader '{}' is not cached", name)));
        };
        let mut context = MaterialContext {
            device,
            shader,
            placeholders,
            brdf_lut,
        };
        material.activate(&mut context)?;
        self.bindings.material = Some(material.id());
        self.stats.material_bind_count += 1;
        Ok(())
    }
}

/// Inverse-transpose of the upper 3x3 of a model-view matrix
pub fn normal_matrix(model_view: &Mat4) -> Result<Mat3> {
    let upper = Mat3::from_mat4(*model_view);
    let determinant = upper.determinant();
    if determinant == 0.0 || !determinant.is_finite() {
        return Err(Error::SingularMatrix("Determinant could not be calculated for normal_view".to_string())
            .logged("prism3d::Renderer"));
    }
    Ok(upper.inverse().transpose())
}

fn reflected_layout(shader: &Shader, block: &str) -> Result<UniformBlockLayout> {
    match shader.block(block) {
        Some(info) => Ok(UniformBlockLayout::from_block(info)),
        None => Err(Error::InitializationFailed(format!(
            "shader '{}' does not declare uniform block '{}'",
            shader.name(),
            block
        ))
        .logged("prism3d::Renderer")),
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
