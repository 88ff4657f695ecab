/// A mesh placed in the scene with its materials and model transform
///
/// The mesh is shared: many instances may draw the same buffers. With a
/// single material the whole mesh is drawn in one call; with one material
/// per slot each submesh is drawn with the material of its slot.

use std::sync::Arc;

use glam::Mat4;

use crate::error::Result;
use crate::material::Material;
use crate::renderer::Renderer;
use crate::resource::Mesh;

#[derive(Clone)]
pub enum InstanceMaterials {
    Single(Arc<dyn Material>),
    /// Indexed by submesh material slot
    PerSlot(Vec<Arc<dyn Material>>),
}

#[derive(Clone)]
pub struct MeshInstance {
    mesh: Arc<Mesh>,
    materials: InstanceMaterials,
    pub model_matrix: Mat4,
}

impl MeshInstance {
    pub fn new(mesh: Arc<Mesh>, material: Arc<dyn Material>) -> Self {
        Self {
            mesh,
            materials: InstanceMaterials::Single(material),
            model_matrix: Mat4::IDENTITY,
        }
    }

    pub fn with_materials(mesh: Arc<Mesh>, materials: Vec<Arc<dyn Material>>) -> Self {
        Self {
            mesh,
            materials: InstanceMaterials::PerSlot(materials),
            model_matrix: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, model_matrix: Mat4) -> Self {
        self.model_matrix = model_matrix;
        self
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn materials(&self) -> &InstanceMaterials {
        &self.materials
    }

    pub fn set_materials(&mut self, materials: InstanceMaterials) {
        self.materials = materials;
    }

    /// Upload the per-model block and draw with the instance's materials
    pub fn render(&self, renderer: &mut Renderer, view: &Mat4, projection: &Mat4) -> Result<()> {
        renderer.set_per_model_uniforms(&self.model_matrix, view, projection)?;
        match &self.materials {
            InstanceMaterials::Single(material) => self.mesh.draw(renderer, Some(material.as_ref())),
            InstanceMaterials::PerSlot(materials) => {
                for (slot, material) in materials.iter().enumerate() {
                    for submesh in self.mesh.submeshes().iter().filter(|s| s.material_index() == slot) {
                        submesh.draw(renderer, self.mesh.draw_mode(), Some(material.as_ref()))?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Draw the whole mesh with `material` in place of the instance's own
    pub fn render_with_material(
        &self,
        renderer: &mut Renderer,
        view: &Mat4,
        projection: &Mat4,
        material: &dyn Material,
    ) -> Result<()> {
        renderer.set_per_model_uniforms(&self.model_matrix, view, projection)?;
        self.mesh.draw(renderer, Some(material))
    }
}
