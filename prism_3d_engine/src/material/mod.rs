/// Materials: shader variant selection and per-material uniforms

pub mod material;
pub mod light;
pub mod pbr_material;
pub mod basic_material;
pub mod grid_material;
pub mod toon_material;
pub mod normal_only_material;
pub mod empty_material;

pub use material::{Material, MaterialContext, MaterialId};
pub use light::{light_uniforms, Light, MAX_LIGHTS};
pub use pbr_material::PbrMaterial;
pub use basic_material::{BasicAlbedo, BasicMaterial};
pub use grid_material::GridMaterial;
pub use toon_material::ToonMaterial;
pub use normal_only_material::NormalOnlyMaterial;
pub use empty_material::EmptyMaterial;

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
