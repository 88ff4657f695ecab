//! Resource module
//!
//! GPU buffers, meshes, textures and the per-renderer resource cache.

mod reference_counter;
pub mod geometry;
pub mod vertex_buffer;
pub mod index_buffer;
pub mod mesh;
pub mod mesh_instance;
pub mod texture;
pub mod resource_cache;

use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};

pub use reference_counter::{ReferenceCounter, ResourceId};
pub use geometry::{
    AttributeSemantic, BufferedGeometry, GeometryAttribute, GeometryGroup, IndexData,
    MAX_U16_INDEXED_VERTICES,
};
pub use vertex_buffer::VertexBuffer;
pub use index_buffer::IndexBuffer;
pub use mesh::{Mesh, SubMesh};
pub use mesh_instance::{InstanceMaterials, MeshInstance};
pub use texture::{
    checkerboard_pixels, full_mip_levels, HdrImage, ImageData, Texture2D, TextureCubeMap,
    TextureOptions, TextureSender, CHECKERBOARD_SIZE,
};
pub use resource_cache::ResourceCache;

/// Lock interior resource state, reporting poisoning as a backend error
pub(crate) fn lock_state<'a, T>(state: &'a Mutex<T>, source: &str) -> Result<MutexGuard<'a, T>> {
    state
        .lock()
        .map_err(|_| Error::BackendError(format!("{} state lock poisoned", source)))
}
