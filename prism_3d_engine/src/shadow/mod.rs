//! Directional shadow mapping: light frustum fit and depth pass

pub mod shadow_frustum;
pub mod shadow_map;

pub use shadow_frustum::ShadowFrustum;
pub use shadow_map::{ShadowMap, SHADOW_MAP_UNIT};
