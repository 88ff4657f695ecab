//! Image based lighting module
//!
//! GPU bakes of environment, irradiance and specular cubemaps plus the BRDF
//! table, the CPU reference integrators and the baked map bundle shared
//! by materials.

pub mod cube_camera;
pub mod cubemap_baker;
pub mod environment;
pub mod sampling;

pub use cube_camera::CubeCamera;
pub use cubemap_baker::{CubemapBaker, EquirectSource};
pub use environment::{IblEnvironment, IblHandles, IblMaps};
pub use sampling::{
    geometry_schlick_ggx_ibl, geometry_smith_ibl, hammersley, importance_sample_ggx, integrate_brdf,
    irradiance_at, prefilter_at, radical_inverse_vdc, texel_direction, CpuCubemap, IRRADIANCE_SAMPLE_DELTA,
};
