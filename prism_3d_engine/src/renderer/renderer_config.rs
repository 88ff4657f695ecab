/// Renderer configuration

use crate::graphics_device::PolygonOffset;

/// Renderer configuration
///
/// Resolutions are requested sizes; bakes clamp them to the device's
/// `max_cube_map_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Binding point of the `ubo_per_frame` block
    pub per_frame_binding: u32,
    /// Binding point of the `ubo_per_model` block
    pub per_model_binding: u32,
    /// Initial viewport (width, height)
    pub viewport_size: (u32, u32),
    /// Face size of the cubemap baked from an equirectangular panorama
    pub equirect_resolution: u32,
    pub irradiance_resolution: u32,
    pub specular_resolution: u32,
    pub specular_mip_levels: u32,
    /// GGX samples per prefiltered texel
    pub specular_sample_count: u32,
    pub brdf_resolution: u32,
    pub shadow_map_size: u32,
    /// Far end of the shadowed camera slice
    pub shadow_distance: f32,
    /// Extra band past `shadow_distance` over which shadows fade out
    pub shadow_transition_distance: f32,
    /// Depth bias applied while rendering shadow maps
    pub shadow_polygon_offset: PolygonOffset,
    pub gamma: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            per_frame_binding: 0,
            per_model_binding: 1,
            viewport_size: (1280, 720),
            equirect_resolution: 512,
            irradiance_resolution: 32,
            specular_resolution: 128,
            specular_mip_levels: 5,
            specular_sample_count: 1024,
            brdf_resolution: 512,
            shadow_map_size: 2048,
            shadow_distance: 20.0,
            shadow_transition_distance: 3.0,
            shadow_polygon_offset: PolygonOffset::new(0.4, 4.0),
            gamma: 2.2,
        }
    }
}
