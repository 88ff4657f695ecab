/*!
# Prism3D Engine

Real-time 3D rendering over a GL-style rasterization context.

The crate is organized around an explicit `Renderer` that owns every
long-lived GPU cache and tracks the last bound state, so redundant
bindings are skipped between draws.

## Architecture

- **GraphicsDevice**: the GPU context trait (a recording `MockGraphicsDevice` ships with the crate)
- **Renderer**: draw dispatch, state caching, per-frame/per-model uniform blocks
- **RenderQueue**: ordered render passes followed by a post-process chain
- **Material**: shader variant + texture bindings + material uniforms
- **Mesh / MeshInstance**: ref-counted vertex/index buffers split into submeshes
- **CubemapBaker**: image based lighting precomputation (environment, irradiance, specular, BRDF LUT)
- **ShadowMap**: light frustum fit and depth pass
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod shader;
pub mod resource;
pub mod material;
pub mod renderer;
pub mod render_queue;
pub mod ibl;
pub mod shadow;

// Main prism3d namespace module
pub mod prism3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Renderer
    pub use crate::renderer::{Renderer, RendererConfig, RendererStats};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // GPU context sub-module
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Shader sub-module
    pub mod shader {
        pub use crate::shader::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Material sub-module
    pub mod material {
        pub use crate::material::*;
    }

    // Render queue sub-module
    pub mod render {
        pub use crate::render_queue::*;
    }

    // Image based lighting sub-module
    pub mod ibl {
        pub use crate::ibl::*;
    }

    // Shadow sub-module
    pub mod shadow {
        pub use crate::shadow::*;
    }
}

// Re-export math library at crate root
pub use glam;
