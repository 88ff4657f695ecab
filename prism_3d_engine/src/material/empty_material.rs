/// Material with no parameters of its own
///
/// Draws with a fixed shader variant and writes no uniforms. The default
/// variant is the depth-only shader used by shadow passes; bakes and
/// full-screen passes use it with their own variant.

use crate::error::Result;
use crate::material::{Material, MaterialContext, MaterialId};
use crate::shader::{shader_source, ShaderSource};

#[derive(Debug, Clone)]
pub struct EmptyMaterial {
    id: MaterialId,
    source: &'static ShaderSource,
}

impl EmptyMaterial {
    /// Depth-only material
    pub fn depth() -> Self {
        Self::with_shader(&shader_source::DEPTH)
    }

    pub fn with_shader(source: &'static ShaderSource) -> Self {
        Self {
            id: MaterialId::next(),
            source,
        }
    }
}

impl Default for EmptyMaterial {
    fn default() -> Self {
        Self::depth()
    }
}

impl Material for EmptyMaterial {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn shader_source(&self) -> &'static ShaderSource {
        self.source
    }

    fn activate(&self, _context: &mut MaterialContext<'_>) -> Result<()> {
        Ok(())
    }
}
