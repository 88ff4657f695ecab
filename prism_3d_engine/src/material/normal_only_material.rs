use crate::error::Result;
use crate::material::{Material, MaterialContext, MaterialId};
use crate::shader::{shader_source, ShaderSource};

/// Debug material writing view-space normals as color
#[derive(Debug, Clone)]
pub struct NormalOnlyMaterial {
    id: MaterialId,
}

impl NormalOnlyMaterial {
    pub fn new() -> Self {
        Self { id: MaterialId::next() }
    }
}

impl Default for NormalOnlyMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl Material for NormalOnlyMaterial {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn shader_source(&self) -> &'static ShaderSource {
        &shader_source::NORMAL_ONLY
    }

    fn activate(&self, _context: &mut MaterialContext<'_>) -> Result<()> {
        Ok(())
    }
}
