//! Baked image based lighting maps of one environment.
//!
//! Materials hold an `Arc<IblEnvironment>` and read the current handles on
//! every activation, so `replace` swaps the lighting of every material at
//! once. The previous maps are destroyed by the swap.

use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::engine_debug;
use crate::graphics_device::{GraphicsDevice, TextureHandle};
use crate::resource::TextureCubeMap;

/// Cubemaps produced by the bake of one panorama
#[derive(Debug)]
pub struct IblMaps {
    pub environment: TextureCubeMap,
    pub irradiance: TextureCubeMap,
    pub specular: TextureCubeMap,
}

/// Raw handles of the current maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IblHandles {
    pub environment: TextureHandle,
    pub irradiance: TextureHandle,
    pub specular: TextureHandle,
}

#[derive(Debug, Default)]
pub struct IblEnvironment {
    maps: RwLock<Option<IblMaps>>,
}

impl IblEnvironment {
    /// Environment with no maps yet; materials bind the cube placeholder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maps(maps: IblMaps) -> Self {
        Self { maps: RwLock::new(Some(maps)) }
    }

    /// Handles of the current maps, None while empty or partly destroyed
    pub fn handles(&self) -> Option<IblHandles> {
        let maps = self.maps.read().ok()?;
        let maps = maps.as_ref()?;
        Some(IblHandles {
            environment: maps.environment.handle()?,
            irradiance: maps.irradiance.handle()?,
            specular: maps.specular.handle()?,
        })
    }

    pub fn specular_mip_levels(&self) -> u32 {
        self.maps
            .read()
            .ok()
            .and_then(|maps| maps.as_ref().map(|m| m.specular.mip_levels()))
            .unwrap_or(0)
    }

    /// Install new maps, destroying the previous set
    pub fn replace(&self, device: &mut dyn GraphicsDevice, maps: IblMaps) -> Result<()> {
        let mut current = self.write_maps()?;
        if let Some(mut old) = current.replace(maps) {
            destroy_maps(device, &mut old);
            engine_debug!("prism3d::IblEnvironment", "Replaced environment maps");
        }
        Ok(())
    }

    pub fn destroy(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if let Some(mut old) = self.write_maps()?.take() {
            destroy_maps(device, &mut old);
        }
        Ok(())
    }

    fn write_maps(&self) -> Result<std::sync::RwLockWriteGuard<'_, Option<IblMaps>>> {
        self.maps
            .write()
            .map_err(|_| Error::BackendError("IblEnvironment lock poisoned".to_string()))
    }
}

fn destroy_maps(device: &mut dyn GraphicsDevice, maps: &mut IblMaps) {
    maps.environment.destroy(device);
    maps.irradiance.destroy(device);
    maps.specular.destroy(device);
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
