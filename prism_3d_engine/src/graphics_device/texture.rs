/// Texture targets, formats, sampling state and texture descriptor

use std::fmt;

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    CubeMap,
    Texture2DArray,
    Texture3D,
}

impl fmt::Display for TextureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureTarget::Texture2D => "Texture2D",
            TextureTarget::CubeMap => "CubeMap",
            TextureTarget::Texture2DArray => "Texture2DArray",
            TextureTarget::Texture3D => "Texture3D",
        };
        write!(f, "{}", name)
    }
}

/// Cube map face, in GL face order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in upload order
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Face index (0..6)
    pub fn index(&self) -> usize {
        match self {
            CubeFace::PositiveX => 0,
            CubeFace::NegativeX => 1,
            CubeFace::PositiveY => 2,
            CubeFace::NegativeY => 3,
            CubeFace::PositiveZ => 4,
            CubeFace::NegativeZ => 5,
        }
    }
}

/// Image slot of a texture addressed by uploads and framebuffer attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureImageTarget {
    Texture2D,
    CubeFace(CubeFace),
}

/// Texel storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8,
    Rgb8,
    Rgb32F,
    Rgba32F,
    Rgba16F,
    Rg16F,
    Depth24,
}

impl TextureFormat {
    /// Returns size in bytes of one texel as uploaded
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            TextureFormat::Rgba8 => 4,
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgb32F => 12,
            TextureFormat::Rgba32F => 16,
            TextureFormat::Rgba16F => 8,
            TextureFormat::Rg16F => 4,
            TextureFormat::Depth24 => 4,
        }
    }

    /// Floating point formats (need float-linear support for linear filtering)
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            TextureFormat::Rgb32F | TextureFormat::Rgba32F | TextureFormat::Rgba16F | TextureFormat::Rg16F
        )
    }

    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth24)
    }
}

/// Texture minification / magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl TextureFilter {
    /// True when the filter interpolates between texels
    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            TextureFilter::Linear | TextureFilter::LinearMipmapNearest | TextureFilter::LinearMipmapLinear
        )
    }

    pub fn uses_mipmaps(&self) -> bool {
        matches!(
            self,
            TextureFilter::NearestMipmapNearest
                | TextureFilter::LinearMipmapNearest
                | TextureFilter::LinearMipmapLinear
        )
    }
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

/// Depth comparison function (shadow sampling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Less,
    LessEqual,
    Greater,
    Always,
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
///
/// Storage for each image is allocated by `GraphicsDevice::upload_texture`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    /// Binding target
    pub target: TextureTarget,
    /// Texel format
    pub format: TextureFormat,
    /// Width of mip 0 in pixels
    pub width: u32,
    /// Height of mip 0 in pixels
    pub height: u32,
    /// Number of mip levels allocated (1 = no mip chain)
    pub mip_levels: u32,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub wrap_r: TextureWrap,
    /// Depth compare mode (None = plain depth sampling)
    pub compare: Option<CompareFunc>,
}

impl TextureDesc {
    /// 2D texture with linear filtering and repeat wrapping
    pub fn texture_2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            target: TextureTarget::Texture2D,
            format,
            width,
            height,
            mip_levels: 1,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::Repeat,
            wrap_t: TextureWrap::Repeat,
            wrap_r: TextureWrap::Repeat,
            compare: None,
        }
    }

    /// Square cube map with linear filtering and clamp-to-edge wrapping
    pub fn cube_map(size: u32, format: TextureFormat) -> Self {
        Self {
            target: TextureTarget::CubeMap,
            format,
            width: size,
            height: size,
            mip_levels: 1,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
            wrap_r: TextureWrap::ClampToEdge,
            compare: None,
        }
    }

    pub fn with_filter(mut self, min_filter: TextureFilter, mag_filter: TextureFilter) -> Self {
        self.min_filter = min_filter;
        self.mag_filter = mag_filter;
        self
    }

    pub fn with_wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self.wrap_r = wrap;
        self
    }

    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels.max(1);
        self
    }

    pub fn with_compare(mut self, compare: Option<CompareFunc>) -> Self {
        self.compare = compare;
        self
    }

    /// True when either filter interpolates between texels
    pub fn uses_linear_filtering(&self) -> bool {
        self.min_filter.is_linear() || self.mag_filter.is_linear()
    }

    /// Size in pixels of one side of the given mip level
    pub fn mip_size(&self, level: u32) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
