/// Uniform types, uniform values and program reflection
///
/// The device reports the active uniforms and uniform blocks of a
/// program when it is linked. Block member offsets follow std140:
///
/// | type          | alignment | size |
/// |---------------|-----------|------|
/// | float/int/bool| 4         | 4    |
/// | vec2          | 8         | 8    |
/// | vec3          | 16        | 12   |
/// | vec4          | 16        | 16   |
/// | mat3          | 16        | 48   |
/// | mat4          | 16        | 64   |
///
/// Array elements are padded to 16-byte rows.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

// ===== UNIFORM TYPE =====

/// GLSL type of a uniform or block member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    UInt,
    Bool,
    Mat3,
    Mat4,
    Sampler2D,
    SamplerCube,
    Sampler2DShadow,
}

impl UniformType {
    /// Parse a GLSL type keyword
    pub fn from_glsl(keyword: &str) -> Option<Self> {
        let ty = match keyword {
            "float" => UniformType::Float,
            "vec2" => UniformType::Vec2,
            "vec3" => UniformType::Vec3,
            "vec4" => UniformType::Vec4,
            "int" => UniformType::Int,
            "uint" => UniformType::UInt,
            "bool" => UniformType::Bool,
            "mat3" => UniformType::Mat3,
            "mat4" => UniformType::Mat4,
            "sampler2D" => UniformType::Sampler2D,
            "samplerCube" => UniformType::SamplerCube,
            "sampler2DShadow" => UniformType::Sampler2DShadow,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_sampler(&self) -> bool {
        matches!(
            self,
            UniformType::Sampler2D | UniformType::SamplerCube | UniformType::Sampler2DShadow
        )
    }

    /// std140 base alignment of a non-array member
    pub fn std140_alignment(&self) -> usize {
        match self {
            UniformType::Vec2 => 8,
            UniformType::Vec3 | UniformType::Vec4 | UniformType::Mat3 | UniformType::Mat4 => 16,
            _ => 4,
        }
    }

    /// std140 size in bytes of a non-array member
    pub fn std140_size(&self) -> usize {
        match self {
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Mat3 => 48,
            UniformType::Mat4 => 64,
            _ => 4,
        }
    }
}

fn round_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

// ===== UNIFORM VALUE =====

/// Value written to a loose uniform or a block member
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    UInt(u32),
    Bool(bool),
    Mat3(Mat3),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    IntArray(Vec<i32>),
    BoolArray(Vec<bool>),
    Vec3Array(Vec<Vec3>),
    Vec4Array(Vec<Vec4>),
}

impl UniformValue {
    /// 32-bit words of the value in column-major order
    pub fn words(&self) -> Vec<u32> {
        match self {
            UniformValue::Float(v) => vec![v.to_bits()],
            UniformValue::Vec2(v) => v.to_array().iter().map(|f| f.to_bits()).collect(),
            UniformValue::Vec3(v) => v.to_array().iter().map(|f| f.to_bits()).collect(),
            UniformValue::Vec4(v) => v.to_array().iter().map(|f| f.to_bits()).collect(),
            UniformValue::Int(v) => vec![*v as u32],
            UniformValue::UInt(v) => vec![*v],
            UniformValue::Bool(v) => vec![u32::from(*v)],
            UniformValue::Mat3(m) => m.to_cols_array().iter().map(|f| f.to_bits()).collect(),
            UniformValue::Mat4(m) => m.to_cols_array().iter().map(|f| f.to_bits()).collect(),
            UniformValue::FloatArray(values) => values.iter().map(|f| f.to_bits()).collect(),
            UniformValue::IntArray(values) => values.iter().map(|v| *v as u32).collect(),
            UniformValue::BoolArray(values) => values.iter().map(|v| u32::from(*v)).collect(),
            UniformValue::Vec3Array(values) => values
                .iter()
                .flat_map(|v| v.to_array())
                .map(|f| f.to_bits())
                .collect(),
            UniformValue::Vec4Array(values) => values
                .iter()
                .flat_map(|v| v.to_array())
                .map(|f| f.to_bits())
                .collect(),
        }
    }

    /// Number of words forming one std140 row (array element or matrix column)
    pub fn items_per_row(&self) -> usize {
        match self {
            UniformValue::Vec2(_) => 2,
            UniformValue::Vec3(_) | UniformValue::Vec3Array(_) | UniformValue::Mat3(_) => 3,
            UniformValue::Vec4(_) | UniformValue::Vec4Array(_) | UniformValue::Mat4(_) => 4,
            _ => 1,
        }
    }

    /// True when the value can be written to a uniform declared as `ty`
    pub fn is_compatible(&self, ty: UniformType) -> bool {
        match self {
            UniformValue::Float(_) | UniformValue::FloatArray(_) => ty == UniformType::Float,
            UniformValue::Vec2(_) => ty == UniformType::Vec2,
            UniformValue::Vec3(_) | UniformValue::Vec3Array(_) => ty == UniformType::Vec3,
            UniformValue::Vec4(_) | UniformValue::Vec4Array(_) => ty == UniformType::Vec4,
            UniformValue::Int(_) | UniformValue::IntArray(_) => {
                matches!(ty, UniformType::Int | UniformType::Bool) || ty.is_sampler()
            }
            UniformValue::UInt(_) => matches!(ty, UniformType::UInt | UniformType::Int),
            UniformValue::Bool(_) | UniformValue::BoolArray(_) => {
                matches!(ty, UniformType::Bool | UniformType::Int)
            }
            UniformValue::Mat3(_) => ty == UniformType::Mat3,
            UniformValue::Mat4(_) => ty == UniformType::Mat4,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self { UniformValue::Float(value) }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self { UniformValue::Int(value) }
}

impl From<u32> for UniformValue {
    fn from(value: u32) -> Self { UniformValue::UInt(value) }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self { UniformValue::Bool(value) }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self { UniformValue::Vec2(value) }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self { UniformValue::Vec3(value) }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self { UniformValue::Vec4(value) }
}

impl From<Mat3> for UniformValue {
    fn from(value: Mat3) -> Self { UniformValue::Mat3(value) }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self { UniformValue::Mat4(value) }
}

// ===== REFLECTION =====

/// A loose (non-block) uniform reported by the linker
///
/// Array uniforms are reported once as `name[0]` with their element count.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveUniform {
    pub name: String,
    pub uniform_type: UniformType,
    pub array_size: u32,
    pub location: u32,
}

/// One member of a uniform block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMember {
    pub name: String,
    /// Byte offset from the start of the block
    pub offset: usize,
    pub uniform_type: UniformType,
    /// Element count (1 for non-arrays)
    pub array_count: u32,
    /// Byte size including row padding
    pub size: usize,
}

/// A uniform block reported by the linker
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlockInfo {
    pub name: String,
    /// Block index within the program
    pub index: u32,
    /// Total block size in bytes
    pub data_size: usize,
    pub members: Vec<BlockMember>,
}

/// Everything the linker reports about a program's uniforms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramReflection {
    pub uniforms: Vec<ActiveUniform>,
    pub blocks: Vec<UniformBlockInfo>,
}

impl ProgramReflection {
    pub fn uniform(&self, name: &str) -> Option<&ActiveUniform> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    pub fn block(&self, name: &str) -> Option<&UniformBlockInfo> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

// ===== STD140 =====

/// Computes std140 member offsets for a uniform block
///
/// # Example
///
/// ```
/// use prism_3d_engine::prism3d::device::{Std140Builder, UniformType};
///
/// let mut builder = Std140Builder::new();
/// builder.push("model", UniformType::Mat4, None);
/// let offset = builder.push("normal_view", UniformType::Mat3, None);
/// assert_eq!(offset, 64);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Std140Builder {
    offset: usize,
    members: Vec<BlockMember>,
}

impl Std140Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member and return its byte offset
    pub fn push(&mut self, name: &str, uniform_type: UniformType, array_count: Option<u32>) -> usize {
        let (alignment, size, count) = match array_count {
            None => (uniform_type.std140_alignment(), uniform_type.std140_size(), 1),
            Some(count) => {
                let stride = round_up(uniform_type.std140_size(), 16);
                (16, stride * count as usize, count)
            }
        };
        let offset = round_up(self.offset, alignment);
        self.members.push(BlockMember {
            name: name.to_string(),
            offset,
            uniform_type,
            array_count: count,
            size,
        });
        self.offset = offset + size;
        offset
    }

    /// Block size rounded up to a whole 16-byte row
    pub fn size(&self) -> usize {
        round_up(self.offset, 16)
    }

    pub fn finish(self) -> (Vec<BlockMember>, usize) {
        let size = self.size();
        (self.members, size)
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
