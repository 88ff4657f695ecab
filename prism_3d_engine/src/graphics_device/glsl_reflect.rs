/// GLSL program reflection
///
/// Parses both stages with the `glsl` front end and reports the uniforms a
/// linker would: loose `uniform` declarations (arrays and struct-typed
/// uniforms included) and `layout(std140) uniform` blocks. Array sizes may
/// name an object-like `#define`.
///
/// Struct uniforms are flattened the way GL reports them:
/// `u_material.albedo`, `u_lights[0].position`, `u_lights[1].position`, ...
/// Scalar arrays are reported once as `name[0]`.

use glsl::parser::Parse as _;
use glsl::syntax::{
    ArraySpecifier, ArraySpecifierDimension, Declaration, Expr, ExternalDeclaration,
    Preprocessor, PreprocessorDefine, StorageQualifier, StructFieldSpecifier,
    TranslationUnit, TypeQualifier, TypeQualifierSpec, TypeSpecifierNonArray,
};
use rustc_hash::FxHashMap;

use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::{
    ActiveUniform, ProgramReflection, Std140Builder, UniformBlockInfo, UniformType,
};

const SOURCE: &str = "prism3d::MockGraphicsDevice";

/// Nesting limit when a `#define` names another `#define`
const MAX_DEFINE_DEPTH: usize = 8;

#[derive(Debug, Clone)]
enum FieldType {
    Basic(UniformType),
    Struct(String),
    Unsupported,
}

/// Declared member of a struct or block, or a loose uniform
#[derive(Debug, Clone)]
struct Field {
    ty: FieldType,
    name: String,
    array_count: Option<u32>,
}

/// Uniform interface of one stage
#[derive(Debug, Default)]
struct StageInterface {
    defines: FxHashMap<String, String>,
    structs: FxHashMap<String, Vec<Field>>,
    uniforms: Vec<Field>,
    blocks: Vec<(String, Vec<Field>)>,
    has_main: bool,
}

/// Reflect the uniforms of a vertex/fragment pair
///
/// Fails like a link would when a stage does not parse or lacks `main`.
/// Names and blocks declared in both stages are reported once.
pub(crate) fn reflect_program(vertex_source: &str, fragment_source: &str) -> Result<ProgramReflection> {
    let mut reflection = ProgramReflection::default();

    for (stage, source) in [("vertex", vertex_source), ("fragment", fragment_source)] {
        let unit = match TranslationUnit::parse(source.trim_start()) {
            Ok(unit) => unit,
            Err(e) => engine_bail!(SOURCE, "Program link failed: {} stage does not parse: {}", stage, e),
        };
        let interface = StageInterface::scan(&unit);
        if !interface.has_main {
            engine_bail!(SOURCE, "Program link failed: {} stage is missing main()", stage);
        }

        for field in &interface.uniforms {
            let mut flattened = Vec::new();
            interface.flatten(field, &field.name, &mut flattened);
            for (name, uniform_type, array_size) in flattened {
                if reflection.uniform(&name).is_none() {
                    let location = reflection.uniforms.len() as u32;
                    reflection.uniforms.push(ActiveUniform { name, uniform_type, array_size, location });
                }
            }
        }

        for (name, members) in &interface.blocks {
            if reflection.block(name).is_some() {
                continue;
            }
            let mut builder = Std140Builder::new();
            for member in members {
                if let FieldType::Basic(uniform_type) = member.ty {
                    builder.push(&member.name, uniform_type, member.array_count);
                }
            }
            let (members, data_size) = builder.finish();
            let index = reflection.blocks.len() as u32;
            reflection.blocks.push(UniformBlockInfo { name: name.clone(), index, data_size, members });
        }
    }

    Ok(reflection)
}

impl StageInterface {
    fn scan(unit: &TranslationUnit) -> Self {
        let mut interface = Self::default();

        for external in unit.0.0.iter() {
            match external {
                ExternalDeclaration::Preprocessor(Preprocessor::Define(PreprocessorDefine::ObjectLike {
                    ident,
                    value,
                })) => {
                    interface.defines.insert(ident.0.clone(), value.trim().to_string());
                }
                ExternalDeclaration::FunctionDefinition(function) => {
                    if function.prototype.name.0 == "main" {
                        interface.has_main = true;
                    }
                }
                ExternalDeclaration::Declaration(Declaration::Block(block)) if is_uniform(Some(&block.qualifier)) => {
                    let members = block.fields.iter().flat_map(|field| interface.fields(field)).collect();
                    interface.blocks.push((block.name.0.clone(), members));
                }
                ExternalDeclaration::Declaration(Declaration::InitDeclaratorList(list)) => {
                    let head = &list.head;
                    let specifier = &head.ty.ty;
                    if let TypeSpecifierNonArray::Struct(definition) = &specifier.ty {
                        if let Some(name) = &definition.name {
                            let members = definition.fields.0.iter().flat_map(|field| interface.fields(field)).collect();
                            interface.structs.insert(name.0.clone(), members);
                        }
                    }
                    if !is_uniform(head.ty.qualifier.as_ref()) {
                        continue;
                    }

                    let ty = field_type(&specifier.ty);
                    let type_array = specifier.array_specifier.as_ref();
                    if let Some(name) = &head.name {
                        let array_count = interface.array_count(head.array_specifier.as_ref().or(type_array));
                        interface.uniforms.push(Field { ty: ty.clone(), name: name.0.clone(), array_count });
                    }
                    for declarator in &list.tail {
                        let array_count = interface.array_count(declarator.ident.array_spec.as_ref().or(type_array));
                        interface.uniforms.push(Field {
                            ty: ty.clone(),
                            name: declarator.ident.ident.0.clone(),
                            array_count,
                        });
                    }
                }
                _ => {}
            }
        }

        interface
    }

    fn fields(&self, field: &StructFieldSpecifier) -> Vec<Field> {
        let ty = field_type(&field.ty.ty);
        let type_array = field.ty.array_specifier.as_ref();
        field
            .identifiers
            .0
            .iter()
            .map(|identifier| Field {
                ty: ty.clone(),
                name: identifier.ident.0.clone(),
                array_count: self.array_count(identifier.array_spec.as_ref().or(type_array)),
            })
            .collect()
    }

    fn array_count(&self, specifier: Option<&ArraySpecifier>) -> Option<u32> {
        match specifier?.dimensions.0.first()? {
            ArraySpecifierDimension::ExplicitlySized(size) => self.evaluate(size, 0),
            ArraySpecifierDimension::Unsized => None,
        }
    }

    /// Constant array size, following `#define`d names
    fn evaluate(&self, expr: &Expr, depth: usize) -> Option<u32> {
        match expr {
            Expr::IntConst(value) => u32::try_from(*value).ok(),
            Expr::UIntConst(value) => Some(*value),
            Expr::Variable(name) if depth < MAX_DEFINE_DEPTH => {
                let value = self.defines.get(&name.0)?;
                let expr = Expr::parse(value.as_str()).ok()?;
                self.evaluate(&expr, depth + 1)
            }
            _ => None,
        }
    }

    fn flatten(&self, field: &Field, prefix: &str, out: &mut Vec<(String, UniformType, u32)>) {
        let struct_name = match &field.ty {
            FieldType::Basic(uniform_type) => {
                match field.array_count {
                    Some(count) => out.push((format!("{}[0]", prefix), *uniform_type, count)),
                    None => out.push((prefix.to_string(), *uniform_type, 1)),
                }
                return;
            }
            FieldType::Struct(name) => name,
            FieldType::Unsupported => return,
        };

        let Some(members) = self.structs.get(struct_name) else {
            return;
        };
        match field.array_count {
            Some(count) => {
                for i in 0..count {
                    for member in members {
                        let name = format!("{}[{}].{}", prefix, i, member.name);
                        self.flatten(member, &name, out);
                    }
                }
            }
            None => {
                for member in members {
                    let name = format!("{}.{}", prefix, member.name);
                    self.flatten(member, &name, out);
                }
            }
        }
    }
}

fn is_uniform(qualifier: Option<&TypeQualifier>) -> bool {
    qualifier.is_some_and(|qualifier| {
        qualifier
            .qualifiers
            .0
            .iter()
            .any(|spec| matches!(spec, TypeQualifierSpec::Storage(StorageQualifier::Uniform)))
    })
}

fn field_type(ty: &TypeSpecifierNonArray) -> FieldType {
    let basic = match ty {
        TypeSpecifierNonArray::Float => UniformType::Float,
        TypeSpecifierNonArray::Vec2 => UniformType::Vec2,
        TypeSpecifierNonArray::Vec3 => UniformType::Vec3,
        TypeSpecifierNonArray::Vec4 => UniformType::Vec4,
        TypeSpecifierNonArray::Int => UniformType::Int,
        TypeSpecifierNonArray::UInt => UniformType::UInt,
        TypeSpecifierNonArray::Bool => UniformType::Bool,
        TypeSpecifierNonArray::Mat3 => UniformType::Mat3,
        TypeSpecifierNonArray::Mat4 => UniformType::Mat4,
        TypeSpecifierNonArray::Sampler2D => UniformType::Sampler2D,
        TypeSpecifierNonArray::SamplerCube => UniformType::SamplerCube,
        TypeSpecifierNonArray::Sampler2DShadow => UniformType::Sampler2DShadow,
        TypeSpecifierNonArray::TypeName(name) => return FieldType::Struct(name.0.clone()),
        TypeSpecifierNonArray::Struct(definition) => {
            return definition
                .name
                .as_ref()
                .map_or(FieldType::Unsupported, |name| FieldType::Struct(name.0.clone()));
        }
        _ => return FieldType::Unsupported,
    };
    FieldType::Basic(basic)
}

#[cfg(test)]
#[path = "glsl_reflect_tests.rs"]
mod tests;
