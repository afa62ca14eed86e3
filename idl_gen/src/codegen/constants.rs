/* Constant declarations and literal rendering for constants and defaults */

use std::collections::HashSet;
use std::fmt::Write;

use idl_types::{ConstantId, ConstantValue, StructKind, TypeSpec};
use tracing::debug;

use super::structs::field_entity;
use super::types::{field_repr, is_primitive, is_reference_typedef, map_is_keyed, FieldRepr};
use super::Generator;
use crate::annotations;
use crate::error::{GenError, GenResult};
use crate::naming::go_quote;

/// Where a literal is being rendered, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct ValueSite<'e> {
    pub entity: &'e str,
}

impl Generator<'_> {
    fn invalid(&self, site: ValueSite<'_>, reason: String) -> GenError {
        GenError::InvalidConstant { entity: site.entity.to_string(), file: self.file_path().to_string(), reason }
    }

    pub fn emit_constant(&mut self, id: ConstantId) -> GenResult<()> {
        let program = self.program;
        let spec = program.constant_spec(id);
        let ident = self.constant_ident(id)?;
        let entity = format!("constant {}", spec.name);
        annotations::validate_type(&spec.ty, self.site(&entity))?;
        debug!(constant = %spec.name, ident = %ident, "emitting constant");

        let type_ref = self.type_ref(&spec.ty)?;
        let value = self.literal(&spec.ty, &spec.value, ValueSite { entity: &entity })?;
        let keyword = if self.is_const_expressible(&spec.ty, &spec.value) { "const" } else { "var" };
        writeln!(self.out, "{keyword} {ident} {type_ref} = {value}\n")?;
        Ok(())
    }

    /// Go constants only hold finite scalars and enum values; everything
    /// else becomes a package variable.
    pub fn is_const_expressible(&self, ty: &TypeSpec, value: &ConstantValue) -> bool {
        let program = self.program;
        let mut seen = HashSet::new();
        let (mut ty, mut value) = (ty, value);
        loop {
            let scalar_root = matches!(
                program.root_type(ty),
                TypeSpec::Bool
                    | TypeSpec::I8
                    | TypeSpec::I16
                    | TypeSpec::I32
                    | TypeSpec::I64
                    | TypeSpec::Double
                    | TypeSpec::String
                    | TypeSpec::Enum(_)
            );
            if !scalar_root {
                return false;
            }
            match value {
                ConstantValue::Double(d) => return d.is_finite(),
                ConstantValue::Constant(other) => {
                    /* a reference loop never settles on a value */
                    if !seen.insert(*other) {
                        return false;
                    }
                    let other = program.constant_spec(*other);
                    ty = &other.ty;
                    value = &other.value;
                }
                _ => return true,
            }
        }
    }

    /// Go expression of type `ty` holding `value`.
    pub fn literal(&mut self, ty: &TypeSpec, value: &ConstantValue, site: ValueSite<'_>) -> GenResult<String> {
        let program = self.program;
        if let ConstantValue::Constant(id) = value {
            return self.constant_ident(*id);
        }

        match ty {
            TypeSpec::Bool => match value {
                ConstantValue::Bool(b) => Ok(b.to_string()),
                ConstantValue::Int(0) => Ok("false".to_string()),
                ConstantValue::Int(1) => Ok("true".to_string()),
                other => Err(self.invalid(site, format!("expected a bool, found {other:?}"))),
            },
            TypeSpec::I8 => self.int_literal(value, i8::MIN as i64, i8::MAX as i64, "i8", site),
            TypeSpec::I16 => self.int_literal(value, i16::MIN as i64, i16::MAX as i64, "i16", site),
            TypeSpec::I32 => self.int_literal(value, i32::MIN as i64, i32::MAX as i64, "i32", site),
            TypeSpec::I64 => self.int_literal(value, i64::MIN, i64::MAX, "i64", site),
            TypeSpec::Double => match value {
                ConstantValue::Double(d) => Ok(self.float_literal(*d)),
                ConstantValue::Int(n) => Ok(n.to_string()),
                other => Err(self.invalid(site, format!("expected a double, found {other:?}"))),
            },
            TypeSpec::String => match value {
                ConstantValue::String(s) => Ok(go_quote(s)),
                other => Err(self.invalid(site, format!("expected a string, found {other:?}"))),
            },
            TypeSpec::Binary => match value {
                ConstantValue::String(s) => Ok(format!("[]byte({})", go_quote(s))),
                other => Err(self.invalid(site, format!("expected binary data, found {other:?}"))),
            },
            TypeSpec::Enum(enum_id) => match value {
                ConstantValue::EnumItem { enum_id: item_enum, item } if item_enum == enum_id => {
                    self.enum_item_ident(*enum_id, *item)
                }
                ConstantValue::Int(_) => {
                    let enum_ref = self.enum_ident(*enum_id)?;
                    let raw = self.int_literal(value, i32::MIN as i64, i32::MAX as i64, "enum", site)?;
                    Ok(format!("{enum_ref}({raw})"))
                }
                other => Err(self.invalid(site, format!("expected an item of the enum, found {other:?}"))),
            },
            TypeSpec::Typedef(id) => {
                let target = &program.typedef_spec(*id).target;
                let inner = self.literal(target, value, site)?;
                let type_ref = self.type_ref(ty)?;
                Ok(format!("({type_ref})({inner})"))
            }
            TypeSpec::List(element) => {
                let ConstantValue::List(items) = value else {
                    return Err(self.invalid(site, format!("expected a list, found {value:?}")));
                };
                let type_ref = self.type_ref(ty)?;
                let rendered = self.literals(element, items, site)?;
                Ok(format!("{type_ref}{{{}}}", rendered.join(", ")))
            }
            TypeSpec::Set { element, annotations: set_annotations } => {
                let ConstantValue::List(items) = value else {
                    return Err(self.invalid(site, format!("expected a set, found {value:?}")));
                };
                let type_ref = self.type_ref(ty)?;
                let rendered = self.literals(element, items, site)?;
                if annotations::set_is_keyed(program, element, set_annotations) {
                    let members: Vec<String> = rendered.iter().map(|m| format!("{m}: struct{{}}{{}}")).collect();
                    Ok(format!("{type_ref}{{{}}}", members.join(", ")))
                } else {
                    Ok(format!("{type_ref}{{{}}}", rendered.join(", ")))
                }
            }
            TypeSpec::Map { key, value: value_ty } => {
                let ConstantValue::Map(pairs) = value else {
                    return Err(self.invalid(site, format!("expected a map, found {value:?}")));
                };
                let type_ref = self.type_ref(ty)?;
                let keyed = map_is_keyed(program, key);
                let mut entries = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    let k = self.literal(key, &pair.key, site)?;
                    let v = self.literal(value_ty, &pair.value, site)?;
                    entries.push(if keyed { format!("{k}: {v}") } else { format!("{{Key: {k}, Value: {v}}}") });
                }
                Ok(format!("{type_ref}{{{}}}", entries.join(", ")))
            }
            TypeSpec::Struct(id) => {
                let ConstantValue::Map(pairs) = value else {
                    return Err(self.invalid(site, format!("expected a struct literal, found {value:?}")));
                };
                let spec = program.struct_spec(*id);
                let ident = self.struct_ident(*id)?;
                let mut assignments = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    let ConstantValue::String(name) = &pair.key else {
                        return Err(self.invalid(site, format!("struct literal keys must be field names, found {:?}", pair.key)));
                    };
                    let field = spec.fields.find_by_name(name).ok_or_else(|| {
                        self.invalid(site, format!("{} has no field named {name}", spec.name))
                    })?;
                    let field_entity = field_entity(&field.name, &spec.name);
                    let field_ident = annotations::identifier(
                        &field.name,
                        &field.annotations,
                        annotations::Site { entity: &field_entity, file: &program.file(spec.file).path },
                    )?;
                    let required = field.is_required() && spec.kind != StructKind::Union;
                    let rendered = self.field_value(&field.ty, required, &pair.value, site)?;
                    assignments.push(format!("{field_ident}: {rendered}"));
                }
                Ok(format!("&{ident}{{{}}}", assignments.join(", ")))
            }
        }
    }

    fn literals(&mut self, element: &TypeSpec, items: &[ConstantValue], site: ValueSite<'_>) -> GenResult<Vec<String>> {
        items.iter().map(|item| self.literal(element, item, site)).collect()
    }

    /// Literal for a struct field: scalars held by pointer are wrapped.
    pub fn field_value(
        &mut self,
        ty: &TypeSpec,
        required: bool,
        value: &ConstantValue,
        site: ValueSite<'_>,
    ) -> GenResult<String> {
        let literal = self.literal(ty, value, site)?;
        match field_repr(self.program, ty, required) {
            FieldRepr::Pointer => self.pointer_to(ty, &literal),
            FieldRepr::Value | FieldRepr::Nilable => Ok(literal),
        }
    }

    fn int_literal(&self, value: &ConstantValue, min: i64, max: i64, what: &str, site: ValueSite<'_>) -> GenResult<String> {
        match value {
            ConstantValue::Int(n) if (min..=max).contains(n) => Ok(n.to_string()),
            ConstantValue::Int(n) => Err(self.invalid(site, format!("{n} does not fit in {what}"))),
            other => Err(self.invalid(site, format!("expected an integer, found {other:?}"))),
        }
    }

    fn float_literal(&mut self, value: f64) -> String {
        if value.is_nan() {
            let math = self.import("math");
            format!("{math}.NaN()")
        } else if value.is_infinite() {
            let math = self.import("math");
            format!("{math}.Inf({})", if value > 0.0 { 1 } else { -1 })
        } else {
            format!("{value:?}")
        }
    }

    /// Pointer to `expr` of scalar type `ty`: `_<M>_ptr(expr)` for primitives
    /// and `expr.Ptr()` for enums and scalar typedefs.
    pub fn pointer_to(&mut self, ty: &TypeSpec, expr: &str) -> GenResult<String> {
        let program = self.program;
        match ty {
            TypeSpec::Enum(_) => Ok(format!("{expr}.Ptr()")),
            TypeSpec::Typedef(id) if !is_reference_typedef(program, *id) => Ok(format!("{expr}.Ptr()")),
            _ if is_primitive(ty) => {
                let helper = self.ptr_helper(ty)?;
                Ok(format!("{helper}({expr})"))
            }
            _ => Err(GenError::Internal(format!("no pointer form for {ty:?}"))),
        }
    }

    fn ptr_helper(&mut self, ty: &TypeSpec) -> GenResult<String> {
        let symbol = format!("_{}_ptr", self.mangle(ty));
        let name = symbol.clone();
        let ty = ty.clone();
        self.helper(&symbol, move |g| {
            let type_ref = g.type_ref(&ty)?;
            Ok(format!("func {name}(v {type_ref}) *{type_ref} {{\n\treturn &v\n}}\n\n"))
        })?;
        Ok(symbol)
    }
}
