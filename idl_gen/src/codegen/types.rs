/* Go representation of schema types */

use idl_types::{Program, TypeSpec, TypedefId};

use super::Generator;
use crate::annotations;
use crate::error::GenResult;

/// Single-byte discriminator of a value's shape on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Bool,
    I8,
    Double,
    I16,
    I32,
    I64,
    Binary,
    Struct,
    Map,
    Set,
    List,
}

impl WireType {
    /// Name of the matching constant in the wire runtime package.
    pub fn constant(self) -> &'static str {
        match self {
            WireType::Bool => "TBool",
            WireType::I8 => "TI8",
            WireType::Double => "TDouble",
            WireType::I16 => "TI16",
            WireType::I32 => "TI32",
            WireType::I64 => "TI64",
            WireType::Binary => "TBinary",
            WireType::Struct => "TStruct",
            WireType::Map => "TMap",
            WireType::Set => "TSet",
            WireType::List => "TList",
        }
    }
}

pub fn wire_type(program: &Program, ty: &TypeSpec) -> WireType {
    match program.root_type(ty) {
        TypeSpec::Bool => WireType::Bool,
        TypeSpec::I8 => WireType::I8,
        TypeSpec::I16 => WireType::I16,
        TypeSpec::I32 | TypeSpec::Enum(_) => WireType::I32,
        TypeSpec::I64 => WireType::I64,
        TypeSpec::Double => WireType::Double,
        TypeSpec::String | TypeSpec::Binary => WireType::Binary,
        TypeSpec::List(_) => WireType::List,
        TypeSpec::Set { .. } => WireType::Set,
        TypeSpec::Map { .. } => WireType::Map,
        TypeSpec::Struct(_) => WireType::Struct,
        /* root_type only stops on a typedef for a cyclic, unvalidated graph */
        TypeSpec::Typedef(_) => WireType::Struct,
    }
}

/// Types whose Go form can be `nil`: byte slices, containers and struct
/// pointers, through any number of typedef layers.
pub fn is_nilable(program: &Program, ty: &TypeSpec) -> bool {
    matches!(
        program.root_type(ty),
        TypeSpec::Binary | TypeSpec::List(_) | TypeSpec::Set { .. } | TypeSpec::Map { .. } | TypeSpec::Struct(_)
    )
}

/// Typedefs of structs are referenced through a pointer like the struct itself.
pub fn is_reference_typedef(program: &Program, id: TypedefId) -> bool {
    matches!(program.root_type(&program.typedef_spec(id).target), TypeSpec::Struct(_))
}

/// Maps with hashable keys become Go maps; others are slices of pairs.
pub fn map_is_keyed(program: &Program, key: &TypeSpec) -> bool {
    annotations::is_hashable(program, key)
}

/// How a struct field holds its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRepr {
    /// Required scalar held directly.
    Value,
    /// Optional scalar held behind a pointer; `nil` when absent.
    Pointer,
    /// A type that is already nil-able.
    Nilable,
}

pub fn field_repr(program: &Program, ty: &TypeSpec, required: bool) -> FieldRepr {
    if is_nilable(program, ty) {
        FieldRepr::Nilable
    } else if required {
        FieldRepr::Value
    } else {
        FieldRepr::Pointer
    }
}

/// Scalars whose pointer form needs a `_<M>_ptr` helper; named scalars
/// expose `Ptr()` themselves.
pub fn is_primitive(ty: &TypeSpec) -> bool {
    ty.is_base() && *ty != TypeSpec::Binary
}

impl Generator<'_> {
    /// Go type expression for values of `ty`.
    pub fn type_ref(&mut self, ty: &TypeSpec) -> GenResult<String> {
        let program = self.program;
        Ok(match ty {
            TypeSpec::Bool => "bool".to_string(),
            TypeSpec::I8 => "int8".to_string(),
            TypeSpec::I16 => "int16".to_string(),
            TypeSpec::I32 => "int32".to_string(),
            TypeSpec::I64 => "int64".to_string(),
            TypeSpec::Double => "float64".to_string(),
            TypeSpec::String => "string".to_string(),
            TypeSpec::Binary => "[]byte".to_string(),
            TypeSpec::List(element) => format!("[]{}", self.type_ref(element)?),
            TypeSpec::Set { element, annotations: set_annotations } => {
                let element_ref = self.type_ref(element)?;
                if annotations::set_is_keyed(program, element, set_annotations) {
                    format!("map[{element_ref}]struct{{}}")
                } else {
                    format!("[]{element_ref}")
                }
            }
            TypeSpec::Map { key, value } => {
                let key_ref = self.type_ref(key)?;
                let value_ref = self.type_ref(value)?;
                if map_is_keyed(program, key) {
                    format!("map[{key_ref}]{value_ref}")
                } else {
                    format!("[]struct{{Key {key_ref}; Value {value_ref}}}")
                }
            }
            TypeSpec::Enum(id) => self.enum_ident(*id)?,
            TypeSpec::Struct(id) => format!("*{}", self.struct_ident(*id)?),
            TypeSpec::Typedef(id) => {
                let ident = self.typedef_ident(*id)?;
                if is_reference_typedef(program, *id) { format!("*{ident}") } else { ident }
            }
        })
    }

    /// Go type of a struct field holding `ty`.
    pub fn field_type_ref(&mut self, ty: &TypeSpec, repr: FieldRepr) -> GenResult<String> {
        let base = self.type_ref(ty)?;
        Ok(match repr {
            FieldRepr::Pointer => format!("*{base}"),
            FieldRepr::Value | FieldRepr::Nilable => base,
        })
    }

    /// `wire.TI32` and friends.
    pub fn wire_type_ref(&mut self, ty: &TypeSpec) -> String {
        let wire = self.wire();
        format!("{wire}.{}", wire_type(self.program, ty).constant())
    }

    pub fn mangle(&mut self, ty: &TypeSpec) -> String {
        self.mangler.mangle(self.program, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idl_types::{ProgramBuilder, StructKind};

    #[test]
    fn wire_types_name_runtime_constants() {
        let mut builder = ProgramBuilder::new();
        let file = builder.file("w.thrift", "example.com/gen/w", "w");
        let color = builder.add_enum(file, "Color", &[("Red", 0)]);
        let program = builder.build().unwrap();

        assert_eq!(wire_type(&program, &TypeSpec::Enum(color)).constant(), "TI32");
        assert_eq!(wire_type(&program, &TypeSpec::Binary).constant(), "TBinary");
        assert_eq!(wire_type(&program, &TypeSpec::set(TypeSpec::I8)).constant(), "TSet");
        assert_eq!(wire_type(&program, &TypeSpec::list(TypeSpec::Double)).constant(), "TList");
    }

    #[test]
    fn typedefs_take_the_wire_type_and_representation_of_their_root() {
        let mut builder = ProgramBuilder::new();
        let file = builder.file("t.thrift", "example.com/gen/t", "t");
        let color = builder.add_enum(file, "Color", &[("Red", 0)]);
        let point = builder.add_struct(file, "Point", StructKind::Struct, vec![]);
        let shade = builder.add_typedef(file, "Shade", TypeSpec::Enum(color));
        let spot = builder.add_typedef(file, "Spot", TypeSpec::Struct(point));
        let place = builder.add_typedef(file, "Place", TypeSpec::Typedef(spot));
        let program = builder.build().unwrap();

        assert_eq!(wire_type(&program, &TypeSpec::Typedef(shade)), WireType::I32);
        assert_eq!(wire_type(&program, &TypeSpec::Typedef(place)), WireType::Struct);
        assert_eq!(wire_type(&program, &TypeSpec::String), WireType::Binary);
        assert!(is_reference_typedef(&program, place));
        assert!(!is_reference_typedef(&program, shade));
        assert_eq!(field_repr(&program, &TypeSpec::Typedef(shade), false), FieldRepr::Pointer);
        assert_eq!(field_repr(&program, &TypeSpec::Typedef(place), true), FieldRepr::Nilable);
        assert_eq!(field_repr(&program, &TypeSpec::I64, true), FieldRepr::Value);
    }

    #[test]
    fn unhashable_keys_make_pair_lists() {
        let mut builder = ProgramBuilder::new();
        let file = builder.file("m.thrift", "example.com/gen/m", "m");
        let point = builder.add_struct(file, "Point", StructKind::Struct, vec![]);
        let program = builder.build().unwrap();

        assert!(map_is_keyed(&program, &TypeSpec::String));
        assert!(!map_is_keyed(&program, &TypeSpec::Binary));
        assert!(!map_is_keyed(&program, &TypeSpec::Struct(point)));
    }
}
