//! Stable symbolic names for types, used to derive helper identifiers.
//!
//! One [`Mangler`] belongs to one generation run. Named types are cased like
//! exported Go identifiers; when two distinct `(file, name)` pairs collapse to
//! the same casing, later arrivals get `_1`, `_2`, ... in first-seen order.

use crate::annotations;
use crate::naming::go_case;
use idl_types::{FileId, Named, Program, TypeSpec};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default)]
pub struct Mangler {
    named: HashMap<(FileId, String), String>,
    /* cased name -> number of distinct (file, name) pairs seen with it */
    seen: HashMap<String, usize>,
}

impl Mangler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mangle(&mut self, program: &Program, ty: &TypeSpec) -> String {
        match ty {
            TypeSpec::Bool => "Bool".to_string(),
            TypeSpec::I8 => "I8".to_string(),
            TypeSpec::I16 => "I16".to_string(),
            TypeSpec::I32 => "I32".to_string(),
            TypeSpec::I64 => "I64".to_string(),
            TypeSpec::Double => "Double".to_string(),
            TypeSpec::String => "String".to_string(),
            TypeSpec::Binary => "Binary".to_string(),
            TypeSpec::List(element) => format!("List_{}", self.mangle(program, element)),
            TypeSpec::Set { element, annotations: set_annotations } => {
                let suffix = if annotations::set_is_keyed(program, element, set_annotations) {
                    "mapType"
                } else {
                    "sliceType"
                };
                format!("Set_{}_{}", self.mangle(program, element), suffix)
            }
            TypeSpec::Map { key, value } => {
                format!("Map_{}_{}", self.mangle(program, key), self.mangle(program, value))
            }
            TypeSpec::Enum(id) => self.named(program.enum_spec(*id)),
            TypeSpec::Struct(id) => self.named(program.struct_spec(*id)),
            TypeSpec::Typedef(id) => self.named(program.typedef_spec(*id)),
        }
    }

    fn named(&mut self, entity: &impl Named) -> String {
        let key = (entity.file(), entity.name().to_string());
        if let Some(name) = self.named.get(&key) {
            return name.clone();
        }

        let cased = go_case(entity.name());
        let count = self.seen.entry(cased.clone()).or_insert(0);
        let name = if *count == 0 { cased } else { format!("{cased}_{count}") };
        *count += 1;

        trace!(schema_name = entity.name(), file = %entity.file(), mangled = %name, "mangled named type");
        self.named.insert(key, name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idl_types::{ProgramBuilder, StructKind};

    #[test]
    fn compound_names_are_stable_within_a_run() {
        let program = Program::default();
        let mut mangler = Mangler::new();
        let ty = TypeSpec::list(TypeSpec::map(TypeSpec::String, TypeSpec::I32));

        let first = mangler.mangle(&program, &ty);
        assert_eq!(first, "List_Map_String_I32");
        assert_eq!(mangler.mangle(&program, &ty), first);
    }

    #[test]
    fn same_name_in_different_files_is_disambiguated() {
        let mut builder = ProgramBuilder::new();
        let a = builder.file("a.thrift", "example.com/gen/a", "a");
        let b = builder.file("b.thrift", "example.com/gen/b", "b");
        let first = builder.add_struct(a, "Point", StructKind::Struct, vec![]);
        let second = builder.add_struct(b, "Point", StructKind::Struct, vec![]);
        let program = builder.build().unwrap();

        let mut mangler = Mangler::new();
        assert_eq!(mangler.mangle(&program, &TypeSpec::Struct(first)), "Point");
        assert_eq!(mangler.mangle(&program, &TypeSpec::Struct(second)), "Point_1");
        assert_eq!(mangler.mangle(&program, &TypeSpec::Struct(first)), "Point");
        assert_eq!(mangler.mangle(&program, &TypeSpec::Struct(second)), "Point_1");
    }

    #[test]
    fn disambiguation_is_first_seen() {
        let mut builder = ProgramBuilder::new();
        let a = builder.file("a.thrift", "example.com/gen/a", "a");
        let b = builder.file("b.thrift", "example.com/gen/b", "b");
        let first = builder.add_struct(a, "user_id", StructKind::Struct, vec![]);
        let second = builder.add_struct(b, "UserID", StructKind::Struct, vec![]);
        let program = builder.build().unwrap();

        let mut mangler = Mangler::new();
        assert_eq!(mangler.mangle(&program, &TypeSpec::Struct(second)), "UserID");
        assert_eq!(mangler.mangle(&program, &TypeSpec::Struct(first)), "UserID_1");
    }

    #[test]
    fn set_names_record_their_representation() {
        let mut builder = ProgramBuilder::new();
        let file = builder.file("s.thrift", "example.com/gen/s", "s");
        let point = builder.add_struct(file, "Point", StructKind::Struct, vec![]);
        let program = builder.build().unwrap();

        let mut forced = idl_types::Annotations::new();
        forced.insert("go.type".to_string(), "slice".to_string());

        let mut mangler = Mangler::new();
        assert_eq!(mangler.mangle(&program, &TypeSpec::set(TypeSpec::I32)), "Set_I32_mapType");
        assert_eq!(mangler.mangle(&program, &TypeSpec::set_with(TypeSpec::I32, forced)), "Set_I32_sliceType");
        assert_eq!(mangler.mangle(&program, &TypeSpec::set(TypeSpec::Struct(point))), "Set_Point_sliceType");
    }
}
