/* Deep equality expressions and comparator helpers */

use std::fmt::Write;

use idl_types::TypeSpec;

use super::types::map_is_keyed;
use super::Generator;
use crate::annotations;
use crate::error::{GenError, GenResult};

impl Generator<'_> {
    /// Go boolean expression comparing `lhs` and `rhs` of type `ty`.
    pub fn equals(&mut self, ty: &TypeSpec, lhs: &str, rhs: &str) -> GenResult<String> {
        Ok(match ty {
            TypeSpec::Bool
            | TypeSpec::I8
            | TypeSpec::I16
            | TypeSpec::I32
            | TypeSpec::I64
            | TypeSpec::Double
            | TypeSpec::String => format!("({lhs} == {rhs})"),
            TypeSpec::Binary => {
                let bytes = self.import("bytes");
                format!("{bytes}.Equal({lhs}, {rhs})")
            }
            TypeSpec::Enum(_) | TypeSpec::Struct(_) | TypeSpec::Typedef(_) => format!("{lhs}.Equals({rhs})"),
            TypeSpec::List(_) | TypeSpec::Set { .. } | TypeSpec::Map { .. } => {
                let comparator = self.container_equals(ty)?;
                format!("{comparator}({lhs}, {rhs})")
            }
        })
    }

    /// `_<M>_Equals` for a list, set or map.
    fn container_equals(&mut self, ty: &TypeSpec) -> GenResult<String> {
        let symbol = format!("_{}_Equals", self.mangle(ty));
        let name = symbol.clone();
        let ty = ty.clone();
        self.helper(&symbol, move |g| {
            let program = g.program;
            let type_ref = g.type_ref(&ty)?;
            let mut out = String::new();
            writeln!(out, "func {name}(lhs, rhs {type_ref}) bool {{")?;
            writeln!(out, "\tif len(lhs) != len(rhs) {{\n\t\treturn false\n\t}}\n")?;
            match &ty {
                TypeSpec::List(element) => {
                    let eq = g.equals(element, "lv", "rv")?;
                    writeln!(out, "\tfor i, lv := range lhs {{\n\t\trv := rhs[i]")?;
                    writeln!(out, "\t\tif !{eq} {{\n\t\t\treturn false\n\t\t}}\n\t}}")?;
                }
                TypeSpec::Set { element, annotations: set_annotations } => {
                    if annotations::set_is_keyed(program, element, set_annotations) {
                        writeln!(out, "\tfor x := range rhs {{")?;
                        writeln!(out, "\t\tif _, ok := lhs[x]; !ok {{\n\t\t\treturn false\n\t\t}}\n\t}}")?;
                    } else {
                        /* No hash available: pairwise membership search */
                        let eq = g.equals(element, "x", "y")?;
                        writeln!(out, "\tfor _, x := range lhs {{\n\t\tok := false")?;
                        writeln!(out, "\t\tfor _, y := range rhs {{")?;
                        writeln!(out, "\t\t\tif {eq} {{\n\t\t\t\tok = true\n\t\t\t\tbreak\n\t\t\t}}\n\t\t}}")?;
                        writeln!(out, "\t\tif !ok {{\n\t\t\treturn false\n\t\t}}\n\t}}")?;
                    }
                }
                TypeSpec::Map { key, value } => {
                    let value_eq = g.equals(value, "lv", "rv")?;
                    if map_is_keyed(program, key) {
                        writeln!(out, "\tfor lk, lv := range lhs {{")?;
                        writeln!(out, "\t\trv, ok := rhs[lk]\n\t\tif !ok {{\n\t\t\treturn false\n\t\t}}")?;
                        writeln!(out, "\t\tif !{value_eq} {{\n\t\t\treturn false\n\t\t}}\n\t}}")?;
                    } else {
                        let key_eq = g.equals(key, "lk", "rk")?;
                        writeln!(out, "\tfor _, i := range lhs {{\n\t\tlk := i.Key\n\t\tlv := i.Value\n\t\tok := false")?;
                        writeln!(out, "\t\tfor _, j := range rhs {{\n\t\t\trk := j.Key\n\t\t\trv := j.Value")?;
                        writeln!(out, "\t\t\tif !{key_eq} {{\n\t\t\t\tcontinue\n\t\t\t}}")?;
                        writeln!(out, "\t\t\tif !{value_eq} {{\n\t\t\t\treturn false\n\t\t\t}}")?;
                        writeln!(out, "\t\t\tok = true\n\t\t\tbreak\n\t\t}}")?;
                        writeln!(out, "\t\tif !ok {{\n\t\t\treturn false\n\t\t}}\n\t}}")?;
                    }
                }
                _ => return Err(GenError::Internal(format!("container comparator requested for {ty:?}"))),
            }
            writeln!(out, "\treturn true\n}}\n")?;
            Ok(out)
        })?;
        Ok(symbol)
    }

    /// `_<M>_EqualsPtr`: compares two optional scalars held by pointer.
    pub fn equals_ptr(&mut self, ty: &TypeSpec) -> GenResult<String> {
        let symbol = format!("_{}_EqualsPtr", self.mangle(ty));
        let name = symbol.clone();
        let ty = ty.clone();
        self.helper(&symbol, move |g| {
            let type_ref = g.type_ref(&ty)?;
            let eq = g.equals(&ty, "x", "y")?;
            Ok(format!(
                "func {name}(lhs, rhs *{type_ref}) bool {{\n\
                 \tif lhs != nil && rhs != nil {{\n\
                 \t\tx := *lhs\n\
                 \t\ty := *rhs\n\
                 \t\treturn {eq}\n\
                 \t}}\n\
                 \treturn lhs == nil && rhs == nil\n\
                 }}\n\n"
            ))
        })?;
        Ok(symbol)
    }
}
