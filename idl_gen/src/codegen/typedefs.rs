/* Typedefs: thin wrappers delegating one layer down to their target */

use std::fmt::Write;

use idl_types::{TypeSpec, TypedefId};
use tracing::debug;

use super::types::is_reference_typedef;
use super::zap::ZapShape;
use super::Generator;
use crate::annotations;
use crate::error::GenResult;

impl Generator<'_> {
    pub fn emit_typedef(&mut self, id: TypedefId) -> GenResult<()> {
        let program = self.program;
        let spec = program.typedef_spec(id);
        let entity = format!("typedef {}", spec.name);
        annotations::validate_type(&spec.target, self.site(&entity))?;

        let name = self.typedef_ident(id)?;
        let target = &spec.target;
        /* Go type of the layer below, e.g. `string`, `*Point` or `UUID` */
        let target_ref = self.type_ref(target)?;
        let by_reference = is_reference_typedef(program, id);
        let root = program.root_type(target).clone();
        debug!(name = %spec.name, ident = %name, by_reference, "emitting typedef");

        let wire = self.wire();
        let fmt = self.import("fmt");
        let (receiver, underlying) = if by_reference {
            (format!("*{name}"), target_ref.trim_start_matches('*').to_string())
        } else {
            (name.clone(), target_ref.clone())
        };
        let unwrap = |operand: &str| format!("({target_ref})({operand})");

        let mut out = String::new();
        writeln!(out, "type {name} {underlying}\n")?;

        if matches!(root, TypeSpec::Bool | TypeSpec::I8 | TypeSpec::I16 | TypeSpec::I32 | TypeSpec::I64 | TypeSpec::Double | TypeSpec::String | TypeSpec::Enum(_)) {
            writeln!(out, "// Ptr returns a pointer to this {name}")?;
            writeln!(out, "func (v {name}) Ptr() *{name} {{\n\treturn &v\n}}\n")?;
        }

        let encode = self.to_wire(target, "x")?;
        writeln!(out, "// ToWire translates {name} into a Thrift-level intermediate")?;
        writeln!(out, "// representation.")?;
        writeln!(out, "func (v {receiver}) ToWire() ({wire}.Value, error) {{")?;
        writeln!(out, "\tx := {}\n\treturn {encode}\n}}\n", unwrap("v"))?;

        writeln!(out, "// String returns a readable string representation of {name}.")?;
        writeln!(out, "func (v {receiver}) String() string {{")?;
        writeln!(out, "\tx := {}\n\treturn {fmt}.Sprint(x)\n}}\n", unwrap("v"))?;

        writeln!(out, "// FromWire deserializes {name} from its Thrift-level")?;
        writeln!(out, "// representation.")?;
        writeln!(out, "func (v *{name}) FromWire(w {wire}.Value) error {{")?;
        if by_reference {
            writeln!(out, "\treturn {}.FromWire(w)\n}}\n", unwrap("v"))?;
        } else {
            let decode = self.from_wire(target, "w")?;
            writeln!(out, "\tx, err := {decode}\n\t*v = ({name})(x)\n\treturn err\n}}\n")?;
        }

        let eq = self.equals(target, &unwrap("v"), &unwrap("rhs"))?;
        writeln!(out, "// Equals returns true if this {name} is equal to the provided")?;
        writeln!(out, "// {name}.")?;
        writeln!(out, "func (v {receiver}) Equals(rhs {receiver}) bool {{\n\treturn {eq}\n}}\n")?;

        if !self.options.no_zap {
            let zapcore = self.zapcore();
            match &root {
                TypeSpec::Struct(_) => {
                    writeln!(out, "func (v {receiver}) MarshalLogObject(enc {zapcore}.ObjectEncoder) error {{")?;
                    writeln!(out, "\treturn {}.MarshalLogObject(enc)\n}}\n", unwrap("v"))?;
                }
                TypeSpec::List(_) | TypeSpec::Set { .. } | TypeSpec::Map { .. } => {
                    let (zapper, shape) = self.zapper(&root)?;
                    let (method, encoder) = match shape {
                        ZapShape::Object => ("MarshalLogObject", "ObjectEncoder"),
                        ZapShape::Array => ("MarshalLogArray", "ArrayEncoder"),
                    };
                    writeln!(out, "func (v {receiver}) {method}(enc {zapcore}.{encoder}) error {{")?;
                    writeln!(out, "\treturn ({zapper})(v).{method}(enc)\n}}\n")?;
                }
                _ => {}
            }
        }

        self.out.push_str(&out);
        Ok(())
    }
}
