//! Structs, unions and exceptions.
//!
//! Every field is laid out once up front (identifier, Go type, requiredness,
//! tag, accessor names, decode bookkeeping local) and each generated method
//! then reads from that layout, so all methods agree on the same names.

use std::fmt::Write;

use idl_types::{ConstantValue, FieldGroup, StructKind, StructSpec, TypeSpec};
use tracing::{debug, trace};

use super::constants::ValueSite;
use super::types::{field_repr, wire_type, FieldRepr};
use super::{kind_name, Generator, Scope};
use crate::annotations::{self, Site};
use crate::error::GenResult;
use crate::naming::lower_camel;

pub(crate) fn field_entity(field: &str, owner: &str) -> String {
    format!("field {field} of {owner}")
}

/// RPC envelope identity of a synthesized argument or result struct.
#[derive(Debug, Clone)]
pub(crate) struct Envelope {
    pub method: String,
    /// `Call`, `OneWay` or `Reply`.
    pub envelope_type: &'static str,
}

/// A struct-shaped declaration to generate: a user struct, union or
/// exception, or a service argument or result wrapper.
#[derive(Debug, Clone)]
pub(crate) struct StructDecl {
    pub ident: String,
    pub name: String,
    pub kind: StructKind,
    pub fields: FieldGroup,
    pub allow_empty: bool,
    pub envelope: Option<Envelope>,
}

impl StructDecl {
    pub fn from_spec(spec: &StructSpec, ident: String) -> Self {
        Self {
            ident,
            name: spec.name.clone(),
            kind: spec.kind,
            fields: spec.fields.clone(),
            allow_empty: spec.allow_empty,
            envelope: None,
        }
    }

    fn is_union(&self) -> bool {
        self.kind == StructKind::Union
    }
}

#[derive(Debug, Clone)]
struct FieldLayout {
    id: i16,
    ident: String,
    label: String,
    ty: TypeSpec,
    repr: FieldRepr,
    /// Required outside a union.
    required: bool,
    /// Schema default; never set for union fields.
    default: Option<ConstantValue>,
    entity: String,
    go_type: String,
    tag: String,
    no_log: bool,
    getter: String,
    is_set: String,
    /// Decode-time presence flag, for required fields.
    set_flag: Option<String>,
}

impl FieldLayout {
    /* Expression for the field's value once known to be present */
    fn value(&self, receiver: &str) -> String {
        match self.repr {
            FieldRepr::Pointer => format!("(*{receiver}.{})", self.ident),
            FieldRepr::Value | FieldRepr::Nilable => format!("{receiver}.{}", self.ident),
        }
    }

    /* Whether presence must be checked before touching the value */
    fn guarded(&self) -> bool {
        match self.repr {
            FieldRepr::Pointer => true,
            FieldRepr::Nilable => !self.required,
            FieldRepr::Value => false,
        }
    }
}

impl Generator<'_> {
    fn layout(&mut self, decl: &StructDecl) -> GenResult<Vec<FieldLayout>> {
        let program = self.program;
        let file = self.file_path();
        let mut members = Scope::new();
        let mut layouts = Vec::with_capacity(decl.fields.len());

        for field in &decl.fields {
            let entity = field_entity(&field.name, &decl.name);
            let site = Site { entity: &entity, file };
            annotations::validate_type(&field.ty, site)?;
            let ident = annotations::identifier(&field.name, &field.annotations, site)?;
            members.claim(&ident, &entity, file)?;

            let required = field.is_required() && !decl.is_union();
            let label = annotations::label(&field.name, &field.annotations).to_string();
            let tag = annotations::struct_tag(&label, required, &field.annotations, site)?;
            let repr = field_repr(program, &field.ty, required);
            let go_type = self.field_type_ref(&field.ty, repr)?;

            layouts.push(FieldLayout {
                id: field.id,
                getter: format!("Get{ident}"),
                is_set: format!("IsSet{ident}"),
                ident,
                label,
                ty: field.ty.clone(),
                repr,
                required,
                default: if decl.is_union() { None } else { field.default.clone() },
                entity,
                go_type,
                tag,
                no_log: annotations::no_log(&field.annotations),
                set_flag: None,
            });
        }

        let mut methods = vec!["ToWire", "FromWire", "String", "Equals"];
        if !self.options.no_zap {
            methods.push("MarshalLogObject");
        }
        if decl.kind == StructKind::Exception {
            methods.extend(["Error", "ErrorName"]);
        }
        if decl.envelope.is_some() {
            methods.extend(["MethodName", "EnvelopeType"]);
        }
        for method in methods {
            members.claim(method, &format!("method {method} of {}", decl.name), file)?;
        }
        for layout in &layouts {
            members.claim(&layout.getter, &format!("getter of {}", layout.entity), file)?;
            members.claim(&layout.is_set, &format!("presence check of {}", layout.entity), file)?;
        }

        /* Locals live in a function scope under the package scope */
        let mut locals = self.root.names.child();
        for (layout, field) in layouts.iter_mut().zip(&decl.fields) {
            if layout.required {
                layout.set_flag = Some(locals.new_name(&format!("{}IsSet", lower_camel(&field.name))));
            }
        }

        Ok(layouts)
    }

    pub fn emit_struct(&mut self, decl: &StructDecl) -> GenResult<()> {
        debug!(kind = kind_name(decl.kind), name = %decl.name, ident = %decl.ident, "emitting struct");
        let fields = self.layout(decl)?;
        trace!(name = %decl.name, fields = fields.len(), "laid out fields");

        self.emit_struct_type(decl, &fields)?;
        self.emit_to_wire(decl, &fields)?;
        self.emit_from_wire(decl, &fields)?;
        self.emit_struct_string(decl, &fields)?;
        self.emit_struct_equals(decl, &fields)?;
        if !self.options.no_zap {
            self.emit_struct_zap(decl, &fields)?;
        }
        self.emit_accessors(decl, &fields)?;
        if decl.kind == StructKind::Exception {
            self.emit_exception(decl)?;
        }
        if let Some(envelope) = &decl.envelope {
            self.emit_envelope(decl, envelope)?;
        }
        Ok(())
    }

    fn emit_struct_type(&mut self, decl: &StructDecl, fields: &[FieldLayout]) -> GenResult<()> {
        let out = &mut self.out;
        if fields.is_empty() {
            writeln!(out, "type {} struct {{\n}}\n", decl.ident)?;
            return Ok(());
        }
        let ident_width = fields.iter().map(|f| f.ident.len()).max().unwrap_or(0);
        let type_width = fields.iter().map(|f| f.go_type.len()).max().unwrap_or(0);
        writeln!(out, "type {} struct {{", decl.ident)?;
        for field in fields {
            writeln!(out, "\t{:<ident_width$} {:<type_width$} {}", field.ident, field.go_type, field.tag)?;
        }
        writeln!(out, "}}\n")?;
        Ok(())
    }

    /// Fills every absent optional field that has a schema default. Runs
    /// before encoding (so `ToWire` fills in the value it encodes) and after
    /// decoding.
    fn emit_default_materialization(&mut self, decl: &StructDecl, fields: &[FieldLayout]) -> GenResult<String> {
        let mut out = String::new();
        for field in fields {
            let Some(default) = &field.default else {
                continue;
            };
            if field.repr == FieldRepr::Value {
                continue;
            }
            let entity = format!("default of {}", field.entity);
            let value = self.field_value(&field.ty, field.required, default, ValueSite { entity: &entity })?;
            trace!(owner = %decl.name, field = %field.ident, "materializing default");
            writeln!(out, "\tif v.{ident} == nil {{\n\t\tv.{ident} = {value}\n\t}}", ident = field.ident)?;
        }
        Ok(out)
    }

    /* `<Type> should have exactly one field` and its allow-empty variant */
    fn union_violation(&mut self, decl: &StructDecl, count: &str, zero: &str) -> String {
        let fmt = self.import("fmt");
        let (test, bound) = if decl.allow_empty { (">", "at most") } else { ("!=", "exactly") };
        format!(
            "\tif {count} {test} 1 {{\n\
             \t\treturn {zero}{fmt}.Errorf(\"{} should have {bound} one field: got %v fields\", {count})\n\
             \t}}\n",
            decl.ident
        )
    }

    fn missing_field(&mut self, decl: &StructDecl, field: &FieldLayout) -> String {
        let errors = self.import("errors");
        format!("{errors}.New(\"field {} of {} is required\")", field.ident, decl.ident)
    }

    fn emit_to_wire(&mut self, decl: &StructDecl, fields: &[FieldLayout]) -> GenResult<()> {
        let program = self.program;
        let wire = self.wire();
        let mut body = String::new();

        if fields.is_empty() {
            writeln!(body, "\tvar (\n\t\tfields [0]{wire}.Field\n\t\ti      int = 0\n\t)\n")?;
        } else {
            writeln!(
                body,
                "\tvar (\n\t\tfields [{}]{wire}.Field\n\t\ti      int = 0\n\t\tw      {wire}.Value\n\t\terr    error\n\t)\n",
                fields.len()
            )?;
        }

        let defaults = self.emit_default_materialization(decl, fields)?;
        if !defaults.is_empty() {
            writeln!(body, "{defaults}")?;
        }

        for field in fields {
            let encode = self.to_wire(&field.ty, &field.value("v"))?;
            let indent = if field.guarded() { "\t\t" } else { "\t" };
            let mut block = String::new();
            writeln!(block, "{indent}w, err = {encode}")?;
            writeln!(block, "{indent}if err != nil {{\n{indent}\treturn w, err\n{indent}}}")?;
            writeln!(block, "{indent}fields[i] = {wire}.Field{{ID: {}, Value: w}}", field.id)?;
            writeln!(block, "{indent}i++")?;

            if field.guarded() {
                writeln!(body, "\tif v.{} != nil {{\n{block}\t}}", field.ident)?;
            } else {
                let needs_nil_check = field.repr == FieldRepr::Nilable
                    && matches!(
                        program.root_type(&field.ty),
                        TypeSpec::Struct(_) | TypeSpec::Set { .. } | TypeSpec::Map { .. }
                    );
                if needs_nil_check {
                    let missing = self.missing_field(decl, field);
                    writeln!(body, "\tif v.{} == nil {{\n\t\treturn w, {missing}\n\t}}", field.ident)?;
                }
                body.push_str(&block);
            }
            body.push('\n');
        }

        if decl.is_union() {
            let check = self.union_violation(decl, "i", &format!("{wire}.Value{{}}, "));
            writeln!(body, "{check}")?;
        }

        writeln!(body, "\treturn {wire}.NewValueStruct({wire}.Struct{{Fields: fields[:i]}}), nil")?;

        let out = &mut self.out;
        writeln!(out, "// ToWire translates a {} into a Thrift-level intermediate", decl.ident)?;
        writeln!(out, "// representation. This intermediate representation may be serialized")?;
        writeln!(out, "// into bytes using a ThriftRW protocol implementation.")?;
        if fields.iter().any(|f| f.default.is_some() && f.repr != FieldRepr::Value) {
            writeln!(out, "//")?;
            writeln!(out, "// Absent fields that have a default value are set to that default")?;
            writeln!(out, "// on v before it is encoded.")?;
        }
        writeln!(out, "func (v *{}) ToWire() ({wire}.Value, error) {{\n{body}}}\n", decl.ident)?;
        Ok(())
    }

    fn emit_from_wire(&mut self, decl: &StructDecl, fields: &[FieldLayout]) -> GenResult<()> {
        let program = self.program;
        let wire = self.wire();
        let mut body = String::new();

        if !fields.is_empty() {
            writeln!(body, "\tvar err error\n")?;
        }
        let flags: Vec<&String> = fields.iter().filter_map(|f| f.set_flag.as_ref()).collect();
        for flag in &flags {
            writeln!(body, "\t{flag} := false")?;
        }
        if !flags.is_empty() {
            body.push('\n');
        }

        writeln!(body, "\tfor _, field := range w.GetStruct().Fields {{")?;
        writeln!(body, "\t\tswitch field.ID {{")?;
        for field in fields {
            let tag = format!("{wire}.{}", wire_type(program, &field.ty).constant());
            let decode = self.from_wire(&field.ty, "field.Value")?;
            writeln!(body, "\t\tcase {}:", field.id)?;
            writeln!(body, "\t\t\tif field.Value.Type() == {tag} {{")?;
            if field.repr == FieldRepr::Pointer {
                writeln!(body, "\t\t\t\tvar x {}", self.type_ref(&field.ty)?)?;
                writeln!(body, "\t\t\t\tx, err = {decode}")?;
                writeln!(body, "\t\t\t\tv.{} = &x", field.ident)?;
            } else {
                writeln!(body, "\t\t\t\tv.{}, err = {decode}", field.ident)?;
            }
            writeln!(body, "\t\t\t\tif err != nil {{\n\t\t\t\t\treturn err\n\t\t\t\t}}")?;
            if let Some(flag) = &field.set_flag {
                writeln!(body, "\t\t\t\t{flag} = true")?;
            }
            writeln!(body, "\t\t\t}}")?;
        }
        writeln!(body, "\t\t}}\n\t}}\n")?;

        let defaults = self.emit_default_materialization(decl, fields)?;
        if !defaults.is_empty() {
            writeln!(body, "{defaults}")?;
        }

        for field in fields {
            if let Some(flag) = &field.set_flag {
                let missing = self.missing_field(decl, field);
                writeln!(body, "\tif !{flag} {{\n\t\treturn {missing}\n\t}}\n")?;
            }
        }

        if decl.is_union() {
            writeln!(body, "\tcount := 0")?;
            for field in fields {
                writeln!(body, "\tif v.{} != nil {{\n\t\tcount++\n\t}}", field.ident)?;
            }
            let check = self.union_violation(decl, "count", "");
            writeln!(body, "{check}")?;
        }
        writeln!(body, "\treturn nil")?;

        let out = &mut self.out;
        writeln!(out, "// FromWire deserializes a {} struct from its Thrift-level", decl.ident)?;
        writeln!(out, "// representation. Fields whose wire type does not match the schema")?;
        writeln!(out, "// are skipped.")?;
        writeln!(out, "func (v *{}) FromWire(w {wire}.Value) error {{\n{body}}}\n", decl.ident)?;
        Ok(())
    }

    fn emit_struct_string(&mut self, decl: &StructDecl, fields: &[FieldLayout]) -> GenResult<()> {
        let mut body = String::from("\tif v == nil {\n\t\treturn \"<nil>\"\n\t}\n\n");
        if fields.is_empty() {
            writeln!(body, "\treturn \"{}{{}}\"", decl.ident)?;
        } else {
            let fmt = self.import("fmt");
            let strings = self.import("strings");
            writeln!(body, "\tvar fields [{}]string\n\ti := 0", fields.len())?;
            for field in fields {
                let assign = format!("fields[i] = {fmt}.Sprintf(\"{}: %v\", {})", field.ident, field.value("v"));
                if field.guarded() {
                    writeln!(body, "\tif v.{} != nil {{\n\t\t{assign}\n\t\ti++\n\t}}", field.ident)?;
                } else {
                    writeln!(body, "\t{assign}\n\ti++")?;
                }
            }
            writeln!(
                body,
                "\n\treturn {fmt}.Sprintf(\"{}{{%v}}\", {strings}.Join(fields[:i], \", \"))",
                decl.ident
            )?;
        }

        let out = &mut self.out;
        writeln!(out, "// String returns a readable string representation of a {}", decl.ident)?;
        writeln!(out, "// struct.")?;
        writeln!(out, "func (v *{}) String() string {{\n{body}}}\n", decl.ident)?;
        Ok(())
    }

    fn emit_struct_equals(&mut self, decl: &StructDecl, fields: &[FieldLayout]) -> GenResult<()> {
        let mut body = String::from("\tif v == nil {\n\t\treturn rhs == nil\n\t} else if rhs == nil {\n\t\treturn false\n\t}\n");
        for field in fields {
            let lhs = format!("v.{}", field.ident);
            let rhs = format!("rhs.{}", field.ident);
            let test = match field.repr {
                FieldRepr::Pointer => {
                    let helper = self.equals_ptr(&field.ty)?;
                    format!("{helper}({lhs}, {rhs})")
                }
                FieldRepr::Nilable if !field.required => {
                    let eq = self.equals(&field.ty, &lhs, &rhs)?;
                    format!("(({lhs} == nil && {rhs} == nil) || ({lhs} != nil && {rhs} != nil && {eq}))")
                }
                FieldRepr::Nilable | FieldRepr::Value => self.equals(&field.ty, &lhs, &rhs)?,
            };
            writeln!(body, "\tif !{test} {{\n\t\treturn false\n\t}}")?;
        }
        writeln!(body, "\n\treturn true")?;

        let out = &mut self.out;
        writeln!(out, "// Equals returns true if all the fields of this {} match the", decl.ident)?;
        writeln!(out, "// provided {}.", decl.ident)?;
        writeln!(out, "//")?;
        writeln!(out, "// This function performs a deep comparison.")?;
        writeln!(out, "func (v *{ident}) Equals(rhs *{ident}) bool {{\n{body}}}\n", ident = decl.ident)?;
        Ok(())
    }

    fn emit_struct_zap(&mut self, decl: &StructDecl, fields: &[FieldLayout]) -> GenResult<()> {
        let zapcore = self.zapcore();
        let mut body = String::from("\tif v == nil {\n\t\treturn nil\n\t}\n");
        for field in fields.iter().filter(|f| !f.no_log) {
            let key = crate::naming::go_quote(&field.label);
            if field.guarded() {
                let add = self.zap_add(&field.ty, &key, &field.value("v"), "\t\t")?;
                writeln!(body, "\tif v.{} != nil {{\n{add}\t}}", field.ident)?;
            } else {
                body.push_str(&self.zap_add(&field.ty, &key, &field.value("v"), "\t")?);
            }
        }
        writeln!(body, "\treturn err")?;

        let out = &mut self.out;
        writeln!(out, "// MarshalLogObject implements zapcore.ObjectMarshaler, enabling")?;
        writeln!(out, "// fast logging of {}.", decl.ident)?;
        writeln!(
            out,
            "func (v *{}) MarshalLogObject(enc {zapcore}.ObjectEncoder) (err error) {{\n{body}}}\n",
            decl.ident
        )?;
        Ok(())
    }

    fn emit_accessors(&mut self, decl: &StructDecl, fields: &[FieldLayout]) -> GenResult<()> {
        for field in fields {
            let return_type = self.type_ref(&field.ty)?;
            let default = match &field.default {
                Some(value) => {
                    let entity = format!("default of {}", field.entity);
                    Some(self.literal(&field.ty, value, ValueSite { entity: &entity })?)
                }
                None => None,
            };

            let mut body = String::new();
            match field.repr {
                FieldRepr::Value => {
                    writeln!(body, "\tif v != nil {{\n\t\to = v.{}\n\t}}", field.ident)?;
                }
                FieldRepr::Pointer | FieldRepr::Nilable => {
                    writeln!(
                        body,
                        "\tif v != nil && v.{} != nil {{\n\t\treturn {}\n\t}}",
                        field.ident,
                        field.value("v")
                    )?;
                    if let Some(default) = &default {
                        writeln!(body, "\to = {default}")?;
                    }
                }
            }
            writeln!(body, "\treturn")?;

            let out = &mut self.out;
            writeln!(out, "// {} returns the value of {} if it is set or its", field.getter, field.ident)?;
            if default.is_some() {
                writeln!(out, "// default value if it is unset.")?;
            } else {
                writeln!(out, "// zero value if it is unset.")?;
            }
            writeln!(out, "func (v *{}) {}() (o {return_type}) {{\n{body}}}\n", decl.ident, field.getter)?;

            writeln!(out, "// {} returns true if {} is not nil.", field.is_set, field.ident)?;
            if field.repr == FieldRepr::Value {
                writeln!(out, "func (v *{}) {}() bool {{\n\treturn v != nil\n}}\n", decl.ident, field.is_set)?;
            } else {
                writeln!(
                    out,
                    "func (v *{}) {}() bool {{\n\treturn v != nil && v.{} != nil\n}}\n",
                    decl.ident, field.is_set, field.ident
                )?;
            }
        }
        Ok(())
    }

    fn emit_exception(&mut self, decl: &StructDecl) -> GenResult<()> {
        let out = &mut self.out;
        writeln!(out, "// ErrorName is the name of this type as defined in the Thrift")?;
        writeln!(out, "// file.")?;
        writeln!(out, "func (*{}) ErrorName() string {{\n\treturn {}\n}}\n", decl.ident, crate::naming::go_quote(&decl.name))?;
        writeln!(out, "func (v *{}) Error() string {{\n\treturn v.String()\n}}\n", decl.ident)?;
        Ok(())
    }

    fn emit_envelope(&mut self, decl: &StructDecl, envelope: &Envelope) -> GenResult<()> {
        let wire = self.wire();
        let out = &mut self.out;
        writeln!(out, "// MethodName returns the name of the Thrift function as specified in")?;
        writeln!(out, "// the IDL, for which this struct represent the arguments or result.")?;
        writeln!(
            out,
            "func (v *{}) MethodName() string {{\n\treturn {}\n}}\n",
            decl.ident,
            crate::naming::go_quote(&envelope.method)
        )?;
        writeln!(out, "// EnvelopeType returns the kind of envelope this struct travels in.")?;
        writeln!(
            out,
            "func (v *{}) EnvelopeType() {wire}.EnvelopeType {{\n\treturn {wire}.{}\n}}\n",
            decl.ident, envelope.envelope_type
        )?;
        Ok(())
    }
}
