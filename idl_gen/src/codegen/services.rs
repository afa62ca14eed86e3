//! Service functions become ordinary struct declarations: an argument
//! struct, a result union for functions that reply, and a helper value
//! tying the two together for RPC layers.

use std::fmt::Write;

use idl_types::{FieldGroup, FieldSpec, FunctionSpec, Requiredness, ServiceId, StructKind, TypeSpec};
use tracing::{debug, trace};

use super::structs::{field_entity, Envelope};
use super::types::{field_repr, FieldRepr};
use super::{Generator, ServiceNames, StructDecl};
use crate::annotations::{self, Site};
use crate::error::{GenError, GenResult};
use crate::naming::lower_camel;

const SUCCESS: &str = "success";

/// Arguments renumbered from 1 in declaration order, all required.
fn argument_fields(function: &FunctionSpec) -> FieldGroup {
    FieldGroup(
        function
            .arguments
            .iter()
            .enumerate()
            .map(|(position, arg)| FieldSpec {
                id: position as i16 + 1,
                requiredness: Requiredness::Required,
                default: None,
                ..arg.clone()
            })
            .collect(),
    )
}

/// `success` as field 0 when the function returns a value, then the
/// declared exceptions in schema order.
fn result_fields(function: &FunctionSpec) -> FieldGroup {
    let mut fields = Vec::new();
    if let Some(result) = &function.result {
        if let Some(ty) = &result.return_type {
            fields.push(FieldSpec::optional(0, SUCCESS, ty.clone()));
        }
        fields.extend(result.exceptions.iter().cloned().map(|e| FieldSpec { default: None, ..e }));
    }
    FieldGroup(fields)
}

/* One member of a synthesized struct as seen from the helper glue */
struct Member {
    ident: String,
    ty: TypeSpec,
    repr: FieldRepr,
}

impl Generator<'_> {
    pub fn emit_service(&mut self, id: ServiceId) -> GenResult<()> {
        let program = self.program;
        let service = program.service_spec(id);
        debug!(service = %service.name, functions = service.functions.len(), "emitting service");
        if let Some(parent) = service.parent {
            trace!(service = %service.name, parent = %program.service_spec(parent).name, "service extends parent");
        }

        for (position, function) in service.functions.iter().enumerate() {
            let names = self
                .declared
                .functions
                .get(&(id, position))
                .cloned()
                .ok_or_else(|| GenError::Internal(format!("function {} was not declared", function.name)))?;
            self.emit_function(&service.name, function, &names)?;
        }
        Ok(())
    }

    fn emit_function(&mut self, service: &str, function: &FunctionSpec, names: &ServiceNames) -> GenResult<()> {
        trace!(service, function = %function.name, oneway = function.oneway, "emitting function");

        let args = StructDecl {
            ident: names.args.clone(),
            name: names.args.clone(),
            kind: StructKind::Struct,
            fields: argument_fields(function),
            allow_empty: false,
            envelope: Some(Envelope {
                method: function.name.clone(),
                envelope_type: if function.oneway { "OneWay" } else { "Call" },
            }),
        };
        self.emit_struct(&args)?;

        let result = match &names.result {
            Some(ident) => {
                let decl = StructDecl {
                    ident: ident.clone(),
                    name: ident.clone(),
                    kind: StructKind::Union,
                    fields: result_fields(function),
                    allow_empty: function.result.as_ref().is_none_or(|r| r.return_type.is_none()),
                    envelope: Some(Envelope { method: function.name.clone(), envelope_type: "Reply" }),
                };
                self.emit_struct(&decl)?;
                Some(decl)
            }
            None => None,
        };

        self.emit_function_helper(function, names, &args, result.as_ref())
    }

    fn members(&mut self, decl: &StructDecl) -> GenResult<Vec<Member>> {
        let program = self.program;
        let file = self.file_path();
        let union = decl.kind == StructKind::Union;
        let mut members = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let entity = field_entity(&field.name, &decl.name);
            let ident = annotations::identifier(&field.name, &field.annotations, Site { entity: &entity, file })?;
            let repr = field_repr(program, &field.ty, field.is_required() && !union);
            members.push(Member { ident, ty: field.ty.clone(), repr });
        }
        Ok(members)
    }

    fn emit_function_helper(
        &mut self,
        function: &FunctionSpec,
        names: &ServiceNames,
        args: &StructDecl,
        result: Option<&StructDecl>,
    ) -> GenResult<()> {
        let arg_members = self.members(args)?;

        /* Parameter names of the Args constructor, clear of package names */
        let params: Vec<String> = {
            let mut locals = self.root.names.child();
            args.fields.iter().map(|f| locals.new_name(&lower_camel(&f.name))).collect()
        };
        let mut param_list = Vec::with_capacity(params.len());
        let mut param_types = Vec::with_capacity(params.len());
        for (param, member) in params.iter().zip(&arg_members) {
            let go_type = self.field_type_ref(&member.ty, member.repr)?;
            param_list.push(format!("{param} {go_type}"));
            param_types.push(go_type);
        }
        let inits: Vec<String> = arg_members.iter().zip(&params).map(|(m, p)| format!("{}: {p}", m.ident)).collect();

        let mut fields = String::new();
        let mut init = String::new();
        let helper = &names.helper;
        let args_ident = &names.args;

        writeln!(fields, "\tArgs func({}) *{args_ident}", param_types.join(", "))?;
        writeln!(init, "\t{helper}.Args = func({}) *{args_ident} {{", param_list.join(", "))?;
        writeln!(init, "\t\treturn &{args_ident}{{{}}}\n\t}}\n", inits.join(", "))?;

        if let (Some(result), Some(result_ident)) = (result, &names.result) {
            let members = self.members(result)?;
            let has_success = result.fields.iter().next().is_some_and(|f| f.name == SUCCESS && f.id == 0);
            let (success, exceptions) = if has_success {
                (members.first(), &members[1..])
            } else {
                (None, &members[..])
            };
            let mut exception_types = Vec::with_capacity(exceptions.len());
            for exception in exceptions {
                exception_types.push(self.type_ref(&exception.ty)?);
            }
            let errors = if has_success || !exceptions.is_empty() { self.import("errors") } else { String::new() };

            writeln!(fields, "\tIsException func(error) bool")?;
            writeln!(init, "\t{helper}.IsException = func(err error) bool {{\n\t\tswitch err.(type) {{")?;
            for go_type in &exception_types {
                writeln!(init, "\t\tcase {go_type}:\n\t\t\treturn true")?;
            }
            writeln!(init, "\t\tdefault:\n\t\t\treturn false\n\t\t}}\n\t}}\n")?;

            let mut wrap_exceptions = String::new();
            if !exceptions.is_empty() {
                writeln!(wrap_exceptions, "\t\tswitch e := err.(type) {{")?;
                for (exception, go_type) in exceptions.iter().zip(&exception_types) {
                    writeln!(wrap_exceptions, "\t\tcase {go_type}:\n\t\t\tif e == nil {{")?;
                    writeln!(
                        wrap_exceptions,
                        "\t\t\t\treturn nil, {errors}.New(\"WrapResponse received non-nil error type with nil value for {result_ident}.{}\")",
                        exception.ident
                    )?;
                    writeln!(wrap_exceptions, "\t\t\t}}\n\t\t\treturn &{result_ident}{{{}: e}}, nil", exception.ident)?;
                }
                writeln!(wrap_exceptions, "\t\t}}\n")?;
            }
            let mut unwrap_exceptions = String::new();
            for exception in exceptions {
                writeln!(
                    unwrap_exceptions,
                    "\t\tif result.{ident} != nil {{\n\t\t\terr = result.{ident}\n\t\t\treturn\n\t\t}}",
                    ident = exception.ident
                )?;
            }

            match success {
                Some(success) => {
                    let go_type = self.type_ref(&success.ty)?;
                    let (wrapped, unwrapped) = match success.repr {
                        FieldRepr::Pointer => ("&success", format!("*result.{}", success.ident)),
                        FieldRepr::Value | FieldRepr::Nilable => ("success", format!("result.{}", success.ident)),
                    };
                    writeln!(fields, "\tWrapResponse func({go_type}, error) (*{result_ident}, error)")?;
                    writeln!(fields, "\tUnwrapResponse func(*{result_ident}) ({go_type}, error)")?;

                    writeln!(
                        init,
                        "\t{helper}.WrapResponse = func(success {go_type}, err error) (*{result_ident}, error) {{"
                    )?;
                    writeln!(init, "\t\tif err == nil {{")?;
                    writeln!(init, "\t\t\treturn &{result_ident}{{{}: {wrapped}}}, nil\n\t\t}}\n", success.ident)?;
                    write!(init, "{wrap_exceptions}")?;
                    writeln!(init, "\t\treturn nil, err\n\t}}\n")?;

                    writeln!(
                        init,
                        "\t{helper}.UnwrapResponse = func(result *{result_ident}) (success {go_type}, err error) {{"
                    )?;
                    write!(init, "{unwrap_exceptions}")?;
                    writeln!(init, "\t\tif result.{} != nil {{", success.ident)?;
                    writeln!(init, "\t\t\tsuccess = {unwrapped}\n\t\t\treturn\n\t\t}}\n")?;
                    writeln!(init, "\t\terr = {errors}.New(\"expected a non-void result\")\n\t\treturn\n\t}}")?;
                }
                None => {
                    writeln!(fields, "\tWrapResponse func(error) (*{result_ident}, error)")?;
                    writeln!(fields, "\tUnwrapResponse func(*{result_ident}) error")?;

                    writeln!(init, "\t{helper}.WrapResponse = func(err error) (*{result_ident}, error) {{")?;
                    writeln!(init, "\t\tif err == nil {{\n\t\t\treturn &{result_ident}{{}}, nil\n\t\t}}\n")?;
                    write!(init, "{wrap_exceptions}")?;
                    writeln!(init, "\t\treturn nil, err\n\t}}\n")?;

                    writeln!(init, "\t{helper}.UnwrapResponse = func(result *{result_ident}) (err error) {{")?;
                    write!(init, "{unwrap_exceptions}")?;
                    writeln!(init, "\t\treturn\n\t}}")?;
                }
            }
        }

        let out = &mut self.out;
        writeln!(out, "// {helper} provides functions that aid in handling the")?;
        writeln!(out, "// parameters and return values of the {} function.", function.name)?;
        writeln!(out, "var {helper} = struct {{\n{fields}}}{{}}\n")?;
        writeln!(out, "func init() {{\n{}\n}}\n", init.trim_end_matches('\n'))?;
        Ok(())
    }
}
