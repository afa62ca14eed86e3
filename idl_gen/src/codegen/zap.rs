/* Structured logging through zapcore marshalers */

use std::fmt::Write;

use idl_types::TypeSpec;

use super::types::map_is_keyed;
use super::Generator;
use crate::annotations;
use crate::error::{GenError, GenResult};

/// How a value is handed to a zapcore encoder: the `Add<Method>` /
/// `Append<Method>` suffix and the expression passed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZapValue {
    pub method: &'static str,
    pub expr: String,
}

impl ZapValue {
    fn new(method: &'static str, expr: String) -> Self {
        Self { method, expr }
    }

    /* Object and array adders return an error that must be collected */
    fn fallible(&self) -> bool {
        matches!(self.method, "Object" | "Array")
    }
}

/// Zapcore marshaler interface implemented by a container's zapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZapShape {
    Object,
    Array,
}

impl ZapShape {
    pub fn method(self) -> &'static str {
        match self {
            ZapShape::Object => "Object",
            ZapShape::Array => "Array",
        }
    }
}

impl Generator<'_> {
    /// `enc.Add<M>(key, value)` statement for an `ObjectEncoder`.
    pub fn zap_add(&mut self, ty: &TypeSpec, key: &str, expr: &str, indent: &str) -> GenResult<String> {
        let value = self.zap_value(ty, expr)?;
        Ok(self.zap_statement(&value, &format!("enc.Add{}({key}, {})", value.method, value.expr), indent))
    }

    /// `enc.Append<M>(value)` statement for an `ArrayEncoder`.
    fn zap_append(&mut self, ty: &TypeSpec, expr: &str, indent: &str) -> GenResult<String> {
        let value = self.zap_value(ty, expr)?;
        Ok(self.zap_statement(&value, &format!("enc.Append{}({})", value.method, value.expr), indent))
    }

    fn zap_statement(&mut self, value: &ZapValue, call: &str, indent: &str) -> String {
        if value.fallible() {
            let multierr = self.multierr();
            format!("{indent}err = {multierr}.Append(err, {call})\n")
        } else {
            format!("{indent}{call}\n")
        }
    }

    pub fn zap_value(&mut self, ty: &TypeSpec, expr: &str) -> GenResult<ZapValue> {
        let program = self.program;
        Ok(match ty {
            TypeSpec::Bool => ZapValue::new("Bool", expr.to_string()),
            TypeSpec::I8 => ZapValue::new("Int8", expr.to_string()),
            TypeSpec::I16 => ZapValue::new("Int16", expr.to_string()),
            TypeSpec::I32 => ZapValue::new("Int32", expr.to_string()),
            TypeSpec::I64 => ZapValue::new("Int64", expr.to_string()),
            TypeSpec::Double => ZapValue::new("Float64", expr.to_string()),
            TypeSpec::String => ZapValue::new("String", expr.to_string()),
            TypeSpec::Binary => {
                let base64 = self.import("encoding/base64");
                ZapValue::new("String", format!("{base64}.StdEncoding.EncodeToString({expr})"))
            }
            TypeSpec::Enum(_) | TypeSpec::Struct(_) => ZapValue::new("Object", expr.to_string()),
            TypeSpec::List(_) | TypeSpec::Set { .. } | TypeSpec::Map { .. } => {
                let (zapper, shape) = self.zapper(ty)?;
                ZapValue::new(shape.method(), format!("({zapper})({expr})"))
            }
            TypeSpec::Typedef(_) => {
                let root = program.root_type(ty).clone();
                match &root {
                    TypeSpec::Struct(_) => ZapValue::new("Object", expr.to_string()),
                    /* The typedef delegates to its root container's zapper */
                    TypeSpec::List(_) | TypeSpec::Set { .. } | TypeSpec::Map { .. } => {
                        ZapValue::new(self.zap_shape(&root).method(), expr.to_string())
                    }
                    TypeSpec::Typedef(_) => {
                        return Err(GenError::Internal(format!("typedef {ty:?} has no concrete root")));
                    }
                    _ => {
                        let root_ref = self.type_ref(&root)?;
                        return self.zap_value(&root, &format!("({root_ref})({expr})"));
                    }
                }
            }
        })
    }

    pub fn zap_shape(&self, container: &TypeSpec) -> ZapShape {
        match container {
            TypeSpec::Map { key, .. }
                if map_is_keyed(self.program, key) && *self.program.root_type(key) == TypeSpec::String =>
            {
                ZapShape::Object
            }
            _ => ZapShape::Array,
        }
    }

    /// `_<M>_Zapper` for a container, and the marshaler interface it implements.
    pub fn zapper(&mut self, ty: &TypeSpec) -> GenResult<(String, ZapShape)> {
        let symbol = format!("_{}_Zapper", self.mangle(ty));
        let shape = self.zap_shape(ty);
        let name = symbol.clone();
        let ty = ty.clone();
        self.helper(&symbol, move |g| {
            let program = g.program;
            let type_ref = g.type_ref(&ty)?;
            let zapcore = g.zapcore();
            let mut out = String::new();
            writeln!(out, "type {name} {type_ref}\n")?;
            match &ty {
                TypeSpec::List(element) | TypeSpec::Set { element, .. } => {
                    let keyed = match &ty {
                        TypeSpec::Set { element, annotations: set_annotations } => {
                            annotations::set_is_keyed(program, element, set_annotations)
                        }
                        _ => false,
                    };
                    let range = if keyed { "v := range l" } else { "_, v := range l" };
                    let append = g.zap_append(element, "v", "\t\t")?;
                    writeln!(out, "// MarshalLogArray implements zapcore.ArrayMarshaler, enabling")?;
                    writeln!(out, "// fast logging of {name}.")?;
                    writeln!(out, "func (l {name}) MarshalLogArray(enc {zapcore}.ArrayEncoder) (err error) {{")?;
                    writeln!(out, "\tfor {range} {{\n{append}\t}}\n\treturn err\n}}\n")?;
                }
                TypeSpec::Map { key, value } => match shape {
                    ZapShape::Object => {
                        let add = g.zap_add(value, "(string)(k)", "v", "\t\t")?;
                        writeln!(out, "// MarshalLogObject implements zapcore.ObjectMarshaler, enabling")?;
                        writeln!(out, "// fast logging of {name}.")?;
                        writeln!(out, "func (m {name}) MarshalLogObject(enc {zapcore}.ObjectEncoder) (err error) {{")?;
                        writeln!(out, "\tfor k, v := range m {{\n{add}\t}}\n\treturn err\n}}\n")?;
                    }
                    ZapShape::Array => {
                        let item = g.map_item_zapper(&ty, key, value)?;
                        let multierr = g.multierr();
                        let range = if map_is_keyed(program, key) {
                            "k, v := range m"
                        } else {
                            "_, i := range m"
                        };
                        let literal = if map_is_keyed(program, key) {
                            format!("{item}{{Key: k, Value: v}}")
                        } else {
                            format!("{item}{{Key: i.Key, Value: i.Value}}")
                        };
                        writeln!(out, "// MarshalLogArray implements zapcore.ArrayMarshaler, enabling")?;
                        writeln!(out, "// fast logging of {name}.")?;
                        writeln!(out, "func (m {name}) MarshalLogArray(enc {zapcore}.ArrayEncoder) (err error) {{")?;
                        writeln!(out, "\tfor {range} {{")?;
                        writeln!(out, "\t\terr = {multierr}.Append(err, enc.AppendObject({literal}))")?;
                        writeln!(out, "\t}}\n\treturn err\n}}\n")?;
                    }
                },
                _ => return Err(GenError::Internal(format!("zapper requested for {ty:?}"))),
            }
            Ok(out)
        })?;
        Ok((symbol, shape))
    }

    /* _<M>_Item_Zapper: one key/value pair of a map logged as an array */
    fn map_item_zapper(&mut self, map: &TypeSpec, key: &TypeSpec, value: &TypeSpec) -> GenResult<String> {
        let symbol = format!("_{}_Item_Zapper", self.mangle(map));
        let name = symbol.clone();
        let key = key.clone();
        let value = value.clone();
        self.helper(&symbol, move |g| {
            let key_ref = g.type_ref(&key)?;
            let value_ref = g.type_ref(&value)?;
            let zapcore = g.zapcore();
            let add_key = g.zap_add(&key, "\"key\"", "v.Key", "\t")?;
            let add_value = g.zap_add(&value, "\"value\"", "v.Value", "\t")?;
            let mut out = String::new();
            writeln!(out, "type {name} struct {{\n\tKey   {key_ref}\n\tValue {value_ref}\n}}\n")?;
            writeln!(out, "// MarshalLogObject implements zapcore.ObjectMarshaler, enabling")?;
            writeln!(out, "// fast logging of {name}.")?;
            writeln!(out, "func (v {name}) MarshalLogObject(enc {zapcore}.ObjectEncoder) (err error) {{")?;
            writeln!(out, "{add_key}{add_value}\treturn err\n}}\n")?;
            Ok(out)
        })?;
        Ok(symbol)
    }
}
