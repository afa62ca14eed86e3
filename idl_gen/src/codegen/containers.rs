/* Shared list, set and map codecs */

use std::fmt::Write;

use idl_types::TypeSpec;

use super::types::map_is_keyed;
use super::Generator;
use crate::annotations;
use crate::error::{GenError, GenResult};

fn unexpected(shape: &str) -> GenError {
    GenError::Internal(format!("{shape} helper requested for a non-{shape} type"))
}

impl Generator<'_> {
    /* Nil check for struct-rooted items, which are pointers and cannot be encoded */
    fn nil_guard(&mut self, item_ty: &TypeSpec, item: &str, receiver: &str, what: &str, container: &str) -> String {
        let program = self.program;
        if !matches!(program.root_type(item_ty), TypeSpec::Struct(_)) {
            return String::new();
        }
        let fmt = self.import("fmt");
        format!(
            "\t\tif {item} == nil {{\n\
             \t\t\treturn {fmt}.Errorf(\"invalid {container} '%T': contains nil {what}\", {receiver})\n\
             \t\t}}\n"
        )
    }

    /// `_<M>_ValueList`: adapts a Go list or set to the wire runtime's
    /// `ValueList` so it can be streamed out.
    pub fn value_list(&mut self, ty: &TypeSpec) -> GenResult<String> {
        let symbol = format!("_{}_ValueList", self.mangle(ty));
        let name = symbol.clone();
        let ty = ty.clone();
        self.helper(&symbol, move |g| {
            let program = g.program;
            let (element, range, container) = match &ty {
                TypeSpec::List(element) => (element.as_ref(), "_, x := range v", "list"),
                TypeSpec::Set { element, annotations: set_annotations } => {
                    if annotations::set_is_keyed(program, element, set_annotations) {
                        (element.as_ref(), "x := range v", "set")
                    } else {
                        (element.as_ref(), "_, x := range v", "set")
                    }
                }
                _ => return Err(unexpected("list")),
            };
            let type_ref = g.type_ref(&ty)?;
            let wire = g.wire();
            let guard = g.nil_guard(element, "x", "v", "value", container);
            let encode = g.to_wire(element, "x")?;
            let element_type = g.wire_type_ref(element);

            let mut out = String::new();
            writeln!(out, "type {name} {type_ref}\n")?;
            writeln!(out, "func (v {name}) ForEach(f func({wire}.Value) error) error {{")?;
            writeln!(out, "\tfor {range} {{")?;
            out.push_str(&guard);
            writeln!(out, "\t\tw, err := {encode}")?;
            writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
            writeln!(out, "\t\terr = f(w)")?;
            writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
            writeln!(out, "\t}}\n\treturn nil\n}}\n")?;
            writeln!(out, "func (v {name}) Size() int {{\n\treturn len(v)\n}}\n")?;
            writeln!(out, "func ({name}) ValueType() {wire}.Type {{\n\treturn {element_type}\n}}\n")?;
            writeln!(out, "func ({name}) Close() {{}}\n")?;
            Ok(out)
        })?;
        Ok(symbol)
    }

    /// `_<M>_MapItemList`: adapts a Go map, or slice of pairs, to the wire
    /// runtime's `MapItemList`.
    pub fn map_item_list(&mut self, ty: &TypeSpec) -> GenResult<String> {
        let symbol = format!("_{}_MapItemList", self.mangle(ty));
        let name = symbol.clone();
        let ty = ty.clone();
        self.helper(&symbol, move |g| {
            let TypeSpec::Map { key, value } = &ty else {
                return Err(unexpected("map"));
            };
            let program = g.program;
            let type_ref = g.type_ref(&ty)?;
            let wire = g.wire();
            let key_guard = g.nil_guard(key, "k", "m", "key", "map");
            let value_guard = g.nil_guard(value, "v", "m", "value", "map");
            let encode_key = g.to_wire(key, "k")?;
            let encode_value = g.to_wire(value, "v")?;
            let key_type = g.wire_type_ref(key);
            let value_type = g.wire_type_ref(value);

            let mut out = String::new();
            writeln!(out, "type {name} {type_ref}\n")?;
            writeln!(out, "func (m {name}) ForEach(f func({wire}.MapItem) error) error {{")?;
            if map_is_keyed(program, key) {
                writeln!(out, "\tfor k, v := range m {{")?;
            } else {
                writeln!(out, "\tfor _, i := range m {{\n\t\tk := i.Key\n\t\tv := i.Value")?;
            }
            out.push_str(&key_guard);
            out.push_str(&value_guard);
            writeln!(out, "\t\tkw, err := {encode_key}")?;
            writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
            writeln!(out, "\t\tvw, err := {encode_value}")?;
            writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
            writeln!(out, "\t\terr = f({wire}.MapItem{{Key: kw, Value: vw}})")?;
            writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
            writeln!(out, "\t}}\n\treturn nil\n}}\n")?;
            writeln!(out, "func (m {name}) Size() int {{\n\treturn len(m)\n}}\n")?;
            writeln!(out, "func ({name}) KeyType() {wire}.Type {{\n\treturn {key_type}\n}}\n")?;
            writeln!(out, "func ({name}) ValueType() {wire}.Type {{\n\treturn {value_type}\n}}\n")?;
            writeln!(out, "func ({name}) Close() {{}}\n")?;
            Ok(out)
        })?;
        Ok(symbol)
    }

    /// `_<M>_Read` for a container: decodes the runtime's `ValueList` or
    /// `MapItemList`. A keyed set collapses duplicate elements, a keyed map
    /// keeps the last value per key; the slice forms keep every item.
    pub fn container_reader(&mut self, ty: &TypeSpec) -> GenResult<String> {
        let symbol = format!("_{}_Read", self.mangle(ty));
        let name = symbol.clone();
        let ty = ty.clone();
        self.helper(&symbol, move |g| match &ty {
            TypeSpec::List(element) => g.sequence_reader(&name, &ty, element, "list", false),
            TypeSpec::Set { element, annotations: set_annotations } => {
                let keyed = annotations::set_is_keyed(g.program, element, set_annotations);
                g.sequence_reader(&name, &ty, element, "set", keyed)
            }
            TypeSpec::Map { key, value } => g.map_reader(&name, &ty, key, value),
            _ => Err(unexpected("container")),
        })?;
        Ok(symbol)
    }

    fn type_check(&mut self, local: &str, accessor: &str, expected: &TypeSpec, what: &str) -> GenResult<String> {
        let fmt = self.import("fmt");
        let tag = self.wire_type_ref(expected);
        Ok(format!(
            "\tif {local}.Size() > 0 && {local}.{accessor}() != {tag} {{\n\
             \t\treturn nil, {fmt}.Errorf(\"unexpected wire type %v for {what} element, expected %v\", {local}.{accessor}(), {tag})\n\
             \t}}\n"
        ))
    }

    fn sequence_reader(
        &mut self,
        name: &str,
        ty: &TypeSpec,
        element: &TypeSpec,
        what: &str,
        keyed: bool,
    ) -> GenResult<String> {
        let local = if what == "set" { "s" } else { "l" };
        let type_ref = self.type_ref(ty)?;
        let wire = self.wire();
        let check = self.type_check(local, "ValueType", element, what)?;
        let decode = self.from_wire(element, "x")?;

        let mut out = String::new();
        writeln!(out, "func {name}({local} {wire}.ValueList) ({type_ref}, error) {{")?;
        out.push_str(&check);
        if keyed {
            writeln!(out, "\to := make({type_ref}, {local}.Size())")?;
        } else {
            writeln!(out, "\to := make({type_ref}, 0, {local}.Size())")?;
        }
        writeln!(out, "\terr := {local}.ForEach(func(x {wire}.Value) error {{")?;
        writeln!(out, "\t\ti, err := {decode}")?;
        writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
        if keyed {
            writeln!(out, "\t\to[i] = struct{{}}{{}}")?;
        } else {
            writeln!(out, "\t\to = append(o, i)")?;
        }
        writeln!(out, "\t\treturn nil\n\t}})")?;
        writeln!(out, "\t{local}.Close()\n\treturn o, err\n}}\n")?;
        Ok(out)
    }

    fn map_reader(&mut self, name: &str, ty: &TypeSpec, key: &TypeSpec, value: &TypeSpec) -> GenResult<String> {
        let program = self.program;
        let type_ref = self.type_ref(ty)?;
        let wire = self.wire();
        let key_check = self.type_check("m", "KeyType", key, "map key")?;
        let value_check = self.type_check("m", "ValueType", value, "map value")?;
        let decode_key = self.from_wire(key, "x.Key")?;
        let decode_value = self.from_wire(value, "x.Value")?;
        let keyed = map_is_keyed(program, key);

        let mut out = String::new();
        writeln!(out, "func {name}(m {wire}.MapItemList) ({type_ref}, error) {{")?;
        out.push_str(&key_check);
        out.push_str(&value_check);
        if keyed {
            writeln!(out, "\to := make({type_ref}, m.Size())")?;
        } else {
            writeln!(out, "\to := make({type_ref}, 0, m.Size())")?;
        }
        writeln!(out, "\terr := m.ForEach(func(x {wire}.MapItem) error {{")?;
        writeln!(out, "\t\tk, err := {decode_key}")?;
        writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
        writeln!(out, "\t\tv, err := {decode_value}")?;
        writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
        if keyed {
            writeln!(out, "\t\to[k] = v")?;
        } else {
            /* type_ref is "[]struct{...}"; the element literal drops the brackets */
            writeln!(out, "\t\to = append(o, {}{{Key: k, Value: v}})", &type_ref[2..])?;
        }
        writeln!(out, "\t\treturn nil\n\t}})")?;
        writeln!(out, "\tm.Close()\n\treturn o, err\n}}\n")?;
        Ok(out)
    }
}
