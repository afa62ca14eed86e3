/* Enums: named int32 types with text, JSON and wire codecs */

use std::collections::HashSet;
use std::fmt::Write;

use idl_types::EnumId;
use tracing::debug;

use super::Generator;
use crate::annotations;
use crate::error::GenResult;
use crate::naming::go_quote;

#[derive(Debug)]
struct ItemLayout {
    ident: String,
    label: String,
    value: i32,
    /// First item declared with this value; only these appear in reverse lookups.
    canonical: bool,
}

impl Generator<'_> {
    fn enum_layout(&mut self, id: EnumId) -> GenResult<Vec<ItemLayout>> {
        let program = self.program;
        let spec = program.enum_spec(id);
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(spec.items.len());
        for (index, item) in spec.items.iter().enumerate() {
            items.push(ItemLayout {
                ident: self.enum_item_ident(id, index)?,
                label: annotations::label(&item.name, &item.annotations).to_string(),
                value: item.value,
                canonical: seen.insert(item.value),
            });
        }
        Ok(items)
    }

    pub fn emit_enum(&mut self, id: EnumId) -> GenResult<()> {
        let program = self.program;
        let spec = program.enum_spec(id);
        let name = self.enum_ident(id)?;
        let items = self.enum_layout(id)?;
        debug!(name = %spec.name, ident = %name, items = items.len(), "emitting enum");

        let wire = self.wire();
        let fmt = self.import("fmt");
        let strconv = self.import("strconv");
        let json = self.import("encoding/json");
        let bytes = self.import("bytes");
        let math = self.import("math");
        let quoted_name = go_quote(&name);

        let canonical: Vec<&ItemLayout> = items.iter().filter(|i| i.canonical).collect();
        let mut out = String::new();

        writeln!(out, "type {name} int32\n")?;
        if !items.is_empty() {
            let width = items.iter().map(|i| i.ident.len()).max().unwrap_or(0);
            writeln!(out, "const (")?;
            for item in &items {
                writeln!(out, "\t{:<width$} {name} = {}", item.ident, item.value)?;
            }
            writeln!(out, ")\n")?;
        }

        let values: Vec<&str> = items.iter().map(|i| i.ident.as_str()).collect();
        writeln!(out, "// {name}_Values returns all recognized values of {name}.")?;
        writeln!(out, "func {name}_Values() []{name} {{\n\treturn []{name}{{{}}}\n}}\n", values.join(", "))?;

        writeln!(out, "// UnmarshalText tries to decode {name} from a byte slice")?;
        writeln!(out, "// containing its name.")?;
        writeln!(out, "func (v *{name}) UnmarshalText(value []byte) error {{")?;
        writeln!(out, "\tswitch s := string(value); s {{")?;
        let mut labels = HashSet::new();
        for item in items.iter().filter(|i| labels.insert(i.label.as_str())) {
            writeln!(out, "\tcase {}:\n\t\t*v = {}\n\t\treturn nil", go_quote(&item.label), item.ident)?;
        }
        writeln!(out, "\tdefault:")?;
        writeln!(out, "\t\tval, err := {strconv}.ParseInt(s, 10, 32)")?;
        writeln!(out, "\t\tif err != nil {{")?;
        writeln!(out, "\t\t\treturn {fmt}.Errorf(\"unknown enum value %q for %q: %v\", s, {quoted_name}, err)")?;
        writeln!(out, "\t\t}}\n\t\t*v = {name}(val)\n\t\treturn nil\n\t}}\n}}\n")?;

        writeln!(out, "// MarshalText encodes {name} to text.")?;
        writeln!(out, "//")?;
        writeln!(out, "// If the enum value is recognized, its name is returned. Otherwise,")?;
        writeln!(out, "// its integer value is returned.")?;
        writeln!(out, "func (v {name}) MarshalText() ([]byte, error) {{")?;
        writeln!(out, "\tswitch int32(v) {{")?;
        for item in &canonical {
            writeln!(out, "\tcase {}:\n\t\treturn []byte({}), nil", item.value, go_quote(&item.label))?;
        }
        writeln!(out, "\t}}\n\treturn []byte({strconv}.FormatInt(int64(v), 10)), nil\n}}\n")?;

        if !self.options.no_zap {
            let zapcore = self.zapcore();
            writeln!(out, "// MarshalLogObject implements zapcore.ObjectMarshaler, enabling")?;
            writeln!(out, "// fast logging of {name}.")?;
            writeln!(out, "// Enums are logged as objects, where the value is logged with key")?;
            writeln!(out, "// \"value\", and if this value's name is known, the name is logged with key \"name\".")?;
            writeln!(out, "func (v {name}) MarshalLogObject(enc {zapcore}.ObjectEncoder) error {{")?;
            writeln!(out, "\tenc.AddInt32(\"value\", int32(v))")?;
            writeln!(out, "\tswitch int32(v) {{")?;
            for item in &canonical {
                writeln!(out, "\tcase {}:\n\t\tenc.AddString(\"name\", {})", item.value, go_quote(&item.label))?;
            }
            writeln!(out, "\t}}\n\treturn nil\n}}\n")?;
        }

        writeln!(out, "// Ptr returns a pointer to this enum value.")?;
        writeln!(out, "func (v {name}) Ptr() *{name} {{\n\treturn &v\n}}\n")?;

        writeln!(out, "// ToWire translates {name} into a Thrift-level intermediate")?;
        writeln!(out, "// representation.")?;
        writeln!(out, "func (v {name}) ToWire() ({wire}.Value, error) {{")?;
        writeln!(out, "\treturn {wire}.NewValueI32(int32(v)), nil\n}}\n")?;

        writeln!(out, "// FromWire deserializes {name} from its Thrift-level")?;
        writeln!(out, "// representation. Values without a name are kept as they are.")?;
        writeln!(out, "func (v *{name}) FromWire(w {wire}.Value) error {{")?;
        writeln!(out, "\t*v = ({name})(w.GetI32())\n\treturn nil\n}}\n")?;

        writeln!(out, "// String returns a readable string representation of {name}.")?;
        writeln!(out, "func (v {name}) String() string {{")?;
        writeln!(out, "\tw := int32(v)\n\tswitch w {{")?;
        for item in &canonical {
            writeln!(out, "\tcase {}:\n\t\treturn {}", item.value, go_quote(&item.label))?;
        }
        writeln!(out, "\t}}\n\treturn {fmt}.Sprintf({}, w)\n}}\n", go_quote(&format!("{name}(%d)")))?;

        writeln!(out, "// Equals returns true if this {name} value matches the provided")?;
        writeln!(out, "// value.")?;
        writeln!(out, "func (v {name}) Equals(rhs {name}) bool {{\n\treturn v == rhs\n}}\n")?;

        writeln!(out, "// MarshalJSON serializes {name} into JSON.")?;
        writeln!(out, "//")?;
        writeln!(out, "// If the enum value is recognized, its name is returned.")?;
        writeln!(out, "// Otherwise, its integer value is returned.")?;
        writeln!(out, "func (v {name}) MarshalJSON() ([]byte, error) {{")?;
        writeln!(out, "\tswitch int32(v) {{")?;
        for item in &canonical {
            let json_text = go_quote(&go_quote(&item.label));
            writeln!(out, "\tcase {}:\n\t\treturn ([]byte)({json_text}), nil", item.value)?;
        }
        writeln!(out, "\t}}\n\treturn ([]byte)({strconv}.FormatInt(int64(v), 10)), nil\n}}\n")?;

        writeln!(out, "// UnmarshalJSON attempts to decode {name} from its JSON")?;
        writeln!(out, "// representation: either the name of a value or its integer form.")?;
        writeln!(out, "func (v *{name}) UnmarshalJSON(text []byte) error {{")?;
        writeln!(out, "\td := {json}.NewDecoder({bytes}.NewReader(text))")?;
        writeln!(out, "\td.UseNumber()")?;
        writeln!(out, "\tt, err := d.Token()")?;
        writeln!(out, "\tif err != nil {{\n\t\treturn err\n\t}}\n")?;
        writeln!(out, "\tswitch w := t.(type) {{")?;
        writeln!(out, "\tcase {json}.Number:")?;
        writeln!(out, "\t\tx, err := w.Int64()")?;
        writeln!(out, "\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}")?;
        writeln!(out, "\t\tif x > {math}.MaxInt32 {{")?;
        writeln!(out, "\t\t\treturn {fmt}.Errorf(\"enum overflow from JSON %q for %q\", text, {quoted_name})\n\t\t}}")?;
        writeln!(out, "\t\tif x < {math}.MinInt32 {{")?;
        writeln!(out, "\t\t\treturn {fmt}.Errorf(\"enum underflow from JSON %q for %q\", text, {quoted_name})\n\t\t}}")?;
        writeln!(out, "\t\t*v = ({name})(x)\n\t\treturn nil")?;
        writeln!(out, "\tcase string:\n\t\treturn v.UnmarshalText([]byte(w))")?;
        writeln!(out, "\tdefault:")?;
        writeln!(
            out,
            "\t\treturn {fmt}.Errorf(\"invalid JSON value %q (%T) to unmarshal into %q\", t, t, {quoted_name})"
        )?;
        writeln!(out, "\t}}\n}}\n")?;

        self.out.push_str(&out);
        Ok(())
    }
}
