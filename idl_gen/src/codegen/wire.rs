/* Encode and decode expressions between Go values and wire.Value */

use idl_types::TypeSpec;

use super::types::is_reference_typedef;
use super::Generator;
use crate::error::GenResult;

impl Generator<'_> {
    fn new_value(&mut self, accessor: &str, value: &str) -> GenResult<String> {
        let wire = self.wire();
        Ok(format!("{wire}.NewValue{accessor}({value}), error(nil)"))
    }

    /// Go expression of type `(wire.Value, error)` encoding `value`.
    pub fn to_wire(&mut self, ty: &TypeSpec, value: &str) -> GenResult<String> {
        match ty {
            TypeSpec::Bool => self.new_value("Bool", value),
            TypeSpec::I8 => self.new_value("I8", value),
            TypeSpec::I16 => self.new_value("I16", value),
            TypeSpec::I32 => self.new_value("I32", value),
            TypeSpec::I64 => self.new_value("I64", value),
            TypeSpec::Double => self.new_value("Double", value),
            TypeSpec::String => self.new_value("String", value),
            TypeSpec::Binary => self.new_value("Binary", value),
            TypeSpec::Enum(_) | TypeSpec::Struct(_) | TypeSpec::Typedef(_) => Ok(format!("{value}.ToWire()")),
            TypeSpec::List(_) => {
                let list = self.value_list(ty)?;
                self.new_value("List", &format!("{list}({value})"))
            }
            TypeSpec::Set { .. } => {
                let list = self.value_list(ty)?;
                self.new_value("Set", &format!("{list}({value})"))
            }
            TypeSpec::Map { .. } => {
                let items = self.map_item_list(ty)?;
                self.new_value("Map", &format!("{items}({value})"))
            }
        }
    }

    /// Go expression of type `(T, error)` decoding the `wire.Value` in `value`.
    pub fn from_wire(&mut self, ty: &TypeSpec, value: &str) -> GenResult<String> {
        let get = |accessor: &str| Ok(format!("{value}.Get{accessor}(), error(nil)"));
        match ty {
            TypeSpec::Bool => get("Bool"),
            TypeSpec::I8 => get("I8"),
            TypeSpec::I16 => get("I16"),
            TypeSpec::I32 => get("I32"),
            TypeSpec::I64 => get("I64"),
            TypeSpec::Double => get("Double"),
            TypeSpec::String => get("String"),
            TypeSpec::Binary => get("Binary"),
            TypeSpec::List(_) => Ok(format!("{}({value}.GetList())", self.container_reader(ty)?)),
            TypeSpec::Set { .. } => Ok(format!("{}({value}.GetSet())", self.container_reader(ty)?)),
            TypeSpec::Map { .. } => Ok(format!("{}({value}.GetMap())", self.container_reader(ty)?)),
            TypeSpec::Enum(_) | TypeSpec::Struct(_) | TypeSpec::Typedef(_) => {
                Ok(format!("{}({value})", self.named_reader(ty)?))
            }
        }
    }

    /// `_Foo_Read`: decode into a fresh value through its `FromWire` method.
    pub fn named_reader(&mut self, ty: &TypeSpec) -> GenResult<String> {
        let symbol = format!("_{}_Read", self.mangle(ty));
        let program = self.program;
        let by_reference = match ty {
            TypeSpec::Struct(_) => true,
            TypeSpec::Typedef(id) => is_reference_typedef(program, *id),
            _ => false,
        };
        let name = symbol.clone();
        let ty = ty.clone();
        self.helper(&symbol, move |g| {
            let type_ref = g.type_ref(&ty)?;
            let wire = g.wire();
            let (var_type, result) = if by_reference {
                (type_ref.trim_start_matches('*').to_string(), "&v")
            } else {
                (type_ref.clone(), "v")
            };
            Ok(format!(
                "func {name}(w {wire}.Value) ({type_ref}, error) {{\n\
                 \tvar v {var_type}\n\
                 \terr := v.FromWire(w)\n\
                 \treturn {result}, err\n\
                 }}\n\n"
            ))
        })?;
        Ok(symbol)
    }
}
