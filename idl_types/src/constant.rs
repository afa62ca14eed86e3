use crate::types::{ConstantId, EnumId};
use serde_derive::{Deserialize, Serialize};

/// Literal value of a constant or field default, as bound by the linker.
///
/// A `Map` whose target type is a struct is a struct literal: each key is a
/// `String` naming a field of that struct.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<ConstantValue>),
    Map(Vec<ConstantPair>),
    EnumItem {
        #[serde(rename = "enum")]
        enum_id: EnumId,
        item: usize,
    },
    Constant(ConstantId),
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ConstantPair {
    pub key: ConstantValue,
    pub value: ConstantValue,
}

impl ConstantValue {
    pub fn string(value: &str) -> Self {
        ConstantValue::String(value.to_string())
    }

    pub fn map<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ConstantValue, ConstantValue)>,
    {
        ConstantValue::Map(pairs.into_iter().map(|(key, value)| ConstantPair { key, value }).collect())
    }

    /* Struct literal keyed by field name */
    pub fn fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, ConstantValue)>,
    {
        Self::map(fields.into_iter().map(|(name, value)| (ConstantValue::string(name), value)))
    }
}
