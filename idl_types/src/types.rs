use crate::constant::ConstantValue;
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

/// Annotation map attached to a schema entity. Keys and values arrive
/// unescaped from the linker; order carries no meaning.
pub type Annotations = IndexMap<String, String>;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Index into [`crate::Program::files`].
    FileId
);
define_id!(
    /// Index into [`crate::Program::structs`].
    StructId
);
define_id!(
    /// Index into [`crate::Program::enums`].
    EnumId
);
define_id!(
    /// Index into [`crate::Program::typedefs`].
    TypedefId
);
define_id!(
    /// Index into [`crate::Program::constants`].
    ConstantId
);
define_id!(
    /// Index into [`crate::Program::services`].
    ServiceId
);

/// Closed set of type shapes the generator understands.
///
/// Named shapes (`Enum`, `Struct`, `Typedef`) are arena references, so a
/// struct may refer to itself through any number of containers or typedefs.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum TypeSpec {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    List(Box<TypeSpec>),
    Set {
        element: Box<TypeSpec>,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        annotations: Annotations,
    },
    Map {
        key: Box<TypeSpec>,
        value: Box<TypeSpec>,
    },
    Enum(EnumId),
    Struct(StructId),
    Typedef(TypedefId),
}

impl TypeSpec {
    pub fn list(element: TypeSpec) -> Self {
        TypeSpec::List(Box::new(element))
    }

    pub fn set(element: TypeSpec) -> Self {
        TypeSpec::Set { element: Box::new(element), annotations: Annotations::new() }
    }

    /* Set with explicit annotations, e.g. the forced-sequence override */
    pub fn set_with(element: TypeSpec, annotations: Annotations) -> Self {
        TypeSpec::Set { element: Box::new(element), annotations }
    }

    pub fn map(key: TypeSpec, value: TypeSpec) -> Self {
        TypeSpec::Map { key: Box::new(key), value: Box::new(value) }
    }

    /// True for `bool`, the integer widths, `double`, `string` and `binary`.
    pub fn is_base(&self) -> bool {
        matches!(
            self,
            TypeSpec::Bool
                | TypeSpec::I8
                | TypeSpec::I16
                | TypeSpec::I32
                | TypeSpec::I64
                | TypeSpec::Double
                | TypeSpec::String
                | TypeSpec::Binary
        )
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Requiredness {
    Required,
    #[default]
    Optional,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldSpec {
    pub id: i16,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeSpec,
    #[serde(default)]
    pub requiredness: Requiredness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ConstantValue>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

impl FieldSpec {
    pub fn required(id: i16, name: &str, ty: TypeSpec) -> Self {
        Self {
            id,
            name: name.to_string(),
            ty,
            requiredness: Requiredness::Required,
            default: None,
            annotations: Annotations::new(),
        }
    }

    pub fn optional(id: i16, name: &str, ty: TypeSpec) -> Self {
        Self { requiredness: Requiredness::Optional, ..Self::required(id, name, ty) }
    }

    pub fn with_default(mut self, value: ConstantValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_required(&self) -> bool {
        self.requiredness == Requiredness::Required
    }
}

/// Ordered fields of a struct, or of a function's arguments or exceptions.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(transparent)]
pub struct FieldGroup(pub Vec<FieldSpec>);

impl FieldGroup {
    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&FieldSpec> {
        self.0.iter().find(|f| f.name == name)
    }
}

impl From<Vec<FieldSpec>> for FieldGroup {
    fn from(fields: Vec<FieldSpec>) -> Self {
        FieldGroup(fields)
    }
}

impl<'a> IntoIterator for &'a FieldGroup {
    type Item = &'a FieldSpec;
    type IntoIter = std::slice::Iter<'a, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum StructKind {
    Struct,
    Union,
    Exception,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructSpec {
    pub name: String,
    pub file: FileId,
    pub kind: StructKind,
    #[serde(default)]
    pub fields: FieldGroup,
    /// Unions only: permit zero populated fields instead of exactly one.
    #[serde(default)]
    pub allow_empty: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumItem {
    pub name: String,
    pub value: i32,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

/// Enum items keep declaration order; values may repeat.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumSpec {
    pub name: String,
    pub file: FileId,
    pub items: Vec<EnumItem>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TypedefSpec {
    pub name: String,
    pub file: FileId,
    pub target: TypeSpec,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ConstantSpec {
    pub name: String,
    pub file: FileId,
    #[serde(rename = "type")]
    pub ty: TypeSpec,
    pub value: ConstantValue,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ResultSpec {
    /// `None` for functions returning `void`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeSpec>,
    #[serde(default)]
    pub exceptions: FieldGroup,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FunctionSpec {
    pub name: String,
    #[serde(default)]
    pub arguments: FieldGroup,
    /// Absent for one-way functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultSpec>,
    #[serde(default)]
    pub oneway: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceSpec {
    pub name: String,
    pub file: FileId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ServiceId>,
    #[serde(default)]
    pub functions: Vec<FunctionSpec>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

/// One schema file of the program and the package its code is generated into.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FileSpec {
    pub path: String,
    pub import_path: String,
    pub package: String,
}

/// Canonical schema name, originating file and annotations of a declaration.
pub trait Named {
    fn name(&self) -> &str;
    fn file(&self) -> FileId;
    fn annotations(&self) -> &Annotations;
}

macro_rules! impl_named {
    ($($ty:ty),*) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn file(&self) -> FileId {
                self.file
            }

            fn annotations(&self) -> &Annotations {
                &self.annotations
            }
        })*
    };
}

impl_named!(StructSpec, EnumSpec, TypedefSpec, ConstantSpec, ServiceSpec);
