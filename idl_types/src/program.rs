//! The resolved program graph and its structural checks.

use crate::constant::ConstantValue;
use crate::types::*;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Violations of the invariants the linker is expected to uphold.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("{context} refers to {kind} #{index}, but the program only has {len}")]
    DanglingReference { context: String, kind: &'static str, index: u32, len: usize },

    #[error("{context} declares field id {id} more than once")]
    DuplicateFieldId { context: String, id: i16 },

    #[error("typedef {name} in {file} never reaches a concrete type")]
    TypedefCycle { name: String, file: String },

    #[error("constant {name} in {file} refers back to itself")]
    ConstantCycle { name: String, file: String },

    #[error("{context} refers to item {item} of enum {name}, which has {len} items")]
    EnumItemOutOfRange { context: String, name: String, item: usize, len: usize },

    #[error("failed to parse program: {0}")]
    Parse(String),
}

/// Fully linked schema graph for one generation run.
///
/// Immutable once built; every id stored inside indexes one of the arenas.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Program {
    #[serde(default)]
    pub files: Vec<FileSpec>,
    #[serde(default)]
    pub constants: Vec<ConstantSpec>,
    #[serde(default)]
    pub enums: Vec<EnumSpec>,
    #[serde(default)]
    pub structs: Vec<StructSpec>,
    #[serde(default)]
    pub typedefs: Vec<TypedefSpec>,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

impl Program {
    pub fn file(&self, id: FileId) -> &FileSpec {
        &self.files[id.index()]
    }

    pub fn struct_spec(&self, id: StructId) -> &StructSpec {
        &self.structs[id.index()]
    }

    pub fn enum_spec(&self, id: EnumId) -> &EnumSpec {
        &self.enums[id.index()]
    }

    pub fn typedef_spec(&self, id: TypedefId) -> &TypedefSpec {
        &self.typedefs[id.index()]
    }

    pub fn constant_spec(&self, id: ConstantId) -> &ConstantSpec {
        &self.constants[id.index()]
    }

    pub fn service_spec(&self, id: ServiceId) -> &ServiceSpec {
        &self.services[id.index()]
    }

    pub fn find_file(&self, path: &str) -> Option<FileId> {
        self.files.iter().position(|f| f.path == path).map(|i| FileId(i as u32))
    }

    /// Strips every typedef layer off `ty`.
    pub fn root_type<'a>(&'a self, ty: &'a TypeSpec) -> &'a TypeSpec {
        let mut current = ty;
        /* Bounded so an unvalidated cyclic graph cannot hang the caller */
        for _ in 0..=self.typedefs.len() {
            match current {
                TypeSpec::Typedef(id) => current = &self.typedef_spec(*id).target,
                _ => return current,
            }
        }
        current
    }

    /// Load a program from YAML. Enum-valued nodes use the singleton-map form
    /// (`{list: i32}`), like the rest of the toolchain's YAML inputs.
    pub fn from_yaml_str(content: &str) -> Result<Self, GraphError> {
        let deserializer = serde_yml::Deserializer::from_str(content);
        let program: Program = serde_yml::with::singleton_map_recursive::deserialize(deserializer)
            .map_err(|e| GraphError::Parse(e.to_string()))?;
        program.validate()?;
        Ok(program)
    }

    pub fn from_json_str(content: &str) -> Result<Self, GraphError> {
        let program: Program = serde_json::from_str(content).map_err(|e| GraphError::Parse(e.to_string()))?;
        program.validate()?;
        Ok(program)
    }

    /// Check that ids are in range, field ids are unique per group, and
    /// that typedef chains and constant references terminate.
    pub fn validate(&self) -> Result<(), GraphError> {
        for constant in &self.constants {
            let context = format!("constant {}", constant.name);
            self.check_file(constant.file, &context)?;
            self.check_type(&constant.ty, &context)?;
            self.check_value(&constant.value, &context)?;
        }

        for spec in &self.enums {
            self.check_file(spec.file, &format!("enum {}", spec.name))?;
        }

        for spec in &self.structs {
            let context = format!("struct {}", spec.name);
            self.check_file(spec.file, &context)?;
            self.check_group(&spec.fields, &context)?;
        }

        for spec in &self.typedefs {
            let context = format!("typedef {}", spec.name);
            self.check_file(spec.file, &context)?;
            self.check_type(&spec.target, &context)?;
        }

        for (index, spec) in self.typedefs.iter().enumerate() {
            let start = TypeSpec::Typedef(TypedefId(index as u32));
            if matches!(self.root_type(&start), TypeSpec::Typedef(_)) {
                return Err(GraphError::TypedefCycle {
                    name: spec.name.clone(),
                    file: self.file(spec.file).path.clone(),
                });
            }
        }

        for service in &self.services {
            let context = format!("service {}", service.name);
            self.check_file(service.file, &context)?;
            if let Some(parent) = service.parent {
                check_index(parent.0, self.services.len(), "service", &context)?;
            }
            for function in &service.functions {
                let context = format!("function {}.{}", service.name, function.name);
                self.check_group(&function.arguments, &context)?;
                if let Some(result) = &function.result {
                    if let Some(ty) = &result.return_type {
                        self.check_type(ty, &context)?;
                    }
                    self.check_group(&result.exceptions, &context)?;
                }
            }
        }

        let mut visits = vec![Visit::Pending; self.constants.len()];
        for index in 0..self.constants.len() {
            self.visit_constant(ConstantId(index as u32), &mut visits)?;
        }

        Ok(())
    }

    /// Depth-first walk over constant references; runs after every index
    /// has been range-checked.
    fn visit_constant(&self, id: ConstantId, visits: &mut [Visit]) -> Result<(), GraphError> {
        match visits[id.index()] {
            Visit::Done => return Ok(()),
            Visit::Active => {
                let spec = self.constant_spec(id);
                return Err(GraphError::ConstantCycle {
                    name: spec.name.clone(),
                    file: self.file(spec.file).path.clone(),
                });
            }
            Visit::Pending => {}
        }

        visits[id.index()] = Visit::Active;
        let mut references = Vec::new();
        collect_constant_refs(&self.constant_spec(id).value, &mut references);
        for reference in references {
            self.visit_constant(reference, visits)?;
        }
        visits[id.index()] = Visit::Done;
        Ok(())
    }

    fn check_file(&self, file: FileId, context: &str) -> Result<(), GraphError> {
        check_index(file.0, self.files.len(), "file", context)
    }

    fn check_group(&self, group: &FieldGroup, context: &str) -> Result<(), GraphError> {
        let mut seen = HashSet::new();
        for field in group {
            if !seen.insert(field.id) {
                return Err(GraphError::DuplicateFieldId { context: context.to_string(), id: field.id });
            }
            let context = format!("{context} field {}", field.name);
            self.check_type(&field.ty, &context)?;
            if let Some(value) = &field.default {
                self.check_value(value, &context)?;
            }
        }
        Ok(())
    }

    fn check_type(&self, ty: &TypeSpec, context: &str) -> Result<(), GraphError> {
        match ty {
            TypeSpec::Bool
            | TypeSpec::I8
            | TypeSpec::I16
            | TypeSpec::I32
            | TypeSpec::I64
            | TypeSpec::Double
            | TypeSpec::String
            | TypeSpec::Binary => Ok(()),
            TypeSpec::List(element) | TypeSpec::Set { element, .. } => self.check_type(element, context),
            TypeSpec::Map { key, value } => {
                self.check_type(key, context)?;
                self.check_type(value, context)
            }
            TypeSpec::Enum(id) => check_index(id.0, self.enums.len(), "enum", context),
            TypeSpec::Struct(id) => check_index(id.0, self.structs.len(), "struct", context),
            TypeSpec::Typedef(id) => check_index(id.0, self.typedefs.len(), "typedef", context),
        }
    }

    fn check_value(&self, value: &ConstantValue, context: &str) -> Result<(), GraphError> {
        match value {
            ConstantValue::Bool(_)
            | ConstantValue::Int(_)
            | ConstantValue::Double(_)
            | ConstantValue::String(_) => Ok(()),
            ConstantValue::List(items) => items.iter().try_for_each(|v| self.check_value(v, context)),
            ConstantValue::Map(pairs) => pairs.iter().try_for_each(|pair| {
                self.check_value(&pair.key, context)?;
                self.check_value(&pair.value, context)
            }),
            ConstantValue::EnumItem { enum_id, item } => {
                check_index(enum_id.0, self.enums.len(), "enum", context)?;
                let spec = self.enum_spec(*enum_id);
                if *item >= spec.items.len() {
                    return Err(GraphError::EnumItemOutOfRange {
                        context: context.to_string(),
                        name: spec.name.clone(),
                        item: *item,
                        len: spec.items.len(),
                    });
                }
                Ok(())
            }
            ConstantValue::Constant(id) => check_index(id.0, self.constants.len(), "constant", context),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    Active,
    Done,
}

fn collect_constant_refs(value: &ConstantValue, out: &mut Vec<ConstantId>) {
    match value {
        ConstantValue::Constant(id) => out.push(*id),
        ConstantValue::List(items) => items.iter().for_each(|item| collect_constant_refs(item, out)),
        ConstantValue::Map(pairs) => pairs.iter().for_each(|pair| {
            collect_constant_refs(&pair.key, out);
            collect_constant_refs(&pair.value, out);
        }),
        ConstantValue::Bool(_)
        | ConstantValue::Int(_)
        | ConstantValue::Double(_)
        | ConstantValue::String(_)
        | ConstantValue::EnumItem { .. } => {}
    }
}

fn check_index(index: u32, len: usize, kind: &'static str, context: &str) -> Result<(), GraphError> {
    if (index as usize) < len {
        Ok(())
    } else {
        Err(GraphError::DanglingReference { context: context.to_string(), kind, index, len })
    }
}
