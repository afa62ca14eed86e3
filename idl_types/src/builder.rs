//! Programmatic construction of a [`Program`].
//!
//! Struct bodies are attached after declaration so self-referencing and
//! mutually-referencing structs can be built without placeholders.

use crate::constant::ConstantValue;
use crate::program::{GraphError, Program};
use crate::types::*;

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&mut self, path: &str, import_path: &str, package: &str) -> FileId {
        self.program.files.push(FileSpec {
            path: path.to_string(),
            import_path: import_path.to_string(),
            package: package.to_string(),
        });
        FileId(self.program.files.len() as u32 - 1)
    }

    pub fn declare_struct(&mut self, file: FileId, name: &str, kind: StructKind) -> StructId {
        self.program.structs.push(StructSpec {
            name: name.to_string(),
            file,
            kind,
            fields: FieldGroup::default(),
            allow_empty: false,
            annotations: Annotations::new(),
        });
        StructId(self.program.structs.len() as u32 - 1)
    }

    pub fn set_fields(&mut self, id: StructId, fields: Vec<FieldSpec>) -> &mut Self {
        self.program.structs[id.index()].fields = FieldGroup(fields);
        self
    }

    pub fn add_struct(&mut self, file: FileId, name: &str, kind: StructKind, fields: Vec<FieldSpec>) -> StructId {
        let id = self.declare_struct(file, name, kind);
        self.set_fields(id, fields);
        id
    }

    pub fn allow_empty(&mut self, id: StructId) -> &mut Self {
        self.program.structs[id.index()].allow_empty = true;
        self
    }

    pub fn struct_annotation(&mut self, id: StructId, key: &str, value: &str) -> &mut Self {
        self.program.structs[id.index()].annotations.insert(key.to_string(), value.to_string());
        self
    }

    pub fn add_enum(&mut self, file: FileId, name: &str, items: &[(&str, i32)]) -> EnumId {
        self.program.enums.push(EnumSpec {
            name: name.to_string(),
            file,
            items: items
                .iter()
                .map(|(name, value)| EnumItem {
                    name: name.to_string(),
                    value: *value,
                    annotations: Annotations::new(),
                })
                .collect(),
            annotations: Annotations::new(),
        });
        EnumId(self.program.enums.len() as u32 - 1)
    }

    pub fn enum_item_annotation(&mut self, id: EnumId, item: usize, key: &str, value: &str) -> &mut Self {
        self.program.enums[id.index()].items[item]
            .annotations
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn add_typedef(&mut self, file: FileId, name: &str, target: TypeSpec) -> TypedefId {
        self.program.typedefs.push(TypedefSpec {
            name: name.to_string(),
            file,
            target,
            annotations: Annotations::new(),
        });
        TypedefId(self.program.typedefs.len() as u32 - 1)
    }

    pub fn add_constant(&mut self, file: FileId, name: &str, ty: TypeSpec, value: ConstantValue) -> ConstantId {
        self.program.constants.push(ConstantSpec {
            name: name.to_string(),
            file,
            ty,
            value,
            annotations: Annotations::new(),
        });
        ConstantId(self.program.constants.len() as u32 - 1)
    }

    pub fn add_service(
        &mut self,
        file: FileId,
        name: &str,
        parent: Option<ServiceId>,
        functions: Vec<FunctionSpec>,
    ) -> ServiceId {
        self.program.services.push(ServiceSpec {
            name: name.to_string(),
            file,
            parent,
            functions,
            annotations: Annotations::new(),
        });
        ServiceId(self.program.services.len() as u32 - 1)
    }

    /// Validate and hand out the finished program.
    pub fn build(self) -> Result<Program, GraphError> {
        self.program.validate()?;
        Ok(self.program)
    }
}

impl FunctionSpec {
    pub fn new(name: &str, arguments: Vec<FieldSpec>, return_type: Option<TypeSpec>, exceptions: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            arguments: FieldGroup(arguments),
            result: Some(ResultSpec { return_type, exceptions: FieldGroup(exceptions) }),
            oneway: false,
            annotations: Annotations::new(),
        }
    }

    pub fn oneway(name: &str, arguments: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            arguments: FieldGroup(arguments),
            result: None,
            oneway: true,
            annotations: Annotations::new(),
        }
    }
}
