//! Go source generation for one schema file.
//!
//! A [`Generator`] owns every piece of mutable state of a run: the root
//! namespace, the type mangler, the import table and the helper memo. Runs
//! for different files share nothing and may execute in parallel.

pub mod imports;

mod constants;
mod containers;
mod enums;
mod equals;
mod services;
mod structs;
mod typedefs;
mod types;
mod wire;
mod zap;

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use idl_types::{
    ConstantId, EnumId, FileId, Named, Program, ServiceId, StructId, StructKind, TypedefId,
};
use tracing::{debug, trace};

use crate::annotations::{self, Site};
use crate::error::{GenError, GenResult};
use crate::mangle::Mangler;
use crate::namespace::{Namespace, NamespaceError};
use crate::options::Options;
use imports::{Imports, STD_PACKAGES};

pub(crate) use structs::StructDecl;

/* Locals the generated function bodies use verbatim */
const FIXED_LOCALS: &[&str] = &[
    "v", "w", "err", "field", "fields", "i", "j", "x", "y", "rhs", "lhs", "enc", "count", "ok", "o",
    "l", "m", "s", "k", "item", "key", "value", "list", "set", "e", "result", "success", "lk", "lv",
    "rk", "rv", "kw", "vw", "d", "t", "val", "text", "f",
];

/// Identifier claims of one scope, remembering which declaration made each
/// claim so conflicts can name both sides.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    pub names: Namespace<'static>,
    owners: HashMap<String, String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, identifier: &str, entity: &str, file: &str) -> GenResult<()> {
        match self.names.reserve(identifier) {
            Ok(()) => {
                self.owners.insert(identifier.to_string(), entity.to_string());
                Ok(())
            }
            Err(NamespaceError::NameTaken(_)) => Err(GenError::IdentifierConflict {
                identifier: identifier.to_string(),
                entity: entity.to_string(),
                existing: self
                    .owners
                    .get(identifier)
                    .cloned()
                    .unwrap_or_else(|| "a reserved Go identifier".to_string()),
                file: file.to_string(),
            }),
            Err(other) => Err(GenError::Internal(other.to_string())),
        }
    }
}

/// Go identifiers of this file's declarations, fixed by the declaration pass.
#[derive(Debug, Default)]
struct Declared {
    structs: HashMap<StructId, String>,
    enums: HashMap<EnumId, String>,
    typedefs: HashMap<TypedefId, String>,
    constants: HashMap<ConstantId, String>,
    /* enum -> identifier of each item constant */
    items: HashMap<EnumId, Vec<String>>,
    functions: HashMap<(ServiceId, usize), ServiceNames>,
}

#[derive(Debug, Clone)]
pub(crate) struct ServiceNames {
    pub args: String,
    pub result: Option<String>,
    pub helper: String,
}

pub(crate) struct Generator<'a> {
    program: &'a Program,
    file: FileId,
    options: &'a Options,
    root: Scope,
    mangler: Mangler,
    imports: Imports,
    declared: Declared,
    emitted_helpers: HashSet<String>,
    helpers: Vec<String>,
    out: String,
}

impl<'a> Generator<'a> {
    pub fn new(program: &'a Program, file: FileId, options: &'a Options) -> GenResult<Self> {
        let mut generator = Self {
            program,
            file,
            options,
            root: Scope::new(),
            mangler: Mangler::new(),
            imports: Imports::new(),
            declared: Declared::default(),
            emitted_helpers: HashSet::new(),
            helpers: Vec::new(),
            out: String::new(),
        };
        generator.reserve_ambient()?;
        Ok(generator)
    }

    pub fn file_path(&self) -> &'a str {
        &self.program.file(self.file).path
    }

    fn site<'s>(&self, entity: &'s str) -> Site<'s>
    where
        'a: 's,
    {
        Site { entity, file: self.file_path() }
    }

    /* Package names and function-body locals, claimed before any declaration */
    fn reserve_ambient(&mut self) -> GenResult<()> {
        let file = self.file_path();
        for local in FIXED_LOCALS {
            self.root.claim(local, "a generated local variable", file)?;
        }

        for path in STD_PACKAGES {
            let alias = imports::default_alias(path);
            self.root.claim(alias, "a standard library import", file)?;
            self.imports.register(path, alias);
        }
        let runtime = [
            (self.options.wire_import.clone(), "wire"),
            (self.options.zapcore_import.clone(), "zapcore"),
            (self.options.multierr_import.clone(), "multierr"),
        ];
        for (path, alias) in runtime {
            self.root.claim(alias, "a runtime import", file)?;
            self.imports.register(&path, alias);
        }

        for (index, other) in self.program.files.iter().enumerate() {
            let id = FileId(index as u32);
            if id == self.file || other.import_path == self.program.file(self.file).import_path {
                continue;
            }
            let alias = self.root.names.new_name(&other.package);
            trace!(file = %other.path, alias = %alias, "allocated import alias");
            self.imports.register_file(id, &other.import_path, &alias);
        }
        Ok(())
    }

    /// Claim package-level identifiers for every declaration of this file.
    /// Services come last so user declarations keep their names.
    fn declare(&mut self) -> GenResult<()> {
        let program = self.program;
        let file_path = self.file_path();

        for (index, constant) in program.constants.iter().enumerate() {
            if constant.file != self.file {
                continue;
            }
            let entity = format!("constant {}", constant.name);
            let ident = annotations::identifier(&constant.name, &constant.annotations, self.site(&entity))?;
            self.root.claim(&ident, &entity, file_path)?;
            self.declared.constants.insert(ConstantId(index as u32), ident);
        }

        for (index, spec) in program.enums.iter().enumerate() {
            if spec.file != self.file {
                continue;
            }
            let id = EnumId(index as u32);
            let entity = format!("enum {}", spec.name);
            let ident = annotations::identifier(&spec.name, &spec.annotations, self.site(&entity))?;
            self.root.claim(&ident, &entity, file_path)?;
            self.root.claim(&format!("{ident}_Values"), &entity, file_path)?;

            let mut items = Vec::with_capacity(spec.items.len());
            for item in &spec.items {
                let item_entity = format!("item {} of enum {}", item.name, spec.name);
                let item_ident = match item.annotations.get(annotations::GO_NAME) {
                    Some(_) => annotations::identifier(&item.name, &item.annotations, self.site(&item_entity))?,
                    None => format!("{ident}{}", crate::naming::go_case(&item.name)),
                };
                self.root.claim(&item_ident, &item_entity, file_path)?;
                items.push(item_ident);
            }
            self.declared.items.insert(id, items);
            self.declared.enums.insert(id, ident);
        }

        for (index, spec) in program.typedefs.iter().enumerate() {
            if spec.file != self.file {
                continue;
            }
            let entity = format!("typedef {}", spec.name);
            let ident = annotations::identifier(&spec.name, &spec.annotations, self.site(&entity))?;
            self.root.claim(&ident, &entity, file_path)?;
            self.declared.typedefs.insert(TypedefId(index as u32), ident);
        }

        for (index, spec) in program.structs.iter().enumerate() {
            if spec.file != self.file {
                continue;
            }
            let entity = format!("{} {}", kind_name(spec.kind), spec.name);
            let ident = annotations::identifier(&spec.name, &spec.annotations, self.site(&entity))?;
            self.root.claim(&ident, &entity, file_path)?;
            self.declared.structs.insert(StructId(index as u32), ident);
        }

        for (index, service) in program.services.iter().enumerate() {
            if service.file != self.file {
                continue;
            }
            let id = ServiceId(index as u32);
            let entity = format!("service {}", service.name);
            let service_ident = annotations::identifier(&service.name, &service.annotations, self.site(&entity))?;
            for (position, function) in service.functions.iter().enumerate() {
                let entity = format!("function {}.{}", service.name, function.name);
                let function_ident =
                    annotations::identifier(&function.name, &function.annotations, self.site(&entity))?;
                let prefix = format!("{service_ident}_{function_ident}");

                let args = format!("{prefix}_Args");
                self.root.claim(&args, &format!("arguments of {entity}"), file_path)?;
                let result = if function.oneway {
                    None
                } else {
                    let result = format!("{prefix}_Result");
                    self.root.claim(&result, &format!("result of {entity}"), file_path)?;
                    Some(result)
                };
                let helper = format!("{prefix}_Helper");
                self.root.claim(&helper, &format!("helper of {entity}"), file_path)?;

                self.declared.functions.insert((id, position), ServiceNames { args, result, helper });
            }
        }

        Ok(())
    }

    /// Go identifier of a named declaration, qualified with its package
    /// alias when it lives in another file.
    fn qualified(&mut self, entity: &impl Named, local: Option<&String>) -> GenResult<String> {
        let program = self.program;
        let ident = match local {
            Some(ident) => ident.clone(),
            None => {
                let file = &program.file(entity.file()).path;
                annotations::identifier(entity.name(), entity.annotations(), Site { entity: entity.name(), file })?
            }
        };
        self.qualify(entity.file(), ident)
    }

    fn qualify(&mut self, file: FileId, ident: String) -> GenResult<String> {
        if file == self.file {
            return Ok(ident);
        }
        match self.imports.take_file(file) {
            Some(alias) => Ok(format!("{alias}.{ident}")),
            /* A different schema file generated into the same package */
            None => Ok(ident),
        }
    }

    pub fn struct_ident(&mut self, id: StructId) -> GenResult<String> {
        let local = self.declared.structs.get(&id).cloned();
        let program = self.program;
        self.qualified(program.struct_spec(id), local.as_ref())
    }

    pub fn enum_ident(&mut self, id: EnumId) -> GenResult<String> {
        let local = self.declared.enums.get(&id).cloned();
        let program = self.program;
        self.qualified(program.enum_spec(id), local.as_ref())
    }

    pub fn typedef_ident(&mut self, id: TypedefId) -> GenResult<String> {
        let local = self.declared.typedefs.get(&id).cloned();
        let program = self.program;
        self.qualified(program.typedef_spec(id), local.as_ref())
    }

    pub fn constant_ident(&mut self, id: ConstantId) -> GenResult<String> {
        let local = self.declared.constants.get(&id).cloned();
        let program = self.program;
        self.qualified(program.constant_spec(id), local.as_ref())
    }

    /// Identifier of item `item` of enum `id`, qualified when foreign.
    pub fn enum_item_ident(&mut self, id: EnumId, item: usize) -> GenResult<String> {
        if let Some(items) = self.declared.items.get(&id) {
            return items
                .get(item)
                .cloned()
                .ok_or_else(|| GenError::Internal(format!("enum item {item} of {id} is out of range")));
        }
        let program = self.program;
        let spec = program.enum_spec(id);
        let entry = spec
            .items
            .get(item)
            .ok_or_else(|| GenError::Internal(format!("enum item {item} of {id} is out of range")))?;
        let file = &program.file(spec.file).path;
        let enum_ident = annotations::identifier(&spec.name, &spec.annotations, Site { entity: &spec.name, file })?;
        let ident = match entry.annotations.get(annotations::GO_NAME) {
            Some(_) => annotations::identifier(&entry.name, &entry.annotations, Site { entity: &entry.name, file })?,
            None => format!("{enum_ident}{}", crate::naming::go_case(&entry.name)),
        };
        self.qualify(spec.file, ident)
    }

    /// Alias of a standard or runtime package, recording the import.
    pub fn import(&mut self, path: &str) -> String {
        self.imports.take(path)
    }

    pub fn wire(&mut self) -> String {
        let path = self.options.wire_import.clone();
        self.imports.take(&path)
    }

    pub fn zapcore(&mut self) -> String {
        let path = self.options.zapcore_import.clone();
        self.imports.take(&path)
    }

    pub fn multierr(&mut self) -> String {
        let path = self.options.multierr_import.clone();
        self.imports.take(&path)
    }

    /// Emit a shared helper once per run. `build` runs only on the first
    /// request for `symbol` and returns the helper's Go source.
    pub fn helper<F>(&mut self, symbol: &str, build: F) -> GenResult<()>
    where
        F: FnOnce(&mut Self) -> GenResult<String>,
    {
        if self.emitted_helpers.contains(symbol) {
            trace!(symbol, "helper already emitted");
            return Ok(());
        }
        self.emitted_helpers.insert(symbol.to_string());
        self.root
            .names
            .reserve(symbol)
            .map_err(|e| GenError::Internal(format!("helper {symbol}: {e}")))?;

        debug!(symbol, "emitting helper");
        let source = build(self)?;
        self.helpers.push(source);
        Ok(())
    }

    /// Generate the whole file.
    pub fn run(mut self) -> GenResult<String> {
        let program = self.program;
        self.declare()?;

        for (index, constant) in program.constants.iter().enumerate() {
            if constant.file == self.file {
                self.emit_constant(ConstantId(index as u32))?;
            }
        }
        for (index, spec) in program.enums.iter().enumerate() {
            if spec.file == self.file {
                self.emit_enum(EnumId(index as u32))?;
            }
        }
        for (index, spec) in program.typedefs.iter().enumerate() {
            if spec.file == self.file {
                self.emit_typedef(TypedefId(index as u32))?;
            }
        }
        for (index, spec) in program.structs.iter().enumerate() {
            if spec.file == self.file {
                let id = StructId(index as u32);
                let ident = self.struct_ident(id)?;
                let decl = StructDecl::from_spec(spec, ident);
                self.emit_struct(&decl)?;
            }
        }
        for (index, service) in program.services.iter().enumerate() {
            if service.file == self.file {
                self.emit_service(ServiceId(index as u32))?;
            }
        }

        self.finish()
    }

    fn finish(self) -> GenResult<String> {
        let file = self.program.file(self.file);
        let mut out = String::new();
        writeln!(
            out,
            "// Code generated by {} from {}. DO NOT EDIT.\n// @generated\n",
            self.options.generator_name, file.path
        )?;
        writeln!(out, "package {}\n", file.package)?;
        let imports = self.imports.render();
        if !imports.is_empty() {
            writeln!(out, "{imports}")?;
        }
        out.push_str(&self.out);
        for helper in &self.helpers {
            out.push_str(helper);
        }
        Ok(out)
    }
}

pub(crate) fn kind_name(kind: StructKind) -> &'static str {
    match kind {
        StructKind::Struct => "struct",
        StructKind::Union => "union",
        StructKind::Exception => "exception",
    }
}
