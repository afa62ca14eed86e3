//! Go code generation for resolved IDL programs
//!
//! Given a linked [`Program`] and one of its files, [`generate`] produces the
//! Go source of that file: wire codecs, equality, string and structured
//! logging methods for every declared type, plus argument and result types
//! for services. All mutable state (namespaces, the mangler, the helper
//! memo) lives inside a single call, so files may be generated in parallel
//! against a shared program.

pub mod annotations;
pub mod error;
pub mod mangle;
pub mod namespace;
pub mod naming;
pub mod options;

mod codegen;

use idl_types::{FileId, GraphError, Program};
use tracing::{debug, info};

pub use codegen::imports::STD_PACKAGES;
pub use error::{GenError, GenResult};
pub use options::Options;

/// Output of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub package_name: String,
    pub import_path: String,
    /// `<package>.go`
    pub file_name: String,
    pub contents: String,
}

/// Generate the Go source for `file` of `program`.
pub fn generate(program: &Program, file: FileId, options: &Options) -> GenResult<GeneratedFile> {
    program.validate()?;
    let spec = program.files.get(file.index()).ok_or_else(|| GraphError::DanglingReference {
        context: "generation target".to_string(),
        kind: "file",
        index: file.0,
        len: program.files.len(),
    })?;
    info!(file = %spec.path, package = %spec.package, "generating");

    let contents = codegen::Generator::new(program, file, options)?.run()?;
    debug!(file = %spec.path, bytes = contents.len(), "generated");

    Ok(GeneratedFile {
        package_name: spec.package.clone(),
        import_path: spec.import_path.clone(),
        file_name: format!("{}.go", spec.package),
        contents,
    })
}

/// Generate every file of `program`, in file order.
pub fn generate_all(program: &Program, options: &Options) -> GenResult<Vec<GeneratedFile>> {
    (0..program.files.len())
        .map(|index| generate(program, FileId(index as u32), options))
        .collect()
}
