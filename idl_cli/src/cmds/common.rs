/* Loading shared between the codegen and check commands */

use anyhow::{bail, Context};
use idl_gen::{GeneratedFile, Options};
use idl_types::{FileId, Program};
use rayon::prelude::*;
use std::path::Path;
use tracing::debug;

/* Load a resolved graph; `.json` files are JSON, anything else YAML */
pub fn load_program(path: &Path) -> anyhow::Result<Program> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read type graph {}", path.display()))?;
  let is_json = path.extension().is_some_and(|ext| ext == "json");
  let program = if is_json {
    Program::from_json_str(&content)
  } else {
    Program::from_yaml_str(&content)
  }
  .with_context(|| format!("Invalid type graph {}", path.display()))?;

  debug!(
    files = program.files.len(),
    structs = program.structs.len(),
    enums = program.enums.len(),
    services = program.services.len(),
    "loaded type graph"
  );
  Ok(program)
}

/* Options file first, then command-line overrides */
pub fn load_options(config: Option<&Path>, no_zap: bool) -> anyhow::Result<Options> {
  let mut options = match config {
    Some(path) => {
      let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options {}", path.display()))?;
      Options::from_yaml_str(&content).with_context(|| format!("Invalid options {}", path.display()))?
    }
    None => Options::default(),
  };
  if no_zap {
    options.no_zap = true;
  }
  Ok(options)
}

/* Files named on the command line, or every file of the graph */
pub fn select_files(program: &Program, names: &[String]) -> anyhow::Result<Vec<FileId>> {
  if names.is_empty() {
    return Ok((0..program.files.len()).map(|index| FileId(index as u32)).collect());
  }
  let mut selected = Vec::with_capacity(names.len());
  for name in names {
    match program.find_file(name) {
      Some(id) => selected.push(id),
      None => bail!("Schema file '{}' is not part of the type graph", name),
    }
  }
  Ok(selected)
}

/* One independent generation run per file, spread across threads */
pub fn generate_files(program: &Program, files: &[FileId], options: &Options) -> anyhow::Result<Vec<GeneratedFile>> {
  files
    .par_iter()
    .map(|&file| {
      idl_gen::generate(program, file, options)
        .with_context(|| format!("Code generation failed for {}", program.file(file).path))
    })
    .collect()
}
