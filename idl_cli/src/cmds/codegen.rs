/* Codegen command - generate Go packages from a resolved type graph */

use super::common::{generate_files, load_options, load_program, select_files};
use anyhow::Context;
use idl_gen::GeneratedFile;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct CodegenArgs {
  pub input: PathBuf,
  pub output_dir: PathBuf,
  pub files: Vec<String>,
  pub config: Option<PathBuf>,
  pub no_zap: bool,
  pub verbose: bool,
}

/* Execute the codegen command */
pub fn run(args: CodegenArgs) -> anyhow::Result<()> {
  if args.verbose {
    println!("[~] Configuration:");
    println!("  Input graph: {}", args.input.display());
    println!("  Output directory: {}", args.output_dir.display());
    if let Some(config) = &args.config {
      println!("  Options file: {}", config.display());
    }
    println!();
  }

  let program = load_program(&args.input)?;
  let options = load_options(args.config.as_deref(), args.no_zap)?;
  let targets = select_files(&program, &args.files)?;

  if args.verbose {
    println!("[*] Generating {} file(s)...", targets.len());
  }
  let generated = generate_files(&program, &targets, &options)?;
  let written = write_generated(&args.output_dir, &generated)?;

  println!("[✓] Generated {} Go file(s):", written.len());
  for path in &written {
    println!("    - {}", path.display());
  }
  Ok(())
}

/* Each package lands at <output>/<import path>/<package>.go */
pub fn write_generated(output_dir: &Path, generated: &[GeneratedFile]) -> anyhow::Result<Vec<PathBuf>> {
  let mut written = Vec::with_capacity(generated.len());
  for file in generated {
    let package_dir = output_dir.join(&file.import_path);
    std::fs::create_dir_all(&package_dir)
      .with_context(|| format!("Failed to create {}", package_dir.display()))?;
    let path = package_dir.join(&file.file_name);
    std::fs::write(&path, &file.contents).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(package = %file.package_name, path = %path.display(), "wrote generated file");
    written.push(path);
  }
  Ok(written)
}
