/* Check command - validate a graph by generating every file in memory */

use super::common::{generate_files, load_options, load_program, select_files};
use std::path::Path;

pub fn run(input: &Path, config: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
  let program = load_program(input)?;
  let options = load_options(config, false)?;
  let targets = select_files(&program, &[])?;
  let generated = generate_files(&program, &targets, &options)?;

  if verbose {
    for file in &generated {
      println!("    - {} ({} bytes)", file.import_path, file.contents.len());
    }
  }
  println!("[✓] {} schema file(s) generate cleanly", generated.len());
  Ok(())
}
