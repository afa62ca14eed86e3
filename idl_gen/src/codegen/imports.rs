/* Import bookkeeping for one generated file */

use std::collections::{BTreeMap, HashMap};

use idl_types::FileId;

/// Standard-library packages the generated code may call into. Their names
/// are reserved in the root scope before anything else is claimed.
pub const STD_PACKAGES: &[&str] =
    &["bytes", "encoding/base64", "encoding/json", "errors", "fmt", "math", "strconv", "strings"];

#[derive(Debug, Clone)]
struct Import {
    alias: String,
    used: bool,
}

/// Import path -> alias, with usage tracking so only referenced packages
/// end up in the import block.
#[derive(Debug, Default)]
pub struct Imports {
    by_path: BTreeMap<String, Import>,
    files: HashMap<FileId, String>,
}

pub fn default_alias(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl Imports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `path` available under `alias` without marking it used.
    pub fn register(&mut self, path: &str, alias: &str) {
        self.by_path
            .entry(path.to_string())
            .or_insert_with(|| Import { alias: alias.to_string(), used: false });
    }

    pub fn register_file(&mut self, file: FileId, path: &str, alias: &str) {
        self.register(path, alias);
        self.files.insert(file, path.to_string());
    }

    /// Alias for `path`, marking it used.
    pub fn take(&mut self, path: &str) -> String {
        let import = self
            .by_path
            .entry(path.to_string())
            .or_insert_with(|| Import { alias: default_alias(path).to_string(), used: false });
        import.used = true;
        import.alias.clone()
    }

    /// Alias of another schema file's package, marking it used.
    pub fn take_file(&mut self, file: FileId) -> Option<String> {
        let path = self.files.get(&file)?.clone();
        Some(self.take(&path))
    }

    /// The Go import block, standard packages first. Empty when nothing is used.
    pub fn render(&self) -> String {
        let (std, third_party): (Vec<_>, Vec<_>) = self
            .by_path
            .iter()
            .filter(|(_, import)| import.used)
            .partition(|(path, _)| STD_PACKAGES.contains(&path.as_str()));
        if std.is_empty() && third_party.is_empty() {
            return String::new();
        }

        let line = |(path, import): &(&String, &Import)| {
            if default_alias(path) == import.alias {
                format!("\t\"{path}\"\n")
            } else {
                format!("\t{} \"{path}\"\n", import.alias)
            }
        };

        let mut out = String::from("import (\n");
        out.extend(std.iter().map(line));
        if !std.is_empty() && !third_party.is_empty() {
            out.push('\n');
        }
        out.extend(third_party.iter().map(line));
        out.push_str(")\n");
        out
    }
}
