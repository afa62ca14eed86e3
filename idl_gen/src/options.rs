/* Generation options */

use serde_derive::{Deserialize, Serialize};

pub const DEFAULT_WIRE_IMPORT: &str = "go.uber.org/thriftrw/wire";
pub const DEFAULT_ZAPCORE_IMPORT: &str = "go.uber.org/zap/zapcore";
pub const DEFAULT_MULTIERR_IMPORT: &str = "go.uber.org/multierr";

/// Knobs for one generation run. Loadable from YAML; every key is optional.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Skip the structured-logging (`MarshalLogObject`) methods and helpers.
    pub no_zap: bool,
    /// Import path of the wire runtime package the generated codecs call into.
    pub wire_import: String,
    pub zapcore_import: String,
    pub multierr_import: String,
    /// Tool name written into the generated-file header.
    pub generator_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            no_zap: false,
            wire_import: DEFAULT_WIRE_IMPORT.to_string(),
            zapcore_import: DEFAULT_ZAPCORE_IMPORT.to_string(),
            multierr_import: DEFAULT_MULTIERR_IMPORT.to_string(),
            generator_name: "idlc".to_string(),
        }
    }
}

impl Options {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(content)
    }
}
