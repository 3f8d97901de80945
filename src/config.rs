//! Run options and compiler style options.
//!
//! Both deserialize from camelCase JSON with per-field defaults, so a config file only
//! has to name what it overrides:
//!
//! ```json
//! { "distFolder": "types", "rulesPrefix": "style/", "style": { "semi": true } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// output root; rule files land in `<dist_folder>/rules`
    pub dist_folder: PathBuf,
    /// prepended to every rule name in the aggregate mapping type
    pub rules_prefix: String,
    pub style: StyleOptions,
}

/// Forwarded to the schema compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    /// emitted verbatim above the declarations when non-empty
    pub banner_comment: String,
    pub semi: bool,
    pub single_quote: bool,
    /// `additionalProperties` absent means "allowed" (index signature emitted)
    pub additional_properties: bool,
    /// `unknown` rather than `any` for unconstrained values
    pub unknown_any: bool,
    pub ignore_min_and_max_items: bool,
    pub print_width: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            dist_folder: PathBuf::from("dist"),
            rules_prefix: String::new(),
            style: StyleOptions::default(),
        }
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        StyleOptions {
            banner_comment: String::new(),
            semi: false,
            single_quote: true,
            additional_properties: true,
            unknown_any: true,
            ignore_min_and_max_items: false,
            print_width: 80,
        }
    }
}

impl Options {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&source).map_err(|message| Error::InvalidConfig {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json_str(source: &str) -> std::result::Result<Self, String> {
        crate::load::from_str_with_path(source)
    }
}
