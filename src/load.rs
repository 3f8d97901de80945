//! Reading rules documents from disk.
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::rule::Rules;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> std::result::Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}

/// One rules document: a JSON object mapping rule names to rule definitions.
pub fn load_rules(path: &Path) -> Result<Rules> {
    let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let rules = from_str_with_path::<Rules>(&source).map_err(|message| Error::InvalidRules {
        path: path.to_path_buf(),
        message,
    })?;
    tracing::debug!(path = %path.display(), rules = rules.len(), "loaded rules document");
    Ok(rules)
}

/// Merge several documents in order. A rule name may only appear once across all of them.
pub fn load_rules_files(paths: &[PathBuf]) -> Result<Rules> {
    let mut merged = Rules::new();
    for path in paths {
        for (name, rule) in load_rules(path)? {
            if merged.contains_key(&name) {
                return Err(Error::DuplicateRule { name });
            }
            merged.insert(name, rule);
        }
    }
    Ok(merged)
}
