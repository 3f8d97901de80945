//! Error taxonomy for the rule typing pipeline.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot compile schema `{declaration}`: {message}")]
    MalformedSchema { declaration: String, message: String },

    #[error("generated source is not parseable: {message}")]
    UnparseableSource { message: String },

    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rules document {}: {message}", path.display())]
    InvalidRules { path: PathBuf, message: String },

    #[error("invalid configuration at {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("invalid rule name: {name:?}")]
    InvalidRuleName { name: String },

    #[error("rule `{name}` is defined more than once")]
    DuplicateRule { name: String },

    #[error("rule `{rule}`: {source}")]
    Rule {
        rule: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn malformed(declaration: &str, message: impl Into<String>) -> Self {
        Error::MalformedSchema {
            declaration: declaration.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn in_rule(self, rule: &str) -> Self {
        Error::Rule { rule: rule.to_string(), source: Box::new(self) }
    }
}
