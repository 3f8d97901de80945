//! Generate TypeScript option types from lint-rule JSON schemas.
//!
//! Pipeline per rule: relink positional `$ref`s ([`relink`]), compile each schema
//! element ([`compiler`]), check whether the first element already enumerates every
//! argument list ([`sufficiency`]), wrap ([`rule`]). [`typify`] runs that over a
//! whole rules map and writes the declaration files plus an index.
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod ir;
pub mod load;
pub mod lower;
pub mod naming;
pub mod relink;
pub mod rule;
pub mod sufficiency;
pub mod ts_parse;
pub mod typify;

pub use compiler::{compile_schema, SchemaCompiler, TypeScriptCompiler};
pub use config::{Options, StyleOptions};
pub use error::{Error, Result};
pub use relink::relink_item_refs;
pub use rule::{compile_rule, validate_rule_name, Rule, RuleMeta, Rules, SchemaSpec};
pub use sufficiency::is_schema_self_sufficient;
pub use typify::{assemble, typify, write_output, Output, Report, RuleFile};
