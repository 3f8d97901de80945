//! Rule definitions and the Rule Compiler.
//!
//! A rule's option schema is either a single schema node or a positional list of
//! them. Every element compiles to its own `Schema<i>` declaration; the rule type
//! is then the tuple of optional element types, or the lone `Schema0` when that
//! declaration already is a union of tuples.
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compiler::{compile_schema, SchemaCompiler};
use crate::config::StyleOptions;
use crate::error::{Error, Result};
use crate::relink::relink_item_refs;
use crate::sufficiency::is_schema_self_sufficient;

/// Rule name → rule, in document order.
pub type Rules = IndexMap<String, Rule>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rule {
    pub meta: RuleMeta,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleMeta {
    /// absent means the rule takes no options
    #[serde(default)]
    pub schema: SchemaSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSpec {
    Sequence(Vec<Value>),
    Single(Value),
}

impl Default for SchemaSpec {
    fn default() -> Self {
        SchemaSpec::Sequence(Vec::new())
    }
}

impl SchemaSpec {
    /// The positional elements; a single schema is a one-element sequence.
    pub fn elements(&self) -> &[Value] {
        match self {
            SchemaSpec::Sequence(elements) => elements,
            SchemaSpec::Single(schema) => std::slice::from_ref(schema),
        }
    }
}

impl Rule {
    /// Wrap a raw `meta.schema` value.
    pub fn from_schema(schema: Value) -> Self {
        let schema = match schema {
            Value::Array(elements) => SchemaSpec::Sequence(elements),
            schema => SchemaSpec::Single(schema),
        };
        Rule { meta: RuleMeta { schema } }
    }
}

/// Rule names become identifiers and file names, so they cannot be empty.
pub fn validate_rule_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidRuleName { name: name.to_string() });
    }
    Ok(())
}

/// TypeScript source declaring `name` as the options type of `rule`.
///
/// The element declarations come first, each ending in a newline, followed by
/// `export type <name> = <annotation>` without a trailing newline.
pub fn compile_rule<C>(rule: &Rule, name: &str, compiler: &C, style: &StyleOptions) -> Result<String>
where
    C: SchemaCompiler + ?Sized,
{
    let elements = rule.meta.schema.elements();
    if elements.is_empty() {
        return Ok(format!("export type {name} = []"));
    }

    let compiled = elements
        .par_iter()
        .enumerate()
        .map(|(id, schema)| {
            let schema = relink_item_refs(schema);
            compile_schema(compiler, &schema, &format!("Schema{id}"), style)
        })
        .collect::<Result<Vec<String>>>()?;

    let self_sufficient = is_schema_self_sufficient(&compiled[0])?;
    let annotation = if compiled.len() == 1 && self_sufficient {
        "Schema0".to_string()
    } else {
        let slots: Vec<String> = (0..compiled.len()).map(|id| format!("Schema{id}?")).collect();
        format!("[{}]", slots.join(", "))
    };
    tracing::debug!(rule = name, elements = compiled.len(), self_sufficient, "compiled rule");

    let mut source = compiled.concat();
    source.push_str(&format!("export type {name} = {annotation}"));
    Ok(source)
}
