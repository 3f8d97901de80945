//! Decides whether a compiled schema already lists every positional alternative.
//!
//! json-schema-to-typescript style compilers render an `anyOf`/`oneOf` of array
//! schemas as a union of tuple types. Such a declaration is the complete set of
//! argument lists for a rule, so wrapping it in another optional tuple would nest it
//! one level too deep. The check is structural, on the compiled source only.

use crate::error::{Error, Result};
use crate::ir::{Declaration, TsType};
use crate::ts_parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationShape {
    Interface,
    /// `type X = [..] | [..] | ...`
    UnionOfTuples,
    Other,
}

pub fn classify(decl: &Declaration) -> DeclarationShape {
    match decl {
        Declaration::Interface { .. } => DeclarationShape::Interface,
        Declaration::TypeAlias { ty: TsType::Union(members), .. }
            if members.iter().all(TsType::is_tuple) =>
        {
            DeclarationShape::UnionOfTuples
        }
        Declaration::TypeAlias { .. } => DeclarationShape::Other,
    }
}

/// Parse `source` and classify its first declaration.
pub fn first_declaration_shape(source: &str) -> Result<DeclarationShape> {
    let module = ts_parse::parse_module(source)
        .map_err(|message| Error::UnparseableSource { message })?;
    let first = module.declarations.first().ok_or_else(|| Error::UnparseableSource {
        message: "source holds no type or interface declaration".to_string(),
    })?;
    let shape = classify(first);
    tracing::debug!(declaration = first.name(), ?shape, "classified compiled schema");
    Ok(shape)
}

pub fn is_schema_self_sufficient(source: &str) -> Result<bool> {
    Ok(first_declaration_shape(source)? == DeclarationShape::UnionOfTuples)
}
