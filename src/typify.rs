//! Aggregate assembly: every rule → its own declaration file, plus an index
//! mapping (prefixed) rule names to their option types.
//!
//! ```text
//! <dist>/rules/<file name>.d.ts
//! <dist>/index.d.ts
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::compiler::SchemaCompiler;
use crate::config::Options;
use crate::error::{Error, Result};
use crate::naming;
use crate::rule::{compile_rule, validate_rule_name, Rules};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct RuleFile {
    pub rule_name: String,
    /// `no-foo` → `NoFoo`, `style/bar` → `Style_Bar`
    pub type_identifier: String,
    /// without the `.d.ts` extension
    pub file_name: String,
    pub source: String,
}

/// Everything a generation run writes, in rule order.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub rules: Vec<RuleFile>,
    pub index: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rule_files: Vec<PathBuf>,
    pub index_file: PathBuf,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// Compile every rule. Rules compile in parallel; the output keeps input order.
pub fn assemble<C>(rules: &Rules, options: &Options, compiler: &C) -> Result<Output>
where
    C: SchemaCompiler + ?Sized,
{
    let entries: Vec<_> = rules.iter().collect();
    let files = entries
        .par_iter()
        .map(|(rule_name, rule)| {
            validate_rule_name(rule_name)?;
            let type_identifier = naming::rule_type_identifier(rule_name);
            let source = compile_rule(rule, &type_identifier, compiler, &options.style)
                .map_err(|error| error.in_rule(rule_name))?;
            Ok(RuleFile {
                rule_name: rule_name.to_string(),
                file_name: naming::rule_file_name(rule_name),
                type_identifier,
                source,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let index = render_index(&files, &options.rules_prefix);
    tracing::info!(rules = files.len(), "assembled rule declarations");
    Ok(Output { rules: files, index })
}

/// Contents of `index.d.ts`.
pub fn render_index(files: &[RuleFile], rules_prefix: &str) -> String {
    let imports: Vec<String> = files
        .iter()
        .map(|file| format!("import type {{ {} }} from './rules/{}'", file.type_identifier, file.file_name))
        .collect();
    let entries: Vec<String> = files
        .iter()
        .map(|file| format!("  '{rules_prefix}{}': {}", file.rule_name, file.type_identifier))
        .collect();
    format!(
        "{}\n\nexport type RuleOptions = {{\n{}\n}}",
        imports.join("\n"),
        entries.join(",\n")
    )
}

/// Write rule files under `<dist>/rules` (in parallel), then `<dist>/index.d.ts`
/// once all of them exist.
pub fn write_output(output: &Output, dist: &Path) -> Result<Report> {
    let rules_folder = dist.join("rules");
    fs::create_dir_all(&rules_folder).map_err(|e| Error::io(&rules_folder, e))?;

    let rule_files = output
        .rules
        .par_iter()
        .map(|file| {
            let path = rules_folder.join(format!("{}.d.ts", file.file_name));
            fs::write(&path, &file.source).map_err(|e| Error::io(&path, e))?;
            tracing::debug!(path = %path.display(), "wrote rule declarations");
            Ok(path)
        })
        .collect::<Result<Vec<_>>>()?;

    let index_file = dist.join("index.d.ts");
    fs::write(&index_file, &output.index).map_err(|e| Error::io(&index_file, e))?;
    tracing::info!(path = %index_file.display(), "wrote index");

    Ok(Report { rule_files, index_file })
}

/// [`assemble`] then [`write_output`].
pub fn typify<C>(rules: &Rules, options: &Options, compiler: &C) -> Result<Report>
where
    C: SchemaCompiler + ?Sized,
{
    let output = assemble(rules, options, compiler)?;
    write_output(&output, &options.dist_folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(rule_name: &str, type_identifier: &str, file_name: &str) -> RuleFile {
        RuleFile {
            rule_name: rule_name.to_string(),
            type_identifier: type_identifier.to_string(),
            file_name: file_name.to_string(),
            source: String::new(),
        }
    }

    #[test]
    fn index_layout() {
        let files = [file("no-foo", "NoFoo", "no-foo"), file("style/indent", "Style_Indent", "style_indent")];
        assert_eq!(
            render_index(&files, "x/"),
            "import type { NoFoo } from './rules/no-foo'\n\
             import type { Style_Indent } from './rules/style_indent'\n\
             \n\
             export type RuleOptions = {\n  \
             'x/no-foo': NoFoo,\n  \
             'x/style/indent': Style_Indent\n\
             }"
        );
    }

    #[test]
    fn empty_index() {
        assert_eq!(render_index(&[], ""), "\n\nexport type RuleOptions = {\n\n}");
    }
}
