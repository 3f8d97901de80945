//! CLI: rules documents → TypeScript declaration files
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rule_typify::{naming, Options, TypeScriptCompiler};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile lint-rule option schemas into TypeScript types
#[derive(Parser, Debug)]
#[command(name = "rule-typify", version)]
pub struct CommandLineInterface {
    /// log pipeline progress to stderr
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile every rule into `<dist>/rules/*.d.ts` plus `<dist>/index.d.ts`
    Generate(GenerateOut),
    /// compile a single rule and print its declarations
    Rule(RuleOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more rules documents (`{ "<rule name>": { "meta": { "schema": ... } } }`).
    /// May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON options file (`distFolder`, `rulesPrefix`, `style`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// end declarations with semicolons
    #[arg(long, default_value_t = false)]
    semi: bool,

    /// quote strings with `"` instead of `'`
    #[arg(long, default_value_t = false)]
    double_quote: bool,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output root (overrides the config file)
    #[arg(long)]
    dist_folder: Option<PathBuf>,

    /// prepended to rule names in the index (overrides the config file)
    #[arg(long)]
    rules_prefix: Option<String>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct RuleOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// rule name as written in the rules document
    #[arg(long)]
    name: String,

    /// output .d.ts file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn options(&self) -> anyhow::Result<Options> {
        let mut options = match self.config.as_ref() {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };
        if self.semi {
            options.style.semi = true;
        }
        if self.double_quote {
            options.style.single_quote = false;
        }
        Ok(options)
    }

    fn load_rules(&self) -> anyhow::Result<rule_typify::Rules> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        Ok(rule_typify::load::load_rules_files(&source_paths)?)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_tracing(&self) {
        if !self.verbose {
            return;
        }
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .finish();
        if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("{}: logging unavailable: {error}", "warning".yellow().bold());
        }
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let mut options = target.input_settings.options()?;
                if let Some(dist_folder) = target.dist_folder.as_ref() {
                    options.dist_folder = dist_folder.clone();
                }
                if let Some(rules_prefix) = target.rules_prefix.as_ref() {
                    options.rules_prefix = rules_prefix.clone();
                }
                let rules = target.input_settings.load_rules()?;

                let report = rule_typify::typify(&rules, &options, &TypeScriptCompiler)?;
                eprintln!(
                    "{} {} rule file(s) and {}",
                    "wrote".green().bold(),
                    report.rule_files.len(),
                    report.index_file.display()
                );
            }
            Command::Rule(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                rule_typify::validate_rule_name(&target.name)?;
                let options = target.input_settings.options()?;
                let rules = target.input_settings.load_rules()?;
                let rule = rules
                    .get(&target.name)
                    .ok_or_else(|| anyhow!("no rule named `{}` in the inputs", target.name))?;
                let type_identifier = naming::rule_type_identifier(&target.name);
                let source =
                    rule_typify::compile_rule(rule, &type_identifier, &TypeScriptCompiler, &options.style)
                        .with_context(|| format!("rule `{}`", target.name))?;

                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("creating {}", parent.display()))?;
                    }
                    std::fs::write(out, &source).with_context(|| format!("writing {}", out.display()))?;
                } else {
                    println!("{source}");
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }

        // sorted so runs over the same tree merge rules in the same order
        let mut matched = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {pattern}"))?
            .collect::<Result<Vec<_>, _>>()?;
        if matched.is_empty() {
            return Err(anyhow!("glob pattern matched no files: {pattern}"));
        }
        matched.sort();
        out.append(&mut matched);
    }

    Ok(out)
}
