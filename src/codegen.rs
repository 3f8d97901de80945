//! TypeScript printer for the IR.
//!
//! Reproduces the layout prettier gives json-schema-to-typescript output, for the
//! subset of TypeScript the IR covers:
//! - object types with members always break, one member per line;
//! - tuples and unions stay on one line when they fit the print width, otherwise
//!   tuples put one element per line and unions one `| member` per line;
//! - an object type unioned only with `null`/`undefined` hugs (`{ ... } | null`).
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::StyleOptions;
use crate::ir::{Declaration, Literal, Member, MemberKey, Module, TsType, TupleElem};

const TAB: usize = 2;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

// prettier's numeric literal normalization, applied in order
static EXPONENT_SIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-]?[\d.]+e)(?:\+|(-))?0*(\d)").unwrap());
static ZERO_EXPONENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-]?[\d.]+)e[+-]?0+$").unwrap());
static LEADING_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-])?\.").unwrap());
static TRAILING_ZEROS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\.\d+?)0+(e|$)").unwrap());
static TRAILING_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(e|$)").unwrap());

/// Where a type starts printing, which decides how a broken union is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    /// right after `=` or `:`; a broken union moves to the next line
    AfterToken,
    /// at the start of an already-indented line (tuple element, parenthesized)
    LineStart,
}

pub struct Codegen<'a> {
    style: &'a StyleOptions,
    out: String,
}

// ————————————————————————————————————————————————————————————————————————————
// PUBLIC API
// ————————————————————————————————————————————————————————————————————————————

impl<'a> Codegen<'a> {
    pub fn new(style: &'a StyleOptions) -> Self {
        Codegen { style, out: String::new() }
    }

    pub fn emit_module(&mut self, module: &Module) {
        if !self.style.banner_comment.is_empty() {
            self.out.push_str(&self.style.banner_comment);
            self.out.push_str("\n\n");
        }
        for decl in &module.declarations {
            self.emit(decl);
        }
    }

    /// Append one declaration, newline-terminated.
    pub fn emit(&mut self, decl: &Declaration) {
        let text = self.declaration(decl);
        self.out.push_str(&text);
        self.out.push('\n');
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Print a whole module with the given style.
pub fn print_module(module: &Module, style: &StyleOptions) -> String {
    let mut cg = Codegen::new(style);
    cg.emit_module(module);
    cg.into_string()
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS & MEMBERS
// ————————————————————————————————————————————————————————————————————————————

impl Codegen<'_> {
    fn semi(&self) -> &'static str {
        if self.style.semi { ";" } else { "" }
    }

    fn declaration(&self, decl: &Declaration) -> String {
        let mut out = String::new();
        match decl {
            Declaration::TypeAlias { name, ty, comment } => {
                push_comment(&mut out, comment.as_deref(), 0);
                let head = format!("export type {name} =");
                let body = self.ty(ty, 0, head.len() + 1, self.semi().len(), Place::AfterToken);
                out.push_str(&head);
                attach(&mut out, &body);
                out.push_str(self.semi());
            }
            Declaration::Interface { name, extends, members, comment } => {
                push_comment(&mut out, comment.as_deref(), 0);
                out.push_str("export interface ");
                out.push_str(name);
                if !extends.is_empty() {
                    let parents: Vec<String> = extends
                        .iter()
                        .map(|parent| self.ty(parent, 0, 0, 0, Place::LineStart))
                        .collect();
                    out.push_str(" extends ");
                    out.push_str(&parents.join(", "));
                }
                out.push(' ');
                out.push_str(&self.members(members, 0));
            }
        }
        out
    }

    fn members(&self, members: &[Member], indent: usize) -> String {
        if members.is_empty() {
            return "{}".to_string();
        }
        let lines: Vec<String> = members.iter().map(|m| self.member(m, indent + TAB)).collect();
        format!("{{\n{}\n{}}}", lines.join("\n"), " ".repeat(indent))
    }

    fn member(&self, member: &Member, indent: usize) -> String {
        let mut out = String::new();
        push_comment(&mut out, member.comment.as_deref(), indent);

        let mut head = " ".repeat(indent);
        if member.readonly {
            head.push_str("readonly ");
        }
        match &member.key {
            MemberKey::Name(name) if IDENTIFIER.is_match(name) => head.push_str(name),
            MemberKey::Name(name) => head.push_str(&self.quote(name)),
            MemberKey::Index { param, key_ty } => {
                head.push_str(&format!("[{param}: {}]", self.flat(key_ty).unwrap_or_default()));
            }
        }
        if member.optional {
            head.push('?');
        }
        head.push(':');

        let body = self.ty(&member.ty, indent, head.len() + 1, self.semi().len(), Place::AfterToken);
        out.push_str(&head);
        attach(&mut out, &body);
        out.push_str(self.semi());
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

impl Codegen<'_> {
    /// Print `ty` whose first character lands at `column`, with `tail` more characters
    /// following it on the same line. `indent` is the enclosing block's indentation.
    fn ty(&self, ty: &TsType, indent: usize, column: usize, tail: usize, place: Place) -> String {
        if let Some(flat) = self.flat(ty) {
            if column + flat.chars().count() + tail <= self.style.print_width {
                return flat;
            }
        }
        match ty {
            TsType::TypeLiteral(members) => self.members(members, indent),
            TsType::Tuple(elems) => self.broken_tuple(elems, indent),
            TsType::Union(members) if hugs(members) => members
                .iter()
                .map(|m| self.ty(m, indent, column, 0, Place::LineStart))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Union(members) => match place {
                Place::AfterToken => format!("\n{}", self.union_lines(members, indent + TAB)),
                Place::LineStart => self.union_lines(members, indent).trim_start().to_string(),
            },
            TsType::Intersection(members) => members
                .iter()
                .map(|m| match m {
                    TsType::Union(_) => {
                        format!("({})", self.ty(m, indent, column + 1, 1, Place::LineStart))
                    }
                    _ => self.ty(m, indent, column, 0, Place::LineStart),
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Array(inner) => match inner.as_ref() {
                TsType::Union(members) => format!(
                    "(\n{}\n{})[]",
                    self.union_lines(members, indent + TAB),
                    " ".repeat(indent)
                ),
                TsType::Intersection(_) => {
                    format!("({})[]", self.ty(inner, indent, column + 1, tail + 3, Place::LineStart))
                }
                _ => format!("{}[]", self.ty(inner, indent, column, tail + 2, place)),
            },
            TsType::Reference { name, args } if !args.is_empty() => {
                let args: Vec<String> = args
                    .iter()
                    .map(|arg| self.ty(arg, indent, column, 0, Place::LineStart))
                    .collect();
                format!("{name}<{}>", args.join(", "))
            }
            _ => self.flat(ty).unwrap_or_default(),
        }
    }

    fn union_lines(&self, members: &[TsType], indent: usize) -> String {
        let pad = " ".repeat(indent);
        members
            .iter()
            .map(|m| format!("{pad}| {}", self.ty(m, indent + 2, indent + 2, 0, Place::LineStart)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn broken_tuple(&self, elems: &[TupleElem], indent: usize) -> String {
        let inner = indent + TAB;
        let pad = " ".repeat(inner);
        let lines: Vec<String> = elems
            .iter()
            .map(|elem| {
                let prefix = if elem.rest { "..." } else { "" };
                let suffix = if elem.optional { "?" } else { "" };
                let column = inner + prefix.len();
                let body = if elem.optional && is_compound(&elem.ty) {
                    format!("({})", self.ty(&elem.ty, inner, column + 1, 3, Place::LineStart))
                } else {
                    self.ty(&elem.ty, inner, column, 1 + suffix.len(), Place::LineStart)
                };
                format!("{pad}{prefix}{body}{suffix}")
            })
            .collect();
        format!("[\n{}\n{}]", lines.join(",\n"), " ".repeat(indent))
    }

    /// Single-line rendering; `None` when the type can never be printed flat.
    fn flat(&self, ty: &TsType) -> Option<String> {
        let text = match ty {
            TsType::Any => "any".to_string(),
            TsType::Unknown => "unknown".to_string(),
            TsType::Never => "never".to_string(),
            TsType::Null => "null".to_string(),
            TsType::Undefined => "undefined".to_string(),
            TsType::Boolean => "boolean".to_string(),
            TsType::Number => "number".to_string(),
            TsType::String => "string".to_string(),
            TsType::Object => "object".to_string(),
            TsType::Literal(Literal::String(value)) => self.quote(value),
            TsType::Literal(Literal::Number(value)) => print_number(value),
            TsType::Raw(text) => text.clone(),
            TsType::Literal(Literal::Bool(value)) => value.to_string(),
            TsType::Reference { name, args } if args.is_empty() => name.clone(),
            TsType::Reference { name, args } => {
                let args = args.iter().map(|a| self.flat(a)).collect::<Option<Vec<_>>>()?;
                format!("{name}<{}>", args.join(", "))
            }
            TsType::Array(inner) if is_compound(inner) => format!("({})[]", self.flat(inner)?),
            TsType::Array(inner) => format!("{}[]", self.flat(inner)?),
            TsType::Tuple(elems) => {
                let elems = elems.iter().map(|e| self.flat_tuple_elem(e)).collect::<Option<Vec<_>>>()?;
                format!("[{}]", elems.join(", "))
            }
            TsType::TypeLiteral(members) if members.is_empty() => "{}".to_string(),
            TsType::TypeLiteral(_) => return None,
            TsType::Union(members) => {
                let members = members.iter().map(|m| self.flat(m)).collect::<Option<Vec<_>>>()?;
                members.join(" | ")
            }
            TsType::Intersection(members) => {
                let members = members
                    .iter()
                    .map(|m| match m {
                        TsType::Union(_) => self.flat(m).map(|s| format!("({s})")),
                        _ => self.flat(m),
                    })
                    .collect::<Option<Vec<_>>>()?;
                members.join(" & ")
            }
        };
        Some(text)
    }

    fn flat_tuple_elem(&self, elem: &TupleElem) -> Option<String> {
        let body = self.flat(&elem.ty)?;
        let body = if elem.optional && is_compound(&elem.ty) { format!("({body})") } else { body };
        let prefix = if elem.rest { "..." } else { "" };
        let suffix = if elem.optional { "?" } else { "" };
        Some(format!("{prefix}{body}{suffix}"))
    }

    /// String literal in the preferred quote, unless the other quote needs fewer escapes.
    fn quote(&self, value: &str) -> String {
        let (preferred, alternate) = if self.style.single_quote { ('\'', '"') } else { ('"', '\'') };
        let quote = if value.matches(preferred).count() > value.matches(alternate).count() {
            alternate
        } else {
            preferred
        };
        let mut out = String::with_capacity(value.len() + 2);
        out.push(quote);
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `1E+300` → `1e300`, `.50` → `0.5`, `2.` → `2`.
fn print_number(value: &str) -> String {
    let value = value.to_lowercase();
    let value = EXPONENT_SIGN.replace(&value, "$1$2$3");
    let value = ZERO_EXPONENT.replace(&value, "$1");
    let value = LEADING_DOT.replace(&value, "${1}0.");
    let value = TRAILING_ZEROS.replace(&value, "$1$2");
    TRAILING_DOT.replace(&value, "$1").into_owned()
}

fn is_compound(ty: &TsType) -> bool {
    matches!(ty, TsType::Union(_) | TsType::Intersection(_))
}

fn hugs(members: &[TsType]) -> bool {
    let objects = members.iter().filter(|m| matches!(m, TsType::TypeLiteral(ms) if !ms.is_empty())).count();
    objects == 1
        && members
            .iter()
            .all(|m| matches!(m, TsType::TypeLiteral(_) | TsType::Null | TsType::Undefined))
}

fn attach(out: &mut String, body: &str) {
    if !body.starts_with('\n') {
        out.push(' ');
    }
    out.push_str(body);
}

fn push_comment(out: &mut String, comment: Option<&str>, indent: usize) {
    let Some(comment) = comment else { return };
    let pad = " ".repeat(indent);
    out.push_str(&pad);
    out.push_str("/**\n");
    for line in comment.lines() {
        let line = line.replace("*/", "*\\/");
        out.push_str(&pad);
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(" * ");
            out.push_str(&line);
            out.push('\n');
        }
    }
    out.push_str(&pad);
    out.push_str(" */\n");
}
