//! JSON Schema → TypeScript IR.
//!
//! Follows json-schema-to-typescript's reading of a schema:
//! `$ref` (local pointers, inlined) > `tsType` > `enum` > `const` > `anyOf`/`oneOf`
//! > `allOf` > `type` > shape inferred from the keywords present.
//! Sub-schemas with a `title` become their own declarations, referenced by name.
use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::config::StyleOptions;
use crate::error::{Error, Result};
use crate::ir::{Declaration, Literal, Member, Module, TsType, TupleElem};
use crate::naming::to_safe_identifier;

/// `minItems`/`maxItems` expansions past this many slots are left as plain arrays.
const MAX_TUPLE_EXPANSION: usize = 16;

const OBJECT_KEYWORDS: [&str; 4] = ["properties", "additionalProperties", "required", "patternProperties"];
const ARRAY_KEYWORDS: [&str; 4] = ["items", "additionalItems", "minItems", "maxItems"];

/// Lower `schema` into a module whose first declaration is `name`.
pub fn lower_to_module(schema: &Value, name: &str, style: &StyleOptions) -> Result<Module> {
    let mut cx = Lowering::new(schema, name, style);
    let ty = cx.lower_inner(schema)?;
    let root = declaration_for(name.to_string(), ty, comment_of(schema));
    let mut declarations = vec![root];
    declarations.extend(cx.hoisted);
    Ok(Module { declarations })
}

struct Lowering<'a> {
    root: &'a Value,
    name: &'a str,
    style: &'a StyleOptions,
    /// titled sub-schemas, in first-seen order
    hoisted: Vec<Declaration>,
    taken_names: HashSet<String>,
    /// declaration name per hoisted schema node, keyed by address
    hoisted_nodes: HashMap<*const Value, String>,
    /// `$ref` pointers currently being expanded
    ref_stack: Vec<String>,
}

// ------------------------------- Dispatch --------------------------------- //

impl<'a> Lowering<'a> {
    fn new(root: &'a Value, name: &'a str, style: &'a StyleOptions) -> Self {
        Lowering {
            root,
            name,
            style,
            hoisted: Vec::new(),
            taken_names: HashSet::from([name.to_string()]),
            hoisted_nodes: HashMap::new(),
            ref_stack: Vec::new(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> Error {
        Error::malformed(self.name, message)
    }

    fn unknown(&self) -> TsType {
        if self.style.unknown_any { TsType::Unknown } else { TsType::Any }
    }

    fn lower(&mut self, node: &'a Value) -> Result<TsType> {
        let Some(title) = node.get("title").and_then(Value::as_str) else {
            return self.lower_inner(node);
        };
        let key: *const Value = node;
        if let Some(name) = self.hoisted_nodes.get(&key) {
            return Ok(TsType::reference(name.as_str()));
        }
        let name = self.fresh_name(&to_safe_identifier(title));
        self.hoisted_nodes.insert(key, name.clone());
        let ty = self.lower_inner(node)?;
        self.hoisted.push(declaration_for(name.clone(), ty, comment_of(node)));
        Ok(TsType::reference(name))
    }

    /// `base`, or `base1`, `base2`, ... when already declared.
    fn fresh_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 0;
        while self.taken_names.contains(&name) {
            suffix += 1;
            name = format!("{base}{suffix}");
        }
        self.taken_names.insert(name.clone());
        name
    }

    fn lower_inner(&mut self, node: &'a Value) -> Result<TsType> {
        let map = match node {
            Value::Object(map) => map,
            Value::Bool(true) => return Ok(self.unknown()),
            Value::Bool(false) => return Ok(TsType::Never),
            other => return Err(self.malformed(format!("expected a schema object, found {other}"))),
        };

        if let Some(reference) = map.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| self.malformed("`$ref` must be a string"))?;
            return self.lower_ref(reference);
        }
        if let Some(ts_type) = map.get("tsType").and_then(Value::as_str) {
            // text outside the parsed subset is emitted as written
            return Ok(crate::ts_parse::parse_type(ts_type)
                .unwrap_or_else(|_| TsType::Raw(ts_type.trim().to_string())));
        }
        if let Some(values) = map.get("enum") {
            let values = values
                .as_array()
                .ok_or_else(|| self.malformed("`enum` must be an array"))?;
            let members = values.iter().map(|v| self.literal(v)).collect::<Result<Vec<_>>>()?;
            return Ok(TsType::union(members));
        }
        if let Some(value) = map.get("const") {
            return self.literal(value);
        }
        for keyword in ["anyOf", "oneOf"] {
            if let Some(branches) = map.get(keyword) {
                let members = self.lower_all(keyword, branches)?;
                return Ok(TsType::union(members));
            }
        }
        if let Some(branches) = map.get("allOf") {
            let members = self.lower_all("allOf", branches)?;
            return Ok(TsType::intersection(members));
        }

        match map.get("type") {
            Some(Value::String(name)) => self.lower_typed(name, map),
            Some(Value::Array(names)) => {
                let members = names
                    .iter()
                    .map(|name| match name {
                        Value::String(name) => self.lower_typed(name, map),
                        other => Err(self.malformed(format!("invalid type name {other}"))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(TsType::union(members))
            }
            Some(other) => Err(self.malformed(format!("invalid `type` {other}"))),
            None if OBJECT_KEYWORDS.iter().any(|k| map.contains_key(*k)) => self.lower_object(map),
            None if ARRAY_KEYWORDS.iter().any(|k| map.contains_key(*k)) => self.lower_array(map),
            None => Ok(self.unknown()),
        }
    }

    fn lower_all(&mut self, keyword: &str, branches: &'a Value) -> Result<Vec<TsType>> {
        let branches = branches
            .as_array()
            .ok_or_else(|| self.malformed(format!("`{keyword}` must be an array")))?;
        branches.iter().map(|branch| self.lower(branch)).collect()
    }

    fn lower_ref(&mut self, reference: &str) -> Result<TsType> {
        if reference == "#" {
            return Ok(TsType::reference(self.name));
        }
        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(self.malformed(format!("only local references are supported, got `{reference}`")));
        };
        let root = self.root;
        let target = root
            .pointer(pointer)
            .ok_or_else(|| self.malformed(format!("unresolvable reference `{reference}`")))?;
        if target.get("title").is_some_and(Value::is_string) {
            return self.lower(target);
        }
        if self.ref_stack.iter().any(|active| active == reference) {
            return Err(self.malformed(format!("recursive reference `{reference}` needs a `title`")));
        }
        self.ref_stack.push(reference.to_string());
        let ty = self.lower(target);
        self.ref_stack.pop();
        ty
    }

    fn lower_typed(&mut self, type_name: &str, map: &'a Map<String, Value>) -> Result<TsType> {
        match type_name {
            "string" => Ok(TsType::String),
            "number" | "integer" => Ok(TsType::Number),
            "boolean" => Ok(TsType::Boolean),
            "null" => Ok(TsType::Null),
            "any" => Ok(self.unknown()),
            "object" => self.lower_object(map),
            "array" => self.lower_array(map),
            other => Err(self.malformed(format!("unknown type `{other}`"))),
        }
    }

    fn literal(&self, value: &Value) -> Result<TsType> {
        match value {
            Value::String(s) => Ok(TsType::string_literal(s.as_str())),
            Value::Number(n) => Ok(TsType::Literal(Literal::Number(n.to_string()))),
            Value::Bool(b) => Ok(TsType::Literal(Literal::Bool(*b))),
            Value::Null => Ok(TsType::Null),
            other => Err(self.malformed(format!("unsupported literal {other}"))),
        }
    }
}

// ------------------------------- Objects ---------------------------------- //

impl<'a> Lowering<'a> {
    fn lower_object(&mut self, map: &'a Map<String, Value>) -> Result<TsType> {
        let required: HashSet<&str> = map
            .get("required")
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut members = Vec::new();
        if let Some(properties) = map.get("properties") {
            let properties = properties
                .as_object()
                .ok_or_else(|| self.malformed("`properties` must be an object"))?;
            for (key, property) in properties {
                let ty = self.lower(property)?;
                let mut member = Member::property(key.as_str(), ty, !required.contains(key.as_str()));
                member.comment = comment_of(property);
                members.push(member);
            }
        }

        match map.get("additionalProperties") {
            Some(Value::Bool(false)) => {}
            None if !self.style.additional_properties => {}
            None | Some(Value::Bool(true)) => members.push(Member::string_index(self.unknown())),
            Some(schema @ Value::Object(_)) => {
                let ty = self.lower(schema)?;
                members.push(Member::string_index(ty));
            }
            Some(other) => {
                return Err(self.malformed(format!("invalid `additionalProperties` {other}")));
            }
        }

        Ok(TsType::TypeLiteral(members))
    }
}

// ------------------------------- Arrays ----------------------------------- //

impl<'a> Lowering<'a> {
    fn lower_array(&mut self, map: &'a Map<String, Value>) -> Result<TsType> {
        let ignore_bounds = self.style.ignore_min_and_max_items;
        let min_items = match map.get("minItems").and_then(Value::as_u64) {
            Some(n) if !ignore_bounds => n as usize,
            _ => 0,
        };
        let max_items = match map.get("maxItems").and_then(Value::as_u64) {
            Some(n) if !ignore_bounds => Some(n as usize),
            _ => None,
        };

        match map.get("items") {
            Some(Value::Array(items)) => {
                let mut params = items.iter().map(|item| self.lower(item)).collect::<Result<Vec<_>>>()?;
                if let Some(max) = max_items {
                    params.truncate(max);
                }
                let spread = match map.get("additionalItems") {
                    Some(Value::Bool(false)) => None,
                    Some(schema @ Value::Object(_)) => Some(self.lower(schema)?),
                    Some(Value::Bool(true)) | None if max_items.is_none() => Some(self.unknown()),
                    _ => None,
                };
                Ok(self.tuples(params, min_items, max_items, spread))
            }
            Some(item @ (Value::Object(_) | Value::Bool(_))) => {
                let item = self.lower(item)?;
                Ok(self.list(item, min_items, max_items))
            }
            None => {
                let item = self.unknown();
                Ok(self.list(item, min_items, max_items))
            }
            Some(other) => Err(self.malformed(format!("invalid `items` {other}"))),
        }
    }

    /// Homogeneous array; bounds turn it into a tuple of copies of `item`.
    fn list(&self, item: TsType, min_items: usize, max_items: Option<usize>) -> TsType {
        let slots = match max_items {
            Some(max) if max > 0 => max,
            _ => min_items,
        };
        if (min_items == 0 && max_items.is_none()) || slots > MAX_TUPLE_EXPANSION {
            return TsType::Array(Box::new(item));
        }
        let spread = if max_items.is_none() { Some(item.clone()) } else { None };
        self.tuples(vec![item; slots], min_items, max_items, spread)
    }

    /// One tuple per accepted length, from `min_items` up to the number of params;
    /// only the longest carries the rest element.
    fn tuples(
        &self,
        mut params: Vec<TsType>,
        min_items: usize,
        max_items: Option<usize>,
        mut spread: Option<TsType>,
    ) -> TsType {
        if min_items > params.len() && spread.is_none() && max_items.is_none() {
            spread = Some(self.unknown());
        }
        if let Some(max) = max_items {
            if spread.is_none() && max > params.len() {
                if max - params.len() <= MAX_TUPLE_EXPANSION {
                    params.resize(max, self.unknown());
                } else {
                    spread = Some(self.unknown());
                }
            }
        }

        let rest = spread.map(|ty| TupleElem { ty: TsType::Array(Box::new(ty)), optional: false, rest: true });

        if params.len() <= min_items {
            let mut elems: Vec<TupleElem> = params.into_iter().map(TupleElem::required).collect();
            elems.extend(rest);
            return TsType::Tuple(elems);
        }

        let mut cumulative: Vec<TupleElem> =
            params[..min_items].iter().cloned().map(TupleElem::required).collect();
        let mut alternatives = vec![TsType::Tuple(cumulative.clone())];
        let last = params.len() - 1;
        for (index, param) in params.into_iter().enumerate().skip(min_items) {
            cumulative.push(TupleElem::required(param));
            let mut elems = cumulative.clone();
            if index == last {
                elems.extend(rest.clone());
            }
            alternatives.push(TsType::Tuple(elems));
        }
        TsType::union(alternatives)
    }
}

// ------------------------------- Helpers ---------------------------------- //

fn declaration_for(name: String, ty: TsType, comment: Option<String>) -> Declaration {
    match ty {
        TsType::TypeLiteral(members) => Declaration::Interface {
            name,
            extends: Vec::new(),
            members,
            comment,
        },
        ty => Declaration::TypeAlias { name, ty, comment },
    }
}

/// Doc comment text from `description` and `deprecated`.
fn comment_of(schema: &Value) -> Option<String> {
    let mut lines = Vec::new();
    if schema.get("deprecated").and_then(Value::as_bool) == Some(true) {
        lines.push("@deprecated");
    }
    if let Some(description) = schema.get("description").and_then(Value::as_str) {
        lines.push(description);
    }
    if lines.is_empty() { None } else { Some(lines.join("\n")) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MemberKey;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn lower(schema: Value) -> Result<Module> {
        lower_to_module(&schema, "Schema0", &StyleOptions::default())
    }

    fn root_type(schema: Value) -> TsType {
        match lower(schema).unwrap().declarations.remove(0) {
            Declaration::TypeAlias { ty, .. } => ty,
            Declaration::Interface { members, .. } => TsType::TypeLiteral(members),
        }
    }

    fn tuple(elems: Vec<TsType>) -> TsType {
        TsType::Tuple(elems.into_iter().map(TupleElem::required).collect())
    }

    fn lit(value: &str) -> TsType {
        TsType::string_literal(value)
    }

    #[test]
    fn enum_becomes_literal_union() {
        assert_eq!(
            root_type(json!({ "enum": ["always", "never", 1, true, null] })),
            TsType::Union(vec![
                lit("always"),
                lit("never"),
                TsType::Literal(Literal::Number("1".to_string())),
                TsType::Literal(Literal::Bool(true)),
                TsType::Null,
            ])
        );
    }

    #[test]
    fn object_root_is_an_interface() {
        let module = lower(json!({
            "type": "object",
            "description": "Options.",
            "properties": { "a": { "type": "string" }, "b": { "type": "integer" } },
            "required": ["b"]
        }))
        .unwrap();
        assert_eq!(
            module.declarations,
            vec![Declaration::Interface {
                name: "Schema0".to_string(),
                extends: Vec::new(),
                members: vec![
                    Member::property("a", TsType::String, true),
                    Member::property("b", TsType::Number, false),
                    Member::string_index(TsType::Unknown),
                ],
                comment: Some("Options.".to_string()),
            }]
        );
    }

    #[test]
    fn additional_properties_variants() {
        let closed = root_type(json!({ "type": "object", "additionalProperties": false }));
        assert_eq!(closed, TsType::TypeLiteral(vec![]));

        let typed = root_type(json!({ "additionalProperties": { "type": "number" } }));
        assert_eq!(typed, TsType::TypeLiteral(vec![Member::string_index(TsType::Number)]));

        let style = StyleOptions { additional_properties: false, ..StyleOptions::default() };
        let module = lower_to_module(&json!({ "type": "object" }), "X", &style).unwrap();
        assert!(matches!(&module.declarations[0], Declaration::Interface { members, .. } if members.is_empty()));
    }

    #[test]
    fn refs_are_inlined_with_member_comments() {
        let ty = root_type(json!({
            "$defs": { "opt": { "type": "string", "enum": ["array", "generic"] } },
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "default": { "$ref": "#/$defs/opt", "description": "Mutable cases." }
            }
        }));
        let TsType::TypeLiteral(members) = ty else { panic!("expected object") };
        assert_eq!(members[0].key, MemberKey::Name("default".to_string()));
        assert_eq!(members[0].ty, TsType::Union(vec![lit("array"), lit("generic")]));
        assert_eq!(members[0].comment.as_deref(), Some("Mutable cases."));
    }

    #[test]
    fn bad_refs_are_malformed() {
        for schema in [
            json!({ "$ref": "#/$defs/missing" }),
            json!({ "$ref": "other.json#/x" }),
            json!({ "$defs": { "a": { "items": { "$ref": "#/$defs/a" } } }, "$ref": "#/$defs/a" }),
        ] {
            assert!(matches!(lower(schema), Err(Error::MalformedSchema { .. })));
        }
    }

    #[test]
    fn titled_schemas_are_hoisted() {
        let module = lower(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "mode": { "title": "Mode option", "enum": ["a", "b"] },
                "again": { "$ref": "#/properties/mode" }
            }
        }))
        .unwrap();
        assert_eq!(module.declarations.len(), 2);
        assert_eq!(
            module.declarations[1],
            Declaration::TypeAlias {
                name: "ModeOption".to_string(),
                ty: TsType::Union(vec![lit("a"), lit("b")]),
                comment: None,
            }
        );
        let Declaration::Interface { members, .. } = &module.declarations[0] else {
            panic!("expected interface");
        };
        assert_eq!(members[0].ty, TsType::reference("ModeOption"));
        assert_eq!(members[1].ty, TsType::reference("ModeOption"));
    }

    #[test]
    fn same_title_on_different_schemas_gets_a_suffix() {
        let module = lower(json!({
            "additionalProperties": false,
            "properties": {
                "a": { "title": "Option", "enum": ["x"] },
                "b": { "title": "Option", "type": "number" }
            }
        }))
        .unwrap();
        let Declaration::Interface { members, .. } = &module.declarations[0] else {
            panic!("expected interface");
        };
        assert_eq!(members[0].ty, TsType::reference("Option"));
        assert_eq!(members[1].ty, TsType::reference("Option1"));
        assert_eq!(
            module.declarations[1..],
            [
                Declaration::TypeAlias { name: "Option".to_string(), ty: lit("x"), comment: None },
                Declaration::TypeAlias { name: "Option1".to_string(), ty: TsType::Number, comment: None },
            ]
        );
    }

    #[test]
    fn title_matching_the_root_name_is_not_the_root() {
        let module = lower(json!({
            "additionalProperties": false,
            "properties": { "a": { "title": "schema0", "type": "boolean" } }
        }))
        .unwrap();
        let Declaration::Interface { members, .. } = &module.declarations[0] else {
            panic!("expected interface");
        };
        assert_eq!(members[0].ty, TsType::reference("Schema01"));
        assert_eq!(
            module.declarations[1],
            Declaration::TypeAlias { name: "Schema01".to_string(), ty: TsType::Boolean, comment: None }
        );
    }

    #[test]
    fn ts_type_outside_the_parsed_subset_passes_through() {
        assert_eq!(
            root_type(json!({ "tsType": "(a: string) => void" })),
            TsType::Raw("(a: string) => void".to_string())
        );
        assert_eq!(
            root_type(json!({ "tsType": " keyof typeof options " })),
            TsType::Raw("keyof typeof options".to_string())
        );
        assert_eq!(root_type(json!({ "tsType": "string[]" })), TsType::Array(Box::new(TsType::String)));
    }

    #[test]
    fn titled_recursion_terminates() {
        let module = lower(json!({
            "$defs": {
                "node": {
                    "title": "Node",
                    "type": "object",
                    "additionalProperties": false,
                    "properties": { "children": { "type": "array", "items": { "$ref": "#/$defs/node" } } }
                }
            },
            "$ref": "#/$defs/node"
        }))
        .unwrap();
        assert_eq!(module.declarations[0].name(), "Schema0");
        assert_eq!(module.declarations[1].name(), "Node");
    }

    #[test]
    fn bounded_tuples_expand_into_unions() {
        assert_eq!(
            root_type(json!({
                "type": "array",
                "items": [{ "enum": ["never"] }, { "type": "boolean" }],
                "minItems": 0,
                "maxItems": 2
            })),
            TsType::Union(vec![
                tuple(vec![]),
                tuple(vec![lit("never")]),
                tuple(vec![lit("never"), TsType::Boolean]),
            ])
        );
    }

    #[test]
    fn open_tuples_get_a_rest_element() {
        let rest = |ty| TupleElem { ty: TsType::Array(Box::new(ty)), optional: false, rest: true };
        assert_eq!(
            root_type(json!({ "items": [{ "type": "string" }], "minItems": 1 })),
            TsType::Tuple(vec![TupleElem::required(TsType::String), rest(TsType::Unknown)])
        );
        assert_eq!(
            root_type(json!({ "items": [{ "type": "string" }], "minItems": 1, "additionalItems": { "type": "number" } })),
            TsType::Tuple(vec![TupleElem::required(TsType::String), rest(TsType::Number)])
        );
        assert_eq!(
            root_type(json!({ "items": [{ "type": "string" }], "minItems": 1, "additionalItems": false })),
            tuple(vec![TsType::String])
        );
    }

    #[test]
    fn homogeneous_arrays() {
        assert_eq!(
            root_type(json!({ "type": "array", "items": { "type": "string" } })),
            TsType::Array(Box::new(TsType::String))
        );
        assert_eq!(
            root_type(json!({ "type": "array", "items": { "type": "string" }, "minItems": 1 })),
            TsType::Tuple(vec![
                TupleElem::required(TsType::String),
                TupleElem { ty: TsType::Array(Box::new(TsType::String)), optional: false, rest: true },
            ])
        );
        assert_eq!(
            root_type(json!({ "type": "array", "items": { "type": "string" }, "maxItems": 1 })),
            TsType::Union(vec![tuple(vec![]), tuple(vec![TsType::String])])
        );
        let style = StyleOptions { ignore_min_and_max_items: true, ..StyleOptions::default() };
        let module = lower_to_module(&json!({ "items": { "type": "string" }, "minItems": 3 }), "X", &style).unwrap();
        assert!(matches!(
            &module.declarations[0],
            Declaration::TypeAlias { ty: TsType::Array(_), .. }
        ));
    }

    #[test]
    fn type_lists_combinators_and_fallbacks() {
        assert_eq!(
            root_type(json!({ "type": ["string", "null"] })),
            TsType::Union(vec![TsType::String, TsType::Null])
        );
        assert_eq!(
            root_type(json!({ "anyOf": [{ "type": "string" }, { "oneOf": [{ "const": 1 }, { "const": 2 }] }] })),
            TsType::Union(vec![
                TsType::String,
                TsType::Literal(Literal::Number("1".to_string())),
                TsType::Literal(Literal::Number("2".to_string())),
            ])
        );
        assert_eq!(
            root_type(json!({ "allOf": [{ "tsType": "Foo" }, { "tsType": "Bar" }] })),
            TsType::Intersection(vec![TsType::reference("Foo"), TsType::reference("Bar")])
        );
        assert_eq!(root_type(json!({})), TsType::Unknown);
        let style = StyleOptions { unknown_any: false, ..StyleOptions::default() };
        let module = lower_to_module(&json!({}), "X", &style).unwrap();
        assert!(matches!(&module.declarations[0], Declaration::TypeAlias { ty: TsType::Any, .. }));
    }

    #[test]
    fn unknown_type_names_are_malformed() {
        let err = lower(json!({ "type": "strng" })).unwrap_err();
        assert!(err.to_string().contains("unknown type `strng`"), "{err}");
        assert!(matches!(lower(json!("nope")), Err(Error::MalformedSchema { .. })));
    }

    #[test]
    fn deprecated_properties_are_marked() {
        let TsType::TypeLiteral(members) = root_type(json!({
            "additionalProperties": false,
            "properties": { "old": { "type": "boolean", "deprecated": true, "description": "Use `new`." } }
        })) else {
            panic!("expected object");
        };
        assert_eq!(members[0].comment.as_deref(), Some("@deprecated\nUse `new`."));
    }
}
