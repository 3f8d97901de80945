//! Reference relinking for schema variants compiled standalone.
//!
//! Rule schemas given as a sequence are authored as if they lived under a shared
//! `items` array, so their self references point at `#/items/0/...`. Each variant is
//! compiled on its own, so those pointers are rewritten to be relative to the
//! variant's root (`#/...`) first.
//!
//! The walk is iterative: a stack of steps (`Descend` into a key, `PopScope` back out
//! of a container) plus a parallel stack of the containers being visited. A container
//! is detached from its parent while it is the current scope and re-attached when its
//! `PopScope` step runs, so no two live mutable borrows ever overlap.
//!
//! Only the literal prefix `#/items/0/` is handled. Pointers into other tuple
//! positions (`#/items/1/...`) pass through untouched.

use serde_json::Value;

pub const ITEM_REF_PREFIX: &str = "#/items/0/";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Key {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Descend(Key),
    /// Leave the current container and put it back under `Key` in its parent.
    PopScope(Key),
}

/// Relinked deep copy of `schema`. The caller's value is left as is.
pub fn relink_item_refs(schema: &Value) -> Value {
    let mut copy = schema.clone();
    relink_item_refs_in_place(&mut copy);
    copy
}

/// Relink a value the caller owns privately.
pub fn relink_item_refs_in_place(schema: &mut Value) {
    match schema {
        Value::String(text) => {
            relink_str(text);
            return;
        }
        Value::Array(_) | Value::Object(_) => {}
        _ => return,
    }

    let root = std::mem::take(schema);
    let mut steps: Vec<Step> = keys_of(&root).into_iter().map(Step::Descend).collect();
    let mut scopes: Vec<Value> = vec![root];

    while let Some(step) = steps.pop() {
        match step {
            Step::Descend(key) => {
                let Some(scope) = scopes.last_mut() else { break };
                let Some(slot) = slot_mut(scope, &key) else { continue };
                match slot {
                    Value::String(text) => relink_str(text),
                    Value::Array(_) | Value::Object(_) => {
                        let child = std::mem::take(slot);
                        steps.push(Step::PopScope(key));
                        steps.extend(keys_of(&child).into_iter().map(Step::Descend));
                        scopes.push(child);
                    }
                    _ => {}
                }
            }
            Step::PopScope(key) => {
                let Some(child) = scopes.pop() else { break };
                if let Some(slot) = scopes.last_mut().and_then(|parent| slot_mut(parent, &key)) {
                    *slot = child;
                }
            }
        }
    }

    // every PopScope has run, so only the root is left
    if let Some(root) = scopes.pop() {
        *schema = root;
    }
}

fn relink_str(text: &mut String) {
    if let Some(rest) = text.strip_prefix(ITEM_REF_PREFIX) {
        let relinked = format!("#/{rest}");
        tracing::trace!(from = %text, to = %relinked, "relinked item reference");
        *text = relinked;
    }
}

fn keys_of(container: &Value) -> Vec<Key> {
    match container {
        Value::Object(map) => map.keys().cloned().map(Key::Field).collect(),
        Value::Array(items) => (0..items.len()).map(Key::Index).collect(),
        _ => Vec::new(),
    }
}

fn slot_mut<'a>(container: &'a mut Value, key: &Key) -> Option<&'a mut Value> {
    match (container, key) {
        (Value::Object(map), Key::Field(field)) => map.get_mut(field),
        (Value::Array(items), Key::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn contains_prefix(value: &Value) -> bool {
        match value {
            Value::String(s) => s.starts_with(ITEM_REF_PREFIX),
            Value::Array(items) => items.iter().any(contains_prefix),
            Value::Object(map) => map.values().any(contains_prefix),
            _ => false,
        }
    }

    #[test]
    fn rewrites_nested_refs() {
        let schema = json!({
            "$defs": { "opt": { "enum": ["a", "b"] } },
            "properties": {
                "first": { "$ref": "#/items/0/$defs/opt" },
                "list": { "type": "array", "items": [{ "$ref": "#/items/0/$defs/opt" }, 3, null] }
            }
        });

        let relinked = relink_item_refs(&schema);

        assert_eq!(relinked["properties"]["first"]["$ref"], json!("#/$defs/opt"));
        assert_eq!(relinked["properties"]["list"]["items"][0]["$ref"], json!("#/$defs/opt"));
        assert_eq!(relinked["properties"]["list"]["items"][1], json!(3));
        assert_eq!(relinked["properties"]["list"]["items"][2], Value::Null);
        assert!(!contains_prefix(&relinked));
    }

    #[test]
    fn leaves_the_callers_value_alone() {
        let schema = json!({ "$ref": "#/items/0/$defs/x" });
        let _ = relink_item_refs(&schema);
        assert_eq!(schema, json!({ "$ref": "#/items/0/$defs/x" }));
    }

    #[test]
    fn only_the_exact_prefix_is_rewritten() {
        let schema = json!({
            "a": "#/$defs/x",
            "b": "#/items/1/$defs/x",
            "c": "#/items/0",
            "d": "x#/items/0/y",
            "e": "#/items/0/"
        });

        let relinked = relink_item_refs(&schema);

        assert_eq!(
            relinked,
            json!({
                "a": "#/$defs/x",
                "b": "#/items/1/$defs/x",
                "c": "#/items/0",
                "d": "x#/items/0/y",
                "e": "#/"
            })
        );
    }

    #[test]
    fn relinking_is_idempotent() {
        let schema = json!([{ "$ref": "#/items/0/a/b" }, { "deep": [[["#/items/0/c"]]] }]);
        let once = relink_item_refs(&schema);
        let twice = relink_item_refs(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn structure_and_key_order_are_preserved() {
        let schema = json!({ "z": 1, "a": { "y": [], "b": {} }, "m": "#/items/0/q" });
        let relinked = relink_item_refs(&schema);
        let keys: Vec<&String> = relinked.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(relinked["a"], json!({ "y": [], "b": {} }));
        assert_eq!(relinked["m"], json!("#/q"));
    }

    #[test]
    fn scalar_roots() {
        assert_eq!(relink_item_refs(&json!("#/items/0/x")), json!("#/x"));
        assert_eq!(relink_item_refs(&json!(true)), json!(true));
    }

    #[test]
    fn deep_nesting() {
        let mut schema = json!("#/items/0/leaf");
        for _ in 0..1_000 {
            schema = json!({ "n": [schema] });
        }
        let relinked = relink_item_refs(&schema);
        let mut cursor = &relinked;
        while let Some(next) = cursor.get("n").and_then(|n| n.get(0)) {
            cursor = next;
        }
        assert_eq!(*cursor, json!("#/leaf"));
    }
}
