//! Subtree addressing over JSON metadata trees.

use alink_types::path;
use serde_json::{Map, Value};

/// Borrow the node at `subtree`, descending through objects by key and
/// through arrays by numeric index.
pub fn get<'a>(root: &'a Value, subtree: &str) -> Option<&'a Value> {
    path::segments(subtree).try_fold(root, child)
}

/// One step of descent.
pub fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Mutable node at `subtree`, creating intermediate objects as needed.
/// Non-object nodes on the way are replaced by empty objects.
pub fn get_or_create<'a>(root: &'a mut Value, subtree: &str) -> &'a mut Value {
    let mut node = root;
    for segment in path::segments(subtree) {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
            _ => unreachable!("node was just made an object"),
        };
    }
    node
}

/// Replace the node at `subtree`.
pub fn replace(root: &mut Value, subtree: &str, value: Value) {
    *get_or_create(root, subtree) = value;
}

/// Deep-merge `value` into the node at `subtree`.
pub fn merge(root: &mut Value, subtree: &str, value: &Value) {
    deep_merge(get_or_create(root, subtree), value);
}

/// Objects merge key by key, recursively; every other value replaces the
/// target outright.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                deep_merge(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, source) => *target = source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_descends_objects_and_arrays() {
        let doc = json!({"a": {"b": [10, {"c": true}]}});
        assert_eq!(get(&doc, "a/b/0"), Some(&json!(10)));
        assert_eq!(get(&doc, "a/b/1/c"), Some(&json!(true)));
        assert_eq!(get(&doc, "a/x"), None);
        assert_eq!(get(&doc, ""), Some(&doc));
    }

    #[test]
    fn replace_creates_intermediate_objects() {
        let mut doc = json!({"public": 3});
        replace(&mut doc, "public/asset_metadata/titles", json!([1, 2]));
        assert_eq!(doc, json!({"public": {"asset_metadata": {"titles": [1, 2]}}}));
    }

    #[test]
    fn merge_keeps_unrelated_keys_and_replaces_sequences() {
        let mut doc = json!({"info": {"a": 1, "list": [1, 2, 3], "nested": {"x": 1}}});
        merge(
            &mut doc,
            "info",
            &json!({"b": 2, "list": [9], "nested": {"y": 2}}),
        );
        assert_eq!(
            doc,
            json!({"info": {"a": 1, "b": 2, "list": [9], "nested": {"x": 1, "y": 2}}})
        );
    }
}
