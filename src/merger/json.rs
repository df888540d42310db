//! Structured-data strategy: recursive key-tree merge.
//!
//! Used for localization catalogs and other JSON resources that are shared
//! across entities. The conflict strategy is fixed at construction time;
//! divergences surface as conflicts only under `Append`; `Overwrite` and
//! `Skip` resolve silently.

use super::conflict::{Conflict, ConflictKind};
use serde_json::{Map, Value};

/// Conflict strategy for diverging leaf values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonMergeStrategy {
    /// Replace existing values with new ones
    Overwrite,
    /// Keep existing values, ignore new ones
    Skip,
    /// Keep existing values and surface a conflict per divergence
    #[default]
    Append,
}

impl JsonMergeStrategy {
    /// Parse the CLI / schema spelling; empty means the default
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "" | "append" => Some(JsonMergeStrategy::Append),
            "overwrite" => Some(JsonMergeStrategy::Overwrite),
            "skip" => Some(JsonMergeStrategy::Skip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonMergeStrategy::Overwrite => "overwrite",
            JsonMergeStrategy::Skip => "skip",
            JsonMergeStrategy::Append => "append",
        }
    }
}

/// Merge two JSON documents
///
/// Both sides must parse as objects. The merged tree is serialized with
/// sorted keys and two-space indentation so repeated merges are
/// byte-stable.
pub fn merge(
    existing: &str,
    new_content: &str,
    strategy: JsonMergeStrategy,
) -> anyhow::Result<(String, Vec<Conflict>)> {
    let existing_value: Value = serde_json::from_str(existing)
        .map_err(|e| anyhow::anyhow!("failed to parse existing JSON: {e}"))?;
    let new_value: Value = serde_json::from_str(new_content)
        .map_err(|e| anyhow::anyhow!("failed to parse new JSON: {e}"))?;

    let (Value::Object(existing_map), Value::Object(new_map)) = (&existing_value, &new_value)
    else {
        anyhow::bail!("JSON merge requires objects on both sides");
    };

    let mut conflicts = Vec::new();
    if strategy == JsonMergeStrategy::Append {
        detect_conflicts(existing_map, new_map, "", &mut conflicts);
    }

    let merged = merge_objects(existing_map, new_map, strategy);
    let serialized = to_sorted_pretty(&Value::Object(merged))?;
    Ok((serialized, conflicts))
}

fn detect_conflicts(
    existing: &Map<String, Value>,
    new: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<Conflict>,
) {
    for (key, new_value) in new {
        let Some(existing_value) = existing.get(key) else {
            continue;
        };
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match (existing_value, new_value) {
            (Value::Object(em), Value::Object(nm)) => detect_conflicts(em, nm, &path, out),
            _ => {
                if existing_value != new_value {
                    out.push(Conflict {
                        kind: ConflictKind::DifferentValue,
                        description: format!("Key '{path}' has different values"),
                        existing_code: existing_value.to_string(),
                        new_code: new_value.to_string(),
                        line: None,
                        identifier: path,
                    });
                }
            }
        }
    }
}

fn merge_objects(
    existing: &Map<String, Value>,
    new: &Map<String, Value>,
    strategy: JsonMergeStrategy,
) -> Map<String, Value> {
    let mut result = existing.clone();
    for (key, new_value) in new {
        match result.get(key) {
            None => {
                result.insert(key.clone(), new_value.clone());
            }
            Some(existing_value) => match strategy {
                JsonMergeStrategy::Overwrite => {
                    result.insert(key.clone(), new_value.clone());
                }
                JsonMergeStrategy::Skip => {}
                JsonMergeStrategy::Append => match (existing_value, new_value) {
                    (Value::Object(em), Value::Object(nm)) => {
                        let merged = merge_objects(em, nm, strategy);
                        result.insert(key.clone(), Value::Object(merged));
                    }
                    (Value::Array(ea), Value::Array(na)) => {
                        result.insert(key.clone(), Value::Array(merge_arrays(ea, na)));
                    }
                    // Diverging leaves keep the existing value; the
                    // divergence was already reported as a conflict.
                    _ => {}
                },
            },
        }
    }
    result
}

/// Set union with deep equality, existing order preserved, new elements
/// appended in input order
fn merge_arrays(existing: &[Value], new: &[Value]) -> Vec<Value> {
    let mut result: Vec<Value> = existing.to_vec();
    for item in new {
        if !existing.iter().any(|e| e == item) {
            result.push(item.clone());
        }
    }
    result
}

/// Serialize with recursively sorted keys and two-space indentation
pub fn to_sorted_pretty(value: &Value) -> anyhow::Result<String> {
    let sorted = sort_value(value);
    Ok(serde_json::to_string_pretty(&sorted)?)
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_value(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_adds_missing_keys_sorted() {
        let existing = r#"{ "Product": "Product", "Product.Name": "Name" }"#;
        let new_content = r#"{ "Order": "Order", "Order.Name": "Name" }"#;
        let (merged, conflicts) =
            merge(existing, new_content, JsonMergeStrategy::Append).unwrap();
        assert!(conflicts.is_empty());
        let value: Value = serde_json::from_str(&merged).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Order", "Order.Name", "Product", "Product.Name"]);
    }

    #[test]
    fn test_append_round_trip_is_byte_stable() {
        let existing = r#"{ "b": "2", "a": { "y": "1", "x": [1, 2] } }"#;
        let new_content = r#"{ "c": "3" }"#;
        let (merged, _) = merge(existing, new_content, JsonMergeStrategy::Append).unwrap();
        let (again, conflicts) = merge(&merged, new_content, JsonMergeStrategy::Append).unwrap();
        assert!(conflicts.is_empty());
        assert_eq!(merged, again);
    }

    #[test]
    fn test_divergence_under_each_strategy() {
        let existing = r#"{ "k": "old" }"#;
        let new_content = r#"{ "k": "new" }"#;

        let (merged, conflicts) =
            merge(existing, new_content, JsonMergeStrategy::Overwrite).unwrap();
        assert!(conflicts.is_empty());
        assert!(merged.contains("\"new\""));

        let (merged, conflicts) = merge(existing, new_content, JsonMergeStrategy::Skip).unwrap();
        assert!(conflicts.is_empty());
        assert!(merged.contains("\"old\""));

        let (merged, conflicts) =
            merge(existing, new_content, JsonMergeStrategy::Append).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::DifferentValue);
        assert_eq!(conflicts[0].identifier, "k");
        // Append keeps existing on divergence
        assert!(merged.contains("\"old\""));
    }

    #[test]
    fn test_nested_maps_recurse() {
        let existing = r#"{ "Permissions": { "Product": "Product" } }"#;
        let new_content = r#"{ "Permissions": { "Order": "Order" } }"#;
        let (merged, conflicts) =
            merge(existing, new_content, JsonMergeStrategy::Append).unwrap();
        assert!(conflicts.is_empty());
        let value: Value = serde_json::from_str(&merged).unwrap();
        assert_eq!(value["Permissions"]["Product"], "Product");
        assert_eq!(value["Permissions"]["Order"], "Order");
    }

    #[test]
    fn test_array_set_union() {
        let existing = r#"{ "cultures": ["en", "de"] }"#;
        let new_content = r#"{ "cultures": ["de", "fr"] }"#;
        let (merged, conflicts) =
            merge(existing, new_content, JsonMergeStrategy::Append).unwrap();
        assert!(conflicts.is_empty());
        let value: Value = serde_json::from_str(&merged).unwrap();
        assert_eq!(
            value["cultures"],
            serde_json::json!(["en", "de", "fr"])
        );
    }

    #[test]
    fn test_invalid_existing_fails_before_resolution() {
        assert!(merge("not json", "{}", JsonMergeStrategy::Append).is_err());
        assert!(merge("{}", "not json", JsonMergeStrategy::Append).is_err());
        assert!(merge("[1]", "{}", JsonMergeStrategy::Append).is_err());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(JsonMergeStrategy::parse(""), Some(JsonMergeStrategy::Append));
        assert_eq!(
            JsonMergeStrategy::parse("overwrite"),
            Some(JsonMergeStrategy::Overwrite)
        );
        assert_eq!(JsonMergeStrategy::parse("skip"), Some(JsonMergeStrategy::Skip));
        assert_eq!(JsonMergeStrategy::parse("ast"), None);
    }

    #[test]
    fn test_nested_divergence_path_in_identifier() {
        let existing = r#"{ "a": { "k": "old" } }"#;
        let new_content = r#"{ "a": { "k": "new" } }"#;
        let (_, conflicts) = merge(existing, new_content, JsonMergeStrategy::Append).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].identifier, "a.k");
    }
}
