//! Dotted-key expansion
//!
//! `name.firstName = Ann` becomes `{"name": {"firstName": "Ann"}}`. Keys are
//! applied in row order and a later key always wins where a prefix is used as
//! both a leaf and a branch: `address` then `address.city` leaves only the
//! branch, `address.city` then `address` leaves only the leaf.

use serde_json::{Map, Value};

use crate::record::{FlatRow, NestedRecord};

pub const PATH_DELIMITER: char = '.';

/// Expand every key of `row` into a nested record
pub fn expand_paths(row: &FlatRow) -> NestedRecord {
    let mut root = Map::new();
    for (key, value) in row.iter() {
        insert_path(&mut root, key, value);
    }
    root
}

/// Set `value` at `path`, replacing any non-object value met along the way
fn insert_path(node: &mut Map<String, Value>, path: &str, value: &str) {
    match path.split_once(PATH_DELIMITER) {
        None => {
            node.insert(path.to_string(), Value::String(value.to_string()));
        }
        Some((segment, rest)) => {
            let slot = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(child) = slot {
                insert_path(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expand(pairs: &[(&str, &str)]) -> Value {
        let row: FlatRow = pairs.iter().copied().collect();
        Value::Object(expand_paths(&row))
    }

    #[test]
    fn test_siblings_share_parent() {
        assert_eq!(
            expand(&[("a.b", "x"), ("a.c", "y")]),
            json!({"a": {"b": "x", "c": "y"}})
        );
    }

    #[test]
    fn test_branch_overwrites_earlier_leaf() {
        assert_eq!(expand(&[("a", "x"), ("a.b", "y")]), json!({"a": {"b": "y"}}));
    }

    #[test]
    fn test_leaf_overwrites_earlier_branch() {
        assert_eq!(expand(&[("a.b", "y"), ("a", "x")]), json!({"a": "x"}));
    }

    #[test]
    fn test_single_level_keys_unchanged() {
        assert_eq!(expand(&[("a", "x"), ("b", "")]), json!({"a": "x", "b": ""}));
    }

    #[test]
    fn test_deep_paths() {
        assert_eq!(
            expand(&[("address.geo.lat", "1.5"), ("address.geo.lng", "2"), ("address.line1", "A St")]),
            json!({"address": {"geo": {"lat": "1.5", "lng": "2"}, "line1": "A St"}})
        );
    }

    #[test]
    fn test_empty_segments_are_keys() {
        assert_eq!(expand(&[("a..b", "x"), ("c.", "y")]), json!({"a": {"": {"b": "x"}}, "c": {"": "y"}}));
    }
}
