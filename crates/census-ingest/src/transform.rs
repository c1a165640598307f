//! Nested row to `users` row mapping
//!
//! Every field falls back to a fixed default instead of failing:
//!
//! | field             | source                                  | default      |
//! |-------------------|-----------------------------------------|--------------|
//! | `name`            | `name.firstName` + " " + `name.lastName` | `""`         |
//! | `age`             | leading base-10 integer of `age`         | `None`       |
//! | `address`         | `address`, verbatim                      | `{}`         |
//! | `additional_info` | every other top-level key                | `{}`         |

use serde_json::{Map, Value};

use crate::record::{NestedRecord, StorageRecord};

const NAME_KEY: &str = "name";
const AGE_KEY: &str = "age";
const ADDRESS_KEY: &str = "address";

/// Map a nested record onto the storage shape. Never fails.
pub fn to_storage_record(mut nested: NestedRecord) -> StorageRecord {
    let name = nested.remove(NAME_KEY).map(full_name).unwrap_or_default();
    let age = nested.remove(AGE_KEY).as_ref().and_then(parse_age);
    let address = nested
        .remove(ADDRESS_KEY)
        .unwrap_or_else(|| Value::Object(Map::new()));

    StorageRecord {
        name,
        age,
        address,
        additional_info: nested,
    }
}

fn full_name(node: Value) -> String {
    let Value::Object(parts) = node else {
        return String::new();
    };
    let part = |key: &str| parts.get(key).and_then(Value::as_str).unwrap_or("");

    format!("{} {}", part("firstName"), part("lastName"))
        .trim()
        .to_string()
}

/// Leading base-10 integer of a string leaf.
///
/// Leading whitespace and one sign are accepted and anything after the digits
/// is ignored, so `"34abc"` is 34 and `"12.5"` is 12. No digits, a non-string
/// value, or a value outside `i32` gives `None`.
pub fn parse_age(value: &Value) -> Option<i32> {
    let text = value.as_str()?.trim_start();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = unsigned[..end].parse().ok()?;
    i32::try_from(if negative { -magnitude } else { magnitude }).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transform(value: Value) -> StorageRecord {
        match value {
            Value::Object(map) => to_storage_record(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_full_record() {
        let record = transform(json!({
            "name": {"firstName": "Jo", "lastName": "Lin"},
            "age": "34"
        }));

        assert_eq!(record.name, "Jo Lin");
        assert_eq!(record.age, Some(34));
        assert_eq!(record.address, json!({}));
        assert!(record.additional_info.is_empty());
    }

    #[test]
    fn test_age_without_leading_digits_is_absent() {
        assert_eq!(transform(json!({"age": "abc"})).age, None);
        assert_eq!(transform(json!({"age": ""})).age, None);
        assert_eq!(transform(json!({"age": "-"})).age, None);
        assert_eq!(transform(json!({"age": ".5"})).age, None);
        assert_eq!(transform(json!({"age": {"years": "3"}})).age, None);
        assert_eq!(transform(json!({})).age, None);
    }

    #[test]
    fn test_age_takes_leading_integer() {
        assert_eq!(transform(json!({"age": "34abc"})).age, Some(34));
        assert_eq!(transform(json!({"age": "12.5"})).age, Some(12));
        assert_eq!(transform(json!({"age": " 27 years"})).age, Some(27));
        assert_eq!(transform(json!({"age": "+8"})).age, Some(8));
    }

    #[test]
    fn test_age_out_of_range_is_absent() {
        assert_eq!(transform(json!({"age": "99999999999"})).age, None);
        assert_eq!(transform(json!({"age": "-2147483648"})).age, Some(i32::MIN));
    }

    #[test]
    fn test_zero_and_negative_ages_parse() {
        assert_eq!(transform(json!({"age": "0"})).age, Some(0));
        assert_eq!(transform(json!({"age": " -4 "})).age, Some(-4));
    }

    #[test]
    fn test_missing_name_parts() {
        assert_eq!(transform(json!({})).name, "");
        assert_eq!(transform(json!({"name": {"lastName": "Ng"}})).name, "Ng");
        assert_eq!(transform(json!({"name": {"firstName": "Cy", "lastName": ""}})).name, "Cy");
        assert_eq!(transform(json!({"name": "Cy Ng"})).name, "");
    }

    #[test]
    fn test_address_passes_through() {
        let record = transform(json!({
            "address": {"line1": "1 A St", "geo": {"lat": "1"}}
        }));
        assert_eq!(record.address, json!({"line1": "1 A St", "geo": {"lat": "1"}}));

        let record = transform(json!({"address": "somewhere"}));
        assert_eq!(record.address, json!("somewhere"));
    }

    #[test]
    fn test_other_keys_collected() {
        let record = transform(json!({
            "name": {"firstName": "Ann"},
            "gender": "female",
            "contact": {"email": "ann@example.com"}
        }));

        assert_eq!(
            Value::Object(record.additional_info),
            json!({"gender": "female", "contact": {"email": "ann@example.com"}})
        );
    }
}
