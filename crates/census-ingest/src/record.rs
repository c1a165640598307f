//! Row shapes flowing through the pipeline

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// One input line keyed by header name, in header order.
///
/// A repeated header keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow(IndexMap<String, String>);

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip `headers` with the comma-separated `line`.
    ///
    /// Values are trimmed. Missing trailing fields become empty strings and
    /// surplus fields are dropped. There is no quoting: a comma inside a value
    /// shifts every later column.
    pub fn from_line(headers: &[String], line: &str) -> Self {
        let mut values = line.split(',');
        let mut row = Self::new();
        for header in headers {
            let value = values.next().map(str::trim).unwrap_or("");
            row.insert(header.clone(), value.to_string());
        }
        row
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

/// A flat row after path expansion: string leaves under object nodes
pub type NestedRecord = Map<String, Value>;

/// One row of `public.users`
#[derive(Debug, Clone, PartialEq)]
pub struct StorageRecord {
    pub name: String,
    pub age: Option<i32>,
    pub address: Value,
    pub additional_info: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_line_trims_and_pads() {
        let row = FlatRow::from_line(&headers(&["a", "b", "c"]), " x ,y");
        assert_eq!(row.get("a"), Some("x"));
        assert_eq!(row.get("b"), Some("y"));
        assert_eq!(row.get("c"), Some(""));
    }

    #[test]
    fn test_from_line_drops_extra_fields() {
        let row = FlatRow::from_line(&headers(&["a"]), "1,2,3");
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("a"), Some("1"));
    }

    #[test]
    fn test_embedded_comma_shifts_columns() {
        let row = FlatRow::from_line(&headers(&["city", "zip"]), "Portland, OR,97201");
        assert_eq!(row.get("city"), Some("Portland"));
        assert_eq!(row.get("zip"), Some("OR"));
    }

    #[test]
    fn test_duplicate_header_keeps_first_position_last_value() {
        let row = FlatRow::from_line(&headers(&["a", "b", "a"]), "1,2,3");
        let pairs: Vec<_> = row.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }
}
