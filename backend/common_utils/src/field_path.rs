//! Path expressions over parsed response documents.
//!
//! Connectors describe where a value lives (`"errorInformation.reason"`,
//! `"errors.0.code"`) instead of walking each response shape by hand; one
//! generic [`FieldPath::dig`] evaluates every path.

use std::borrow::Cow;

use serde_json::Value;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PathSegment {
    Key(Cow<'static, str>),
    Index(usize),
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Parses a dot separated path. Purely numeric segments index into arrays.
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(|segment| match segment.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(Cow::Owned(segment.to_string())),
                })
                .collect(),
        )
    }

    /// Builds a path from literal keys; numbers are never treated as indices.
    pub fn from_keys(keys: &'static [&'static str]) -> Self {
        Self(
            keys.iter()
                .map(|key| PathSegment::Key(Cow::Borrowed(*key)))
                .collect(),
        )
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Walks the document. A key applied to an array descends into its first
    /// element, so `errors.code` reads the first error of an error array.
    pub fn dig<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(value, |current, segment| match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key.as_ref()),
                (PathSegment::Key(_), Value::Array(items)) => items
                    .first()
                    .and_then(|first| Self(vec![segment.clone()]).dig(first)),
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
                (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
                _ => None,
            })
    }

    /// Like [`FieldPath::dig`], rendering scalars as strings. Empty strings,
    /// nulls, objects and arrays yield `None`.
    pub fn dig_string(&self, value: &Value) -> Option<String> {
        self.dig(value).and_then(scalar_to_string)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// First path that resolves to a non-empty scalar.
pub fn dig_first_string(value: &Value, paths: &[FieldPath]) -> Option<String> {
    paths.iter().find_map(|path| path.dig_string(value))
}

pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_dig_nested_object() {
        let body = json!({"errorInformation": {"reason": "INVALID_DATA", "message": "Declined"}});
        assert_eq!(
            FieldPath::parse("errorInformation.reason").dig_string(&body),
            Some("INVALID_DATA".to_string())
        );
    }

    #[test]
    fn test_dig_array_by_index_and_implicitly() {
        let body = json!({"errors": [{"code": "PMT-4000"}, {"code": "PMT-5000"}]});
        assert_eq!(
            FieldPath::parse("errors.1.code").dig_string(&body),
            Some("PMT-5000".to_string())
        );
        assert_eq!(
            FieldPath::parse("errors.code").dig_string(&body),
            Some("PMT-4000".to_string())
        );
    }

    #[test]
    fn test_dig_top_level_array() {
        let body = json!([{"Code": 126, "Message": "Credit Card Expiration Date is invalid"}]);
        assert_eq!(
            FieldPath::parse("Code").dig_string(&body),
            Some("126".to_string())
        );
        assert_eq!(
            FieldPath::parse("0.Message").dig_string(&body),
            Some("Credit Card Expiration Date is invalid".to_string())
        );
    }

    #[test]
    fn test_from_keys_treats_numbers_as_keys() {
        let body = json!({"0001": "000"});
        assert_eq!(
            FieldPath::from_keys(&["0001"]).dig_string(&body),
            Some("000".to_string())
        );
    }

    #[test]
    fn test_missing_and_empty_values() {
        let body = json!({"status": "", "id": null, "nested": {"a": 1}});
        assert_eq!(FieldPath::parse("status").dig_string(&body), None);
        assert_eq!(FieldPath::parse("id").dig_string(&body), None);
        assert_eq!(FieldPath::parse("nested").dig_string(&body), None);
        assert_eq!(FieldPath::parse("nested.b").dig(&body), None);
    }

    #[test]
    fn test_dig_first_string() {
        let body = json!({"response_code": 51, "message": "Insufficient funds"});
        let paths = [FieldPath::parse("gateway_error_code"), FieldPath::parse("response_code")];
        assert_eq!(dig_first_string(&body, &paths), Some("51".to_string()));
    }
}
