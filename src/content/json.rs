//! JSON implementations of the serializer seams, backed by
//! [`serde_json`](serde_json).
//!
//! These are the reference strategies a requester installs for sites
//! resolved to the `Serialized` method. Swap in your own implementations of
//! the traits in [`content`](crate::content) for other wire formats.
use serde_json::Value;

use crate::content::{
    BodySerializer, PathParamSerializer, QueryParamSerializer, SerializationError, SerializedBody,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBodySerializer;

impl BodySerializer for JsonBodySerializer {
    fn serialize_body(&self, value: &Value) -> Result<SerializedBody, SerializationError> {
        match serde_json::to_vec(value) {
            Ok(content) => Ok(SerializedBody {
                content,
                content_type: Some("application/json".to_string()),
            }),
            Err(e) => Err(SerializationError::new(&e.to_string())),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonQueryParamSerializer;

impl QueryParamSerializer for JsonQueryParamSerializer {
    /// Arrays expand to one pair per element; anything else becomes a
    /// single pair holding its JSON text.
    fn serialize_query(
        &self,
        name: &str,
        value: &Value,
    ) -> Result<Vec<(String, String)>, SerializationError> {
        let to_text = |v: &Value| match serde_json::to_string(v) {
            Ok(text) => Ok(text),
            Err(e) => Err(SerializationError::new(&e.to_string())),
        };
        match value {
            Value::Array(items) => {
                let mut pairs = vec![];
                for item in items {
                    pairs.push((name.to_string(), to_text(item)?));
                }
                Ok(pairs)
            }
            other => Ok(vec![(name.to_string(), to_text(other)?)]),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPathParamSerializer;

impl PathParamSerializer for JsonPathParamSerializer {
    /// String values substitute their content rather than their JSON
    /// quoting; a quoted path segment is never what a template means.
    fn serialize_path(&self, value: &Value) -> Result<String, SerializationError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => match serde_json::to_string(other) {
                Ok(text) => Ok(text),
                Err(e) => Err(SerializationError::new(&e.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body() {
        let body = JsonBodySerializer.serialize_body(&json!({"name": "ferris"})).unwrap();
        assert_eq!(body.content, br#"{"name":"ferris"}"#.to_vec());
        assert_eq!(body.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_query_array_expands() {
        let pairs = JsonQueryParamSerializer
            .serialize_query("tag", &json!(["a", "b"]))
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("tag".to_string(), "\"a\"".to_string()),
                ("tag".to_string(), "\"b\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_path_string_unquoted() {
        assert_eq!(
            JsonPathParamSerializer.serialize_path(&json!("A1")).unwrap(),
            "A1"
        );
        assert_eq!(
            JsonPathParamSerializer.serialize_path(&json!(7)).unwrap(),
            "7"
        );
    }
}
