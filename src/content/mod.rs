//! Pluggable path, query and body serialization.
//!
//! The generator never serializes anything; it only records which
//! serialization method applies at each site. The strategy objects defined
//! here are held by the requester and consulted at call time for every site
//! resolved to the `Serialized` method. Sites resolved to `ToString` use
//! [`display_value`] instead.
use std::fmt;

use serde_json::Value;

pub mod json;

#[derive(Debug)]
pub struct SerializationError {
    reason: String,
}

impl SerializationError {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "serialization error: {}", self.reason)
    }
}

/// Serialized request content plus the content type it should be sent as.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedBody {
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

/// Turns a body value into request content.
pub trait BodySerializer: Send + Sync {
    fn serialize_body(&self, value: &Value) -> Result<SerializedBody, SerializationError>;
}

/// Turns one named query value into zero or more query pairs.
pub trait QueryParamSerializer: Send + Sync {
    fn serialize_query(
        &self,
        name: &str,
        value: &Value,
    ) -> Result<Vec<(String, String)>, SerializationError>;
}

/// Turns a path substitution value into a path segment.
pub trait PathParamSerializer: Send + Sync {
    fn serialize_path(&self, value: &Value) -> Result<String, SerializationError>;
}

/// The canonical textual form of a value, used by the `ToString`
/// serialization methods. Strings render bare, null renders empty,
/// composites render as compact JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
