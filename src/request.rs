//! The request description assembled by plan execution.
use serde_json::Value;

use crate::content::{display_value, PathParamSerializer, SerializationError};
use crate::model::Method;
use crate::requester::CancellationToken;
use crate::serialization::{
    BodySerializationMethod, PathSerializationMethod, QuerySerializationMethod,
};
use crate::template;

/// One query contribution: the value is kept unserialized so the requester
/// can apply the recorded method with its own serializer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEntry {
    pub name: String,
    pub value: Value,
    pub serialization: QuerySerializationMethod,
}

/// One path placeholder substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSubstitution {
    pub name: String,
    pub value: Value,
    pub serialization: PathSerializationMethod,
}

/// The request body and how to serialize it.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyContent {
    pub value: Value,
    pub serialization: BodySerializationMethod,
}

/// Everything the requester needs to execute one call.
///
/// Built up by walking an emitted plan; the ordering of the header, query,
/// substitution and request-property lists is the emission ordering
/// contract and may be observable at the wire.
///
/// # Example
/// ```
/// use restgen::model::Method;
/// use restgen::request::RequestDescription;
///
/// let description = RequestDescription::new(Method::GET, "/users", "list_users")
///     .with_header("Accept", "application/json");
/// assert_eq!(description.resolved_path(), "/users");
/// ```
#[derive(Debug, Clone)]
pub struct RequestDescription {
    pub method: Method,
    pub path_template: String,
    pub base_path: Option<String>,
    pub headers: Vec<(String, String)>,
    pub queries: Vec<QueryEntry>,
    pub raw_query_strings: Vec<String>,
    pub path_substitutions: Vec<PathSubstitution>,
    pub request_properties: Vec<(String, Value)>,
    pub body: Option<BodyContent>,
    pub allow_any_status_code: bool,
    pub cancellation: Option<CancellationToken>,
    /// Name of the interface method this description was assembled for.
    pub method_name: String,
}

impl RequestDescription {
    pub fn new(method: Method, path_template: &str, method_name: &str) -> Self {
        Self {
            method,
            path_template: path_template.to_string(),
            base_path: None,
            headers: vec![],
            queries: vec![],
            raw_query_strings: vec![],
            path_substitutions: vec![],
            request_properties: vec![],
            body: None,
            allow_any_status_code: false,
            cancellation: None,
            method_name: method_name.to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_base_path(mut self, template: &str) -> Self {
        self.base_path = Some(template.to_string());
        self
    }

    pub fn with_query(mut self, entry: QueryEntry) -> Self {
        self.queries.push(entry);
        self
    }

    pub fn with_substitution(mut self, substitution: PathSubstitution) -> Self {
        self.path_substitutions.push(substitution);
        self
    }

    /// Base path and method path joined with exactly one separating slash.
    fn full_template(&self) -> String {
        match self.base_path.as_deref() {
            None | Some("") => self.path_template.clone(),
            Some(base) => {
                let trimmed = base.trim_end_matches('/');
                if self.path_template.starts_with('/') {
                    format!("{}{}", trimmed, self.path_template)
                } else {
                    format!("{}/{}", trimmed, self.path_template)
                }
            }
        }
    }

    fn substitution_for(&self, name: &str) -> Option<&PathSubstitution> {
        self.path_substitutions.iter().find(|s| s.name == name)
    }

    /// The path with every matched placeholder filled in from the recorded
    /// substitutions, rendered through each value's canonical textual form.
    /// Unmatched placeholders are left in place.
    pub fn resolved_path(&self) -> String {
        let full = self.full_template();
        template::substitute(&full, |name| {
            self.substitution_for(name).map(|s| display_value(&s.value))
        })
    }

    /// Like [`resolved_path`](Self::resolved_path), but substitutions
    /// recorded with the `Serialized` method go through the given
    /// serializer instead of the canonical textual form.
    pub fn resolved_path_with(
        &self,
        serializer: &dyn PathParamSerializer,
    ) -> Result<String, SerializationError> {
        let full = self.full_template();
        let mut failure = None;
        let path = template::substitute(&full, |name| {
            let sub = self.substitution_for(name)?;
            match sub.serialization {
                PathSerializationMethod::ToString => Some(display_value(&sub.value)),
                PathSerializationMethod::Serialized => match serializer.serialize_path(&sub.value) {
                    Ok(segment) => Some(segment),
                    Err(e) => {
                        failure = Some(e);
                        None
                    }
                },
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(path),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn substitution(name: &str, value: Value) -> PathSubstitution {
        PathSubstitution {
            name: name.to_string(),
            value,
            serialization: PathSerializationMethod::ToString,
        }
    }

    #[test]
    fn test_resolved_path_no_base() {
        let description = RequestDescription::new(Method::GET, "/accounts/{accountId}/users", "m")
            .with_substitution(substitution("accountId", json!("A1")));
        assert_eq!(description.resolved_path(), "/accounts/A1/users");
    }

    #[test]
    fn test_resolved_path_joins_base() {
        let description = RequestDescription::new(Method::GET, "/users", "m")
            .with_base_path("/api/{version}/")
            .with_substitution(substitution("version", json!("v2")));
        assert_eq!(description.resolved_path(), "/api/v2/users");

        let description = RequestDescription::new(Method::GET, "users", "m")
            .with_base_path("/api");
        assert_eq!(description.resolved_path(), "/api/users");
    }

    #[test]
    fn test_resolved_path_unmatched_placeholder_left() {
        let description = RequestDescription::new(Method::GET, "/users/{id}", "m");
        assert_eq!(description.resolved_path(), "/users/{id}");
    }

    #[test]
    fn test_resolved_path_with_serializer() {
        use crate::content::json::JsonPathParamSerializer;

        let description = RequestDescription::new(Method::GET, "/users/{id}", "m")
            .with_substitution(PathSubstitution {
                name: "id".to_string(),
                value: json!(12),
                serialization: PathSerializationMethod::Serialized,
            });
        assert_eq!(
            description
                .resolved_path_with(&JsonPathParamSerializer)
                .unwrap(),
            "/users/12"
        );
    }
}
