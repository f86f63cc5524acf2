//! Serialization method selection.
//!
//! Path, query and body values can each be rendered two ways: through the
//! value's canonical textual form, or delegated to the serializer configured
//! on the requester. Annotations at the call site, the method, and the
//! interface each may pin a choice; [`SerializationResolver`] applies the
//! precedence between them.

/// How a path substitution value becomes a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSerializationMethod {
    /// Canonical textual form of the value.
    ToString,
    /// Delegated to the configured path parameter serializer.
    Serialized,
}

impl Default for PathSerializationMethod {
    fn default() -> Self {
        PathSerializationMethod::ToString
    }
}

/// How a query value becomes one or more query pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySerializationMethod {
    /// Canonical textual form of the value.
    ToString,
    /// Delegated to the configured query parameter serializer.
    Serialized,
}

impl Default for QuerySerializationMethod {
    fn default() -> Self {
        QuerySerializationMethod::ToString
    }
}

/// How a body value becomes request content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySerializationMethod {
    /// Delegated to the configured body serializer.
    Serialized,
    /// Rendered as form URL-encoded key-value content.
    UrlEncoded,
}

impl Default for BodySerializationMethod {
    fn default() -> Self {
        BodySerializationMethod::Serialized
    }
}

/// Default serialization methods declared on an interface or a method.
/// `None` fields leave the decision to the next level down the precedence
/// chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializationMethodsAttr {
    pub path: Option<PathSerializationMethod>,
    pub query: Option<QuerySerializationMethod>,
    pub body: Option<BodySerializationMethod>,
}

impl SerializationMethodsAttr {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_path(mut self, method: PathSerializationMethod) -> Self {
        self.path = Some(method);
        self
    }
    pub fn with_query(mut self, method: QuerySerializationMethod) -> Self {
        self.query = Some(method);
        self
    }
    pub fn with_body(mut self, method: BodySerializationMethod) -> Self {
        self.body = Some(method);
        self
    }
}

/// Resolves effective serialization methods for one method of one interface.
///
/// Precedence, nearest first: explicit override at the call site, the
/// method-level default, the interface-level default, the framework default.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializationResolver {
    type_level: Option<SerializationMethodsAttr>,
    method_level: Option<SerializationMethodsAttr>,
}

impl SerializationResolver {
    pub fn new(
        type_level: Option<SerializationMethodsAttr>,
        method_level: Option<SerializationMethodsAttr>,
    ) -> Self {
        Self {
            type_level,
            method_level,
        }
    }

    pub fn resolve_path(&self, site: Option<PathSerializationMethod>) -> PathSerializationMethod {
        site.or_else(|| self.method_level.and_then(|a| a.path))
            .or_else(|| self.type_level.and_then(|a| a.path))
            .unwrap_or_default()
    }

    pub fn resolve_query(&self, site: Option<QuerySerializationMethod>) -> QuerySerializationMethod {
        site.or_else(|| self.method_level.and_then(|a| a.query))
            .or_else(|| self.type_level.and_then(|a| a.query))
            .unwrap_or_default()
    }

    pub fn resolve_body(&self, site: Option<BodySerializationMethod>) -> BodySerializationMethod {
        site.or_else(|| self.method_level.and_then(|a| a.body))
            .or_else(|| self.type_level.and_then(|a| a.body))
            .unwrap_or_default()
    }
}
