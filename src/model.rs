//! Passive descriptions of annotated service interfaces.
//!
//! A [`TypeModel`] is built once per interface by a discovery collaborator
//! (a macro, a static analyzer, or by hand with the builder methods here)
//! and consumed immutably by the generator. Nothing in this module
//! validates; multiplicity rules and cross-checks live in
//! [`validate`](crate::validate) so that every violation can surface as a
//! diagnostic instead of a construction failure.
use std::fmt;
use std::str::FromStr;

use crate::serialization::{
    BodySerializationMethod, PathSerializationMethod, QuerySerializationMethod,
    SerializationMethodsAttr,
};

/// The recognized HTTP verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    PATCH,
    DELETE,
    OPTIONS,
    TRACE,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseMethodError {
    verb: String,
}

impl fmt::Display for ParseMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized HTTP method '{}'", self.verb)
    }
}

impl FromStr for Method {
    type Err = ParseMethodError;
    fn from_str(s: &str) -> Result<Method, ParseMethodError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "OPTIONS" => Ok(Method::OPTIONS),
            "TRACE" => Ok(Method::TRACE),
            _ => Err(ParseMethodError {
                verb: s.to_string(),
            }),
        }
    }
}

/// A declared type as the discovery surface saw it: a display name plus the
/// two facts the pipeline actually needs about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub display: String,
    pub nullable: bool,
    pub is_dictionary: bool,
}

impl TypeRef {
    pub fn new(display: &str) -> Self {
        Self {
            display: display.to_string(),
            nullable: false,
            is_dictionary: false,
        }
    }
    pub fn nullable(display: &str) -> Self {
        Self {
            nullable: true,
            ..Self::new(display)
        }
    }
    pub fn dictionary(display: &str) -> Self {
        Self {
            is_dictionary: true,
            ..Self::new(display)
        }
    }
}

/// The closed set of request shapes a generated method can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// Future of unit: fire the request, surface only failure.
    Unit,
    /// Future of a deserialized body.
    Body,
    /// Future of the raw response message.
    ResponseMessage,
    /// Future of a deserialized body paired with its response message.
    Response,
    /// Future of the raw body bytes.
    Bytes,
    /// Future of the body as text.
    Text,
    /// Future of the body as a byte stream.
    Stream,
}

/// A method's declared return type. `shape` is `None` when the type is not
/// one of the recognized request shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnType {
    pub display: String,
    pub shape: Option<ReturnShape>,
}

impl ReturnType {
    pub fn new(display: &str, shape: ReturnShape) -> Self {
        Self {
            display: display.to_string(),
            shape: Some(shape),
        }
    }
    pub fn unrecognized(display: &str) -> Self {
        Self {
            display: display.to_string(),
            shape: None,
        }
    }
}

/// A header annotation: a name and an optional value literal. Which of the
/// two is mandatory depends on where the annotation sits; see
/// [`validate`](crate::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderAttr {
    pub name: String,
    pub value: Option<String>,
}

impl HeaderAttr {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
    pub fn with_value(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }
}

/// A type-level header, tagged with the interface that declared it so
/// inherited headers stay attributable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceHeader {
    pub name: String,
    pub value: Option<String>,
    pub declared_on: String,
}

/// Type-level opt-out of status code checking, tagged with its declaring
/// interface; it is only legal on the interface being generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowAnyStatusCodeAttr {
    pub allow: bool,
    pub declared_on: String,
}

/// A path annotation. `name` defaults to the annotated member's own name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAttr {
    pub name: Option<String>,
    pub serialization: Option<PathSerializationMethod>,
}

impl PathAttr {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            serialization: None,
        }
    }
    pub fn with_serialization(mut self, method: PathSerializationMethod) -> Self {
        self.serialization = Some(method);
        self
    }
}

/// A query annotation. `name` defaults to the annotated member's own name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryAttr {
    pub name: Option<String>,
    pub serialization: Option<QuerySerializationMethod>,
}

impl QueryAttr {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            serialization: None,
        }
    }
    pub fn with_serialization(mut self, method: QuerySerializationMethod) -> Self {
        self.serialization = Some(method);
        self
    }
}

/// A body annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyAttr {
    pub serialization: Option<BodySerializationMethod>,
}

impl BodyAttr {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_serialization(mut self, method: BodySerializationMethod) -> Self {
        self.serialization = Some(method);
        self
    }
}

/// A request-property annotation: attaches a keyed value to the request
/// description for transport-level consumers. `key` defaults to the
/// annotated member's own name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPropertyAttr {
    pub key: Option<String>,
}

impl RequestPropertyAttr {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn keyed(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
        }
    }
}

/// The annotations a property can carry, as tagged variants.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyAttr {
    Header(HeaderAttr),
    Path(PathAttr),
    Query(QueryAttr),
    RequestProperty(RequestPropertyAttr),
}

/// The annotations a parameter can carry, as tagged variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterAttr {
    Header(HeaderAttr),
    Path(PathAttr),
    Query(QueryAttr),
    QueryMap {
        serialization: Option<QuerySerializationMethod>,
    },
    RawQueryString,
    Body(BodyAttr),
    RequestProperty(RequestPropertyAttr),
}

/// One property of the interface.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyModel {
    pub name: String,
    pub type_ref: TypeRef,
    pub has_getter: bool,
    pub has_setter: bool,
    pub is_requester: bool,
    pub attrs: Vec<PropertyAttr>,
}

impl PropertyModel {
    /// A plain read-write property.
    pub fn new(name: &str, type_ref: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            type_ref,
            has_getter: true,
            has_setter: true,
            is_requester: false,
            attrs: vec![],
        }
    }
    /// The injected requester capability: read-only, no annotations.
    pub fn requester(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_ref: TypeRef::new("Requester"),
            has_getter: true,
            has_setter: false,
            is_requester: true,
            attrs: vec![],
        }
    }
    pub fn read_only(mut self) -> Self {
        self.has_setter = false;
        self
    }
    pub fn write_only(mut self) -> Self {
        self.has_getter = false;
        self
    }
    pub fn with_attr(mut self, attr: PropertyAttr) -> Self {
        self.attrs.push(attr);
        self
    }
    pub fn with_setter(mut self, has_setter: bool) -> Self {
        self.has_setter = has_setter;
        self
    }

    /// The path key this property contributes, if it carries a path
    /// annotation.
    pub fn path_key(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            PropertyAttr::Path(p) => Some(p.name.as_deref().unwrap_or(&self.name)),
            _ => None,
        })
    }
}

/// One parameter of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterModel {
    pub name: String,
    pub type_ref: TypeRef,
    pub is_cancellation_token: bool,
    pub attrs: Vec<ParameterAttr>,
}

impl ParameterModel {
    pub fn new(name: &str, type_ref: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            type_ref,
            is_cancellation_token: false,
            attrs: vec![],
        }
    }
    /// A cooperative-cancellation handle parameter.
    pub fn cancellation(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_ref: TypeRef::new("CancellationToken"),
            is_cancellation_token: true,
            attrs: vec![],
        }
    }
    pub fn with_attr(mut self, attr: ParameterAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// The path key this parameter contributes, if it carries a path
    /// annotation.
    pub fn path_key(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            ParameterAttr::Path(p) => Some(p.name.as_deref().unwrap_or(&self.name)),
            _ => None,
        })
    }
}

/// The verb-and-path annotation that makes a method a request method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAttr {
    pub method: Method,
    pub path: String,
}

impl RequestAttr {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
        }
    }
}

/// One method of the interface.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodModel {
    pub name: String,
    pub return_type: ReturnType,
    pub params: Vec<ParameterModel>,
    pub is_dispose: bool,
    pub request: Option<RequestAttr>,
    pub allow_any_status_code: Option<bool>,
    pub serialization: Option<SerializationMethodsAttr>,
    pub headers: Vec<HeaderAttr>,
}

impl MethodModel {
    pub fn new(name: &str, return_type: ReturnType) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            params: vec![],
            is_dispose: false,
            request: None,
            allow_any_status_code: None,
            serialization: None,
            headers: vec![],
        }
    }
    /// The resource-release method, delegated to the requester.
    pub fn dispose(name: &str) -> Self {
        Self {
            is_dispose: true,
            ..Self::new(name, ReturnType::new("()", ReturnShape::Unit))
        }
    }
    pub fn with_request(mut self, method: Method, path: &str) -> Self {
        self.request = Some(RequestAttr::new(method, path));
        self
    }
    pub fn with_param(mut self, param: ParameterModel) -> Self {
        self.params.push(param);
        self
    }
    pub fn with_header(mut self, header: HeaderAttr) -> Self {
        self.headers.push(header);
        self
    }
    pub fn with_allow_any_status_code(mut self, allow: bool) -> Self {
        self.allow_any_status_code = Some(allow);
        self
    }
    pub fn with_serialization(mut self, attr: SerializationMethodsAttr) -> Self {
        self.serialization = Some(attr);
        self
    }
}

/// An event declaration. Events are never supported; they exist in the
/// model so their rejection can surface as a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventModel {
    pub name: String,
}

/// A complete annotated interface, as handed to the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeModel {
    pub name: String,
    pub headers: Vec<InterfaceHeader>,
    pub base_path: Option<String>,
    pub allow_any_status_code: Option<AllowAnyStatusCodeAttr>,
    pub serialization: Option<SerializationMethodsAttr>,
    pub properties: Vec<PropertyModel>,
    pub methods: Vec<MethodModel>,
    pub events: Vec<EventModel>,
}

impl TypeModel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            headers: vec![],
            base_path: None,
            allow_any_status_code: None,
            serialization: None,
            properties: vec![],
            methods: vec![],
            events: vec![],
        }
    }
    /// A header declared on this interface itself.
    pub fn with_header(mut self, name: &str, value: Option<&str>) -> Self {
        let declared_on = self.name.clone();
        self.headers.push(InterfaceHeader {
            name: name.to_string(),
            value: value.map(str::to_string),
            declared_on,
        });
        self
    }
    /// A header inherited from a parent interface.
    pub fn with_inherited_header(mut self, name: &str, value: Option<&str>, parent: &str) -> Self {
        self.headers.push(InterfaceHeader {
            name: name.to_string(),
            value: value.map(str::to_string),
            declared_on: parent.to_string(),
        });
        self
    }
    pub fn with_base_path(mut self, template: &str) -> Self {
        self.base_path = Some(template.to_string());
        self
    }
    /// Allow-any-status-code declared on this interface itself.
    pub fn with_allow_any_status_code(mut self, allow: bool) -> Self {
        let declared_on = self.name.clone();
        self.allow_any_status_code = Some(AllowAnyStatusCodeAttr { allow, declared_on });
        self
    }
    /// Allow-any-status-code inherited from a parent interface. Always
    /// rejected by validation; modeled so the rejection can be reported.
    pub fn with_inherited_allow_any_status_code(mut self, allow: bool, parent: &str) -> Self {
        self.allow_any_status_code = Some(AllowAnyStatusCodeAttr {
            allow,
            declared_on: parent.to_string(),
        });
        self
    }
    pub fn with_serialization(mut self, attr: SerializationMethodsAttr) -> Self {
        self.serialization = Some(attr);
        self
    }
    pub fn with_property(mut self, property: PropertyModel) -> Self {
        self.properties.push(property);
        self
    }
    pub fn with_method(mut self, method: MethodModel) -> Self {
        self.methods.push(method);
        self
    }
    pub fn with_event(mut self, name: &str) -> Self {
        self.events.push(EventModel {
            name: name.to_string(),
        });
        self
    }
}
