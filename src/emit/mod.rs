//! The emission contract and its two reference backends.
//!
//! The generator drives an [`Emitter`] through an ordered sequence of
//! emission operations; the backend decides what each operation means. The
//! [`plan`](crate::emit::plan) backend records tagged ops and materializes a
//! runtime-executable plan; the [`source`](crate::emit::source) backend
//! appends text fragments for downstream compilation. Both observe the same
//! ordering: type-level setup, property contributions in property
//! declaration order, method headers, parameter contributions in parameter
//! declaration order, dispatch. That ordering is part of the contract;
//! header and query ordering may be observable at the wire.
//!
//! Every emission call is total. Calling one twice for the same site is a
//! bug at the caller, not something backends defend against.
use crate::model::{Method, MethodModel, ParameterModel, PropertyModel, TypeModel};
use crate::serialization::{
    BodySerializationMethod, PathSerializationMethod, QuerySerializationMethod,
};

pub mod plan;
pub mod source;

/// The request-construction role a property was emitted with.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyRole {
    Header {
        /// Combined "wire-name: inline-fallback" form; see
        /// [`split_header_name`].
        name: String,
        default: Option<String>,
    },
    Path {
        key: String,
        serialization: Option<PathSerializationMethod>,
    },
    Query {
        name: String,
        serialization: Option<QuerySerializationMethod>,
    },
    RequestProperty {
        key: String,
    },
}

/// Handle to a property already emitted on the type emitter. Method
/// emitters replay these, one contribution per method, in property
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedProperty {
    /// Index into the type's property value slots.
    pub slot: usize,
    pub name: String,
    pub role: PropertyRole,
}

/// Split a property header name into its wire name and inline fallback.
/// "X-API-Key: none" splits into ("X-API-Key", Some("none")); an absent or
/// empty fallback yields None.
pub(crate) fn split_header_name(name: &str) -> (&str, Option<&str>) {
    match name.find(':') {
        Some(at) => {
            let fallback = name[at + 1..].trim();
            let fallback = if fallback.is_empty() {
                None
            } else {
                Some(fallback)
            };
            (name[..at].trim_end(), fallback)
        }
        None => (name, None),
    }
}

/// A backend able to emit implementations for whole interfaces.
pub trait Emitter {
    type Type: TypeEmitter;

    fn emit_type(&mut self, model: &TypeModel) -> Self::Type;
}

/// Per-interface emission state.
pub trait TypeEmitter {
    type Method: MethodEmitter;
    type Artifact;

    fn emit_requester_property(&mut self, property: &PropertyModel);

    fn emit_property(&mut self, property: &PropertyModel, role: PropertyRole) -> EmittedProperty;

    /// Begin emission for one request method. The returned method emitter
    /// is handed back through [`finish_method`](Self::finish_method) once
    /// every contribution has been emitted.
    fn start_method(&mut self, method: &MethodModel) -> Self::Method;

    fn finish_method(&mut self, method: Self::Method);

    fn emit_dispose_method(&mut self, method: &MethodModel);

    /// Finalize and return the emitted artifact.
    fn generate(self) -> Self::Artifact;
}

/// Per-method emission operations, one per contribution a call site makes
/// to the request description.
pub trait MethodEmitter {
    fn emit_request_info_creation(&mut self, method: Method, path: &str);

    fn emit_set_allow_any_status_code(&mut self);

    fn emit_set_base_path(&mut self, template: &str);

    fn emit_add_header_property(&mut self, property: &EmittedProperty);

    fn emit_add_path_property(
        &mut self,
        property: &EmittedProperty,
        serialization: PathSerializationMethod,
    );

    fn emit_add_query_property(
        &mut self,
        property: &EmittedProperty,
        serialization: QuerySerializationMethod,
    );

    fn emit_add_request_property_property(&mut self, property: &EmittedProperty);

    fn emit_add_method_header(&mut self, name: &str, value: Option<&str>);

    fn emit_set_cancellation_token(&mut self, index: usize, param: &ParameterModel);

    fn emit_add_header_parameter(&mut self, index: usize, param: &ParameterModel, name: &str);

    fn emit_add_path_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        key: &str,
        serialization: PathSerializationMethod,
    );

    fn emit_add_query_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        name: &str,
        serialization: QuerySerializationMethod,
    );

    fn emit_add_request_property_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        key: &str,
    );

    fn emit_add_raw_query_string_parameter(&mut self, index: usize, param: &ParameterModel);

    /// Returns false when the parameter's declared type is not a key-value
    /// mapping; the caller reports the diagnostic.
    fn try_emit_add_query_map_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        serialization: QuerySerializationMethod,
    ) -> bool;

    fn emit_set_body_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        serialization: BodySerializationMethod,
    );

    /// Record the dispatch against the requester. Returns false when the
    /// method's return type is not one of the recognized request shapes;
    /// the caller reports the diagnostic.
    fn try_emit_request_method_invocation(&mut self, method: &MethodModel) -> bool;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_header_name() {
        assert_eq!(split_header_name("X-API-Key: none"), ("X-API-Key", Some("none")));
        assert_eq!(split_header_name("X-API-Key:"), ("X-API-Key", None));
        assert_eq!(split_header_name("X-API-Key"), ("X-API-Key", None));
    }
}
