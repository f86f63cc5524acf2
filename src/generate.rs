//! Pipeline orchestration: validate a type model and drive an emitter
//! through it.
//!
//! Generation is single-threaded, synchronous and total: findings
//! accumulate in the diagnostics sink while emission keeps going, so one
//! pass surfaces everything. The caller inspects the diagnostics and
//! discards the artifact when any finding is an error.
use log::debug;

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::emit::plan::{PlanEmitter, TypePlan};
use crate::emit::source::SourceEmitter;
use crate::emit::{EmittedProperty, Emitter, MethodEmitter, PropertyRole, TypeEmitter};
use crate::model::{ParameterAttr, PropertyAttr, PropertyModel, TypeModel};
use crate::serialization::{QuerySerializationMethod, SerializationResolver};
use crate::validate;

/// The emitted artifact together with everything validation found.
#[derive(Debug)]
pub struct Generated<A> {
    pub artifact: A,
    pub diagnostics: Diagnostics,
}

impl<A> Generated<A> {
    /// The artifact, unless any finding is an error.
    pub fn into_result(self) -> Result<A, Diagnostics> {
        if self.diagnostics.has_errors() {
            Err(self.diagnostics)
        } else {
            Ok(self.artifact)
        }
    }
}

/// Generate the runtime-executable plan for an interface.
pub fn generate_plan(model: &TypeModel) -> Generated<TypePlan> {
    generate(model, &mut PlanEmitter::new())
}

/// Generate implementation source text for an interface.
pub fn generate_source(model: &TypeModel) -> Generated<String> {
    generate(model, &mut SourceEmitter::new())
}

/// Run the full pipeline against `model` with any emitter backend.
pub fn generate<E: Emitter>(
    model: &TypeModel,
    emitter: &mut E,
) -> Generated<<E::Type as TypeEmitter>::Artifact> {
    let mut diagnostics = Diagnostics::new();
    debug!("generating implementation for {}", model.name);

    validate::interface_headers(model, &mut diagnostics);
    validate::allow_any_status_code(model, &mut diagnostics);
    validate::events(model, &mut diagnostics);

    let mut type_emitter = emitter.emit_type(model);

    validate::path_properties(model, &mut diagnostics);
    let type_path_keys = validate::path_property_keys(model);

    let mut requester_seen = false;
    let mut emitted: Vec<EmittedProperty> = vec![];
    for property in &model.properties {
        if property.is_requester {
            validate::requester_property(property, requester_seen, &mut diagnostics);
            if !requester_seen {
                type_emitter.emit_requester_property(property);
                requester_seen = true;
            }
            continue;
        }
        validate::property_shape(property, &mut diagnostics);
        if let Some(role) = property_role(property) {
            emitted.push(type_emitter.emit_property(property, role));
        }
    }

    for method in &model.methods {
        if method.is_dispose {
            type_emitter.emit_dispose_method(method);
            continue;
        }
        let request = match &method.request {
            Some(request) => request,
            None => {
                diagnostics.report(
                    DiagnosticCode::MethodMustHaveRequestAttribute,
                    &format!("method {}", method.name),
                    "request methods need a verb-and-path annotation",
                );
                continue;
            }
        };

        let resolver = SerializationResolver::new(model.serialization, method.serialization);
        let mut method_emitter = type_emitter.start_method(method);
        method_emitter.emit_request_info_creation(request.method, &request.path);

        let allow_any = method.allow_any_status_code.unwrap_or_else(|| {
            model
                .allow_any_status_code
                .as_ref()
                .map(|a| a.allow)
                .unwrap_or(false)
        });
        if allow_any {
            method_emitter.emit_set_allow_any_status_code();
        }
        if let Some(base) = &model.base_path {
            method_emitter.emit_set_base_path(base);
        }

        for property in &emitted {
            match &property.role {
                PropertyRole::Header { .. } => {
                    method_emitter.emit_add_header_property(property)
                }
                PropertyRole::Path { serialization, .. } => method_emitter
                    .emit_add_path_property(property, resolver.resolve_path(*serialization)),
                PropertyRole::Query { serialization, .. } => method_emitter
                    .emit_add_query_property(property, resolver.resolve_query(*serialization)),
                PropertyRole::RequestProperty { .. } => {
                    method_emitter.emit_add_request_property_property(property)
                }
            }
        }

        validate::method_headers(method, &mut diagnostics);
        for header in &method.headers {
            method_emitter.emit_add_method_header(&header.name, header.value.as_deref());
        }

        validate::method_path(method, request, &type_path_keys, &mut diagnostics);
        validate::request_property_keys(method, &mut diagnostics);

        let mut seen_cancellation = false;
        let mut seen_body = false;
        for (index, param) in method.params.iter().enumerate() {
            let subject = format!("parameter {} of method {}", param.name, method.name);
            if param.is_cancellation_token {
                if !param.attrs.is_empty() {
                    diagnostics.report(
                        DiagnosticCode::CancellationTokenMustHaveZeroAttributes,
                        &subject,
                        "cancellation token parameters must not carry annotations",
                    );
                }
                if seen_cancellation {
                    diagnostics.report(
                        DiagnosticCode::MultipleCancellationTokenParameters,
                        &subject,
                        "a method can have at most one cancellation token parameter",
                    );
                } else {
                    seen_cancellation = true;
                    method_emitter.emit_set_cancellation_token(index, param);
                }
                continue;
            }
            if param.attrs.len() > 1 {
                diagnostics.report(
                    DiagnosticCode::ParameterMustHaveZeroOrOneAttributes,
                    &subject,
                    &format!(
                        "expected at most one annotation, found {}",
                        param.attrs.len()
                    ),
                );
            }
            match param.attrs.first() {
                None => {
                    // implicit query parameter, framework-default serialization
                    method_emitter.emit_add_query_parameter(
                        index,
                        param,
                        &param.name,
                        QuerySerializationMethod::default(),
                    );
                }
                Some(ParameterAttr::Header(header)) => {
                    if header.name.contains(':') {
                        diagnostics.report(
                            DiagnosticCode::HeaderOnInterfaceMustNotHaveColonInName,
                            &format!("header '{}' on {}", header.name, subject),
                            "parameter header names must not contain ':'",
                        );
                    }
                    if header.value.is_some() {
                        diagnostics.report(
                            DiagnosticCode::HeaderParameterMustNotHaveValue,
                            &subject,
                            "parameter headers take their value from the argument",
                        );
                    }
                    method_emitter.emit_add_header_parameter(index, param, &header.name);
                }
                Some(ParameterAttr::Path(path)) => {
                    let key = path.name.as_deref().unwrap_or(&param.name);
                    method_emitter.emit_add_path_parameter(
                        index,
                        param,
                        key,
                        resolver.resolve_path(path.serialization),
                    );
                }
                Some(ParameterAttr::Query(query)) => {
                    let name = query.name.as_deref().unwrap_or(&param.name);
                    method_emitter.emit_add_query_parameter(
                        index,
                        param,
                        name,
                        resolver.resolve_query(query.serialization),
                    );
                }
                Some(ParameterAttr::QueryMap { serialization }) => {
                    let resolved = resolver.resolve_query(*serialization);
                    if !method_emitter.try_emit_add_query_map_parameter(index, param, resolved) {
                        diagnostics.report(
                            DiagnosticCode::QueryMapParameterIsNotADictionary,
                            &subject,
                            &format!(
                                "query map parameters need a key-value mapping type, found {}",
                                param.type_ref.display
                            ),
                        );
                    }
                }
                Some(ParameterAttr::RawQueryString) => {
                    method_emitter.emit_add_raw_query_string_parameter(index, param);
                }
                Some(ParameterAttr::RequestProperty(rp)) => {
                    let key = rp.key.as_deref().unwrap_or(&param.name);
                    method_emitter.emit_add_request_property_parameter(index, param, key);
                }
                Some(ParameterAttr::Body(body)) => {
                    if seen_body {
                        diagnostics.report(
                            DiagnosticCode::MultipleBodyParameters,
                            &subject,
                            "a method can have at most one body parameter",
                        );
                    } else {
                        seen_body = true;
                        method_emitter.emit_set_body_parameter(
                            index,
                            param,
                            resolver.resolve_body(body.serialization),
                        );
                    }
                }
            }
        }

        if !method_emitter.try_emit_request_method_invocation(method) {
            diagnostics.report(
                DiagnosticCode::MethodMustHaveValidReturnType,
                &format!("method {}", method.name),
                &format!(
                    "'{}' is not one of the recognized request shapes",
                    method.return_type.display
                ),
            );
        }
        type_emitter.finish_method(method_emitter);
    }

    let artifact = type_emitter.generate();
    Generated {
        artifact,
        diagnostics,
    }
}

/// The request-construction role of a property, when it carries exactly one
/// annotation. Key and name fall back to the property's own name.
fn property_role(property: &PropertyModel) -> Option<PropertyRole> {
    if property.attrs.len() != 1 {
        return None;
    }
    Some(match &property.attrs[0] {
        PropertyAttr::Header(header) => PropertyRole::Header {
            name: header.name.clone(),
            default: header.value.clone(),
        },
        PropertyAttr::Path(path) => PropertyRole::Path {
            key: path
                .name
                .clone()
                .unwrap_or_else(|| property.name.clone()),
            serialization: path.serialization,
        },
        PropertyAttr::Query(query) => PropertyRole::Query {
            name: query
                .name
                .clone()
                .unwrap_or_else(|| property.name.clone()),
            serialization: query.serialization,
        },
        PropertyAttr::RequestProperty(rp) => PropertyRole::RequestProperty {
            key: rp.key.clone().unwrap_or_else(|| property.name.clone()),
        },
    })
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::emit::plan::RequestOp;
    use crate::model::{
        BodyAttr, HeaderAttr, Method, MethodModel, ParameterModel, PathAttr, QueryAttr,
        RequestPropertyAttr, ReturnShape, ReturnType, TypeRef,
    };
    use crate::requester::ArgValue;
    use crate::serialization::SerializationMethodsAttr;

    fn codes(diagnostics: &Diagnostics) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    fn unit_method(name: &str, verb: Method, path: &str) -> MethodModel {
        MethodModel::new(name, ReturnType::new("()", ReturnShape::Unit))
            .with_request(verb, path)
    }

    #[test]
    fn test_minimal_get() {
        let model = TypeModel::new("IUsers").with_method(unit_method(
            "get_users",
            Method::GET,
            "/users",
        ));
        let generated = generate_plan(&model);
        assert!(generated.diagnostics.is_empty());

        let plan = generated.artifact;
        let description = plan.describe("get_users", &[], &[]).unwrap();
        assert_eq!(description.method, Method::GET);
        assert_eq!(description.path_template, "/users");
        assert!(description.headers.is_empty());
        assert!(description.queries.is_empty());
        assert!(description.body.is_none());
    }

    #[test]
    fn test_path_placeholder_via_property() {
        let model = TypeModel::new("IAccounts")
            .with_property(
                PropertyModel::new("accountId", TypeRef::new("String"))
                    .with_attr(PropertyAttr::Path(PathAttr::new())),
            )
            .with_method(unit_method(
                "get_account_users",
                Method::GET,
                "/accounts/{accountId}/users",
            ));
        let generated = generate_plan(&model);
        assert!(generated.diagnostics.is_empty());

        let plan = generated.artifact;
        let description = plan
            .describe("get_account_users", &[json!("A1")], &[])
            .unwrap();
        assert_eq!(description.resolved_path(), "/accounts/A1/users");
    }

    #[test]
    fn test_missing_placeholder_matcher() {
        let model = TypeModel::new("IAccounts").with_method(unit_method(
            "get_account_users",
            Method::GET,
            "/accounts/{accountId}/users",
        ));
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![DiagnosticCode::MissingPathPropertyOrParameterForPlaceholder]
        );
        assert!(generated.diagnostics.iter().next().unwrap().subject.contains("accountId"));
    }

    #[test]
    fn test_duplicate_body_parameters() {
        let model = TypeModel::new("IUsers").with_method(
            MethodModel::new("create", ReturnType::new("()", ReturnShape::Unit))
                .with_request(Method::POST, "/users")
                .with_param(
                    ParameterModel::new("first", TypeRef::new("User"))
                        .with_attr(ParameterAttr::Body(BodyAttr::new())),
                )
                .with_param(
                    ParameterModel::new("second", TypeRef::new("User"))
                        .with_attr(ParameterAttr::Body(BodyAttr::new())),
                ),
        );
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![DiagnosticCode::MultipleBodyParameters]
        );
        let finding = generated.diagnostics.iter().next().unwrap();
        assert!(finding.subject.contains("second"));

        // the first body parameter stays in the plan
        let ops = &generated.artifact.method("create").unwrap().ops;
        let bodies: Vec<&RequestOp> = ops
            .iter()
            .filter(|op| matches!(op, RequestOp::SetBodyParameter { .. }))
            .collect();
        assert_eq!(bodies.len(), 1);
        assert!(matches!(bodies[0], RequestOp::SetBodyParameter { index: 0, .. }));
    }

    #[test]
    fn test_implicit_query_parameter() {
        let model = TypeModel::new("ISearch").with_method(
            unit_method("search", Method::GET, "/search")
                .with_param(ParameterModel::new("q", TypeRef::new("String"))),
        );
        let generated = generate_plan(&model);
        assert!(generated.diagnostics.is_empty());

        let description = generated
            .artifact
            .describe("search", &[], &[ArgValue::from("rust")])
            .unwrap();
        assert_eq!(description.queries.len(), 1);
        assert_eq!(description.queries[0].name, "q");
        assert_eq!(description.queries[0].value, json!("rust"));
        assert_eq!(
            description.queries[0].serialization,
            QuerySerializationMethod::ToString
        );
    }

    #[test]
    fn test_implicit_query_ignores_serialization_defaults() {
        // implicit parameters use the framework default, not the resolver
        // chain, unlike annotated query parameters
        let model = TypeModel::new("ISearch")
            .with_serialization(
                SerializationMethodsAttr::new()
                    .with_query(QuerySerializationMethod::Serialized),
            )
            .with_method(
                unit_method("search", Method::GET, "/search")
                    .with_param(ParameterModel::new("implicit", TypeRef::new("String")))
                    .with_param(
                        ParameterModel::new("annotated", TypeRef::new("String"))
                            .with_attr(ParameterAttr::Query(QueryAttr::new())),
                    ),
            );
        let generated = generate_plan(&model);
        assert!(generated.diagnostics.is_empty());
        let ops = &generated.artifact.method("search").unwrap().ops;
        assert_eq!(
            ops[0],
            RequestOp::AddQueryParameter {
                index: 0,
                name: "implicit".to_string(),
                serialization: QuerySerializationMethod::ToString,
            }
        );
        assert_eq!(
            ops[1],
            RequestOp::AddQueryParameter {
                index: 1,
                name: "annotated".to_string(),
                serialization: QuerySerializationMethod::Serialized,
            }
        );
    }

    #[test]
    fn test_colon_rules() {
        let model = TypeModel::new("IApi")
            .with_header("X-Bad: value", Some("v"))
            .with_property(
                PropertyModel::new("key", TypeRef::nullable("Option<String>"))
                    .with_attr(PropertyAttr::Header(HeaderAttr::new("X-Good"))),
            )
            .with_method(unit_method("get", Method::GET, "/"));
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![
                DiagnosticCode::HeaderOnInterfaceMustNotHaveColonInName,
                DiagnosticCode::HeaderPropertyNameMustContainColon,
            ]
        );
    }

    #[test]
    fn test_header_order_type_then_method_then_parameter() {
        let model = TypeModel::new("IApi")
            .with_header("X-Type", Some("t"))
            .with_method(
                unit_method("get", Method::GET, "/")
                    .with_header(HeaderAttr::with_value("X-Method", "m"))
                    .with_param(
                        ParameterModel::new("h", TypeRef::new("String"))
                            .with_attr(ParameterAttr::Header(HeaderAttr::new("X-Param"))),
                    ),
            );
        let generated = generate_plan(&model);
        assert!(generated.diagnostics.is_empty());
        let description = generated
            .artifact
            .describe("get", &[], &[ArgValue::from("p")])
            .unwrap();
        let names: Vec<&str> = description.headers.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["X-Type", "X-Method", "X-Param"]);
    }

    #[test]
    fn test_property_contributions_precede_parameters_in_declaration_order() {
        let model = TypeModel::new("IApi")
            .with_property(
                PropertyModel::new("p1", TypeRef::new("String"))
                    .with_attr(PropertyAttr::Query(QueryAttr::new())),
            )
            .with_property(
                PropertyModel::new("p2", TypeRef::new("String"))
                    .with_attr(PropertyAttr::Query(QueryAttr::new())),
            )
            .with_method(
                unit_method("get", Method::GET, "/")
                    .with_param(ParameterModel::new("a1", TypeRef::new("String"))),
            );
        let generated = generate_plan(&model);
        assert!(generated.diagnostics.is_empty());
        let description = generated
            .artifact
            .describe(
                "get",
                &[json!("v1"), json!("v2")],
                &[ArgValue::from("v3")],
            )
            .unwrap();
        let names: Vec<&str> = description.queries.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["p1", "p2", "a1"]);
    }

    #[test]
    fn test_allow_any_status_code_effective() {
        let type_level = TypeModel::new("IApi")
            .with_allow_any_status_code(true)
            .with_method(unit_method("get", Method::GET, "/"));
        let generated = generate_plan(&type_level);
        assert!(generated.diagnostics.is_empty());
        assert!(generated.artifact.method("get").unwrap().ops
            .contains(&RequestOp::SetAllowAnyStatusCode));

        // a method-level false overrides the type-level true
        let overridden = TypeModel::new("IApi")
            .with_allow_any_status_code(true)
            .with_method(
                unit_method("get", Method::GET, "/").with_allow_any_status_code(false),
            );
        let generated = generate_plan(&overridden);
        assert!(!generated.artifact.method("get").unwrap().ops
            .contains(&RequestOp::SetAllowAnyStatusCode));
    }

    #[test]
    fn test_allow_any_status_code_on_parent_rejected() {
        let model = TypeModel::new("IChild")
            .with_inherited_allow_any_status_code(true, "IParent")
            .with_method(unit_method("get", Method::GET, "/"));
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![DiagnosticCode::AllowAnyStatusCodeNotAllowedOnParent]
        );
    }

    #[test]
    fn test_event_rejected() {
        let model = TypeModel::new("IApi").with_event("changed");
        let generated = generate_plan(&model);
        assert_eq!(codes(&generated.diagnostics), vec![DiagnosticCode::EventNotAllowed]);
    }

    #[test]
    fn test_method_without_request_attribute() {
        let model = TypeModel::new("IApi").with_method(MethodModel::new(
            "naked",
            ReturnType::new("()", ReturnShape::Unit),
        ));
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![DiagnosticCode::MethodMustHaveRequestAttribute]
        );
        assert!(generated.artifact.method("naked").is_none());
    }

    #[test]
    fn test_unrecognized_return_type() {
        let model = TypeModel::new("IApi").with_method(
            MethodModel::new("get", ReturnType::unrecognized("HashMap<u8, u8>"))
                .with_request(Method::GET, "/"),
        );
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![DiagnosticCode::MethodMustHaveValidReturnType]
        );
        assert!(generated.artifact.method("get").unwrap().dispatch.is_none());
    }

    #[test]
    fn test_requester_property_rules() {
        let model = TypeModel::new("IApi")
            .with_property(PropertyModel::requester("inner").with_setter(true))
            .with_property(PropertyModel::requester("second"));
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![
                DiagnosticCode::PropertyMustBeReadOnly,
                DiagnosticCode::MultipleRequesterProperties,
            ]
        );
        assert_eq!(generated.artifact.requester_property(), Some("inner"));
    }

    #[test]
    fn test_cancellation_token_rules() {
        let model = TypeModel::new("IApi").with_method(
            unit_method("get", Method::GET, "/")
                .with_param(
                    ParameterModel::cancellation("first")
                        .with_attr(ParameterAttr::Query(QueryAttr::new())),
                )
                .with_param(ParameterModel::cancellation("second")),
        );
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![
                DiagnosticCode::CancellationTokenMustHaveZeroAttributes,
                DiagnosticCode::MultipleCancellationTokenParameters,
            ]
        );
        // only the first token is wired up
        let ops = &generated.artifact.method("get").unwrap().ops;
        assert_eq!(ops, &vec![RequestOp::SetCancellationToken { index: 0 }]);
    }

    #[test]
    fn test_query_map_must_be_dictionary() {
        let model = TypeModel::new("IApi").with_method(
            unit_method("get", Method::GET, "/").with_param(
                ParameterModel::new("m", TypeRef::new("String"))
                    .with_attr(ParameterAttr::QueryMap {
                        serialization: None,
                    }),
            ),
        );
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![DiagnosticCode::QueryMapParameterIsNotADictionary]
        );
    }

    #[test]
    fn test_parameter_attribute_multiplicity() {
        let model = TypeModel::new("IApi").with_method(
            unit_method("get", Method::GET, "/").with_param(
                ParameterModel::new("p", TypeRef::new("String"))
                    .with_attr(ParameterAttr::Query(QueryAttr::new()))
                    .with_attr(ParameterAttr::RawQueryString),
            ),
        );
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![DiagnosticCode::ParameterMustHaveZeroOrOneAttributes]
        );
        // the first annotation wins for emission
        let ops = &generated.artifact.method("get").unwrap().ops;
        assert!(matches!(ops[0], RequestOp::AddQueryParameter { .. }));
    }

    #[test]
    fn test_duplicate_request_property_keys() {
        let model = TypeModel::new("IApi").with_method(
            unit_method("get", Method::GET, "/")
                .with_param(
                    ParameterModel::new("a", TypeRef::new("String"))
                        .with_attr(ParameterAttr::RequestProperty(RequestPropertyAttr::keyed(
                            "k",
                        ))),
                )
                .with_param(
                    ParameterModel::new("b", TypeRef::new("String"))
                        .with_attr(ParameterAttr::RequestProperty(RequestPropertyAttr::keyed(
                            "k",
                        ))),
                )
                .with_param(
                    // case differs: keys are case-sensitive, no finding
                    ParameterModel::new("c", TypeRef::new("String"))
                        .with_attr(ParameterAttr::RequestProperty(RequestPropertyAttr::keyed(
                            "K",
                        ))),
                ),
        );
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![DiagnosticCode::DuplicateRequestPropertyKey]
        );
    }

    #[test]
    fn test_property_shape_rules() {
        let model = TypeModel::new("IApi")
            .with_property(
                PropertyModel::new("read_only", TypeRef::new("String"))
                    .read_only()
                    .with_attr(PropertyAttr::Query(QueryAttr::new())),
            )
            .with_property(PropertyModel::new("bare", TypeRef::new("String")))
            .with_property(
                PropertyModel::new("key", TypeRef::new("String")).with_attr(
                    PropertyAttr::Header(HeaderAttr::with_value("X-Key: fallback", "default")),
                ),
            );
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![
                DiagnosticCode::PropertyMustBeReadWrite,
                DiagnosticCode::PropertyMustHaveOneAttribute,
                DiagnosticCode::HeaderPropertyWithValueMustBeNullable,
            ]
        );
        // only properties with a usable role occupy slots
        assert_eq!(generated.artifact.property_slots().len(), 2);
    }

    #[test]
    fn test_header_value_rules() {
        let model = TypeModel::new("IApi")
            .with_header("X-Empty", None)
            .with_method(
                unit_method("get", Method::GET, "/").with_param(
                    ParameterModel::new("h", TypeRef::new("String"))
                        .with_attr(ParameterAttr::Header(HeaderAttr::with_value("X-H", "v"))),
                ),
            );
        let generated = generate_plan(&model);
        assert_eq!(
            codes(&generated.diagnostics),
            vec![
                DiagnosticCode::HeaderOnInterfaceMustHaveValue,
                DiagnosticCode::HeaderParameterMustNotHaveValue,
            ]
        );
    }

    #[test]
    fn test_interface_with_properties_but_no_methods_is_legal() {
        let model = TypeModel::new("IApi").with_property(
            PropertyModel::new("q", TypeRef::new("String"))
                .with_attr(PropertyAttr::Query(QueryAttr::new())),
        );
        let generated = generate_plan(&model);
        assert!(generated.diagnostics.is_empty());
        assert_eq!(generated.artifact.property_slots(), &["q".to_string()]);
        assert!(generated.artifact.methods().is_empty());
    }

    #[test]
    fn test_dispose_method_recorded() {
        let model = TypeModel::new("IApi").with_method(MethodModel::dispose("close"));
        let generated = generate_plan(&model);
        assert!(generated.diagnostics.is_empty());
        assert_eq!(generated.artifact.dispose_method(), Some("close"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let model = TypeModel::new("IApi")
            .with_header("X-Type", Some("t"))
            .with_base_path("/api")
            .with_property(
                PropertyModel::new("q", TypeRef::new("String"))
                    .with_attr(PropertyAttr::Query(QueryAttr::new())),
            )
            .with_method(
                unit_method("get", Method::GET, "/users/{id}").with_param(
                    ParameterModel::new("id", TypeRef::new("u64"))
                        .with_attr(ParameterAttr::Path(PathAttr::new())),
                ),
            );
        let first = generate_source(&model);
        let second = generate_source(&model);
        assert!(first.diagnostics.is_empty());
        assert!(!first.artifact.is_empty());
        assert_eq!(first.artifact, second.artifact);

        let plan_a = generate_plan(&model).artifact;
        let plan_b = generate_plan(&model).artifact;
        assert_eq!(plan_a, plan_b);
    }

    #[test]
    fn test_valid_model_has_no_errors_and_nonempty_artifact() {
        let model = TypeModel::new("IGitHub")
            .with_header("User-Agent", Some("restgen"))
            .with_base_path("/api/{version}")
            .with_property(
                PropertyModel::new("version", TypeRef::new("String"))
                    .with_attr(PropertyAttr::Path(PathAttr::new())),
            )
            .with_property(PropertyModel::requester("inner"))
            .with_method(
                MethodModel::new("get_user", ReturnType::new("User", ReturnShape::Body))
                    .with_request(Method::GET, "/users/{username}")
                    .with_param(
                        ParameterModel::new("username", TypeRef::new("String"))
                            .with_attr(ParameterAttr::Path(PathAttr::new())),
                    )
                    .with_param(ParameterModel::cancellation("token")),
            )
            .with_method(MethodModel::dispose("close"));
        let generated = generate_plan(&model);
        assert!(!generated.diagnostics.has_errors());
        let plan = generated.into_result().unwrap();
        assert!(!plan.methods().is_empty());
    }

    #[test]
    fn test_into_result_fails_on_errors() {
        let model = TypeModel::new("IApi").with_event("changed");
        let result = generate_plan(&model).into_result();
        assert!(result.is_err());
    }
}
