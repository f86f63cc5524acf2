//! Structural rules enforced over a type model.
//!
//! Every function here is pure with respect to the model: it reads, decides,
//! and writes findings to the sink. None of them stop the pipeline; the
//! generator keeps emitting so that one pass surfaces every reachable
//! diagnostic. The generator is responsible for calling these in
//! declaration order.
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::model::{
    MethodModel, ParameterAttr, PropertyAttr, PropertyModel, RequestAttr, TypeModel,
};
use crate::template;

pub fn interface_headers(model: &TypeModel, diagnostics: &mut Diagnostics) {
    for header in &model.headers {
        let subject = format!(
            "header '{}' on interface {}",
            header.name, header.declared_on
        );
        if header.name.contains(':') {
            diagnostics.report(
                DiagnosticCode::HeaderOnInterfaceMustNotHaveColonInName,
                &subject,
                "interface header names must not contain ':'",
            );
        }
        if header.value.is_none() {
            diagnostics.report(
                DiagnosticCode::HeaderOnInterfaceMustHaveValue,
                &subject,
                "interface headers must carry a value",
            );
        }
    }
}

pub fn allow_any_status_code(model: &TypeModel, diagnostics: &mut Diagnostics) {
    if let Some(attr) = &model.allow_any_status_code {
        if attr.declared_on != model.name {
            diagnostics.report(
                DiagnosticCode::AllowAnyStatusCodeNotAllowedOnParent,
                &format!("interface {}", model.name),
                &format!(
                    "allow-any-status-code is declared on parent interface {} and must be declared on the interface being generated",
                    attr.declared_on
                ),
            );
        }
    }
}

pub fn events(model: &TypeModel, diagnostics: &mut Diagnostics) {
    for event in &model.events {
        diagnostics.report(
            DiagnosticCode::EventNotAllowed,
            &format!("event {} on interface {}", event.name, model.name),
            "interfaces must not declare events",
        );
    }
}

/// Rules for the injected-requester property. `already_seen` is true when a
/// previous property of the model was also a requester.
pub fn requester_property(
    property: &PropertyModel,
    already_seen: bool,
    diagnostics: &mut Diagnostics,
) {
    let subject = format!("property {}", property.name);
    if already_seen {
        diagnostics.report(
            DiagnosticCode::MultipleRequesterProperties,
            &subject,
            "an interface can have at most one requester property",
        );
    }
    if !property.attrs.is_empty() {
        diagnostics.report(
            DiagnosticCode::RequesterPropertyMustHaveZeroAttributes,
            &subject,
            "the requester property must not carry annotations",
        );
    }
    if property.has_setter {
        diagnostics.report(
            DiagnosticCode::PropertyMustBeReadOnly,
            &subject,
            "the requester property must not have a setter",
        );
    }
}

/// Shape rules for ordinary (non-requester) properties.
pub fn property_shape(property: &PropertyModel, diagnostics: &mut Diagnostics) {
    let subject = format!("property {}", property.name);
    if !(property.has_getter && property.has_setter) {
        diagnostics.report(
            DiagnosticCode::PropertyMustBeReadWrite,
            &subject,
            "annotated properties must have both a getter and a setter",
        );
    }
    if property.attrs.len() != 1 {
        diagnostics.report(
            DiagnosticCode::PropertyMustHaveOneAttribute,
            &subject,
            &format!(
                "expected exactly one annotation, found {}",
                property.attrs.len()
            ),
        );
        return;
    }
    if let PropertyAttr::Header(header) = &property.attrs[0] {
        if !header.name.contains(':') {
            diagnostics.report(
                DiagnosticCode::HeaderPropertyNameMustContainColon,
                &subject,
                "property header names carry the wire name and an inline fallback separated by ':'",
            );
        }
        if header.value.is_some() && !property.type_ref.nullable {
            diagnostics.report(
                DiagnosticCode::HeaderPropertyWithValueMustBeNullable,
                &subject,
                "a property header with a default value needs a nullable backing type",
            );
        }
    }
}

/// The path keys contributed by the model's properties, in declaration
/// order, duplicates included.
pub fn path_property_keys(model: &TypeModel) -> Vec<String> {
    model
        .properties
        .iter()
        .filter(|p| !p.is_requester)
        .filter_map(|p| p.path_key().map(str::to_string))
        .collect()
}

/// Path property keys must be unique across the type, and every base-path
/// placeholder must be matched by one of them.
pub fn path_properties(model: &TypeModel, diagnostics: &mut Diagnostics) {
    let keys = path_property_keys(model);
    let mut seen: Vec<&str> = vec![];
    for key in &keys {
        if seen.contains(&key.as_str()) {
            diagnostics.report(
                DiagnosticCode::MultiplePathPropertiesForKey,
                &format!("path property key '{}' on interface {}", key, model.name),
                "path property keys must be unique across the interface",
            );
        } else {
            seen.push(key);
        }
    }
    if let Some(base) = &model.base_path {
        for placeholder in template::placeholders(base) {
            if !seen.contains(&placeholder) {
                diagnostics.report(
                    DiagnosticCode::MissingPathPropertyForBasePathPlaceholder,
                    &format!(
                        "placeholder '{}' in base path of interface {}",
                        placeholder, model.name
                    ),
                    "base path placeholders must be matched by a path property",
                );
            }
        }
    }
}

/// Method-level header names share the interface-level colon rule.
pub fn method_headers(method: &MethodModel, diagnostics: &mut Diagnostics) {
    for header in &method.headers {
        if header.name.contains(':') {
            diagnostics.report(
                DiagnosticCode::HeaderOnInterfaceMustNotHaveColonInName,
                &format!("header '{}' on method {}", header.name, method.name),
                "method header names must not contain ':'",
            );
        }
    }
}

/// Cross-check a method's path template against its path parameters and the
/// type's path properties, in both directions.
pub fn method_path(
    method: &MethodModel,
    request: &RequestAttr,
    type_path_keys: &[String],
    diagnostics: &mut Diagnostics,
) {
    let mut param_keys: Vec<&str> = vec![];
    for param in &method.params {
        if let Some(key) = param.path_key() {
            if param_keys.contains(&key) {
                diagnostics.report(
                    DiagnosticCode::MultiplePathParametersForKey,
                    &format!(
                        "parameter {} of method {}",
                        param.name, method.name
                    ),
                    &format!("duplicate path key '{}'", key),
                );
            } else {
                param_keys.push(key);
            }
        }
    }

    let placeholders = template::placeholders(&request.path);
    for placeholder in &placeholders {
        let matched = param_keys.contains(placeholder)
            || type_path_keys.iter().any(|k| k == placeholder);
        if !matched {
            diagnostics.report(
                DiagnosticCode::MissingPathPropertyOrParameterForPlaceholder,
                &format!(
                    "placeholder '{}' in path of method {}",
                    placeholder, method.name
                ),
                "no path parameter or path property matches this placeholder",
            );
        }
    }
    for key in &param_keys {
        if !placeholders.contains(key) {
            diagnostics.report(
                DiagnosticCode::MissingPlaceholderForPathParameter,
                &format!("path parameter '{}' of method {}", key, method.name),
                "the method's path template has no matching placeholder",
            );
        }
    }
}

/// Request-property keys must be unique across a method's parameters.
/// Comparison is case-sensitive.
pub fn request_property_keys(method: &MethodModel, diagnostics: &mut Diagnostics) {
    let mut seen: Vec<&str> = vec![];
    for param in &method.params {
        for attr in &param.attrs {
            if let ParameterAttr::RequestProperty(rp) = attr {
                let key = rp.key.as_deref().unwrap_or(&param.name);
                if seen.contains(&key) {
                    diagnostics.report(
                        DiagnosticCode::DuplicateRequestPropertyKey,
                        &format!(
                            "parameter {} of method {}",
                            param.name, method.name
                        ),
                        &format!("duplicate request property key '{}'", key),
                    );
                } else {
                    seen.push(key);
                }
            }
        }
    }
}
