//! The source-text backend.
//!
//! Each emission operation appends a fragment to a text builder; the
//! generate step returns the accumulated text for downstream compilation.
//! Output is deterministic: equal models produce byte-identical text.
use std::fmt::Write;

use crate::emit::{EmittedProperty, Emitter, MethodEmitter, PropertyRole, TypeEmitter};
use crate::model::{Method, MethodModel, ParameterModel, PropertyModel, ReturnShape, TypeModel};
use crate::serialization::{
    BodySerializationMethod, PathSerializationMethod, QuerySerializationMethod,
};

/// The source backend entry point.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceEmitter;

impl SourceEmitter {
    pub fn new() -> Self {
        SourceEmitter
    }
}

impl Emitter for SourceEmitter {
    type Type = SourceTypeEmitter;

    fn emit_type(&mut self, model: &TypeModel) -> SourceTypeEmitter {
        let mut out = String::new();
        let _ = writeln!(out, "// generated implementation of {}", model.name);
        for header in &model.headers {
            if let Some(value) = &header.value {
                let _ = writeln!(
                    out,
                    "// interface header: {}: {} (from {})",
                    header.name, value, header.declared_on
                );
            }
        }
        SourceTypeEmitter { out, slots: 0 }
    }
}

/// Accumulates the source text for one interface.
#[derive(Debug)]
pub struct SourceTypeEmitter {
    out: String,
    slots: usize,
}

impl TypeEmitter for SourceTypeEmitter {
    type Method = SourceMethodEmitter;
    type Artifact = String;

    fn emit_requester_property(&mut self, property: &PropertyModel) {
        let _ = writeln!(self.out, "// requester property: {}", property.name);
    }

    fn emit_property(&mut self, property: &PropertyModel, role: PropertyRole) -> EmittedProperty {
        // slots are assigned in emission order, same as the plan backend
        let slot = self.slots;
        self.slots += 1;
        let _ = writeln!(
            self.out,
            "// property slot {}: {} ({:?})",
            slot, property.name, role
        );
        EmittedProperty {
            slot,
            name: property.name.clone(),
            role,
        }
    }

    fn start_method(&mut self, method: &MethodModel) -> SourceMethodEmitter {
        SourceMethodEmitter {
            name: method.name.clone(),
            lines: vec![],
        }
    }

    fn finish_method(&mut self, method: SourceMethodEmitter) {
        let _ = writeln!(self.out, "fn {}(requester, properties, args) {{", method.name);
        for line in &method.lines {
            let _ = writeln!(self.out, "    {}", line);
        }
        let _ = writeln!(self.out, "}}");
    }

    fn emit_dispose_method(&mut self, method: &MethodModel) {
        let _ = writeln!(self.out, "fn {}(requester) {{", method.name);
        let _ = writeln!(self.out, "    requester.dispose()");
        let _ = writeln!(self.out, "}}");
    }

    fn generate(self) -> String {
        self.out
    }
}

/// Accumulates the fragments for one method body.
#[derive(Debug)]
pub struct SourceMethodEmitter {
    name: String,
    lines: Vec<String>,
}

impl MethodEmitter for SourceMethodEmitter {
    fn emit_request_info_creation(&mut self, method: Method, path: &str) {
        self.lines.push(format!(
            "let mut request = RequestDescription::new(Method::{}, {:?}, {:?});",
            method, path, self.name
        ));
    }

    fn emit_set_allow_any_status_code(&mut self) {
        self.lines
            .push("request.allow_any_status_code = true;".to_string());
    }

    fn emit_set_base_path(&mut self, template: &str) {
        self.lines
            .push(format!("request.base_path = Some({:?});", template));
    }

    fn emit_add_header_property(&mut self, property: &EmittedProperty) {
        if let PropertyRole::Header { name, default } = &property.role {
            self.lines.push(format!(
                "request.add_header_property(properties[{}], {:?}, default {:?});",
                property.slot, name, default
            ));
        }
    }

    fn emit_add_path_property(
        &mut self,
        property: &EmittedProperty,
        serialization: PathSerializationMethod,
    ) {
        if let PropertyRole::Path { key, .. } = &property.role {
            self.lines.push(format!(
                "request.add_path_property(properties[{}], {:?}, {:?});",
                property.slot, key, serialization
            ));
        }
    }

    fn emit_add_query_property(
        &mut self,
        property: &EmittedProperty,
        serialization: QuerySerializationMethod,
    ) {
        if let PropertyRole::Query { name, .. } = &property.role {
            self.lines.push(format!(
                "request.add_query_property(properties[{}], {:?}, {:?});",
                property.slot, name, serialization
            ));
        }
    }

    fn emit_add_request_property_property(&mut self, property: &EmittedProperty) {
        if let PropertyRole::RequestProperty { key } = &property.role {
            self.lines.push(format!(
                "request.add_request_property(properties[{}], {:?});",
                property.slot, key
            ));
        }
    }

    fn emit_add_method_header(&mut self, name: &str, value: Option<&str>) {
        self.lines.push(format!(
            "request.add_method_header({:?}, {:?});",
            name,
            value.unwrap_or("")
        ));
    }

    fn emit_set_cancellation_token(&mut self, index: usize, param: &ParameterModel) {
        self.lines.push(format!(
            "request.cancellation = Some(args[{}] /* {} */);",
            index, param.name
        ));
    }

    fn emit_add_header_parameter(&mut self, index: usize, param: &ParameterModel, name: &str) {
        self.lines.push(format!(
            "request.add_header_parameter(args[{}] /* {} */, {:?});",
            index, param.name, name
        ));
    }

    fn emit_add_path_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        key: &str,
        serialization: PathSerializationMethod,
    ) {
        self.lines.push(format!(
            "request.add_path_parameter(args[{}] /* {} */, {:?}, {:?});",
            index, param.name, key, serialization
        ));
    }

    fn emit_add_query_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        name: &str,
        serialization: QuerySerializationMethod,
    ) {
        self.lines.push(format!(
            "request.add_query_parameter(args[{}] /* {} */, {:?}, {:?});",
            index, param.name, name, serialization
        ));
    }

    fn emit_add_request_property_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        key: &str,
    ) {
        self.lines.push(format!(
            "request.add_request_property(args[{}] /* {} */, {:?});",
            index, param.name, key
        ));
    }

    fn emit_add_raw_query_string_parameter(&mut self, index: usize, param: &ParameterModel) {
        self.lines.push(format!(
            "request.add_raw_query_string(args[{}] /* {} */);",
            index, param.name
        ));
    }

    fn try_emit_add_query_map_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        serialization: QuerySerializationMethod,
    ) -> bool {
        if !param.type_ref.is_dictionary {
            return false;
        }
        self.lines.push(format!(
            "request.add_query_map(args[{}] /* {} */, {:?});",
            index, param.name, serialization
        ));
        true
    }

    fn emit_set_body_parameter(
        &mut self,
        index: usize,
        param: &ParameterModel,
        serialization: BodySerializationMethod,
    ) {
        self.lines.push(format!(
            "request.body = Some((args[{}] /* {} */, {:?}));",
            index, param.name, serialization
        ));
    }

    fn try_emit_request_method_invocation(&mut self, method: &MethodModel) -> bool {
        let call = match method.return_type.shape {
            Some(ReturnShape::Unit) => "request_void",
            Some(ReturnShape::Body) => "request_value",
            Some(ReturnShape::ResponseMessage) => "request_response_message",
            Some(ReturnShape::Response) => "request_with_response",
            Some(ReturnShape::Bytes) => "request_bytes",
            Some(ReturnShape::Text) => "request_string",
            Some(ReturnShape::Stream) => "request_stream",
            None => return false,
        };
        self.lines
            .push(format!("requester.{}(request).await", call));
        true
    }
}

#[cfg(test)]
mod test {
    use crate::generate::generate_source;
    use crate::model::{
        MethodModel, ParameterAttr, ParameterModel, PathAttr, PropertyAttr, PropertyModel,
        QueryAttr, ReturnType, TypeModel, TypeRef,
    };
    use crate::model::{Method, ReturnShape};

    #[test]
    fn test_source_text_orders_contributions() {
        let model = TypeModel::new("IApi")
            .with_header("X-Type", Some("t"))
            .with_base_path("/api")
            .with_property(
                PropertyModel::new("q", TypeRef::new("String"))
                    .with_attr(PropertyAttr::Query(QueryAttr::new())),
            )
            .with_method(
                MethodModel::new("get_user", ReturnType::new("User", ReturnShape::Body))
                    .with_request(Method::GET, "/users/{id}")
                    .with_param(
                        ParameterModel::new("id", TypeRef::new("u64"))
                            .with_attr(ParameterAttr::Path(PathAttr::new())),
                    ),
            )
            .with_method(MethodModel::dispose("close"));
        let generated = generate_source(&model);
        assert!(generated.diagnostics.is_empty());

        let text = generated.artifact;
        assert!(text.starts_with("// generated implementation of IApi\n"));
        let base_path = text.find("request.base_path").unwrap();
        let query_property = text.find("request.add_query_property").unwrap();
        let path_parameter = text.find("request.add_path_parameter").unwrap();
        let dispatch = text.find("requester.request_value(request).await").unwrap();
        assert!(base_path < query_property);
        assert!(query_property < path_parameter);
        assert!(path_parameter < dispatch);
        assert!(text.contains("fn close(requester) {\n    requester.dispose()\n}"));
    }

    #[test]
    fn test_source_text_skips_dispatch_for_unrecognized_return() {
        let model = TypeModel::new("IApi").with_method(
            MethodModel::new("get", ReturnType::unrecognized("u8"))
                .with_request(Method::GET, "/"),
        );
        let generated = generate_source(&model);
        assert!(!generated.artifact.contains("requester.request"));
    }
}
