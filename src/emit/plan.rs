//! The runtime plan backend.
//!
//! Each emission operation appends a tagged record; [`TypeEmitter::generate`]
//! wraps the records into an immutable [`TypePlan`]. Invoking a plan walks
//! the records to assemble a [`RequestDescription`] and dispatches it to the
//! requester operation matching the method's return shape.
//!
//! A plan holds no interior mutability and may be shared freely across
//! threads (wrap it in an `Arc`); per-call state lives entirely in the
//! description being assembled.
use std::fmt;

use log::{debug, trace};
use serde_json::Value;

use crate::content::display_value;
use crate::emit::{split_header_name, EmittedProperty, Emitter, MethodEmitter, PropertyRole, TypeEmitter};
use crate::model::{Method, MethodModel, ParameterModel, PropertyModel, ReturnShape, TypeModel};
use crate::request::{BodyContent, PathSubstitution, QueryEntry, RequestDescription};
use crate::requester::{ArgValue, Requester, RequesterError};
use crate::serialization::{
    BodySerializationMethod, PathSerializationMethod, QuerySerializationMethod,
};

/// One recorded emission operation. Slot indices refer to the type's
/// property value slots; parameter indices refer to declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOp {
    SetAllowAnyStatusCode,
    SetBasePath {
        template: String,
    },
    AddHeaderProperty {
        slot: usize,
        name: String,
        default: Option<String>,
    },
    AddPathProperty {
        slot: usize,
        key: String,
        serialization: PathSerializationMethod,
    },
    AddQueryProperty {
        slot: usize,
        name: String,
        serialization: QuerySerializationMethod,
    },
    AddRequestPropertyProperty {
        slot: usize,
        key: String,
    },
    AddMethodHeader {
        name: String,
        value: Option<String>,
    },
    SetCancellationToken {
        index: usize,
    },
    AddHeaderParameter {
        index: usize,
        name: String,
    },
    AddPathParameter {
        index: usize,
        key: String,
        serialization: PathSerializationMethod,
    },
    AddQueryParameter {
        index: usize,
        name: String,
        serialization: QuerySerializationMethod,
    },
    AddRequestPropertyParameter {
        index: usize,
        key: String,
    },
    AddRawQueryStringParameter {
        index: usize,
    },
    AddQueryMapParameter {
        index: usize,
        serialization: QuerySerializationMethod,
    },
    SetBodyParameter {
        index: usize,
        serialization: BodySerializationMethod,
    },
}

/// The recorded construction recipe for one request method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodPlan {
    pub name: String,
    pub verb: Method,
    pub path_template: String,
    pub ops: Vec<RequestOp>,
    pub dispatch: Option<ReturnShape>,
}

/// The immutable artifact of plan emission: everything needed to assemble
/// and dispatch requests for one interface.
#[derive(Debug, Clone, PartialEq)]
pub struct TypePlan {
    interface: String,
    headers: Vec<(String, String)>,
    property_slots: Vec<String>,
    requester_property: Option<String>,
    methods: Vec<MethodPlan>,
    dispose: Option<String>,
}

/// What a dispatched call produced, by return shape.
pub enum Dispatched {
    Unit,
    Value(Value),
    ResponseMessage(crate::requester::ResponseMessage),
    Response(crate::requester::Response<Value>),
    Bytes(Vec<u8>),
    Text(String),
    Stream(crate::requester::ByteStream),
}

impl fmt::Debug for Dispatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatched::Unit => write!(f, "Unit"),
            Dispatched::Value(v) => write!(f, "Value({})", v),
            Dispatched::ResponseMessage(m) => write!(f, "ResponseMessage({})", m.status_code),
            Dispatched::Response(r) => write!(f, "Response({})", r.message.status_code),
            Dispatched::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Dispatched::Text(t) => write!(f, "Text({:?})", t),
            Dispatched::Stream(_) => write!(f, "Stream"),
        }
    }
}

/// A call against a plan did not line up with the plan.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeError {
    UnknownMethod { method: String },
    NoDispatch { method: String },
    ArgumentMismatch { method: String, reason: String },
}

impl InvokeError {
    fn unknown(method: &str) -> Self {
        InvokeError::UnknownMethod {
            method: method.to_string(),
        }
    }
    fn no_dispatch(method: &str) -> Self {
        InvokeError::NoDispatch {
            method: method.to_string(),
        }
    }
    fn mismatch(method: &str, reason: &str) -> Self {
        InvokeError::ArgumentMismatch {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::UnknownMethod { method } => {
                write!(f, "no method '{}' in the plan", method)
            }
            InvokeError::NoDispatch { method } => write!(
                f,
                "method '{}' has no dispatch recorded; generation reported its return type",
                method
            ),
            InvokeError::ArgumentMismatch { method, reason } => {
                write!(f, "invoking '{}': {}", method, reason)
            }
        }
    }
}

/// A plan invocation failed, either before dispatch or inside the requester.
#[derive(Debug)]
pub enum ExecuteError {
    Invoke(InvokeError),
    Requester(RequesterError),
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteError::Invoke(e) => write!(f, "{}", e),
            ExecuteError::Requester(e) => write!(f, "{}", e),
        }
    }
}

impl From<InvokeError> for ExecuteError {
    fn from(e: InvokeError) -> Self {
        ExecuteError::Invoke(e)
    }
}

impl From<RequesterError> for ExecuteError {
    fn from(e: RequesterError) -> Self {
        ExecuteError::Requester(e)
    }
}

impl TypePlan {
    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn methods(&self) -> &[MethodPlan] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodPlan> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Property slot names, in property declaration order. Invocations pass
    /// property values in this order.
    pub fn property_slots(&self) -> &[String] {
        &self.property_slots
    }

    pub fn property_slot(&self, name: &str) -> Option<usize> {
        self.property_slots.iter().position(|n| n == name)
    }

    pub fn requester_property(&self) -> Option<&str> {
        self.requester_property.as_deref()
    }

    pub fn dispose_method(&self) -> Option<&str> {
        self.dispose.as_deref()
    }

    /// Walk the recorded ops and assemble the request description for one
    /// call: the synchronous half of an invocation.
    pub fn describe(
        &self,
        method_name: &str,
        properties: &[Value],
        args: &[ArgValue],
    ) -> Result<RequestDescription, InvokeError> {
        let plan = self
            .methods
            .iter()
            .find(|m| m.name == method_name)
            .ok_or_else(|| InvokeError::unknown(method_name))?;

        debug!(
            "assembling request for {}::{}",
            self.interface, plan.name
        );
        let mut description =
            RequestDescription::new(plan.verb, &plan.path_template, &plan.name);
        for (name, value) in &self.headers {
            description.headers.push((name.clone(), value.clone()));
        }

        for op in &plan.ops {
            self.apply(plan, op, &mut description, properties, args)?;
        }
        trace!("DESCRIPTION {:?}", description);
        Ok(description)
    }

    fn apply(
        &self,
        plan: &MethodPlan,
        op: &RequestOp,
        description: &mut RequestDescription,
        properties: &[Value],
        args: &[ArgValue],
    ) -> Result<(), InvokeError> {
        match op {
            RequestOp::SetAllowAnyStatusCode => description.allow_any_status_code = true,
            RequestOp::SetBasePath { template } => {
                description.base_path = Some(template.clone())
            }
            RequestOp::AddHeaderProperty {
                slot,
                name,
                default,
            } => {
                let value = self.property_value(plan, properties, *slot)?;
                let (wire, inline) = split_header_name(name);
                let rendered = if value.is_null() {
                    default
                        .clone()
                        .or_else(|| inline.map(str::to_string))
                } else {
                    Some(display_value(value))
                };
                if let Some(rendered) = rendered {
                    description.headers.push((wire.to_string(), rendered));
                }
            }
            RequestOp::AddPathProperty {
                slot,
                key,
                serialization,
            } => {
                let value = self.property_value(plan, properties, *slot)?;
                description.path_substitutions.push(PathSubstitution {
                    name: key.clone(),
                    value: value.clone(),
                    serialization: *serialization,
                });
            }
            RequestOp::AddQueryProperty {
                slot,
                name,
                serialization,
            } => {
                let value = self.property_value(plan, properties, *slot)?;
                if !value.is_null() {
                    description.queries.push(QueryEntry {
                        name: name.clone(),
                        value: value.clone(),
                        serialization: *serialization,
                    });
                }
            }
            RequestOp::AddRequestPropertyProperty { slot, key } => {
                let value = self.property_value(plan, properties, *slot)?;
                description
                    .request_properties
                    .push((key.clone(), value.clone()));
            }
            RequestOp::AddMethodHeader { name, value } => {
                description
                    .headers
                    .push((name.clone(), value.clone().unwrap_or_default()));
            }
            RequestOp::SetCancellationToken { index } => match args.get(*index) {
                Some(ArgValue::Cancellation(token)) => {
                    description.cancellation = Some(token.clone())
                }
                _ => {
                    return Err(InvokeError::mismatch(
                        &plan.name,
                        &format!("expected a cancellation token at argument {}", index),
                    ))
                }
            },
            RequestOp::AddHeaderParameter { index, name } => {
                let value = argument_value(plan, args, *index)?;
                if !value.is_null() {
                    description
                        .headers
                        .push((name.clone(), display_value(value)));
                }
            }
            RequestOp::AddPathParameter {
                index,
                key,
                serialization,
            } => {
                let value = argument_value(plan, args, *index)?;
                description.path_substitutions.push(PathSubstitution {
                    name: key.clone(),
                    value: value.clone(),
                    serialization: *serialization,
                });
            }
            RequestOp::AddQueryParameter {
                index,
                name,
                serialization,
            } => {
                let value = argument_value(plan, args, *index)?;
                if !value.is_null() {
                    description.queries.push(QueryEntry {
                        name: name.clone(),
                        value: value.clone(),
                        serialization: *serialization,
                    });
                }
            }
            RequestOp::AddRequestPropertyParameter { index, key } => {
                let value = argument_value(plan, args, *index)?;
                description
                    .request_properties
                    .push((key.clone(), value.clone()));
            }
            RequestOp::AddRawQueryStringParameter { index } => {
                let value = argument_value(plan, args, *index)?;
                if !value.is_null() {
                    description.raw_query_strings.push(display_value(value));
                }
            }
            RequestOp::AddQueryMapParameter {
                index,
                serialization,
            } => {
                let value = argument_value(plan, args, *index)?;
                match value {
                    Value::Null => (),
                    Value::Object(entries) => {
                        for (name, item) in entries {
                            match item {
                                Value::Null => (),
                                Value::Array(items) => {
                                    for item in items {
                                        description.queries.push(QueryEntry {
                                            name: name.clone(),
                                            value: item.clone(),
                                            serialization: *serialization,
                                        });
                                    }
                                }
                                other => description.queries.push(QueryEntry {
                                    name: name.clone(),
                                    value: other.clone(),
                                    serialization: *serialization,
                                }),
                            }
                        }
                    }
                    _ => {
                        return Err(InvokeError::mismatch(
                            &plan.name,
                            &format!(
                                "query map argument {} must be a key-value mapping",
                                index
                            ),
                        ))
                    }
                }
            }
            RequestOp::SetBodyParameter {
                index,
                serialization,
            } => {
                let value = argument_value(plan, args, *index)?;
                description.body = Some(BodyContent {
                    value: value.clone(),
                    serialization: *serialization,
                });
            }
        }
        Ok(())
    }

    fn property_value<'v>(
        &self,
        plan: &MethodPlan,
        properties: &'v [Value],
        slot: usize,
    ) -> Result<&'v Value, InvokeError> {
        properties.get(slot).ok_or_else(|| {
            InvokeError::mismatch(
                &plan.name,
                &format!(
                    "expected {} property values, got {}",
                    self.property_slots.len(),
                    properties.len()
                ),
            )
        })
    }

    /// Assemble the description and dispatch it to the requester operation
    /// matching the recorded return shape.
    pub async fn execute(
        &self,
        requester: &dyn Requester,
        method_name: &str,
        properties: &[Value],
        args: &[ArgValue],
    ) -> Result<Dispatched, ExecuteError> {
        let dispatch = self
            .method(method_name)
            .ok_or_else(|| InvokeError::unknown(method_name))?
            .dispatch
            .ok_or_else(|| InvokeError::no_dispatch(method_name))?;
        let description = self.describe(method_name, properties, args)?;
        let outcome = match dispatch {
            ReturnShape::Unit => {
                requester.request_void(description).await?;
                Dispatched::Unit
            }
            ReturnShape::Body => Dispatched::Value(requester.request_value(description).await?),
            ReturnShape::ResponseMessage => {
                Dispatched::ResponseMessage(requester.request_response_message(description).await?)
            }
            ReturnShape::Response => {
                Dispatched::Response(requester.request_with_response(description).await?)
            }
            ReturnShape::Bytes => Dispatched::Bytes(requester.request_bytes(description).await?),
            ReturnShape::Text => Dispatched::Text(requester.request_string(description).await?),
            ReturnShape::Stream => {
                Dispatched::Stream(requester.request_stream(description).await?)
            }
        };
        Ok(outcome)
    }

    /// Delegate resource release to the requester, if the interface
    /// declared a dispose method.
    pub fn dispose(&self, requester: &dyn Requester) {
        if self.dispose.is_some() {
            requester.dispose();
        }
    }
}

fn argument_value<'v>(
    plan: &MethodPlan,
    args: &'v [ArgValue],
    index: usize,
) -> Result<&'v Value, InvokeError> {
    match args.get(index) {
        Some(ArgValue::Value(v)) => Ok(v),
        Some(ArgValue::Cancellation(_)) => Err(InvokeError::mismatch(
            &plan.name,
            &format!("expected a plain value at argument {}", index),
        )),
        None => Err(InvokeError::mismatch(
            &plan.name,
            &format!("expected at least {} arguments, got {}", index + 1, args.len()),
        )),
    }
}

/// The plan backend entry point.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanEmitter;

impl PlanEmitter {
    pub fn new() -> Self {
        PlanEmitter
    }
}

impl Emitter for PlanEmitter {
    type Type = PlanTypeEmitter;

    fn emit_type(&mut self, model: &TypeModel) -> PlanTypeEmitter {
        PlanTypeEmitter {
            interface: model.name.clone(),
            headers: model
                .headers
                .iter()
                .filter_map(|h| h.value.as_ref().map(|v| (h.name.clone(), v.clone())))
                .collect(),
            property_slots: vec![],
            requester_property: None,
            methods: vec![],
            dispose: None,
        }
    }
}

/// Accumulates the plan for one interface.
#[derive(Debug)]
pub struct PlanTypeEmitter {
    interface: String,
    headers: Vec<(String, String)>,
    property_slots: Vec<String>,
    requester_property: Option<String>,
    methods: Vec<MethodPlan>,
    dispose: Option<String>,
}

impl TypeEmitter for PlanTypeEmitter {
    type Method = PlanMethodEmitter;
    type Artifact = TypePlan;

    fn emit_requester_property(&mut self, property: &PropertyModel) {
        self.requester_property = Some(property.name.clone());
    }

    fn emit_property(&mut self, property: &PropertyModel, role: PropertyRole) -> EmittedProperty {
        let slot = self.property_slots.len();
        self.property_slots.push(property.name.clone());
        EmittedProperty {
            slot,
            name: property.name.clone(),
            role,
        }
    }

    fn start_method(&mut self, method: &MethodModel) -> PlanMethodEmitter {
        PlanMethodEmitter {
            name: method.name.clone(),
            verb: None,
            path_template: String::new(),
            ops: vec![],
            dispatch: None,
        }
    }

    fn finish_method(&mut self, method: PlanMethodEmitter) {
        debug_assert!(
            method.verb.is_some(),
            "method emitter finished without request info"
        );
        self.methods.push(MethodPlan {
            name: method.name,
            verb: method.verb.unwrap_or(Method::GET),
            path_template: method.path_template,
            ops: method.ops,
            dispatch: method.dispatch,
        });
    }

    fn emit_dispose_method(&mut self, method: &MethodModel) {
        self.dispose = Some(method.name.clone());
    }

    fn generate(self) -> TypePlan {
        debug!(
            "emitted plan for {}: {} property slots, {} methods",
            self.interface,
            self.property_slots.len(),
            self.methods.len()
        );
        TypePlan {
            interface: self.interface,
            headers: self.headers,
            property_slots: self.property_slots,
            requester_property: self.requester_property,
            methods: self.methods,
            dispose: self.dispose,
        }
    }
}

/// Records the ops for one method.
#[derive(Debug)]
pub struct PlanMethodEmitter {
    name: String,
    verb: Option<Method>,
    path_template: String,
    ops: Vec<RequestOp>,
    dispatch: Option<ReturnShape>,
}

impl MethodEmitter for PlanMethodEmitter {
    fn emit_request_info_creation(&mut self, method: Method, path: &str) {
        debug_assert!(self.verb.is_none(), "request info emitted twice");
        self.verb = Some(method);
        self.path_template = path.to_string();
    }

    fn emit_set_allow_any_status_code(&mut self) {
        self.ops.push(RequestOp::SetAllowAnyStatusCode);
    }

    fn emit_set_base_path(&mut self, template: &str) {
        self.ops.push(RequestOp::SetBasePath {
            template: template.to_string(),
        });
    }

    fn emit_add_header_property(&mut self, property: &EmittedProperty) {
        if let PropertyRole::Header { name, default } = &property.role {
            self.ops.push(RequestOp::AddHeaderProperty {
                slot: property.slot,
                name: name.clone(),
                default: default.clone(),
            });
        }
    }

    fn emit_add_path_property(
        &mut self,
        property: &EmittedProperty,
        serialization: PathSerializationMethod,
    ) {
        if let PropertyRole::Path { key, .. } = &property.role {
            self.ops.push(RequestOp::AddPathProperty {
                slot: property.slot,
                key: key.clone(),
                serialization,
            });
        }
    }

    fn emit_add_query_property(
        &mut self,
        property: &EmittedProperty,
        serialization: QuerySerializationMethod,
    ) {
        if let PropertyRole::Query { name, .. } = &property.role {
            self.ops.push(RequestOp::AddQueryProperty {
                slot: property.slot,
                name: name.clone(),
                serialization,
            });
        }
    }

    fn emit_add_request_property_property(&mut self, property: &EmittedProperty) {
        if let PropertyRole::RequestProperty { key } = &property.role {
            self.ops.push(RequestOp::AddRequestPropertyProperty {
                slot: property.slot,
                key: key.clone(),
            });
        }
    }

    fn emit_add_method_header(&mut self, name: &str, value: Option<&str>) {
        self.ops.push(RequestOp::AddMethodHeader {
            name: name.to_string(),
            value: value.map(str::to_string),
        });
    }

    fn emit_set_cancellation_token(&mut self, index: usize, _param: &ParameterModel) {
        self.ops.push(RequestOp::SetCancellationToken { index });
    }

    fn emit_add_header_parameter(&mut self, index: usize, _param: &ParameterModel, name: &str) {
        self.ops.push(RequestOp::AddHeaderParameter {
            index,
            name: name.to_string(),
        });
    }

    fn emit_add_path_parameter(
        &mut self,
        index: usize,
        _param: &ParameterModel,
        key: &str,
        serialization: PathSerializationMethod,
    ) {
        self.ops.push(RequestOp::AddPathParameter {
            index,
            key: key.to_string(),
            serialization,
        });
    }

    fn emit_add_query_parameter(
        &mut self,
        index: usize,
        _param: &ParameterModel,
        name: &str,
        serialization: QuerySerializationMethod,
    ) {
        self.ops.push(RequestOp::AddQueryParameter {
            index,
            name: name.to_string(),
            serialization,
        });
    }

    fn emit_add_request_property_parameter(
        &mut self,
        index: usize,
        _param: &ParameterModel,
        key: &str,
    ) {
        self.ops.push(RequestOp::AddRequestPropertyParameter {
            index,
            key: key.to_string(),
        });
    }

    fn emit_add_raw_query_string_parameter(&mut self, index: usize, _param: &ParameterModel) {
        self.ops.push(RequestOp::AddRawQueryStringParameter { index });
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
        self.ops.push(RequestOp::AddQueryMapParameter {
            index,
            serialization,
        });
        true
    }

    fn emit_set_body_parameter(
        &mut self,
        index: usize,
        _param: &ParameterModel,
        serialization: BodySerializationMethod,
    ) {
        self.ops.push(RequestOp::SetBodyParameter {
            index,
            serialization,
        });
    }

    fn try_emit_request_method_invocation(&mut self, method: &MethodModel) -> bool {
        match method.return_type.shape {
            Some(shape) => {
                self.dispatch = Some(shape);
                true
            }
            None => false,
        }
    }
}
