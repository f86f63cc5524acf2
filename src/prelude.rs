pub use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use crate::emit::plan::{Dispatched, PlanEmitter, TypePlan};
pub use crate::emit::source::SourceEmitter;
pub use crate::generate::{generate, generate_plan, generate_source, Generated};
pub use crate::model::{
    BodyAttr, HeaderAttr, Method, MethodModel, ParameterAttr, ParameterModel, PathAttr,
    PropertyAttr, PropertyModel, QueryAttr, RequestPropertyAttr, ReturnShape, ReturnType,
    TypeModel, TypeRef,
};
pub use crate::request::RequestDescription;
pub use crate::requester::{
    ArgValue, CancellationToken, Requester, RequesterError, Response, ResponseMessage,
};
pub use crate::serialization::{
    BodySerializationMethod, PathSerializationMethod, QuerySerializationMethod,
    SerializationMethodsAttr,
};
