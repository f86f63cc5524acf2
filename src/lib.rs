//! Components for generating declarative HTTP clients. This is a learning
//! project, use at your own risk.
//! * Passive [interface models](crate::model::TypeModel) built by any
//!   discovery surface
//! * A [validation pass](crate::validate) that accumulates
//!   [diagnostics](crate::diagnostics) instead of aborting
//! * [Serialization method resolution](crate::serialization) by precedence
//! * Pluggable [emission backends](crate::emit): a runtime
//!   [plan](crate::emit::plan) and a [source-text](crate::emit::source)
//!   renderer
//! * A pluggable async [requester](crate::requester::Requester) that
//!   executes the assembled [request descriptions](crate::request)
//!
//! # Example
//! ```
//! use restgen::prelude::*;
//!
//! let model = TypeModel::new("IGitHub")
//!     .with_header("User-Agent", Some("restgen"))
//!     .with_property(
//!         PropertyModel::new("accountId", TypeRef::new("String"))
//!             .with_attr(PropertyAttr::Path(PathAttr::new())),
//!     )
//!     .with_method(
//!         MethodModel::new("list_users", ReturnType::new("Vec<User>", ReturnShape::Body))
//!             .with_request(Method::GET, "/accounts/{accountId}/users")
//!             .with_param(ParameterModel::new("page", TypeRef::new("u32"))),
//!     );
//!
//! let generated = generate_plan(&model);
//! assert!(generated.diagnostics.is_empty());
//!
//! let plan = generated.artifact;
//! let description = plan
//!     .describe("list_users", &[serde_json::json!("A1")], &[ArgValue::from(2u64)])
//!     .unwrap();
//! assert_eq!(description.resolved_path(), "/accounts/A1/users");
//! assert_eq!(description.queries[0].name, "page");
//! ```
pub mod content;
pub mod diagnostics;
pub mod emit;
pub mod generate;
pub mod model;
pub mod prelude;
pub mod request;
pub mod requester;
pub mod serialization;
pub mod template;
pub mod validate;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
