use async_trait::async_trait;
use log::*;
use serde_json::{json, Value};

use restgen::prelude::*;
use restgen::requester::ByteStream;

// restgen uses the log crate for logging
// plan assembly has detailed description logging at TRACE level
// just a very basic stderr setup for demonstration
fn setup_logging() {
    stderrlog::new()
        .module(module_path!())
        .module("restgen")
        .verbosity(4)
        .timestamp(stderrlog::Timestamp::Millisecond)
        .init()
        .unwrap();
}

// A requester owns the transport; this one just prints what it would send.
// A real implementation would hand the description to an HTTP client and
// apply the configured serializers.
struct PrintingRequester;

#[async_trait]
impl Requester for PrintingRequester {
    async fn request_void(&self, description: RequestDescription) -> Result<(), RequesterError> {
        info!("{} {}", description.method, description.resolved_path());
        Ok(())
    }
    async fn request_value(
        &self,
        description: RequestDescription,
    ) -> Result<Value, RequesterError> {
        info!("{} {}", description.method, description.resolved_path());
        for (name, value) in &description.headers {
            info!("  {}: {}", name, value);
        }
        for query in &description.queries {
            info!("  ? {}={}", query.name, query.value);
        }
        Ok(json!([{"login": "ferris"}]))
    }
    async fn request_response_message(
        &self,
        _description: RequestDescription,
    ) -> Result<ResponseMessage, RequesterError> {
        Ok(ResponseMessage::new(200))
    }
    async fn request_with_response(
        &self,
        _description: RequestDescription,
    ) -> Result<Response<Value>, RequesterError> {
        Ok(Response::new(ResponseMessage::new(200), Value::Null))
    }
    async fn request_bytes(
        &self,
        _description: RequestDescription,
    ) -> Result<Vec<u8>, RequesterError> {
        Ok(vec![])
    }
    async fn request_string(
        &self,
        _description: RequestDescription,
    ) -> Result<String, RequesterError> {
        Ok(String::new())
    }
    async fn request_stream(
        &self,
        _description: RequestDescription,
    ) -> Result<ByteStream, RequesterError> {
        Ok(Box::pin(futures::stream::empty()))
    }
    fn dispose(&self) {
        info!("requester disposed");
    }
}

// The descriptor a discovery surface (macro, analyzer) would produce for:
//
//   interface IGitHub {
//       [Path] accountId: String
//       [Header("User-Agent: restgen-demo")] userAgent: Option<String>
//       [Get("/accounts/{accountId}/users")]
//       fn list_users([Query] page: u32) -> Vec<User>
//       fn close()
//   }
fn github_model() -> TypeModel {
    TypeModel::new("IGitHub")
        .with_property(
            PropertyModel::new("accountId", TypeRef::new("String"))
                .with_attr(PropertyAttr::Path(PathAttr::new())),
        )
        .with_property(
            PropertyModel::new("userAgent", TypeRef::nullable("Option<String>")).with_attr(
                PropertyAttr::Header(HeaderAttr::new("User-Agent: restgen-demo")),
            ),
        )
        .with_method(
            MethodModel::new("list_users", ReturnType::new("Vec<User>", ReturnShape::Body))
                .with_request(Method::GET, "/accounts/{accountId}/users")
                .with_param(
                    ParameterModel::new("page", TypeRef::new("u32"))
                        .with_attr(ParameterAttr::Query(QueryAttr::new())),
                ),
        )
        .with_method(MethodModel::dispose("close"))
}

#[tokio::main]
async fn main() {
    setup_logging();

    let model = github_model();

    // the source backend renders the same emission sequence as text
    let source = generate_source(&model);
    println!("{}", source.artifact);

    let plan = match generate_plan(&model).into_result() {
        Ok(plan) => plan,
        Err(diagnostics) => {
            error!("generation failed:\n{}", diagnostics);
            return;
        }
    };

    let requester = PrintingRequester;
    let properties = [json!("A1"), Value::Null];
    let outcome = plan
        .execute(&requester, "list_users", &properties, &[ArgValue::from(2u64)])
        .await
        .unwrap();
    info!("outcome: {:?}", outcome);

    plan.dispose(&requester);
}
