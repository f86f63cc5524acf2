//! The injected request executor and the values that flow into it.
//!
//! The generator never talks to the network; a generated plan dispatches
//! each call to one of the operations here, chosen by the method's return
//! shape. Implementations own the transport and the serializer strategies
//! from [`content`](crate::content).
use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::Value;
pub use tokio_util::sync::CancellationToken;

use crate::content::SerializationError;
use crate::request::RequestDescription;

/// Raw body bytes delivered incrementally, for stream-shaped methods.
pub type ByteStream = BoxStream<'static, Result<Bytes, RequesterError>>;

/// One argument at a call site: either a plain value or the cooperative
/// cancellation handle.
#[derive(Debug, Clone)]
pub enum ArgValue {
    Value(Value),
    Cancellation(CancellationToken),
}

impl ArgValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ArgValue::Value(v) => Some(v),
            ArgValue::Cancellation(_) => None,
        }
    }

    /// Serialize any serde-serializable argument into a plain value.
    pub fn serialized<T: serde::Serialize>(value: T) -> Result<ArgValue, SerializationError> {
        match serde_json::to_value(value) {
            Ok(v) => Ok(ArgValue::Value(v)),
            Err(e) => Err(SerializationError::new(&e.to_string())),
        }
    }
}

impl From<Value> for ArgValue {
    fn from(v: Value) -> Self {
        ArgValue::Value(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Value(Value::from(v))
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Value(Value::from(v))
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Value(Value::from(v))
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Value(Value::from(v))
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        ArgValue::Value(Value::from(v))
    }
}

impl From<CancellationToken> for ArgValue {
    fn from(token: CancellationToken) -> Self {
        ArgValue::Cancellation(token)
    }
}

/// A raw HTTP response: status, headers, body bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseMessage {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ResponseMessage {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: vec![],
            body: vec![],
        }
    }
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

/// A deserialized body paired with the response message it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub message: ResponseMessage,
    pub body: T,
}

impl<T> Response<T> {
    pub fn new(message: ResponseMessage, body: T) -> Self {
        Self { message, body }
    }
}

/// Failures surfaced by a requester at call time. Never produced by
/// generation.
#[derive(Debug)]
pub enum RequesterError {
    Transport(String),
    Serialization(SerializationError),
    Cancelled,
    UnexpectedStatus(u16),
}

impl fmt::Display for RequesterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequesterError::Transport(reason) => write!(f, "transport error: {}", reason),
            RequesterError::Serialization(e) => write!(f, "{}", e),
            RequesterError::Cancelled => write!(f, "request cancelled"),
            RequesterError::UnexpectedStatus(code) => {
                write!(f, "unexpected response status {}", code)
            }
        }
    }
}

impl From<SerializationError> for RequesterError {
    fn from(e: SerializationError) -> Self {
        RequesterError::Serialization(e)
    }
}

/// The capability a generated implementation delegates every call to.
///
/// One operation per recognized return shape, plus resource release. The
/// deserializing operations work in terms of dynamic values; typed wrappers
/// over a plan deserialize further on their side of the seam.
#[async_trait]
pub trait Requester: Send + Sync {
    /// Execute, expect success, discard the body.
    async fn request_void(&self, description: RequestDescription) -> Result<(), RequesterError>;

    /// Execute and deserialize the body.
    async fn request_value(&self, description: RequestDescription)
        -> Result<Value, RequesterError>;

    /// Execute and return the raw response message.
    async fn request_response_message(
        &self,
        description: RequestDescription,
    ) -> Result<ResponseMessage, RequesterError>;

    /// Execute and return the deserialized body along with its message.
    async fn request_with_response(
        &self,
        description: RequestDescription,
    ) -> Result<Response<Value>, RequesterError>;

    /// Execute and return the raw body bytes.
    async fn request_bytes(
        &self,
        description: RequestDescription,
    ) -> Result<Vec<u8>, RequesterError>;

    /// Execute and return the body as text.
    async fn request_string(
        &self,
        description: RequestDescription,
    ) -> Result<String, RequesterError>;

    /// Execute and return the body as a byte stream.
    async fn request_stream(
        &self,
        description: RequestDescription,
    ) -> Result<ByteStream, RequesterError>;

    /// Release any resources held by the executor.
    fn dispose(&self) {}
}
