use crate::lsp::error::EncodeError;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResponseMessage {
    pub jsonrpc: String,
    pub id: i64,
    pub result: serde_json::Value,
}

impl ResponseMessage {
    pub fn new<T: Serialize>(id: i64, result: T) -> Result<Self, EncodeError> {
        Ok(ResponseMessage {
            jsonrpc: "2.0".to_string(),
            id,
            result: serde_json::to_value(result)?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

impl Notification {
    pub fn new<T: Serialize>(method: &str, params: T) -> Result<Self, EncodeError> {
        Ok(Notification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params: serde_json::to_value(params)?,
        })
    }
}

/// JSON-RPC error codes used by this server.
pub mod error_codes {
    pub const INVALID_PARAMS: i64 = -32602;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResponseError {
    pub jsonrpc: String,
    pub id: i64,
    pub error: ErrorObject,
}

impl ResponseError {
    pub fn new(id: i64, code: i64, message: impl Into<String>) -> Self {
        ResponseError {
            jsonrpc: "2.0".to_string(),
            id,
            error: ErrorObject {
                code,
                message: message.into(),
            },
        }
    }
}

/// Anything the server writes back to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SendMessage {
    Response(ResponseMessage),
    Error(ResponseError),
    Notification(Notification),
}

/// One reply from a handler. A payload that failed to serialize only costs
/// that reply, not the others produced alongside it.
pub type Outgoing = Result<SendMessage, EncodeError>;

impl From<ResponseMessage> for SendMessage {
    fn from(response: ResponseMessage) -> Self {
        SendMessage::Response(response)
    }
}

impl From<ResponseError> for SendMessage {
    fn from(error: ResponseError) -> Self {
        SendMessage::Error(error)
    }
}

impl From<Notification> for SendMessage {
    fn from(notification: Notification) -> Self {
        SendMessage::Notification(notification)
    }
}
