use crate::lsp::error::{DecodeError, EncodeError};
use crate::lsp::framing::{self, Split, CONTENT_LENGTH};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Routing view of an incoming message. The body is kept as raw bytes;
/// only `method` and `id` are parsed up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub method: String,
    pub id: Option<i64>,
    pub raw_body: Vec<u8>,
}

#[derive(Deserialize)]
struct Envelope {
    method: String,
    #[serde(default)]
    id: Option<i64>,
}

impl DecodedMessage {
    pub fn is_request(&self) -> bool {
        self.id.is_some()
    }

    /// The id of a request; notifications have none.
    pub fn request_id(&self) -> Result<i64, DecodeError> {
        self.id.ok_or_else(|| DecodeError::MissingId {
            method: self.method.clone(),
        })
    }

    /// Deserialize the `params` member into a handler-specific type.
    pub fn params<P: DeserializeOwned>(&self) -> Result<P, DecodeError> {
        #[derive(Deserialize)]
        struct WithParams<P> {
            params: P,
        }

        serde_json::from_slice::<WithParams<P>>(&self.raw_body)
            .map(|message| message.params)
            .map_err(|source| DecodeError::Params {
                method: self.method.clone(),
                source,
            })
    }
}

/// Decode an isolated frame (header included).
pub fn decode(frame: &[u8]) -> Result<DecodedMessage, DecodeError> {
    let body = match framing::split(frame, true)? {
        Split::Frame { body, .. } => body,
        Split::NeedMore => return Err(DecodeError::Truncated),
    };

    let envelope: Envelope = serde_json::from_slice(body)?;
    Ok(DecodedMessage {
        method: envelope.method,
        id: envelope.id,
        raw_body: body.to_vec(),
    })
}

/// Serialize `value` and prefix it with its Content-Length header.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let body = serde_json::to_vec(value)?;
    let mut frame = format!("{}{}\r\n\r\n", CONTENT_LENGTH, body.len()).into_bytes();
    frame.extend_from_slice(&body);
    Ok(frame)
}
