use std::num::ParseIntError;
use thiserror::Error;

/// The header section of a frame could not be turned into a body length.
///
/// Every variant records `discard`: how many bytes (header plus separator)
/// the reader must drop to get past the unusable header.
#[derive(Error, Debug)]
pub enum FramingError {
    #[error("Content-Length header not found in {header:?}")]
    MissingContentLength { header: String, discard: usize },

    #[error("invalid Content-Length {value:?}: {source}")]
    InvalidContentLength {
        value: String,
        discard: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("Content-Length {length} exceeds the maximum frame size")]
    TooLarge { length: usize, discard: usize },
}

impl FramingError {
    pub fn discard(&self) -> usize {
        match self {
            FramingError::MissingContentLength { discard, .. }
            | FramingError::InvalidContentLength { discard, .. }
            | FramingError::TooLarge { discard, .. } => *discard,
        }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error("frame is shorter than its declared Content-Length")]
    Truncated,

    #[error("invalid message body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid params for {method}: {source}")]
    Params {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} is a request but carries no id")]
    MissingId { method: String },
}

/// A handler built a value that cannot be serialized.
#[derive(Error, Debug)]
#[error("failed to serialize outgoing message: {0}")]
pub struct EncodeError(#[from] pub serde_json::Error);

#[derive(Error, Debug)]
pub enum RpcError {
    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
