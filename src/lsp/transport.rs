//! LSP transport abstraction (framed Content-Length messages).
use crate::lsp::error::RpcError;
use async_trait::async_trait;

/// Minimal async trait for a framed byte stream.
/// - `read_frame` returns one complete frame (header included), or `None`
///   once the input is exhausted.
/// - `write_frame` writes an already encoded frame and flushes it.
#[async_trait]
pub trait LspTransport: Send {
    async fn read_frame(&mut self) -> Result<Option<Vec<u8>>, RpcError>;
    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), RpcError>;
}
