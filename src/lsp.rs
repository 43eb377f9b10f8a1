pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod framing;
pub mod stdio_transport;
pub mod transport;
pub mod types;

use crate::lsp::dispatcher::{DispatchState, Dispatcher};
use crate::lsp::error::RpcError;
use crate::lsp::transport::LspTransport;
use crate::lsp::types::Outgoing;
use tracing::{debug, error, info, warn};

/// The control loop: read a frame, decode it, dispatch it, write the
/// replies, and only then read the next frame.
pub struct LspServer<T> {
    transport: T,
    dispatcher: Dispatcher,
}

impl<T: LspTransport> LspServer<T> {
    pub fn new(transport: T) -> Self {
        LspServer {
            transport,
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run until the input is exhausted. Per-message failures are logged
    /// and skipped; only transport I/O errors end the loop early.
    pub async fn run(&mut self) -> Result<(), RpcError> {
        loop {
            let frame = match self.transport.read_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("input closed, shutting down");
                    return Ok(());
                }
                Err(RpcError::Framing(e)) => {
                    warn!(error = %e, "dropping malformed frame header");
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.process(&frame).await?;
        }
    }

    async fn process(&mut self, frame: &[u8]) -> Result<(), RpcError> {
        let message = match codec::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "failed to decode message");
                return Ok(());
            }
        };
        debug!(
            method = %message.method,
            id = ?message.id,
            request = message.is_request(),
            "received message"
        );

        let handled = self.dispatcher.dispatch(&message);
        debug_assert_eq!(self.dispatcher.state(), DispatchState::Idle);
        match handled {
            Ok(outgoing) => self.write_replies(&message.method, outgoing).await,
            Err(e @ RpcError::Encode(_)) => {
                error!(method = %message.method, error = %e, "internal error, message dropped");
                Ok(())
            }
            Err(e) => {
                warn!(method = %message.method, error = %e, "failed to handle message");
                Ok(())
            }
        }
    }

    /// Write each reply in order. One that fails to serialize is skipped
    /// without affecting the rest.
    async fn write_replies(
        &mut self,
        method: &str,
        outgoing: Vec<Outgoing>,
    ) -> Result<(), RpcError> {
        for reply in outgoing {
            match reply.and_then(|reply| codec::encode(&reply)) {
                Ok(bytes) => self.transport.write_frame(&bytes).await?,
                Err(e) => error!(method, error = %e, "internal error, reply dropped"),
            }
        }
        Ok(())
    }
}
