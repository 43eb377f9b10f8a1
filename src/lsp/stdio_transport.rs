// byte stream transport: buffers input and cuts it into frames
use crate::lsp::error::RpcError;
use crate::lsp::framing::{self, Split};
use crate::lsp::transport::LspTransport;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, Stdin, Stdout};
use tracing::warn;

const READ_CHUNK: usize = 8 * 1024;

pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
    buffer: Vec<u8>,
    eof: bool,
}

impl StdioTransport<Stdin, Stdout> {
    pub fn stdio() -> Self {
        StdioTransport::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        StdioTransport {
            reader,
            writer,
            buffer: Vec::new(),
            eof: false,
        }
    }

    /// Append whatever the reader has next. Returns false at end of input.
    async fn fill(&mut self) -> Result<bool, RpcError> {
        let mut chunk = [0u8; READ_CHUNK];
        let count = self.reader.read(&mut chunk).await?;
        self.buffer.extend_from_slice(&chunk[..count]);
        Ok(count > 0)
    }
}

#[async_trait::async_trait]
impl<R, W> LspTransport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_frame(&mut self) -> Result<Option<Vec<u8>>, RpcError> {
        loop {
            match framing::split(&self.buffer, self.eof) {
                Ok(Split::Frame { advance, frame, .. }) => {
                    let frame = frame.to_vec();
                    self.buffer.drain(..advance);
                    return Ok(Some(frame));
                }
                Ok(Split::NeedMore) => {}
                Err(err) => {
                    self.buffer.drain(..err.discard());
                    return Err(err.into());
                }
            }

            if self.eof {
                if !self.buffer.is_empty() {
                    warn!(
                        pending = self.buffer.len(),
                        "input closed in the middle of a frame; discarding"
                    );
                    self.buffer.clear();
                }
                return Ok(None);
            }
            self.eof = !self.fill().await?;
        }
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), RpcError> {
        self.writer.write_all(frame).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp::error::FramingError;
    use tokio::io::{duplex, empty, sink, AsyncWriteExt};

    fn frame_of(body: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{}", body.len(), body).into_bytes()
    }

    #[tokio::test]
    async fn test_read_frame_from_duplex() {
        let (mut a, b) = duplex(1024);
        let mut transport = StdioTransport::new(b, sink());

        let writer = tokio::spawn(async move {
            let json = r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#;
            a.write_all(&frame_of(json)).await.unwrap();
        });

        let frame = transport.read_frame().await.expect("read failed").unwrap();
        assert_eq!(frame, frame_of(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#));

        writer.await.unwrap();
        assert!(transport.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_across_partial_writes() {
        let (mut a, b) = duplex(16);
        let mut transport = StdioTransport::new(b, sink());
        let first = frame_of(r#"{"method":"a","params":{"text":"héllo"}}"#);
        let second = frame_of(r#"{"method":"b"}"#);

        let (first_clone, second_clone) = (first.clone(), second.clone());
        let writer = tokio::spawn(async move {
            for piece in first_clone.chunks(3).chain(second_clone.chunks(5)) {
                a.write_all(piece).await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        assert_eq!(transport.read_frame().await.unwrap(), Some(first));
        assert_eq!(transport.read_frame().await.unwrap(), Some(second));
        writer.await.unwrap();
        assert_eq!(transport.read_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_frame_skips_malformed_header() {
        let mut input = b"Content-Length: abc\r\n\r\n".to_vec();
        input.extend_from_slice(&frame_of(r#"{"method":"ok"}"#));
        let mut transport = StdioTransport::new(&input[..], sink());

        let err = transport.read_frame().await.unwrap_err();
        assert!(matches!(
            err,
            RpcError::Framing(FramingError::InvalidContentLength { .. })
        ));

        let frame = transport.read_frame().await.unwrap().unwrap();
        assert!(frame.ends_with(br#"{"method":"ok"}"#));
    }

    #[tokio::test]
    async fn test_read_frame_skips_oversized_header_without_buffering_it() {
        let mut input = b"Content-Length: 999999999999\r\n\r\n".to_vec();
        input.extend_from_slice(&frame_of(r#"{"method":"ok"}"#));
        let mut transport = StdioTransport::new(&input[..], sink());

        let err = transport.read_frame().await.unwrap_err();
        assert!(matches!(
            err,
            RpcError::Framing(FramingError::TooLarge { .. })
        ));

        let frame = transport.read_frame().await.unwrap().unwrap();
        assert_eq!(frame, frame_of(r#"{"method":"ok"}"#));
        assert_eq!(transport.read_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_truncated_input_ends_stream() {
        let input = b"Content-Length: 5\r\n\r\n{".to_vec();
        let mut transport = StdioTransport::new(&input[..], sink());
        assert_eq!(transport.read_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_input_ends_stream() {
        let mut transport = StdioTransport::new(empty(), sink());
        assert_eq!(transport.read_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_frame_passes_bytes_through() {
        let mut output = Vec::new();
        {
            let mut transport = StdioTransport::new(empty(), &mut output);
            transport.write_frame(b"Content-Length: 2\r\n\r\n{}").await.unwrap();
        }
        assert_eq!(output, b"Content-Length: 2\r\n\r\n{}");
    }
}
