//! MCP transport layer.
//!
//! `McpTransport` moves newline-delimited JSON-RPC messages. The stdio
//! transport is a `LineTransport` over the process streams; the HTTP/SSE
//! transport lives in the server binary and talks to `McpServer` directly.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use bytes::BytesMut;
use tokio_util::codec::{Decoder, FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use crate::error::McpError;

/// Trait for MCP message transport.
///
/// `receive` must be cancel-safe: the server loop polls it inside
/// `tokio::select!` and may drop the future before it completes.
#[async_trait]
pub trait McpTransport: Send {
    /// Next message, or `None` once the peer has closed.
    ///
    /// `McpError::MalformedMessage` reports one unreadable message; the
    /// transport stays usable afterwards.
    async fn receive(&mut self) -> Result<Option<String>, McpError>;

    /// Write one message.
    async fn send(&mut self, message: &str) -> Result<(), McpError>;
}

/// Longest accepted line in bytes. Longer lines are discarded.
pub const MAX_LINE_LENGTH: usize = 4 * 1024 * 1024;

enum Frame {
    Line(String),
    Malformed(LinesCodecError),
}

/// `LinesCodec` that yields undecodable lines as frames instead of errors,
/// so `FramedRead` keeps reading past them. Read errors stay errors.
struct FrameCodec {
    lines: LinesCodec,
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        Ok(match self.lines.decode(buf) {
            Ok(line) => line.map(Frame::Line),
            Err(err) => Some(Frame::Malformed(err)),
        })
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        Ok(match self.lines.decode_eof(buf) {
            Ok(line) => line.map(Frame::Line),
            Err(err) => Some(Frame::Malformed(err)),
        })
    }
}

/// Newline-delimited JSON over any async byte streams.
pub struct LineTransport<R, W> {
    reader: FramedRead<R, FrameCodec>,
    writer: FramedWrite<W, LinesCodec>,
}

/// Reads stdin, writes stdout.
pub type StdioTransport = LineTransport<tokio::io::Stdin, tokio::io::Stdout>;

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_max_line_length(reader, writer, MAX_LINE_LENGTH)
    }

    pub fn with_max_line_length(reader: R, writer: W, max_length: usize) -> Self {
        let codec = FrameCodec {
            lines: LinesCodec::new_with_max_length(max_length),
        };
        Self {
            reader: FramedRead::new(reader, codec),
            writer: FramedWrite::new(writer, LinesCodec::new()),
        }
    }
}

impl StdioTransport {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> McpTransport for LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        while let Some(frame) = self.reader.next().await {
            let line = match frame.map_err(codec_error)? {
                Frame::Line(line) => line,
                Frame::Malformed(err) => return Err(McpError::MalformedMessage(err.to_string())),
            };
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
        Ok(None)
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.writer.send(message).await.map_err(codec_error)
    }
}

fn codec_error(err: LinesCodecError) -> McpError {
    match err {
        LinesCodecError::Io(err) => McpError::Transport(err),
        other => McpError::Transport(std::io::Error::new(std::io::ErrorKind::InvalidData, other)),
    }
}

/// In-memory transport for testing, backed by channel pairs.
pub struct ChannelTransport {
    rx: mpsc::Receiver<String>,
    tx: mpsc::Sender<String>,
}

impl ChannelTransport {
    /// Create a pair of connected transports.
    ///
    /// Messages sent on one transport are received by the other.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::channel(32);
        let (tx_b, rx_a) = mpsc::channel(32);
        (Self { rx: rx_a, tx: tx_a }, Self { rx: rx_b, tx: tx_b })
    }
}

#[async_trait]
impl McpTransport for ChannelTransport {
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        Ok(self.rx.recv().await)
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.tx.send(message.to_string()).await.map_err(|e| {
            McpError::Transport(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_channel_transport_pair() {
        let (mut a, mut b) = ChannelTransport::pair();

        a.send("hello from a").await.unwrap();
        assert_eq!(b.receive().await.unwrap(), Some("hello from a".to_string()));

        b.send("hello from b").await.unwrap();
        assert_eq!(a.receive().await.unwrap(), Some("hello from b".to_string()));
    }

    #[tokio::test]
    async fn test_channel_transport_closed() {
        let (mut a, b) = ChannelTransport::pair();
        drop(b);
        assert_eq!(a.receive().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_transport_skips_blank_lines() {
        let (mut client, server_side) = tokio::io::duplex(1024);
        let (read_half, write_half) = tokio::io::split(server_side);
        let mut transport = LineTransport::new(read_half, write_half);

        client
            .write_all(b"\n  \n{\"jsonrpc\":\"2.0\"}\r\n")
            .await
            .unwrap();
        assert_eq!(
            transport.receive().await.unwrap(),
            Some("{\"jsonrpc\":\"2.0\"}".to_string())
        );

        transport.send("{\"ok\":true}").await.unwrap();
        let mut buf = vec![0u8; 12];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, b"{\"ok\":true}\n");

        drop(client);
        assert_eq!(transport.receive().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_transport_survives_bad_lines() {
        let (mut client, server_side) = tokio::io::duplex(1024);
        let (read_half, write_half) = tokio::io::split(server_side);
        let mut transport = LineTransport::with_max_line_length(read_half, write_half, 16);

        client.write_all(b"\xff\xfe garbage\n").await.unwrap();
        client.write_all(b"{\"too\":\"long for the limit\"}\n").await.unwrap();
        client.write_all(b"{\"id\":1}\n").await.unwrap();
        drop(client);

        assert!(matches!(
            transport.receive().await,
            Err(McpError::MalformedMessage(_))
        ));
        assert!(matches!(
            transport.receive().await,
            Err(McpError::MalformedMessage(_))
        ));
        assert_eq!(transport.receive().await.unwrap(), Some("{\"id\":1}".to_string()));
        assert_eq!(transport.receive().await.unwrap(), None);
    }
}
