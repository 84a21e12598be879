//! TCP connection and listener.
//!
//! A [`Connection`] owns both directions of one TCP stream behind buffered
//! halves. The handshake uses it sequentially; [`Connection::into_split`]
//! then hands the independent read and write halves to the concurrent
//! session loops.

use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::error::ChatError;
use crate::transport::{read_frame, write_frame};

/// The read direction of a connection.
pub struct FrameReader {
    inner: BufReader<OwnedReadHalf>,
}

impl FrameReader {
    /// Receives one frame, blocking until it has fully arrived.
    pub async fn recv_frame(&mut self) -> Result<Vec<u8>, ChatError> {
        read_frame(&mut self.inner).await
    }
}

/// The write direction of a connection.
pub struct FrameWriter {
    inner: BufWriter<OwnedWriteHalf>,
}

impl FrameWriter {
    /// Sends one frame, writing the entire payload before returning.
    pub async fn send_frame(&mut self, payload: &[u8]) -> Result<(), ChatError> {
        write_frame(&mut self.inner, payload).await
    }

    /// Flushes buffered data and shuts down the write direction, signalling
    /// end-of-stream to the peer.
    pub async fn close(&mut self) -> Result<(), ChatError> {
        self.inner.flush().await?;
        self.inner.shutdown().await?;
        Ok(())
    }
}

/// One established chat connection.
pub struct Connection {
    reader: FrameReader,
    writer: FrameWriter,
    peer_addr: String,
}

impl Connection {
    /// Wraps an accepted or connected stream.
    pub fn new(stream: TcpStream) -> Self {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let (read_half, write_half) = stream.into_split();

        Self {
            reader: FrameReader {
                inner: BufReader::new(read_half),
            },
            writer: FrameWriter {
                inner: BufWriter::new(write_half),
            },
            peer_addr,
        }
    }

    /// Connects to a remote peer. Blocking; no retry.
    pub async fn connect(addr: &str) -> Result<Self, ChatError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ChatError::ConnectFailed {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self::new(stream))
    }

    /// Sends one frame.
    pub async fn send_frame(&mut self, payload: &[u8]) -> Result<(), ChatError> {
        self.writer.send_frame(payload).await
    }

    /// Receives one frame.
    pub async fn recv_frame(&mut self) -> Result<Vec<u8>, ChatError> {
        self.reader.recv_frame().await
    }

    /// Closes the connection.
    pub async fn close(&mut self) -> Result<(), ChatError> {
        self.writer.close().await
    }

    /// The peer address, for display.
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Splits into independently owned halves for the concurrent loops.
    pub fn into_split(self) -> (FrameReader, FrameWriter) {
        (self.reader, self.writer)
    }
}

/// Listener that accepts one inbound chat connection.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Binds to an address and starts listening.
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, ChatError> {
        let inner = TcpListener::bind(addr).await?;
        Ok(Self { inner })
    }

    /// Accepts the next inbound connection. Blocking.
    pub async fn accept(&self) -> Result<Connection, ChatError> {
        let (stream, _addr) = self.inner.accept().await?;
        Ok(Connection::new(stream))
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ChatError> {
        Ok(self.inner.local_addr()?)
    }
}
