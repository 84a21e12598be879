//! Transport layer: length-prefixed framing over TCP.
//!
//! Every wire transmission - public keys, the wrapped session key, and chat
//! messages - is a frame: a 4-byte unsigned big-endian length followed by
//! exactly that many payload bytes. The receiver accumulates partial reads
//! until the full frame has arrived; no partial frame is ever interpreted.

mod tcp;

pub use tcp::{Connection, FrameReader, FrameWriter, Listener};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ChatError;

/// Maximum frame payload length.
///
/// Handshake artifacts (a PEM public key, a 256-byte wrapped session key)
/// and chat messages are all far below this. Without the cap, the length
/// prefix would let a peer request an unbounded allocation before sending
/// a single payload byte.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Writes one frame: big-endian length prefix, then the full payload.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ChatError> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(ChatError::FrameTooLarge {
            got: payload.len(),
            limit: MAX_FRAME_LEN,
        });
    }

    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame, accumulating across partial reads.
///
/// The declared length is validated against [`MAX_FRAME_LEN`] before the
/// payload buffer is allocated. A connection that closes mid-frame surfaces
/// as [`ChatError::ConnectionClosed`].
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ChatError> {
    let mut len_bytes = [0u8; 4];
    reader
        .read_exact(&mut len_bytes)
        .await
        .map_err(eof_as_closed)?;

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ChatError::FrameTooLarge {
            got: len,
            limit: MAX_FRAME_LEN,
        });
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(eof_as_closed)?;
    Ok(payload)
}

fn eof_as_closed(err: std::io::Error) -> ChatError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        ChatError::ConnectionClosed
    } else {
        ChatError::Io(err)
    }
}
