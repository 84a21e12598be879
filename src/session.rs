//! Steady-state chat: two concurrent loops over one connection.
//!
//! The inbound loop blocks on frame reads and decrypts each arriving
//! message; the outbound loop blocks on local input and encrypts and sends
//! each submitted line. They share the channel read-only behind an `Arc`
//! and each own one direction of the socket, so neither needs a lock and
//! no coordination channel exists between them - socket closure is the
//! only signal.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::crypto::{Decrypted, SecureChannel};
use crate::error::ChatError;
use crate::transport::{Connection, FrameReader, FrameWriter};

/// Local input token that ends the session.
pub const EXIT_TOKEN: &str = "exit";

/// Runs the chat session until it ends.
///
/// Blocks until either the local user types the exit token (the connection
/// is then closed, which the peer observes as end-of-stream) or the peer
/// side terminates. A clean peer disconnect returns `Ok`; a reset or any
/// other inbound transport failure is fatal and propagates.
pub async fn run_session(conn: Connection, channel: SecureChannel) -> Result<(), ChatError> {
    let channel = Arc::new(channel);
    let (reader, writer) = conn.into_split();

    let mut inbound = tokio::spawn(receive_loop(reader, Arc::clone(&channel)));
    let outbound = send_loop(writer, channel, BufReader::new(tokio::io::stdin()));

    tokio::select! {
        joined = &mut inbound => {
            match joined {
                Ok(Ok(())) => println!("Peer disconnected."),
                Ok(Err(err)) => return Err(err),
                // Inbound task aborted or panicked; nothing left to report.
                Err(_) => {}
            }
        }
        sent = outbound => {
            sent?;
            inbound.abort();
        }
    }

    Ok(())
}

/// The inbound loop: read frames, decrypt, display.
///
/// Returns `Ok` when the peer closes the connection; any other transport
/// error propagates. A message that fails to decrypt is shown as a
/// placeholder and the loop continues.
pub async fn receive_loop(
    mut reader: FrameReader,
    channel: Arc<SecureChannel>,
) -> Result<(), ChatError> {
    loop {
        let frame = match reader.recv_frame().await {
            Ok(frame) => frame,
            Err(ChatError::ConnectionClosed) => return Ok(()),
            Err(err) => return Err(err),
        };

        match channel.decrypt(&frame)? {
            Decrypted::Plaintext(bytes) => {
                println!("Peer: {}", String::from_utf8_lossy(&bytes));
            }
            Decrypted::Garbled(reason) => {
                println!("Peer: [message could not be decrypted: {}]", reason);
            }
        }
    }
}

/// The outbound loop: read local lines, encrypt, send.
///
/// Generic over the input source so tests can script it; production passes
/// stdin. The exit token (case-insensitive, surrounding whitespace ignored)
/// ends the loop; the write half is then shut down, closing the connection.
/// A send failure is reported and the loop exits cleanly.
pub async fn send_loop<I>(
    mut writer: FrameWriter,
    channel: Arc<SecureChannel>,
    input: I,
) -> Result<(), ChatError>
where
    I: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().eq_ignore_ascii_case(EXIT_TOKEN) {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let sealed = channel.encrypt(line.as_bytes())?;
        if let Err(err) = writer.send_frame(&sealed.to_bytes()).await {
            eprintln!("Send failed: {}", err);
            break;
        }

        println!("You: {}", line);
    }

    let _ = writer.close().await;
    Ok(())
}
