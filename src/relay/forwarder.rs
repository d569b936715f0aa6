//! Data forwarding module
//!
//! This module handles bidirectional data forwarding between the client and
//! backend streams.

use log::debug;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::common::Result;

/// Forward data between the client and backend streams
///
/// Runs one copy task per direction. The relay ends as soon as either
/// direction reaches end-of-stream, errors, or goes idle past the timeout;
/// the other direction is then shut down so both sockets close and its copy
/// unblocks. Both streams are consumed and closed on every path.
///
/// # Parameters
///
/// * `client_stream` - Client TCP stream
/// * `backend_stream` - Backend TCP stream
/// * `buffer_size` - Transfer buffer size for each direction
/// * `idle_timeout` - Per-read idle bound, `None` to wait indefinitely
///
/// # Returns
///
/// Returns `Ok(())` when the relay has ended; per-direction I/O failures end
/// the relay but are reported only through logs.
pub async fn relay_data(
    client_stream: TcpStream,
    backend_stream: TcpStream,
    buffer_size: usize,
    idle_timeout: Option<Duration>,
) -> Result<()> {
    let (client_reader, client_writer) = tokio::io::split(client_stream);
    let (backend_reader, backend_writer) = tokio::io::split(backend_stream);

    let mut directions = JoinSet::new();
    directions.spawn(copy_bytes(
        client_reader,
        backend_writer,
        buffer_size,
        idle_timeout,
        "client to backend",
    ));
    directions.spawn(copy_bytes(
        backend_reader,
        client_writer,
        buffer_size,
        idle_timeout,
        "backend to client",
    ));

    // The first direction to finish ends the relay; aborting the other drops
    // its stream halves, which closes both sockets and unblocks its reads.
    if let Some(result) = directions.join_next().await {
        if let Err(e) = result {
            debug!("Relay direction task ended abnormally: {}", e);
        }
    }
    directions.shutdown().await;

    Ok(())
}

/// Copy bytes from a reader to a writer until end-of-stream, error, or idle
/// timeout
async fn copy_bytes<R, W>(
    mut reader: R,
    mut writer: W,
    buffer_size: usize,
    idle_timeout: Option<Duration>,
    direction: &'static str,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size];
    let mut total_bytes: u64 = 0;

    loop {
        let read_result = match idle_timeout {
            Some(limit) => match timeout(limit, reader.read(&mut buffer)).await {
                Ok(result) => result,
                Err(_) => {
                    debug!("{}: idle for {:?}, closing relay", direction, limit);
                    break;
                }
            },
            None => reader.read(&mut buffer).await,
        };

        match read_result {
            Ok(0) => break, // Connection closed
            Ok(n) => {
                total_bytes += n as u64;
                if let Err(e) = writer.write_all(&buffer[..n]).await {
                    debug!("{}: write failed: {}", direction, e);
                    break;
                }
            }
            Err(e) => {
                debug!("{}: read failed: {}", direction, e);
                break;
            }
        }
    }

    // Flush and propagate the half-close before the relay tears down
    let _ = writer.shutdown().await;
    debug!("{}: transferred {} bytes total", direction, total_bytes);
}
