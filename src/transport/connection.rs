//! Per-request TCP connection.
//!
//! Every outbound request owns exactly one [`Connection`]. The handle is
//! created by [`Connection::open`], used for a single send followed by zero or
//! more non-blocking receive attempts, and released by dropping it. No
//! connection is pooled or reused across requests.
//!
//! # Wire Framing
//!
//! The two localizer channels frame their payloads differently and the
//! difference is load-bearing:
//!
//! - session channel: raw payload bytes, no prefix ([`Connection::send_raw`])
//! - lookup channel: a 4-byte ASCII decimal length, left-justified and
//!   space-padded (not null-terminated), then the payload
//!   ([`Connection::send_framed`])
//!
//! The reply direction carries no length prefix on either channel.

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Largest payload the 4-digit decimal length prefix can describe.
pub const MAX_FRAMED_PAYLOAD: usize = 9999;

/// Width of the ASCII length prefix in bytes.
const PREFIX_WIDTH: usize = 4;

/// Upper bound on a single connect attempt.
///
/// Connects are awaited inline by the caller's loop, so an endpoint that
/// black-holes SYNs must not be allowed to hold the loop for the kernel's
/// full connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

// ============================================================================
// Connection
// ============================================================================

/// A single-exchange TCP connection to a localizer endpoint.
///
/// Dropping the handle closes the socket, so release is guaranteed on every
/// exit path including errors.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Opens a fresh connection to `addr`.
    ///
    /// The attempt is bounded by [`CONNECT_TIMEOUT`] so an unresponsive host
    /// surfaces as a failed connect instead of stalling the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectFailed`] if the connect is refused, fails, or
    /// does not complete in time.
    pub async fn open(addr: SocketAddr) -> Result<Self> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                let e = std::io::Error::new(ErrorKind::TimedOut, "connect timed out");
                Error::connect_failed(addr, e)
            })?
            .map_err(|e| Error::connect_failed(addr, e))?;
        debug!(peer = %addr, "Connection opened");
        Ok(Self { stream, peer: addr })
    }

    /// Returns the address this connection targets.
    #[inline]
    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Sends the payload with no length prefix (session channel).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the write fails.
    pub async fn send_raw(&mut self, payload: &[u8]) -> Result<()> {
        self.stream.write_all(payload).await?;
        self.stream.flush().await?;
        trace!(peer = %self.peer, len = payload.len(), "Sent raw payload");
        Ok(())
    }

    /// Sends the payload with the 4-byte ASCII length prefix (lookup channel).
    ///
    /// # Errors
    ///
    /// - [`Error::FrameTooLarge`] if the payload exceeds [`MAX_FRAMED_PAYLOAD`]
    /// - [`Error::Io`] if the write fails
    pub async fn send_framed(&mut self, payload: &[u8]) -> Result<()> {
        let prefix = length_prefix(payload.len())?;
        self.stream.write_all(&prefix).await?;
        self.stream.write_all(payload).await?;
        self.stream.flush().await?;
        trace!(peer = %self.peer, len = payload.len(), "Sent framed payload");
        Ok(())
    }

    /// Performs one non-blocking receive attempt.
    ///
    /// Returns `Ok(None)` when no data is available yet ("try again on a
    /// later tick"); would-block is not an error.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the remote closed without sending data
    /// - [`Error::Io`] on any other read failure
    pub fn try_receive(&self, max_bytes: usize) -> Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; max_bytes];
        match self.stream.try_read(&mut buf) {
            Ok(0) => Err(Error::ConnectionClosed),
            Ok(n) => {
                buf.truncate(n);
                trace!(peer = %self.peer, len = n, "Received reply bytes");
                Ok(Some(buf))
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

// ============================================================================
// Framing
// ============================================================================

/// Builds the 4-byte ASCII decimal length prefix.
///
/// Left-justified, space-padded, not null-terminated: a 42-byte payload gets
/// the prefix `b"42  "`.
fn length_prefix(len: usize) -> Result<[u8; PREFIX_WIDTH]> {
    if len > MAX_FRAMED_PAYLOAD {
        return Err(Error::frame_too_large(len));
    }
    let text = format!("{len:<PREFIX_WIDTH$}");
    let mut prefix = [0u8; PREFIX_WIDTH];
    prefix.copy_from_slice(text.as_bytes());
    Ok(prefix)
}

// ============================================================================
// Tests
// ============================================================================
