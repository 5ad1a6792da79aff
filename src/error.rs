//! Error types for the frame streamer.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use frame_streamer::{Result, Error};
//!
//! async fn example(addr: std::net::SocketAddr) -> Result<()> {
//!     let mut conn = Connection::open(addr).await?;
//!     conn.send_raw(b"{}").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Catalog | [`Error::Catalog`] |
//! | Connection | [`Error::ConnectFailed`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::FrameTooLarge`], [`Error::MalformedReply`] |
//! | Event log | [`Error::Journal`] |
//! | External | [`Error::Io`], [`Error::Json`] |
//!
//! A would-block read is *not* an error anywhere in this crate: the transport
//! reports it as "no data yet" and the client loop retries on a later poll.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when streamer configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Catalog Errors
    // ========================================================================
    /// Frame catalog could not be loaded.
    ///
    /// Returned when the stream directory cannot be read. An empty directory
    /// is *not* an error; it is a valid empty run.
    #[error("Catalog error at {path}: {message}")]
    Catalog {
        /// Directory that was being scanned.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Outbound TCP connect failed.
    ///
    /// Session attempts are retried on the next pacing tick; frame-lookup
    /// attempts are not retried and the frame is abandoned.
    #[error("Connect failed to {addr}: {message}")]
    ConnectFailed {
        /// Address the connect was aimed at.
        addr: SocketAddr,
        /// Description of the connect failure.
        message: String,
    },

    /// Connection closed by the remote end before a reply arrived.
    #[error("Connection closed by remote")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Payload too large for the 4-byte ASCII length prefix.
    ///
    /// The lookup channel frames payloads with a 4-digit decimal length,
    /// so anything above 9999 bytes cannot be sent.
    #[error("Payload of {len} bytes exceeds the 4-digit length prefix")]
    FrameTooLarge {
        /// Length of the rejected payload.
        len: usize,
    },

    /// Session reply did not contain an extractable session id.
    ///
    /// The session remains un-established; per the protocol contract no retry
    /// is scheduled by this path.
    #[error("Malformed session reply: {message}")]
    MalformedReply {
        /// Description of what was missing.
        message: String,
    },

    // ========================================================================
    // Event Log Errors
    // ========================================================================
    /// Event log could not be created.
    ///
    /// Only raised at startup; mid-run write failures are logged and ignored.
    #[error("Event log error at {path}: {message}")]
    Journal {
        /// Log file path.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a catalog error.
    #[inline]
    pub fn catalog(path: impl Into<PathBuf>, err: IoError) -> Self {
        Self::Catalog {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Creates a connect failure error.
    #[inline]
    pub fn connect_failed(addr: SocketAddr, err: IoError) -> Self {
        Self::ConnectFailed {
            addr,
            message: err.to_string(),
        }
    }

    /// Creates a frame-too-large error.
    #[inline]
    pub fn frame_too_large(len: usize) -> Self {
        Self::FrameTooLarge { len }
    }

    /// Creates a malformed reply error.
    #[inline]
    pub fn malformed_reply(message: impl Into<String>) -> Self {
        Self::MalformedReply {
            message: message.into(),
        }
    }

    /// Creates an event log error.
    #[inline]
    pub fn journal(path: impl Into<PathBuf>, err: IoError) -> Self {
        Self::Journal {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a failed outbound connect.
    #[inline]
    #[must_use]
    pub fn is_connect_failed(&self) -> bool {
        matches!(self, Self::ConnectFailed { .. })
    }

    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectFailed { .. } | Self::ConnectionClosed)
    }

    /// Returns `true` if this is a malformed session reply.
    #[inline]
    #[must_use]
    pub fn is_malformed_reply(&self) -> bool {
        matches!(self, Self::MalformedReply { .. })
    }

    /// Returns `true` if this error aborts the run before the loop starts.
    ///
    /// Only startup resource acquisition is fatal; everything that happens
    /// inside the client loop is logged and survived.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Catalog { .. } | Self::Journal { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 18001)
    }

    #[test]
    fn test_error_display() {
        let io = IoError::new(ErrorKind::ConnectionRefused, "refused");
        let err = Error::connect_failed(addr(), io);
        assert_eq!(err.to_string(), "Connect failed to 127.0.0.1:18001: refused");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("pacing interval must be non-zero");
        assert_eq!(
            err.to_string(),
            "Configuration error: pacing interval must be non-zero"
        );
    }

    #[test]
    fn test_frame_too_large_display() {
        let err = Error::frame_too_large(12345);
        assert!(err.to_string().contains("12345"));
    }

    #[test]
    fn test_is_connect_failed() {
        let io = IoError::new(ErrorKind::ConnectionRefused, "refused");
        let conn_err = Error::connect_failed(addr(), io);
        let other_err = Error::config("test");

        assert!(conn_err.is_connect_failed());
        assert!(!other_err.is_connect_failed());
    }

    #[test]
    fn test_is_connection_error() {
        let io = IoError::new(ErrorKind::ConnectionRefused, "refused");

        assert!(Error::connect_failed(addr(), io).is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_is_malformed_reply() {
        let err = Error::malformed_reply("marker not found");
        assert!(err.is_malformed_reply());
        assert!(!Error::ConnectionClosed.is_malformed_reply());
    }

    #[test]
    fn test_is_fatal() {
        let io = IoError::new(ErrorKind::PermissionDenied, "denied");
        assert!(Error::config("bad").is_fatal());
        assert!(Error::journal("data/streamer.log", io).is_fatal());
        assert!(!Error::ConnectionClosed.is_fatal());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
