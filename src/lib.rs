//! Frame Streamer - field-device simulator for a remote localization service.
//!
//! This library simulates a device that streams captured camera frames to a
//! two-endpoint localizer and records the returned position fixes. It exists
//! to exercise the session/lookup protocol under realistic timing and failure
//! conditions, independent of the real localization backend.
//!
//! # Architecture
//!
//! The client is a single-task, cooperative, non-blocking state machine:
//!
//! - **Session channel**: one unframed request to the session endpoint yields
//!   a session id, extracted by literal marker search (never parsed).
//! - **Lookup channel**: one length-framed request per frame, gated on the
//!   previous exchange having seen a reply.
//! - **Two timing domains**: a fast socket-polling cadence and a slow pacing
//!   cadence that makes all dispatch/drop/retry decisions. A frame that
//!   cannot be served within one pacing interval is shed, never queued.
//! - **Per-request connections**: every exchange owns exactly one TCP
//!   connection, released on every exit path.
//!
//! # Quick Start
//!
//! ```no_run
//! use frame_streamer::{Streamer, StreamerConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = StreamerConfig::new()
//!         .with_coordinates(50.4162, 30.8906)
//!         .with_radius_meters(1000);
//!
//!     let streamer = Streamer::new(config)?;
//!     let outcome = streamer.run().await?;
//!     println!("run ended: {outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`catalog`] | Frame catalog loaded from the stream directory |
//! | [`client`] | Session initializer, dispatcher, pacing, client loop |
//! | [`config`] | Run configuration and defaults |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`journal`] | Append-only event log |
//! | [`protocol`] | Request encoding and session id extraction (internal) |
//! | [`state`] | Owned run-state aggregate |
//! | [`transport`] | Per-request TCP connections (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Frame catalog loaded once at startup, immutable afterwards.
pub mod catalog;

/// Client components and the loop that drives them.
pub mod client;

/// Run configuration with documented defaults.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Append-only event log, one line per observable milestone.
pub mod journal;

/// Wire message construction and field extraction.
///
/// Internal module; the receive path deliberately has no parser.
pub mod protocol;

/// Owned run-state aggregate: session, readiness, cursor, frame statuses.
pub mod state;

/// Per-request TCP transport.
///
/// Internal module; connections are single-use and never pooled.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Catalog types
pub use catalog::{Catalog, Frame};

// Client types
pub use client::{Outcome, PacingController, Streamer, TickAction};

// Configuration
pub use config::StreamerConfig;

// Error types
pub use error::{Error, Result};

// State types
pub use state::{FrameStatus, Session, StreamState};
