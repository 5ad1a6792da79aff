//! Client state machine: session initialization, frame dispatch, pacing, and
//! the loop that drives them.
//!
//! The timing model has two independent cadences that are never conflated:
//!
//! - **fast polling** ([`runner`]): checks sockets for pending replies, never
//!   decides policy
//! - **pacing** ([`pacing`]): makes every dispatch/drop/retry decision, at
//!   most once per interval
//!
//! All components operate on the shared [`crate::state::StreamState`]
//! aggregate; nothing here spawns tasks or takes locks.

pub mod dispatch;
pub mod pacing;
pub mod runner;
pub mod session;

pub use dispatch::FrameDispatcher;
pub use pacing::{PacingController, TickAction};
pub use runner::{Outcome, Streamer};
pub use session::SessionInitializer;
