//! Pacing control.
//!
//! Rate-limits decision-making to one decision per fixed interval, independent
//! of the much faster socket-polling cadence. The fast cadence only checks
//! sockets; every dispatch, drop, and retry decision is made here, at most
//! once per interval.
//!
//! Both halves take plain `Instant` values as input, so tests can drive a
//! synthetic clock instead of sleeping.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use crate::state::StreamState;

// ============================================================================
// TickAction
// ============================================================================

/// What the client loop should do on one pacing tick.
///
/// Evaluated in strict order; the first matching branch wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// No session and no attempt outstanding: issue the initialization call.
    RequestSession,
    /// No session but an attempt is outstanding: wait for its reply.
    AwaitSession,
    /// Session exists, frames remain, channel free: dispatch the next frame.
    DispatchFrame,
    /// Session exists, frames remain, channel busy: shed the current frame.
    ///
    /// The deliberate shed-load policy: backlog is never queued, work that
    /// cannot be served within one pacing interval is discarded.
    ShedFrame,
    /// Nothing to decide (catalog exhausted).
    Idle,
}

// ============================================================================
// PacingController
// ============================================================================

/// Fixed-interval tick source for pacing decisions.
#[derive(Debug)]
pub struct PacingController {
    /// Minimum spacing between two decisions.
    interval: Duration,
    /// Timestamp of the last tick, recorded regardless of branch taken.
    last_tick: Option<Instant>,
    /// Number of ticks fired so far.
    ticks: u64,
}

impl PacingController {
    /// Creates a controller with the given decision interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
            ticks: 0,
        }
    }

    /// Returns `true` if a pacing decision is due at `now`.
    ///
    /// Fires on the first call, then at most once per elapsed interval.
    /// Recording the tick timestamp happens here, so a tick is consumed even
    /// when the resulting action is [`TickAction::Idle`].
    pub fn is_due(&mut self, now: Instant) -> bool {
        let due = match self.last_tick {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last_tick = Some(now);
            self.ticks += 1;
        }
        due
    }

    /// Returns the number of ticks fired so far.
    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Decides what one tick should do.
    #[must_use]
    pub fn decide(state: &StreamState, attempt_outstanding: bool) -> TickAction {
        if !state.session.established() {
            if attempt_outstanding {
                return TickAction::AwaitSession;
            }
            return TickAction::RequestSession;
        }
        if !state.exhausted() {
            if state.ready {
                return TickAction::DispatchFrame;
            }
            return TickAction::ShedFrame;
        }
        TickAction::Idle
    }
}

// ============================================================================
// Tests
// ============================================================================
