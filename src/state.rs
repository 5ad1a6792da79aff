//! Run state aggregate.
//!
//! All mutable state of a streaming run lives in one owned [`StreamState`]
//! passed by `&mut` to the components that act on it. There are no ambient
//! globals and no locks: every mutation happens on the single client-loop task.
//!
//! # State Held
//!
//! - [`Session`] - server-issued session id, assigned exactly once
//! - readiness flag - whether the lookup channel is free for the next frame
//! - cursor - index of the next frame to act on, monotonically non-decreasing
//! - per-frame [`FrameStatus`] values, one per catalog entry
//!
//! The catalog itself is immutable after load and is *not* part of this
//! aggregate; components reference frames by index.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// FrameStatus
// ============================================================================

/// Lifecycle status of a single frame.
///
/// Transitions are monotonic: `Pending -> Dispatched -> Completed`, or
/// `Pending -> Dropped`. A frame never leaves a terminal status and is never
/// dispatched twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Not yet acted on.
    Pending,
    /// Sent to the lookup endpoint; reply may or may not arrive.
    Dispatched,
    /// A reply was observed for this frame.
    Completed,
    /// Shed without sending because the service was still busy.
    Dropped,
}

impl FrameStatus {
    /// Returns `true` for `Completed` or `Dropped`.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Dropped)
    }

    /// Returns `true` if `next` is a legal successor of `self`.
    #[must_use]
    pub const fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Dispatched)
                | (Self::Pending, Self::Dropped)
                | (Self::Dispatched, Self::Completed)
        )
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Server-issued session identifier.
///
/// The id is empty until assigned and is assigned exactly once per run;
/// `established` is derived from the id being non-empty. Re-assignment is
/// ignored so an id, once set, is never mutated or cleared.
#[derive(Debug, Default)]
pub struct Session {
    id: String,
}

impl Session {
    /// Creates an unestablished session.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a non-empty id has been assigned.
    #[inline]
    #[must_use]
    pub fn established(&self) -> bool {
        !self.id.is_empty()
    }

    /// Returns the session id, empty until assigned.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Assigns the session id.
    ///
    /// Returns `true` if the id was accepted. Empty ids and re-assignments
    /// are rejected.
    pub fn assign(&mut self, id: impl Into<String>) -> bool {
        if self.established() {
            return false;
        }
        let id = id.into();
        if id.is_empty() {
            return false;
        }
        self.id = id;
        true
    }
}

// ============================================================================
// StreamState
// ============================================================================

/// Mutable state of one streaming run.
///
/// Owned by the client loop; the session initializer, frame dispatcher, and
/// pacing controller receive it by `&mut` / `&`.
#[derive(Debug)]
pub struct StreamState {
    /// Session id, assigned once on successful initialization.
    pub session: Session,
    /// `true` when the lookup channel has no outstanding request.
    ///
    /// Initialized `true`; logically inert until a session exists. Cleared on
    /// dispatch, set again on any reply (success is not content-validated).
    pub ready: bool,
    /// Index of the next frame to act on.
    cursor: usize,
    /// One status per catalog entry, index-aligned.
    statuses: Vec<FrameStatus>,
}

impl StreamState {
    /// Creates the state for a run over `frame_count` frames.
    #[must_use]
    pub fn new(frame_count: usize) -> Self {
        Self {
            session: Session::new(),
            ready: true,
            cursor: 0,
            statuses: vec![FrameStatus::Pending; frame_count],
        }
    }

    /// Returns the current frame cursor.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the number of frames this run covers.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.statuses.len()
    }

    /// Returns `true` when the cursor has passed every frame.
    #[inline]
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.cursor >= self.statuses.len()
    }

    /// Advances the cursor by one, saturating at the catalog length.
    pub fn advance(&mut self) {
        if self.cursor < self.statuses.len() {
            self.cursor += 1;
        }
    }

    /// Returns the status of frame `index`, if it exists.
    #[inline]
    #[must_use]
    pub fn status(&self, index: usize) -> Option<FrameStatus> {
        self.statuses.get(index).copied()
    }

    /// Moves frame `index` to `next`.
    ///
    /// Illegal transitions (including re-dispatch and leaving a terminal
    /// status) are rejected; returns `true` on success.
    pub fn mark(&mut self, index: usize, next: FrameStatus) -> bool {
        match self.statuses.get_mut(index) {
            Some(slot) if slot.allows(next) => {
                *slot = next;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` when the run has nothing left to do.
    ///
    /// Completion requires an established session, an exhausted cursor, and a
    /// free lookup channel. A run whose readiness never returns cannot
    /// complete and exits via the global timeout instead.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.session.established() && self.exhausted() && self.ready
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal() {
        assert!(FrameStatus::Completed.is_terminal());
        assert!(FrameStatus::Dropped.is_terminal());
        assert!(!FrameStatus::Pending.is_terminal());
        assert!(!FrameStatus::Dispatched.is_terminal());
    }

    #[test]
    fn test_status_transitions() {
        assert!(FrameStatus::Pending.allows(FrameStatus::Dispatched));
        assert!(FrameStatus::Pending.allows(FrameStatus::Dropped));
        assert!(FrameStatus::Dispatched.allows(FrameStatus::Completed));

        // No re-dispatch, no leaving terminal states, no dispatched drop.
        assert!(!FrameStatus::Dispatched.allows(FrameStatus::Dispatched));
        assert!(!FrameStatus::Dispatched.allows(FrameStatus::Dropped));
        assert!(!FrameStatus::Completed.allows(FrameStatus::Pending));
        assert!(!FrameStatus::Dropped.allows(FrameStatus::Completed));
    }

    #[test]
    fn test_session_assign_once() {
        let mut session = Session::new();
        assert!(!session.established());
        assert_eq!(session.id(), "");

        assert!(session.assign("S1"));
        assert!(session.established());
        assert_eq!(session.id(), "S1");

        // Second assignment is ignored.
        assert!(!session.assign("S2"));
        assert_eq!(session.id(), "S1");
    }

    #[test]
    fn test_session_rejects_empty_id() {
        let mut session = Session::new();
        assert!(!session.assign(""));
        assert!(!session.established());
    }

    #[test]
    fn test_cursor_monotonic_and_bounded() {
        let mut state = StreamState::new(2);
        assert_eq!(state.cursor(), 0);

        state.advance();
        assert_eq!(state.cursor(), 1);
        state.advance();
        assert_eq!(state.cursor(), 2);
        assert!(state.exhausted());

        // Saturates at the catalog length.
        state.advance();
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn test_mark_enforces_monotonic_transitions() {
        let mut state = StreamState::new(1);

        assert!(state.mark(0, FrameStatus::Dispatched));
        assert!(!state.mark(0, FrameStatus::Dispatched));
        assert!(!state.mark(0, FrameStatus::Dropped));
        assert!(state.mark(0, FrameStatus::Completed));
        assert!(!state.mark(0, FrameStatus::Pending));
        assert_eq!(state.status(0), Some(FrameStatus::Completed));
    }

    #[test]
    fn test_mark_out_of_range() {
        let mut state = StreamState::new(1);
        assert!(!state.mark(5, FrameStatus::Dropped));
        assert_eq!(state.status(5), None);
    }

    #[test]
    fn test_complete_requires_all_three() {
        let mut state = StreamState::new(1);
        assert!(!state.complete());

        state.session.assign("S1");
        assert!(!state.complete());

        state.mark(0, FrameStatus::Dispatched);
        state.advance();
        state.ready = false;
        assert!(!state.complete());

        state.mark(0, FrameStatus::Completed);
        state.ready = true;
        assert!(state.complete());
    }

    #[test]
    fn test_empty_catalog_completes_once_established() {
        let mut state = StreamState::new(0);
        assert!(state.exhausted());
        assert!(!state.complete());

        state.session.assign("S1");
        assert!(state.complete());
    }
}
