//! Session initialization.
//!
//! Drives the `NoSession -> AwaitingResponse -> Established` state machine.
//! `Established` is terminal for the process lifetime and is never re-entered.
//!
//! The initializer never loops on its own: it issues one attempt when asked,
//! and retry on connect failure is driven externally by the pacing controller
//! clearing-and-requesting on a later tick. At most one attempt is outstanding
//! at any time.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;

use tracing::{debug, info, warn};

use crate::journal::EventLog;
use crate::protocol::{extract_session_id, InitRequest};
use crate::state::StreamState;
use crate::transport::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Receive buffer size for session replies.
const SESSION_REPLY_MAX: usize = 4096;

// ============================================================================
// SessionInitializer
// ============================================================================

/// Issues the session-establishment call and polls for its reply.
#[derive(Debug)]
pub struct SessionInitializer {
    /// Session endpoint address.
    addr: SocketAddr,
    /// Request body sent on every attempt.
    request: InitRequest,
    /// Connection of the outstanding attempt, if any.
    conn: Option<Connection>,
    /// Set while an attempt is outstanding; cleared only by connect failure
    /// or establishment.
    outstanding: bool,
}

impl SessionInitializer {
    /// Creates an initializer targeting `addr`.
    #[must_use]
    pub fn new(addr: SocketAddr, lat: f64, lng: f64, radius_meters: u32) -> Self {
        Self {
            addr,
            request: InitRequest::new(lat, lng, radius_meters),
            conn: None,
            outstanding: false,
        }
    }

    /// Returns `true` while an initialization attempt is outstanding.
    #[inline]
    #[must_use]
    pub fn attempt_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Issues one session-establishment attempt.
    ///
    /// Opens a fresh connection and sends the request unframed. On connect
    /// failure the outstanding marker is cleared so the pacing controller
    /// retries on a later tick; any failure after a successful connect
    /// abandons the exchange with the marker still set.
    pub async fn request_session(&mut self, state: &StreamState) {
        if state.session.established() || self.outstanding {
            return;
        }
        self.outstanding = true;

        let payload = match self.request.encode() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to encode session request");
                self.outstanding = false;
                return;
            }
        };

        let mut conn = match Connection::open(self.addr).await {
            Ok(c) => c,
            Err(e) => {
                warn!(addr = %self.addr, error = %e, "Session connect failed, will retry");
                self.outstanding = false;
                return;
            }
        };

        if let Err(e) = conn.send_raw(&payload).await {
            warn!(addr = %self.addr, error = %e, "Session send failed, attempt abandoned");
            return;
        }

        info!(addr = %self.addr, "Sent session initialization request");
        self.conn = Some(conn);
    }

    /// Polls for the session reply without blocking.
    ///
    /// On data, extracts the session id by literal marker search. A reply the
    /// id cannot be extracted from leaves the session awaiting with the
    /// marker still set, so no further attempt is issued by this path.
    pub fn poll_response(&mut self, state: &mut StreamState, journal: &mut EventLog) {
        let Some(conn) = self.conn.as_ref() else {
            return;
        };

        match conn.try_receive(SESSION_REPLY_MAX) {
            Ok(None) => {}
            Ok(Some(data)) => {
                self.conn = None;
                match extract_session_id(&data) {
                    Some(id) => {
                        if state.session.assign(&id) {
                            self.outstanding = false;
                            journal.session_initialized(&id);
                            info!(session_id = %id, "Session established");
                        }
                    }
                    None => {
                        warn!(
                            len = data.len(),
                            "Malformed session reply, session id not found"
                        );
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Session exchange abandoned");
                self.conn = None;
                debug!("Session remains unestablished");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
