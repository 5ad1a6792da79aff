//! Frame dispatch.
//!
//! Issues per-frame position-lookup calls, one frame at a time, gated on the
//! readiness flag: a new frame goes out only when the previous exchange has
//! seen a reply. When the pacing controller finds the channel still busy it
//! sheds the current frame instead of queuing it ([`FrameDispatcher::shed_current`]).
//!
//! Failure handling is deliberately asymmetric with the session channel: a
//! failed lookup connect is not retried and the frame is simply lost, and a
//! dispatched frame whose reply never arrives keeps readiness false for the
//! rest of the run. Only the global timeout ends such a run.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;

use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::journal::EventLog;
use crate::protocol::LookupRequest;
use crate::state::{FrameStatus, StreamState};
use crate::transport::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Receive buffer size for lookup replies.
const LOOKUP_REPLY_MAX: usize = 8192;

// ============================================================================
// FrameDispatcher
// ============================================================================

/// Sends frames to the lookup endpoint and polls for their replies.
#[derive(Debug)]
pub struct FrameDispatcher {
    /// Lookup endpoint address.
    addr: SocketAddr,
    /// Connection of the in-flight exchange, if any.
    conn: Option<Connection>,
    /// Index of the frame the in-flight exchange belongs to.
    inflight: Option<usize>,
}

impl FrameDispatcher {
    /// Creates a dispatcher targeting `addr`.
    #[must_use]
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            conn: None,
            inflight: None,
        }
    }

    /// Dispatches the frame at the current cursor.
    ///
    /// Marks the frame `Dispatched`, advances the cursor, then opens a fresh
    /// connection and sends the length-framed lookup request. Readiness is
    /// cleared only once the request is actually on the wire; a connect or
    /// send failure leaves the channel free and the frame lost (no retry).
    pub async fn dispatch_next(
        &mut self,
        state: &mut StreamState,
        catalog: &Catalog,
    ) {
        if !state.session.established() || !state.ready {
            return;
        }
        let index = state.cursor();
        let Some(frame) = catalog.get(index) else {
            return;
        };

        state.mark(index, FrameStatus::Dispatched);
        state.advance();

        let request = LookupRequest::new(state.session.id(), &frame.identifier);
        let payload = match request.encode() {
            Ok(p) => p,
            Err(e) => {
                error!(index, error = %e, "Failed to encode lookup request, frame lost");
                return;
            }
        };

        let mut conn = match Connection::open(self.addr).await {
            Ok(c) => c,
            Err(e) => {
                error!(index, addr = %self.addr, error = %e, "Lookup connect failed, frame lost");
                return;
            }
        };

        if let Err(e) = conn.send_framed(&payload).await {
            warn!(index, error = %e, "Lookup send failed, exchange abandoned");
            return;
        }

        state.ready = false;
        self.conn = Some(conn);
        self.inflight = Some(index);
        info!(index, identifier = %frame.identifier, "Dispatched frame");
    }

    /// Polls for the reply to the most recent dispatch without blocking.
    ///
    /// Any reply restores readiness; the content is not validated, only
    /// recorded verbatim. A reply-less remote close drops the connection but
    /// leaves readiness false, preserving the stall the protocol allows.
    pub fn poll_result(&mut self, state: &mut StreamState, journal: &mut EventLog) {
        let Some(conn) = self.conn.as_ref() else {
            return;
        };
        let Some(index) = self.inflight else {
            return;
        };

        match conn.try_receive(LOOKUP_REPLY_MAX) {
            Ok(None) => {}
            Ok(Some(data)) => {
                state.mark(index, FrameStatus::Completed);
                state.ready = true;
                journal.frame_result(index, &data);
                info!(index, len = data.len(), "Frame result received");
                self.conn = None;
                self.inflight = None;
            }
            Err(e) => {
                warn!(index, error = %e, "Lookup exchange abandoned, readiness not restored");
                self.conn = None;
                self.inflight = None;
                debug!(index, "Frame will never complete");
            }
        }
    }

    /// Sheds the frame at the current cursor without sending anything.
    ///
    /// The shed-load policy: work that cannot be served within one pacing
    /// interval is discarded, never queued. The cursor still advances by
    /// exactly one.
    pub fn shed_current(&mut self, state: &mut StreamState, journal: &mut EventLog) {
        let index = state.cursor();
        if index >= state.frame_count() {
            return;
        }
        state.mark(index, FrameStatus::Dropped);
        journal.frame_dropped(index);
        state.advance();
        info!(index, "Dropped frame, localizer busy");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_journal() -> (tempfile::TempDir, EventLog) {
        let dir = tempdir().expect("tempdir");
        let journal = EventLog::create(dir.path().join("run.log")).expect("journal");
        (dir, journal)
    }

    fn established_state(frames: usize) -> StreamState {
        let mut state = StreamState::new(frames);
        state.session.assign("S1");
        state
    }

    async fn poll_until<F: FnMut() -> bool>(mut done: F) {
        for _ in 0..200 {
            if done() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_dispatch_and_complete() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut prefix = [0u8; 4];
            stream.read_exact(&mut prefix).await.expect("prefix");
            let len: usize = std::str::from_utf8(&prefix)
                .expect("ascii")
                .trim_end()
                .parse()
                .expect("length");
            let mut payload = vec![0u8; len];
            stream.read_exact(&mut payload).await.expect("payload");
            stream
                .write_all(br#"{"lat": 50.41, "lng": 30.89}"#)
                .await
                .expect("reply");
            stream.flush().await.expect("flush");
            payload
        });

        let catalog = Catalog::from_identifiers(["data/stream/a.jpg"]);
        let mut state = established_state(1);
        let (dir, mut journal) = test_journal();
        let mut dispatcher = FrameDispatcher::new(addr);

        dispatcher.dispatch_next(&mut state, &catalog).await;
        assert!(!state.ready);
        assert_eq!(state.cursor(), 1);
        assert_eq!(state.status(0), Some(FrameStatus::Dispatched));

        poll_until(|| {
            dispatcher.poll_result(&mut state, &mut journal);
            state.ready
        })
        .await;

        assert_eq!(state.status(0), Some(FrameStatus::Completed));
        assert!(state.complete());

        let payload = server.await.expect("join");
        assert_eq!(
            String::from_utf8(payload).expect("utf8"),
            r#"{"session_id":"S1","image_path":"data/stream/a.jpg"}"#
        );

        let log = std::fs::read_to_string(dir.path().join("run.log")).expect("read log");
        assert!(log.contains(r#"Frame 0: {"lat": 50.41, "lng": 30.89}"#));
    }

    #[tokio::test]
    async fn test_dispatch_requires_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let catalog = Catalog::from_identifiers(["a.jpg"]);
        let mut state = StreamState::new(1);
        let mut dispatcher = FrameDispatcher::new(addr);

        dispatcher.dispatch_next(&mut state, &catalog).await;

        assert_eq!(state.cursor(), 0);
        assert_eq!(state.status(0), Some(FrameStatus::Pending));
        assert!(state.ready);
    }

    #[tokio::test]
    async fn test_connect_failure_loses_frame_keeps_readiness() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let catalog = Catalog::from_identifiers(["a.jpg", "b.jpg"]);
        let mut state = established_state(2);
        let mut dispatcher = FrameDispatcher::new(addr);

        dispatcher.dispatch_next(&mut state, &catalog).await;

        // Frame 0 is lost: marked dispatched, cursor advanced, no retry,
        // readiness untouched so the run can continue with frame 1.
        assert_eq!(state.status(0), Some(FrameStatus::Dispatched));
        assert_eq!(state.cursor(), 1);
        assert!(state.ready);
    }

    #[tokio::test]
    async fn test_shed_advances_without_sending() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = tokio::spawn(async move {
            match tokio::time::timeout(
                std::time::Duration::from_millis(200),
                listener.accept(),
            )
            .await
            {
                Ok(_) => true,
                Err(_) => false,
            }
        });

        let mut state = established_state(2);
        state.ready = false;
        let (dir, mut journal) = test_journal();
        let mut dispatcher = FrameDispatcher::new(addr);

        dispatcher.shed_current(&mut state, &mut journal);

        assert_eq!(state.status(0), Some(FrameStatus::Dropped));
        assert_eq!(state.cursor(), 1);
        assert!(!state.ready);

        // Nothing was sent.
        assert!(!server.await.expect("join"));

        let log = std::fs::read_to_string(dir.path().join("run.log")).expect("read log");
        assert!(log.contains("Dropped frame 0 (localizer busy)"));
    }

    #[tokio::test]
    async fn test_replyless_close_preserves_stall() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = vec![0u8; 256];
            let _ = stream.read(&mut buf).await;
            // Close without replying.
        });

        let catalog = Catalog::from_identifiers(["a.jpg"]);
        let mut state = established_state(1);
        let (_dir, mut journal) = test_journal();
        let mut dispatcher = FrameDispatcher::new(addr);

        dispatcher.dispatch_next(&mut state, &catalog).await;
        assert!(!state.ready);

        poll_until(|| {
            dispatcher.poll_result(&mut state, &mut journal);
            dispatcher.conn.is_none()
        })
        .await;

        // Connection reclaimed, but readiness stays false: the documented
        // stall. The run can only end via the global timeout.
        assert!(!state.ready);
        assert_eq!(state.status(0), Some(FrameStatus::Dispatched));
        assert!(!state.complete());
    }
}
