//! Client loop.
//!
//! Drives the whole run: an unbounded loop on the fast polling cadence that
//! (a) polls whichever reply is pending - the session reply while no session
//! exists, otherwise the frame result while one is outstanding - and (b) runs
//! one pacing decision whenever the pacing interval has elapsed.
//!
//! The loop has exactly two exits: [`Outcome::Completed`] once the session is
//! established, every frame has reached a terminal status, and the lookup
//! channel is free; or [`Outcome::TimedOut`] once the wall-clock budget
//! elapses regardless of progress. A permanently unresponsive service runs
//! the loop all the way to the timeout.

// ============================================================================
// Imports
// ============================================================================

use std::time::Instant;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::StreamerConfig;
use crate::error::Result;
use crate::journal::EventLog;
use crate::state::StreamState;

use super::dispatch::FrameDispatcher;
use super::pacing::{PacingController, TickAction};
use super::session::SessionInitializer;

// ============================================================================
// Outcome
// ============================================================================

/// How a run ended.
///
/// The process exit code does not distinguish the two (both exit 0, matching
/// the deployed behavior); callers that need to can inspect this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Session established, every frame terminal, lookup channel free.
    Completed,
    /// The wall-clock budget elapsed before completion.
    TimedOut,
}

impl Outcome {
    /// Returns `true` if the run completed all its work.
    #[inline]
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

// ============================================================================
// Streamer
// ============================================================================

/// The assembled client: state, components, and the loop that drives them.
#[derive(Debug)]
pub struct Streamer {
    config: StreamerConfig,
    catalog: Catalog,
    state: StreamState,
    initializer: SessionInitializer,
    dispatcher: FrameDispatcher,
    pacer: PacingController,
    journal: EventLog,
}

impl Streamer {
    /// Builds a streamer from configuration, loading the frame catalog from
    /// the configured stream directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the stream directory
    /// cannot be read, or the event log cannot be created. These are the only
    /// fatal conditions; everything after this point is survived.
    pub fn new(config: StreamerConfig) -> Result<Self> {
        config.validate()?;
        let catalog = Catalog::load(&config.stream_dir)?;
        Self::with_catalog(config, catalog)
    }

    /// Builds a streamer over an explicit catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the event log
    /// cannot be created.
    pub fn with_catalog(config: StreamerConfig, catalog: Catalog) -> Result<Self> {
        config.validate()?;
        let journal = EventLog::create(&config.log_path)?;
        let state = StreamState::new(catalog.len());
        let initializer = SessionInitializer::new(
            config.session_addr(),
            config.lat,
            config.lng,
            config.radius_meters,
        );
        let dispatcher = FrameDispatcher::new(config.lookup_addr());
        let pacer = PacingController::new(config.pacing_interval);

        Ok(Self {
            config,
            catalog,
            state,
            initializer,
            dispatcher,
            pacer,
            journal,
        })
    }

    /// Runs the client loop to one of its two terminal conditions.
    ///
    /// # Errors
    ///
    /// This method itself does not fail once constructed: transport and
    /// protocol errors are logged and survived inside the loop. The `Result`
    /// is kept for interface stability.
    pub async fn run(mut self) -> Result<Outcome> {
        info!(
            frames = self.catalog.len(),
            session = %self.config.session_addr(),
            lookup = %self.config.lookup_addr(),
            "Starting client loop"
        );

        let started = Instant::now();
        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            poll.tick().await;

            // Fast cadence: check sockets, never decide policy.
            if !self.state.session.established() {
                self.initializer
                    .poll_response(&mut self.state, &mut self.journal);
            } else if !self.state.ready {
                self.dispatcher
                    .poll_result(&mut self.state, &mut self.journal);
            }

            if self.state.complete() {
                info!(
                    frames = self.catalog.len(),
                    ticks = self.pacer.ticks(),
                    "Processing complete"
                );
                return Ok(Outcome::Completed);
            }

            // Slow cadence: one decision per pacing interval.
            if self.pacer.is_due(Instant::now()) {
                let action =
                    PacingController::decide(&self.state, self.initializer.attempt_outstanding());
                debug!(?action, cursor = self.state.cursor(), "Pacing tick");
                match action {
                    TickAction::RequestSession => {
                        self.initializer.request_session(&self.state).await;
                    }
                    TickAction::AwaitSession => {}
                    TickAction::DispatchFrame => {
                        self.dispatcher
                            .dispatch_next(&mut self.state, &self.catalog)
                            .await;
                    }
                    TickAction::ShedFrame => {
                        self.dispatcher.shed_current(&mut self.state, &mut self.journal);
                    }
                    TickAction::Idle => {}
                }
            }

            if started.elapsed() >= self.config.run_budget {
                warn!(
                    budget_ms = self.config.run_budget.as_millis() as u64,
                    cursor = self.state.cursor(),
                    established = self.state.session.established(),
                    "Run budget exhausted, timing out"
                );
                return Ok(Outcome::TimedOut);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
