//! Streamer configuration.
//!
//! Provides a type-safe interface for configuring a streaming run: the two
//! localizer endpoints, the map initialization parameters, the frame source
//! and log destination, and the two timing cadences.
//!
//! # Example
//!
//! ```ignore
//! use frame_streamer::StreamerConfig;
//!
//! let config = StreamerConfig::new()
//!     .with_coordinates(50.4162, 30.8906)
//!     .with_radius_meters(1000)
//!     .with_pacing_interval(std::time::Duration::from_millis(500));
//!
//! config.validate()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default latitude for the map initialization request.
pub const DEFAULT_LAT: f64 = 50.4162;

/// Default longitude for the map initialization request.
pub const DEFAULT_LNG: f64 = 30.8906;

/// Default search radius in meters.
pub const DEFAULT_RADIUS_METERS: u32 = 1000;

/// Default port of the session (init_map) endpoint.
pub const DEFAULT_SESSION_PORT: u16 = 18001;

/// Default port of the frame-lookup (fetch_gps) endpoint.
pub const DEFAULT_LOOKUP_PORT: u16 = 18002;

/// Default fast I/O polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default pacing decision cadence.
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_millis(1000);

/// Default wall-clock budget for a whole run.
pub const DEFAULT_RUN_BUDGET: Duration = Duration::from_secs(60);

/// Default directory scanned for stream frames.
pub const DEFAULT_STREAM_DIR: &str = "data/stream";

/// Default event log destination.
pub const DEFAULT_LOG_PATH: &str = "data/streamer.log";

// ============================================================================
// StreamerConfig
// ============================================================================

/// Configuration for one streaming run.
///
/// Both localizer endpoints are loopback by default; only the ports are
/// expected to vary between deployments.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamerConfig {
    /// Latitude sent in the session initialization request.
    pub lat: f64,

    /// Longitude sent in the session initialization request.
    pub lng: f64,

    /// Search radius in meters sent in the session initialization request.
    pub radius_meters: u32,

    /// Host both endpoints live on.
    pub host: IpAddr,

    /// Port of the session endpoint.
    pub session_port: u16,

    /// Port of the frame-lookup endpoint.
    pub lookup_port: u16,

    /// Directory scanned for frame files.
    pub stream_dir: PathBuf,

    /// Event log destination, truncated at startup.
    pub log_path: PathBuf,

    /// Fast cadence: how often sockets are polled for pending replies.
    pub poll_interval: Duration,

    /// Slow cadence: how often one pacing decision is made.
    pub pacing_interval: Duration,

    /// Wall-clock budget; the run exits via timeout once it elapses.
    pub run_budget: Duration,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            lat: DEFAULT_LAT,
            lng: DEFAULT_LNG,
            radius_meters: DEFAULT_RADIUS_METERS,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            session_port: DEFAULT_SESSION_PORT,
            lookup_port: DEFAULT_LOOKUP_PORT,
            stream_dir: PathBuf::from(DEFAULT_STREAM_DIR),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
            pacing_interval: DEFAULT_PACING_INTERVAL,
            run_budget: DEFAULT_RUN_BUDGET,
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl StreamerConfig {
    /// Creates a configuration with documented defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl StreamerConfig {
    /// Sets the coordinates for the session initialization request.
    #[inline]
    #[must_use]
    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.lat = lat;
        self.lng = lng;
        self
    }

    /// Sets the search radius in meters.
    #[inline]
    #[must_use]
    pub fn with_radius_meters(mut self, meters: u32) -> Self {
        self.radius_meters = meters;
        self
    }

    /// Sets the host both endpoints live on.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the session endpoint port.
    #[inline]
    #[must_use]
    pub fn with_session_port(mut self, port: u16) -> Self {
        self.session_port = port;
        self
    }

    /// Sets the frame-lookup endpoint port.
    #[inline]
    #[must_use]
    pub fn with_lookup_port(mut self, port: u16) -> Self {
        self.lookup_port = port;
        self
    }

    /// Sets the directory scanned for frame files.
    #[inline]
    #[must_use]
    pub fn with_stream_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stream_dir = dir.into();
        self
    }

    /// Sets the event log destination.
    #[inline]
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Sets the fast socket-polling cadence.
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the pacing decision cadence.
    #[inline]
    #[must_use]
    pub fn with_pacing_interval(mut self, interval: Duration) -> Self {
        self.pacing_interval = interval;
        self
    }

    /// Sets the wall-clock budget for the run.
    #[inline]
    #[must_use]
    pub fn with_run_budget(mut self, budget: Duration) -> Self {
        self.run_budget = budget;
        self
    }
}

// ============================================================================
// Accessors & Validation
// ============================================================================

impl StreamerConfig {
    /// Returns the socket address of the session endpoint.
    #[inline]
    #[must_use]
    pub fn session_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.session_port)
    }

    /// Returns the socket address of the frame-lookup endpoint.
    #[inline]
    #[must_use]
    pub fn lookup_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.lookup_port)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any interval is zero, the budget is zero,
    /// or the polling cadence is not faster than the pacing cadence.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::config("poll interval must be non-zero"));
        }
        if self.pacing_interval.is_zero() {
            return Err(Error::config("pacing interval must be non-zero"));
        }
        if self.run_budget.is_zero() {
            return Err(Error::config("run budget must be non-zero"));
        }
        if self.poll_interval >= self.pacing_interval {
            return Err(Error::config(
                "poll interval must be shorter than the pacing interval",
            ));
        }
        if self.radius_meters == 0 {
            return Err(Error::config("search radius must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamerConfig::new();
        assert_eq!(config.lat, DEFAULT_LAT);
        assert_eq!(config.lng, DEFAULT_LNG);
        assert_eq!(config.radius_meters, 1000);
        assert_eq!(config.session_port, 18001);
        assert_eq!(config.lookup_port, 18002);
        assert_eq!(config.stream_dir, PathBuf::from("data/stream"));
        assert_eq!(config.log_path, PathBuf::from("data/streamer.log"));
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.pacing_interval, Duration::from_millis(1000));
        assert_eq!(config.run_budget, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_chain() {
        let config = StreamerConfig::new()
            .with_coordinates(48.85, 2.35)
            .with_radius_meters(500)
            .with_session_port(28001)
            .with_lookup_port(28002)
            .with_stream_dir("/tmp/frames")
            .with_log_path("/tmp/run.log");

        assert_eq!(config.lat, 48.85);
        assert_eq!(config.lng, 2.35);
        assert_eq!(config.radius_meters, 500);
        assert_eq!(config.session_addr().port(), 28001);
        assert_eq!(config.lookup_addr().port(), 28002);
        assert_eq!(config.stream_dir, PathBuf::from("/tmp/frames"));
    }

    #[test]
    fn test_addresses_are_loopback_by_default() {
        let config = StreamerConfig::new();
        assert!(config.session_addr().ip().is_loopback());
        assert!(config.lookup_addr().ip().is_loopback());
    }

    #[test]
    fn test_validate_defaults_ok() {
        assert!(StreamerConfig::new().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let config = StreamerConfig::new().with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_pacing_interval() {
        let config = StreamerConfig::new().with_pacing_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_budget() {
        let config = StreamerConfig::new().with_run_budget(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_poll_not_faster_than_pacing() {
        let config = StreamerConfig::new()
            .with_poll_interval(Duration::from_millis(100))
            .with_pacing_interval(Duration::from_millis(100));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_radius() {
        let config = StreamerConfig::new().with_radius_meters(0);
        assert!(config.validate().is_err());
    }
}
