//! Command-line entry point for the frame streamer.
//!
//! Parses the externally supplied run parameters, builds the client, and
//! drives it to one of its two terminal conditions. Both completion and
//! timeout exit with status 0, matching the deployed behavior; the outcome is
//! still logged so operators can tell them apart.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use frame_streamer::{Outcome, Streamer, StreamerConfig};

/// Streams captured camera frames to a remote localization service.
#[derive(Parser, Debug)]
#[command(name = "frame-streamer", version, about)]
struct Cli {
    /// Latitude of the map center
    #[arg(long, default_value_t = frame_streamer::config::DEFAULT_LAT)]
    lat: f64,

    /// Longitude of the map center
    #[arg(long, default_value_t = frame_streamer::config::DEFAULT_LNG)]
    lng: f64,

    /// Search radius in meters
    #[arg(long, default_value_t = frame_streamer::config::DEFAULT_RADIUS_METERS)]
    meters: u32,

    /// Port of the session (init_map) endpoint
    #[arg(long, default_value_t = frame_streamer::config::DEFAULT_SESSION_PORT)]
    session_port: u16,

    /// Port of the frame-lookup (fetch_gps) endpoint
    #[arg(long, default_value_t = frame_streamer::config::DEFAULT_LOOKUP_PORT)]
    lookup_port: u16,

    /// Directory scanned for stream frames
    #[arg(long, default_value = frame_streamer::config::DEFAULT_STREAM_DIR)]
    stream_dir: PathBuf,

    /// Event log destination
    #[arg(long, default_value = frame_streamer::config::DEFAULT_LOG_PATH)]
    log_file: PathBuf,

    /// Pacing decision interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    pacing_ms: u64,

    /// Wall-clock budget for the whole run in seconds
    #[arg(long, default_value_t = 60)]
    budget_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = StreamerConfig::new()
        .with_coordinates(cli.lat, cli.lng)
        .with_radius_meters(cli.meters)
        .with_session_port(cli.session_port)
        .with_lookup_port(cli.lookup_port)
        .with_stream_dir(cli.stream_dir)
        .with_log_path(cli.log_file)
        .with_pacing_interval(Duration::from_millis(cli.pacing_ms))
        .with_run_budget(Duration::from_secs(cli.budget_secs));

    let streamer = match Streamer::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Startup failed");
            std::process::exit(1);
        }
    };

    match streamer.run().await {
        Ok(Outcome::Completed) => info!("Run completed"),
        Ok(Outcome::TimedOut) => info!("Run timed out"),
        Err(e) => {
            // The loop survives its own errors; this path is unreachable in
            // practice but kept total.
            error!(error = %e, "Run aborted");
            std::process::exit(1);
        }
    }
}
