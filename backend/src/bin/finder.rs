//! Occultation finder binary.
//!
//! Runs the search pipeline once and replaces the published event list.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin occultation-finder
//!
//! FINDER_CONFIG=backend/finder.toml FINDER_OUTPUT=/srv/www/occultations.json \
//!   cargo run --bin occultation-finder
//! ```
//!
//! # Environment Variables
//!
//! - `FINDER_CONFIG`: Path to the TOML configuration (default: search for `finder.toml`)
//! - `FINDER_OUTPUT`: Output file path
//! - `FINDER_API_URL`: Prediction service URL
//! - `FINDER_QUOTA`: Minimum number of visible events
//! - `RUST_LOG`: Log level (default: info)

use std::env;

use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use occultation_finder::config::FinderConfig;
use occultation_finder::services::OccultationFinder;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    let config = FinderConfig::load()?;
    info!(
        "Searching occultations for {} ({:.4}, {:.4})",
        config.site.name, config.site.latitude, config.site.longitude
    );

    let finder = OccultationFinder::from_config(&config)?;
    let summary = match finder.run(chrono::Utc::now()).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Failed to publish occultation events: {}", e);
            return Err(e.into());
        }
    };

    if summary.admitted_past_events {
        warn!("Published list contains past events only");
    }
    info!(
        "Published {} events to {} ({:?}; {} windows fetched, {} failed)",
        summary.published,
        config.output.path.display(),
        summary.outcome,
        summary.windows_fetched,
        summary.windows_failed
    );

    Ok(())
}
