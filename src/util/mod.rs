use anyhow::{anyhow, Result};
use tracing_subscriber::fmt::time::OffsetTime;

pub mod assert;
pub mod colour;
pub mod linalg;

/// Installs the global `tracing` subscriber: UTC timestamps with microseconds, source locations,
/// no targets.
pub fn setup_log() -> Result<()> {
    let timer = OffsetTime::new(
        time::UtcOffset::UTC,
        time::macros::format_description!("[hour]:[minute]:[second].[subsecond digits:6]"),
    );
    tracing_subscriber::fmt()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_target(false)
                .with_source_location(true)
                .with_timer(timer),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
