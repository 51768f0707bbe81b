//! Tracing initialization.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Filter comes from `CRABGATE_LOG` (falls back to `warn`). Logs go to
/// stderr so they never interleave with prompt rendering on stdout.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_env("CRABGATE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}
