//! # Cert Management Controller
//!
//! Runs the shared controller state together with the metrics and probe
//! server and the periodic state reporter.
//!
//! ## Usage
//!
//! Configuration is read from environment variables (`METRICS_PORT`,
//! `RENEWAL_WINDOW`, `DEFAULT_REQUESTS_PER_DAY_QUOTA`, ...). Log verbosity
//! follows `RUST_LOG`.

use anyhow::Result;
use cert_management_controller::runtime::initialize;

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = initialize().await?;
    runtime.run_until_signal().await
}
