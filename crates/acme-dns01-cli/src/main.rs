//! dns01-check - verify an ACME DNS-01 challenge record from the command line.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    acme_dns01_cli::run().await
}
