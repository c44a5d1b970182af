//! CLI argument parsing and dispatch.

pub mod args;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use acme_dns01::{Dns01Verifier, HickoryTxtResolver, ResolverSettings, VerificationRequest};
use anyhow::Result;
use args::Cli;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::{OutputFormat, Report};

/// Run the CLI application.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    let settings = resolver_settings(&cli, &config);
    debug!(?settings, "resolver settings");

    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    let resolver = Arc::new(HickoryTxtResolver::with_settings(&settings));
    let verifier = Dns01Verifier::new(Some(resolver));

    let request = VerificationRequest::new(cli.domain, cli.payload);
    let result = verifier.verify(&request).await;

    let report = Report::new(&request, &result);
    println!("{}", report.render(output_format)?);

    Ok(if report.verified {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Flags and environment override the config file.
fn resolver_settings(cli: &Cli, config: &Config) -> ResolverSettings {
    let mut settings = config.resolver.clone();

    if !cli.nameservers.is_empty() {
        settings = settings.nameservers(cli.nameservers.iter().copied());
    }
    if let Some(secs) = cli.timeout {
        settings = settings.timeout(Duration::from_secs(secs));
    }
    if let Some(attempts) = cli.attempts {
        settings = settings.attempts(attempts);
    }

    settings
}

/// `RUST_LOG` wins; otherwise warnings only, or debug for this tool with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,acme_dns01=debug,acme_dns01_cli=debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
