//! Command-line argument definitions using clap.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::output::OutputFormat;

/// Check an ACME DNS-01 challenge record
///
/// Looks up the TXT records at `_acme-challenge.<DOMAIN>` and succeeds when
/// one of them equals PAYLOAD exactly. Exits with status 1 when the record
/// is missing, differs, or cannot be queried.
#[derive(Parser, Debug)]
#[command(name = "dns01-check")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Domain under validation (without the `_acme-challenge.` label)
    pub domain: String,

    /// Expected TXT record value
    pub payload: String,

    /// Nameserver to query; repeat or comma-separate for several
    #[arg(
        short = 'n',
        long = "nameserver",
        env = "DNS01_NAMESERVERS",
        value_delimiter = ','
    )]
    pub nameservers: Vec<IpAddr>,

    /// Per-request timeout in seconds
    #[arg(
        short,
        long,
        env = "DNS01_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Attempts per query
    #[arg(short, long)]
    pub attempts: Option<usize>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
