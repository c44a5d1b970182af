//! # acme-dns01-cli
//!
//! `dns01-check` looks up `_acme-challenge.<domain>` and reports whether the
//! expected payload is published, so operators can tell a propagation delay
//! from a misconfigured record before the CA tries.

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
