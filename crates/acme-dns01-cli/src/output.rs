//! Output formatting for verification results.

use acme_dns01::{VerificationRequest, VerifyError};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored one-line summary
    #[default]
    Pretty,
    /// JSON report
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Outcome of one verification, as printed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Report {
    /// Domain under validation
    pub domain: String,
    /// Name the TXT query went to
    pub lookup_name: String,
    /// Payload that was looked for
    pub expected: String,
    /// Whether a record matched
    pub verified: bool,
    /// Failure kind: `no_txt_record`, `resolution_failed` or `payload_mismatch`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Full error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Values found when they did not match
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observed: Vec<String>,
}

impl Report {
    /// Build a report from a request and its result.
    pub fn new(request: &VerificationRequest, result: &Result<(), VerifyError>) -> Self {
        let (reason, observed) = match result {
            Ok(()) => (None, Vec::new()),
            Err(VerifyError::NoTxtRecord { .. }) => (Some("no_txt_record"), Vec::new()),
            Err(VerifyError::ResolutionFailed { .. }) => (Some("resolution_failed"), Vec::new()),
            Err(VerifyError::PayloadMismatch { observed, .. }) => {
                (Some("payload_mismatch"), observed.clone())
            }
        };

        Self {
            domain: request.domain.clone(),
            lookup_name: request.lookup_name(),
            expected: request.expected_payload.clone(),
            verified: result.is_ok(),
            reason,
            error: result.as_ref().err().map(ToString::to_string),
            observed,
        }
    }

    /// Render in the requested format.
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Pretty => Ok(self.pretty()),
        }
    }

    fn pretty(&self) -> String {
        match &self.error {
            None => format!(
                "{} {} contains '{}'",
                "OK".green().bold(),
                self.lookup_name.cyan(),
                self.expected
            ),
            Some(error) => format!("{} {}", "FAIL".red().bold(), error),
        }
    }
}
