use thiserror::Error;

use crate::resolver::ResolverError;

/// Result type alias for challenge verification
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Why a DNS-01 challenge could not be verified
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The challenge name carries no TXT records
    #[error("verification failed, no TXT record found for '{name}'")]
    NoTxtRecord {
        /// Queried lookup name
        name: String,
        /// Resolver error reporting the absence
        #[source]
        source: ResolverError,
    },

    /// The TXT query itself failed
    #[error("verification failed, couldn't query TXT record of '{name}': {message}")]
    ResolutionFailed {
        /// Queried lookup name
        name: String,
        /// Detail from the resolver
        message: String,
        /// Underlying resolver error
        #[source]
        source: ResolverError,
    },

    /// Records exist, but none equals the expected payload
    #[error(
        "verification failed, please check DNS record for '{name}'. It contains {found} but '{expected}' was expected.",
        found = quote_list(.observed)
    )]
    PayloadMismatch {
        /// Queried lookup name
        name: String,
        /// Every TXT value the resolver returned, in order
        observed: Vec<String>,
        /// Payload that was looked for
        expected: String,
    },
}

impl VerifyError {
    /// The `_acme-challenge.` name the failed lookup was made for
    #[must_use]
    pub fn lookup_name(&self) -> &str {
        match self {
            Self::NoTxtRecord { name, .. }
            | Self::ResolutionFailed { name, .. }
            | Self::PayloadMismatch { name, .. } => name,
        }
    }
}

/// Render values as `'a', 'b', 'c'`.
fn quote_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
