//! DNS-01 challenge verification.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{Result, VerifyError};
use crate::hickory::default_resolver;
use crate::resolver::{ResolverError, TxtResolver};

/// Label prepended to the domain for DNS-01 records.
pub const CHALLENGE_LABEL: &str = "_acme-challenge";

/// Build the TXT lookup name for a domain.
///
/// Example: `"example.com"` -> `"_acme-challenge.example.com"`
#[must_use]
pub fn challenge_record_name(domain: &str) -> String {
    format!("{CHALLENGE_LABEL}.{domain}")
}

/// A single challenge to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Domain under validation
    pub domain: String,
    /// Value the TXT record must carry
    pub expected_payload: String,
}

impl VerificationRequest {
    /// Create a request
    pub fn new(domain: impl Into<String>, expected_payload: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            expected_payload: expected_payload.into(),
        }
    }

    /// Name the TXT query goes to
    #[must_use]
    pub fn lookup_name(&self) -> String {
        challenge_record_name(&self.domain)
    }
}

/// Verifies DNS-01 challenges against live DNS.
///
/// Holds no state besides the resolver, so clones are cheap and a single
/// verifier can serve concurrent verifications.
#[derive(Clone)]
pub struct Dns01Verifier {
    resolver: Arc<dyn TxtResolver>,
}

impl Dns01Verifier {
    /// Create a verifier, falling back to [`default_resolver`] when `resolver` is `None`
    #[must_use]
    pub fn new(resolver: Option<Arc<dyn TxtResolver>>) -> Self {
        let resolver = resolver.unwrap_or_else(|| default_resolver() as Arc<dyn TxtResolver>);
        Self { resolver }
    }

    /// Create a verifier using `resolver`
    pub fn with_resolver(resolver: impl TxtResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Check that `_acme-challenge.<domain>` has a TXT record equal to `expected_payload`.
    ///
    /// Comparison is byte-exact: no case folding, no trimming. One query is
    /// issued; retries after a propagation delay are up to the caller.
    #[instrument(skip(self, expected_payload))]
    pub async fn verify_challenge(&self, domain: &str, expected_payload: &str) -> Result<()> {
        let name = challenge_record_name(domain);
        debug!(name = %name, "querying challenge TXT record");

        let records = match self.resolver.query_txt(&name).await {
            Ok(records) => records,
            Err(source @ ResolverError::NoRecords { .. }) => {
                debug!(name = %name, "no TXT record present");
                return Err(VerifyError::NoTxtRecord { name, source });
            }
            Err(source @ ResolverError::Failed { .. }) => {
                debug!(name = %name, error = %source, "TXT query failed");
                return Err(VerifyError::ResolutionFailed {
                    name,
                    message: source.to_string(),
                    source,
                });
            }
        };

        if records.is_empty() {
            debug!(name = %name, "resolver returned an empty TXT set");
            let source = ResolverError::no_records(name.as_str());
            return Err(VerifyError::NoTxtRecord { name, source });
        }

        let observed: Vec<String> = records.into_iter().map(|r| r.value).collect();

        if observed.iter().any(|value| value == expected_payload) {
            debug!(name = %name, "challenge record verified");
            Ok(())
        } else {
            debug!(name = %name, observed = ?observed, "challenge record mismatch");
            Err(VerifyError::PayloadMismatch {
                name,
                observed,
                expected: expected_payload.to_string(),
            })
        }
    }

    /// Verify a [`VerificationRequest`]
    pub async fn verify(&self, request: &VerificationRequest) -> Result<()> {
        self.verify_challenge(&request.domain, &request.expected_payload)
            .await
    }
}

impl Default for Dns01Verifier {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for Dns01Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dns01Verifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TxtRecord;
    use async_trait::async_trait;

    struct Fixed(Vec<&'static str>);

    #[async_trait]
    impl TxtResolver for Fixed {
        async fn query_txt(
            &self,
            _name: &str,
        ) -> std::result::Result<Vec<TxtRecord>, ResolverError> {
            Ok(self.0.iter().copied().map(TxtRecord::from).collect())
        }
    }

    #[test]
    fn record_name_format() {
        assert_eq!(
            challenge_record_name("example.com"),
            "_acme-challenge.example.com"
        );
        assert_eq!(
            challenge_record_name("Sub.Example.COM."),
            "_acme-challenge.Sub.Example.COM."
        );
        assert_eq!(challenge_record_name(""), "_acme-challenge.");
    }

    #[test]
    fn request_lookup_name() {
        let request = VerificationRequest::new("example.org", "token");
        assert_eq!(request.lookup_name(), "_acme-challenge.example.org");
    }

    #[test]
    fn blocking_verify() {
        let verifier = Dns01Verifier::with_resolver(Fixed(vec!["token"]));
        let request = VerificationRequest::new("example.org", "token");
        assert!(tokio_test::block_on(verifier.verify(&request)).is_ok());
    }

    #[tokio::test]
    async fn trailing_whitespace_is_significant() {
        let verifier = Dns01Verifier::with_resolver(Fixed(vec!["token "]));
        let err = verifier
            .verify_challenge("example.org", "token")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::PayloadMismatch { .. }));
    }
}
