//! The DNS capability the verifier depends on.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Boxed error carried as the cause of a resolution failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A single TXT resource record as seen by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxtRecord {
    /// Record data. Multi-string records are concatenated.
    pub value: String,
}

impl TxtRecord {
    /// Create a record from its text value
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Record value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<&str> for TxtRecord {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TxtRecord {
    fn from(value: String) -> Self {
        Self { value }
    }
}

/// Errors a [`TxtResolver`] may report.
///
/// The two variants must stay distinct: a name without TXT data usually
/// means the record has not propagated yet, anything else is a lookup
/// failure.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The name answered, but carries no TXT records
    #[error("no TXT records found for '{name}'")]
    NoRecords {
        /// Name that was queried
        name: String,
    },

    /// Timeout, NXDOMAIN, network error, malformed response, ...
    #[error("{message}")]
    Failed {
        /// Human-readable detail
        message: String,
        /// Underlying resolver error, if any
        #[source]
        source: Option<BoxError>,
    },
}

impl ResolverError {
    /// No TXT records exist at `name`
    pub fn no_records(name: impl Into<String>) -> Self {
        Self::NoRecords { name: name.into() }
    }

    /// Generic failure without an underlying error value
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Generic failure wrapping an underlying error
    pub fn from_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Whether the name simply has no TXT records
    #[must_use]
    pub const fn is_no_records(&self) -> bool {
        matches!(self, Self::NoRecords { .. })
    }
}

/// Anything able to look up TXT records by name.
///
/// Implementations own timeouts, retries and caching; the verifier issues
/// exactly one query per verification.
#[async_trait]
pub trait TxtResolver: Send + Sync {
    /// Query all TXT records at `name`, in the order the resolver returned them
    async fn query_txt(&self, name: &str) -> Result<Vec<TxtRecord>, ResolverError>;
}

#[async_trait]
impl<T: TxtResolver + ?Sized> TxtResolver for Arc<T> {
    async fn query_txt(&self, name: &str) -> Result<Vec<TxtRecord>, ResolverError> {
        (**self).query_txt(name).await
    }
}

#[async_trait]
impl<T: TxtResolver + ?Sized> TxtResolver for Box<T> {
    async fn query_txt(&self, name: &str) -> Result<Vec<TxtRecord>, ResolverError> {
        (**self).query_txt(name).await
    }
}
