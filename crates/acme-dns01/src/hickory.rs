//! [`TxtResolver`] backed by hickory-resolver.

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{ResolveError, Resolver, TokioResolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::resolver::{ResolverError, TxtRecord, TxtResolver};

const DEFAULT_PORT: u16 = 53;
const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ATTEMPTS: usize = 2;

/// Settings for [`HickoryTxtResolver`].
///
/// Retries and timeouts configured here are the only ones applied to a
/// verification; the verifier itself never retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Nameservers to query (empty = system configuration)
    pub nameservers: Vec<IpAddr>,
    /// Port used for the configured nameservers
    pub port: u16,
    /// Per-request timeout, in milliseconds (0 is treated as 1)
    pub timeout_ms: u64,
    /// Attempts per query before giving up
    pub attempts: usize,
    /// Resolver cache entries (0 keeps every lookup fresh)
    pub cache_size: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverSettings {
    /// System nameservers, 5 second timeout, 2 attempts, no cache
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nameservers: Vec::new(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            attempts: DEFAULT_ATTEMPTS,
            cache_size: 0,
        }
    }

    /// Query these nameservers instead of the system ones
    #[must_use]
    pub fn nameservers(mut self, nameservers: impl IntoIterator<Item = IpAddr>) -> Self {
        self.nameservers = nameservers.into_iter().collect();
        self
    }

    /// Set the nameserver port
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the per-request timeout, at millisecond precision
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set attempts per query
    #[must_use]
    pub const fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the resolver cache size
    #[must_use]
    pub const fn cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Per-request timeout as a [`Duration`], never zero
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    fn resolver_opts(&self) -> ResolverOpts {
        let mut opts = ResolverOpts::default();
        opts.timeout = self.request_timeout();
        opts.attempts = self.attempts;
        opts.cache_size = self.cache_size;
        opts
    }

    fn explicit_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::new();
        for ip in &self.nameservers {
            let addr = SocketAddr::new(*ip, self.port);
            config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));
            // Large TXT answers come back truncated over UDP
            config.add_name_server(NameServerConfig::new(addr, Protocol::Tcp));
        }
        config
    }
}

/// TXT lookups through a [`TokioResolver`].
#[derive(Debug, Clone)]
pub struct HickoryTxtResolver {
    resolver: TokioResolver,
}

impl HickoryTxtResolver {
    /// Resolver using the system configuration
    pub fn new() -> Self {
        Self::with_settings(&ResolverSettings::default())
    }

    /// Resolver built from `settings`.
    ///
    /// With no explicit nameservers the system configuration is used. If it
    /// cannot be read, hickory's built-in public resolvers are used instead.
    pub fn with_settings(settings: &ResolverSettings) -> Self {
        let opts = settings.resolver_opts();

        let builder = if settings.nameservers.is_empty() {
            match TokioResolver::builder_tokio() {
                Ok(builder) => builder,
                Err(e) => {
                    warn!(error = %e, "failed to read system resolver config, using defaults");
                    Resolver::builder_with_config(
                        ResolverConfig::default(),
                        TokioConnectionProvider::default(),
                    )
                }
            }
        } else {
            debug!(nameservers = ?settings.nameservers, port = settings.port, "using explicit nameservers");
            Resolver::builder_with_config(
                settings.explicit_config(),
                TokioConnectionProvider::default(),
            )
        };

        Self {
            resolver: builder.with_options(opts).build(),
        }
    }

    /// Wrap an already configured resolver
    #[must_use]
    pub const fn from_resolver(resolver: TokioResolver) -> Self {
        Self { resolver }
    }

    /// The underlying resolver
    #[must_use]
    pub const fn inner(&self) -> &TokioResolver {
        &self.resolver
    }
}

impl Default for HickoryTxtResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TxtResolver for HickoryTxtResolver {
    async fn query_txt(&self, name: &str) -> Result<Vec<TxtRecord>, ResolverError> {
        let lookup = self
            .resolver
            .txt_lookup(name)
            .await
            .map_err(|e| classify_error(name, e))?;

        Ok(lookup
            .iter()
            .map(|txt| {
                // A TXT record may hold several character-strings
                let value: String = txt
                    .txt_data()
                    .iter()
                    .map(|data| String::from_utf8_lossy(data))
                    .collect();
                trace!(record = %name, value = %value, "TXT record");
                TxtRecord::from(value)
            })
            .collect())
    }
}

/// Map a hickory error onto the two outcomes the verifier tells apart.
///
/// NOERROR without answers means the name exists but has no TXT data.
/// NXDOMAIN and every transport-level failure count as resolution failures.
fn classify_error(name: &str, err: ResolveError) -> ResolverError {
    if err.is_no_records_found() && !err.is_nx_domain() {
        ResolverError::no_records(name)
    } else {
        ResolverError::from_source(err)
    }
}

static DEFAULT_RESOLVER: OnceLock<Arc<HickoryTxtResolver>> = OnceLock::new();

/// Process-wide resolver used when a verifier is built without one.
///
/// Built on first use with [`ResolverSettings::default`].
pub fn default_resolver() -> Arc<HickoryTxtResolver> {
    Arc::clone(DEFAULT_RESOLVER.get_or_init(|| Arc::new(HickoryTxtResolver::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::proto::op::{Query, ResponseCode};
    use hickory_resolver::proto::ProtoError;
    use std::net::Ipv4Addr;

    const NAME: &str = "_acme-challenge.example.com";

    fn negative_answer(code: ResponseCode) -> ResolveError {
        ProtoError::nx_error(Box::new(Query::default()), None, None, None, code, true, None).into()
    }

    #[test]
    fn noerror_without_answers_is_no_records() {
        let err = classify_error(NAME, negative_answer(ResponseCode::NoError));
        assert!(err.is_no_records());
        assert_eq!(err.to_string(), format!("no TXT records found for '{NAME}'"));
    }

    #[test]
    fn nxdomain_is_a_failure() {
        let err = classify_error(NAME, negative_answer(ResponseCode::NXDomain));
        assert!(matches!(err, ResolverError::Failed { source: Some(_), .. }));
    }

    #[test]
    fn timeout_is_a_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "request timed out");
        let err = classify_error(NAME, ResolveError::from(ProtoError::from(io)));
        assert!(!err.is_no_records());
        assert!(matches!(err, ResolverError::Failed { source: Some(_), .. }));
    }

    #[test]
    fn sub_second_timeout_kept() {
        let settings = ResolverSettings::new().timeout(Duration::from_millis(1500));
        assert_eq!(settings.request_timeout(), Duration::from_millis(1500));

        let settings = ResolverSettings::new().timeout(Duration::from_millis(500));
        assert_eq!(settings.request_timeout(), Duration::from_millis(500));
        assert_eq!(settings.resolver_opts().timeout, Duration::from_millis(500));
    }

    #[test]
    fn zero_timeout_never_reaches_resolver() {
        let settings = ResolverSettings::new().timeout(Duration::ZERO);
        assert_eq!(settings.timeout_ms, 0);
        assert_eq!(settings.request_timeout(), Duration::from_millis(1));
        assert!(!settings.resolver_opts().timeout.is_zero());
    }

    #[test]
    fn default_settings() {
        let settings = ResolverSettings::default();
        assert!(settings.nameservers.is_empty());
        assert_eq!(settings.port, 53);
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.attempts, 2);
        assert_eq!(settings.cache_size, 0);
    }

    #[test]
    fn builder_setters() {
        let settings = ResolverSettings::new()
            .nameservers([IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))])
            .port(5353)
            .timeout(Duration::from_secs(2))
            .attempts(4)
            .cache_size(16);

        assert_eq!(settings.nameservers, vec![IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))]);
        assert_eq!(settings.port, 5353);
        assert_eq!(settings.timeout_ms, 2_000);
        assert_eq!(settings.attempts, 4);
        assert_eq!(settings.cache_size, 16);
    }

    #[test]
    fn explicit_config_adds_udp_and_tcp() {
        let settings = ResolverSettings::new().nameservers([
            IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
            IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9)),
        ]);
        let config = settings.explicit_config();
        assert_eq!(config.name_servers().len(), 4);
        assert!(config
            .name_servers()
            .iter()
            .all(|ns| ns.socket_addr.port() == 53));
    }

    #[test]
    fn opts_follow_settings() {
        let opts = ResolverSettings::new()
            .timeout(Duration::from_secs(3))
            .attempts(1)
            .resolver_opts();
        assert_eq!(opts.timeout, Duration::from_secs(3));
        assert_eq!(opts.attempts, 1);
        assert_eq!(opts.cache_size, 0);
    }

    #[test]
    fn partial_settings_deserialize() {
        let settings: ResolverSettings =
            serde_json::from_str(r#"{"nameservers":["1.1.1.1"],"timeout_ms":1500}"#).unwrap();
        assert_eq!(settings.nameservers.len(), 1);
        assert_eq!(settings.request_timeout(), Duration::from_millis(1500));
        assert_eq!(settings.port, 53);
        assert_eq!(settings.attempts, 2);
    }

    #[tokio::test]
    async fn resolver_creation() {
        let resolver = HickoryTxtResolver::with_settings(
            &ResolverSettings::new().nameservers([IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))]),
        );
        let cloned = resolver.clone();
        assert!(format!("{cloned:?}").contains("HickoryTxtResolver"));
    }

    #[tokio::test]
    async fn default_resolver_is_shared() {
        let a = default_resolver();
        let b = default_resolver();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
