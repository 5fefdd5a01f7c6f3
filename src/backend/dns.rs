//! DNS backends: hickory for production, a static table for tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::{Name, TokioAsyncResolver};
use tracing::{debug, trace};

use crate::config::Config;
use crate::{Error, Result};

/// A parsed SRV record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    /// Lower is preferred. Carried but not used for ordering.
    pub priority: u16,
    /// Relative weight among equal priorities. Carried but not used.
    pub weight: u16,
    /// Service port.
    pub port: u16,
    /// Target host without the trailing root dot, or `"."` for the root name.
    pub target: String,
}

impl SrvRecord {
    /// Create a record.
    pub fn new(priority: u16, weight: u16, port: u16, target: impl Into<String>) -> Self {
        Self {
            priority,
            weight,
            port,
            target: target.into(),
        }
    }

    /// The "service not available at this domain" marker (RFC 2782).
    pub fn is_unavailable(&self) -> bool {
        self.target == "."
    }
}

/// A TXT record: one or more character-strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxtRecord {
    /// Raw character-strings in wire order.
    pub entries: Vec<Vec<u8>>,
}

impl TxtRecord {
    /// Build a record from text entries.
    pub fn from_strings<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().as_bytes().to_vec())
                .collect(),
        }
    }
}

/// DNS queries needed by the srv and txt sources.
///
/// Records are returned in the order the DNS layer produced them. An empty
/// answer may be reported either as `Ok(vec![])` or as an error.
pub trait DnsLookup: Send + Sync + 'static {
    /// SRV lookup.
    fn srv(&self, name: &str) -> impl Future<Output = Result<Vec<SrvRecord>>> + Send;

    /// TXT lookup.
    fn txt(&self, name: &str) -> impl Future<Output = Result<Vec<TxtRecord>>> + Send;
}

/// DNS lookups through hickory's tokio resolver.
#[derive(Clone)]
pub struct HickoryDns {
    resolver: TokioAsyncResolver,
}

impl HickoryDns {
    /// Build a resolver from the service configuration.
    ///
    /// Answer caching is disabled so every request sees current DNS data.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (resolver_config, mut opts) = if config.system_dns {
            hickory_resolver::system_conf::read_system_conf()?
        } else {
            (ResolverConfig::default(), ResolverOpts::default())
        };
        opts.timeout = config.timeout;
        opts.attempts = config.dns_attempts;
        opts.cache_size = 0;

        debug!(
            system = config.system_dns,
            timeout = ?config.timeout,
            attempts = config.dns_attempts,
            "Building DNS resolver"
        );

        Ok(Self::with_config(resolver_config, opts))
    }

    /// Create a resolver with explicit hickory configuration.
    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

/// Render an SRV target: the root name as `"."`, anything else as ASCII
/// without the trailing root dot.
fn srv_target(name: &Name) -> String {
    if name.is_root() {
        ".".to_string()
    } else {
        name.to_ascii().trim_end_matches('.').to_string()
    }
}

impl DnsLookup for HickoryDns {
    async fn srv(&self, name: &str) -> Result<Vec<SrvRecord>> {
        let lookup = self.resolver.srv_lookup(name).await?;
        let records: Vec<SrvRecord> = lookup
            .iter()
            .map(|srv| {
                SrvRecord::new(srv.priority(), srv.weight(), srv.port(), srv_target(srv.target()))
            })
            .collect();
        trace!(name, count = records.len(), "SRV answer");
        Ok(records)
    }

    async fn txt(&self, name: &str) -> Result<Vec<TxtRecord>> {
        let lookup = self.resolver.txt_lookup(name).await?;
        let records: Vec<TxtRecord> = lookup
            .iter()
            .map(|txt| TxtRecord {
                entries: txt.txt_data().iter().map(|chunk| chunk.to_vec()).collect(),
            })
            .collect();
        trace!(name, count = records.len(), "TXT answer");
        Ok(records)
    }
}

/// In-memory DNS table.
///
/// Names without an entry fail like an NXDOMAIN answer. Every query is
/// recorded and can be inspected with [`queries`](StaticDns::queries);
/// clones share the log.
#[derive(Clone, Default)]
pub struct StaticDns {
    srv: HashMap<String, Vec<SrvRecord>>,
    txt: HashMap<String, Vec<TxtRecord>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticDns {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add SRV records for a name.
    pub fn with_srv<I>(mut self, name: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = SrvRecord>,
    {
        self.srv
            .entry(name.into())
            .or_default()
            .extend(records);
        self
    }

    /// Add TXT records for a name.
    pub fn with_txt<I>(mut self, name: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = TxtRecord>,
    {
        self.txt
            .entry(name.into())
            .or_default()
            .extend(records);
        self
    }

    /// Queried names so far, prefixed with the record type (`SRV name`).
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    fn record(&self, kind: &str, name: &str) {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(format!("{kind} {name}"));
        }
    }
}

impl DnsLookup for StaticDns {
    async fn srv(&self, name: &str) -> Result<Vec<SrvRecord>> {
        self.record("SRV", name);
        self.srv
            .get(name)
            .cloned()
            .ok_or_else(|| Error::lookup(format!("no SRV records for {name}")))
    }

    async fn txt(&self, name: &str) -> Result<Vec<TxtRecord>> {
        self.record("TXT", name);
        self.txt
            .get(name)
            .cloned()
            .ok_or_else(|| Error::lookup(format!("no TXT records for {name}")))
    }
}
