//! Direct TCP endpoints from `_xmpp-client._tcp` SRV records (RFC 6120 §3.2.1).

use tracing::debug;

use crate::backend::{DnsLookup, SrvRecord};
use crate::domain::Domain;
use crate::methods::{Endpoint, Method, Methods};
use crate::source::Source;

use super::Discovery;

/// SRV owner name for a domain.
pub fn srv_name(domain: &Domain) -> String {
    format!("_xmpp-client._tcp.{domain}")
}

/// Append `tcp` endpoints in answer order, stopping at the first `.` target.
///
/// Priority and weight are not applied.
pub fn collect(records: &[SrvRecord], mut methods: Methods) -> Methods {
    for record in records {
        if record.is_unavailable() {
            break;
        }
        methods.push(Method::Tcp, Endpoint::host(record.target.clone(), record.port));
    }
    methods
}

/// The `srv` source.
#[derive(Clone)]
pub struct SrvDiscovery<D> {
    dns: D,
}

impl<D: DnsLookup> SrvDiscovery<D> {
    /// Create the source over a DNS backend.
    pub fn new(dns: D) -> Self {
        Self { dns }
    }
}

impl<D: DnsLookup> Discovery for SrvDiscovery<D> {
    fn source(&self) -> Source {
        Source::Srv
    }

    async fn discover(&self, domain: &Domain, methods: Methods) -> Methods {
        let name = srv_name(domain);
        match self.dns.srv(&name).await {
            Ok(records) => {
                debug!(name = %name, count = records.len(), "SRV lookup");
                collect(&records, methods)
            }
            Err(e) => {
                debug!(name = %name, error = %e, "SRV lookup failed");
                methods
            }
        }
    }
}
