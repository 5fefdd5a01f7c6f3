//! Orchestrates the three discovery sources for one request.

use tracing::debug;

use crate::backend::{DnsLookup, DocumentFetch, HickoryDns, HttpFetcher};
use crate::config::Config;
use crate::discovery::{Discovery, HostMetaDiscovery, SrvDiscovery, TxtDiscovery};
use crate::domain::Domain;
use crate::methods::Methods;
use crate::source::Sources;
use crate::Result;

/// Resolves the alternative connection methods of a domain.
///
/// Holds only immutable backend handles; every call to
/// [`resolve()`](AltConnectionResolver::resolve) builds and returns its own
/// accumulator, so one resolver can serve concurrent requests.
///
/// ```no_run
/// # async fn example() -> xmpp_alt_connections::Result<()> {
/// use xmpp_alt_connections::{AltConnectionResolver, Config, Sources};
///
/// let resolver = AltConnectionResolver::from_config(&Config::default())?;
/// let methods = resolver.resolve(Some("example.com"), Sources::all()).await;
/// println!("{}", serde_json::to_string(&methods).unwrap());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AltConnectionResolver<D, H> {
    srv: SrvDiscovery<D>,
    txt: TxtDiscovery<D>,
    host_meta: HostMetaDiscovery<H>,
}

impl AltConnectionResolver<HickoryDns, HttpFetcher> {
    /// Build a resolver backed by hickory DNS and reqwest.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dns = HickoryDns::from_config(config)?;
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::new(dns, fetcher))
    }
}

impl<D, H> AltConnectionResolver<D, H>
where
    D: DnsLookup + Clone,
    H: DocumentFetch,
{
    /// Create a resolver over explicit backends.
    pub fn new(dns: D, fetcher: H) -> Self {
        Self {
            srv: SrvDiscovery::new(dns.clone()),
            txt: TxtDiscovery::new(dns),
            host_meta: HostMetaDiscovery::new(fetcher),
        }
    }

    /// Resolve untrusted `domain` input using the selected sources.
    ///
    /// Returns an empty result without touching the network when the domain
    /// is absent or invalid. Sources run one after another in the order
    /// srv, txt, host-meta.
    pub async fn resolve(&self, domain: Option<&str>, sources: Sources) -> Methods {
        let Some(domain) = Domain::parse(domain) else {
            debug!("Rejected missing or invalid domain");
            return Methods::new();
        };
        self.resolve_domain(&domain, sources).await
    }

    /// Resolve an already validated domain.
    pub async fn resolve_domain(&self, domain: &Domain, sources: Sources) -> Methods {
        let mut methods = Methods::new();
        methods = run(&self.srv, domain, sources, methods).await;
        methods = run(&self.txt, domain, sources, methods).await;
        methods = run(&self.host_meta, domain, sources, methods).await;
        debug!(domain = %domain, methods = methods.len(), "Resolved alternative connections");
        methods
    }
}

async fn run<S: Discovery>(source: &S, domain: &Domain, sources: Sources, methods: Methods) -> Methods {
    if sources.contains(source.source()) {
        source.discover(domain, methods).await
    } else {
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SrvRecord, StaticDns, StaticDocuments, TxtRecord};
    use crate::methods::{Endpoint, Method};
    use crate::source::Source;

    fn dns() -> StaticDns {
        StaticDns::new()
            .with_srv(
                "_xmpp-client._tcp.example.com",
                [SrvRecord::new(0, 0, 5222, "xmpp.example.com")],
            )
            .with_txt(
                "_xmppconnect.example.com",
                [TxtRecord::from_strings([
                    "_xmpp-client-websocket=wss://txt.example.com/ws",
                ])],
            )
    }

    fn docs() -> StaticDocuments {
        StaticDocuments::new().with_document(
            "https://example.com/.well-known/host-meta",
            r#"<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0">
<Link rel="urn:xmpp:alt-connections:websocket" href="wss://meta.example.com/ws"/>
</XRD>"#,
        )
    }

    #[tokio::test]
    async fn invalid_domain_skips_every_source() {
        let dns = dns();
        let docs = docs();
        let resolver = AltConnectionResolver::new(dns.clone(), docs.clone());

        for input in [None, Some(""), Some("exa mple.com"), Some("../etc")] {
            assert!(resolver.resolve(input, Sources::all()).await.is_empty());
        }
        assert!(dns.queries().is_empty());
        assert!(docs.fetched().is_empty());
    }

    #[tokio::test]
    async fn merges_sources_in_order() {
        let resolver = AltConnectionResolver::new(dns(), docs());
        let methods = resolver.resolve(Some("example.com"), Sources::all()).await;

        assert_eq!(
            methods.get(Method::Tcp),
            Some(&[Endpoint::host("xmpp.example.com", 5222)][..])
        );
        assert_eq!(
            methods.get(Method::Websocket),
            Some(
                &[
                    Endpoint::url("wss://txt.example.com/ws"),
                    Endpoint::url("wss://meta.example.com/ws"),
                ][..]
            )
        );
    }

    #[tokio::test]
    async fn only_selected_sources_run() {
        let dns = dns();
        let docs = docs();
        let resolver = AltConnectionResolver::new(dns.clone(), docs.clone());

        let methods = resolver
            .resolve(Some("example.com"), Sources::none().with(Source::Txt))
            .await;

        assert_eq!(methods.get(Method::Tcp), None);
        assert_eq!(methods.len(), 1);
        assert_eq!(dns.queries(), vec!["TXT _xmppconnect.example.com"]);
        assert!(docs.fetched().is_empty());
    }

    #[tokio::test]
    async fn nothing_published_is_empty() {
        let resolver = AltConnectionResolver::new(StaticDns::new(), StaticDocuments::new());
        let methods = resolver.resolve(Some("quiet.example"), Sources::all()).await;
        assert!(methods.is_empty());
    }
}
