//! Fallback endpoints from the host-meta document (XEP-0156 §3.2, RFC 6415).

use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Document, ParsingOptions};
use tracing::{debug, trace};

use crate::backend::DocumentFetch;
use crate::domain::Domain;
use crate::methods::{Endpoint, Method, Methods};
use crate::source::Source;
use crate::Result;

use super::Discovery;

static LINK_REL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^urn:xmpp:alt-connections:(xbosh|websocket)$").expect("valid rel pattern")
});

static LINK_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(wss|https)://.+").expect("valid href pattern"));

/// Well-known host-meta URL for a domain over `scheme`.
pub fn host_meta_url(scheme: &str, domain: &Domain) -> String {
    format!("{scheme}://{domain}/.well-known/host-meta")
}

/// Extract alternative connection links from a host-meta document.
///
/// Only direct children of the root element named `Link` are considered,
/// whatever their namespace. Links with a missing or non-matching `rel` or
/// `href` are skipped. A document type declaration is accepted. Fails only
/// when the document is not well-formed XML.
pub fn parse_links(document: &str) -> Result<Vec<(Method, String)>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(document, options)?;
    let links = doc
        .root_element()
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "Link")
        .filter_map(|link| {
            let rel = link.attribute("rel")?;
            let Some(caps) = LINK_REL.captures(rel) else {
                trace!(rel, "Skipping link with unrelated rel");
                return None;
            };
            let method = Method::from_alt_name(caps.get(1)?.as_str())?;

            let href = link.attribute("href")?;
            let Some(found) = LINK_HREF.find(href) else {
                trace!(href, "Skipping link with unsupported href");
                return None;
            };
            Some((method, found.as_str().to_string()))
        })
        .collect();
    Ok(links)
}

/// The `host-meta` source.
#[derive(Clone)]
pub struct HostMetaDiscovery<H> {
    fetcher: H,
}

impl<H: DocumentFetch> HostMetaDiscovery<H> {
    /// Create the source over a document fetcher.
    pub fn new(fetcher: H) -> Self {
        Self { fetcher }
    }

    async fn load(&self, scheme: &str, domain: &Domain) -> Result<Vec<(Method, String)>> {
        let url = host_meta_url(scheme, domain);
        let body = self.fetcher.fetch(&url).await?;
        parse_links(&body)
    }
}

impl<H: DocumentFetch> Discovery for HostMetaDiscovery<H> {
    fn source(&self) -> Source {
        Source::HostMeta
    }

    async fn discover(&self, domain: &Domain, mut methods: Methods) -> Methods {
        let links = match self.load("https", domain).await {
            Ok(links) => links,
            Err(e) => {
                debug!(domain = %domain, error = %e, "HTTPS host-meta failed, trying HTTP");
                match self.load("http", domain).await {
                    Ok(links) => links,
                    Err(e) => {
                        debug!(domain = %domain, error = %e, "HTTP host-meta failed");
                        return methods;
                    }
                }
            }
        };

        debug!(domain = %domain, count = links.len(), "host-meta links");
        for (method, href) in links {
            methods.push(method, Endpoint::url(href));
        }
        methods
    }
}
