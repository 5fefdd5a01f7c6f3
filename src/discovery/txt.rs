//! Fallback endpoints from `_xmppconnect` TXT records (XEP-0156 §3.1).

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::backend::{DnsLookup, TxtRecord};
use crate::domain::Domain;
use crate::methods::{Endpoint, Method, Methods};
use crate::source::Source;

use super::Discovery;

static TXT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^_xmpp-client-(xbosh|websocket)=((wss|https)://.+)").expect("valid TXT pattern")
});

/// TXT owner name for a domain.
pub fn txt_name(domain: &Domain) -> String {
    format!("_xmppconnect.{domain}")
}

/// Parse one TXT character-string.
///
/// Matches `_xmpp-client-<method>=<url>` at the start of the entry; the URL
/// runs to the end of the line.
pub fn parse_entry(entry: &str) -> Option<(Method, String)> {
    let caps = TXT_ENTRY.captures(entry)?;
    let method = Method::from_alt_name(caps.get(1)?.as_str())?;
    Some((method, caps.get(2)?.as_str().to_string()))
}

/// Append every matching entry of every record, in order.
pub fn collect(records: &[TxtRecord], mut methods: Methods) -> Methods {
    for entry in records.iter().flat_map(|r| r.entries.iter()) {
        let Ok(text) = std::str::from_utf8(entry) else {
            trace!("Skipping non-UTF-8 TXT entry");
            continue;
        };
        match parse_entry(text) {
            Some((method, url)) => methods.push(method, Endpoint::url(url)),
            None => trace!(entry = text, "TXT entry does not declare a connection method"),
        }
    }
    methods
}

/// The `txt` source.
#[derive(Clone)]
pub struct TxtDiscovery<D> {
    dns: D,
}

impl<D: DnsLookup> TxtDiscovery<D> {
    /// Create the source over a DNS backend.
    pub fn new(dns: D) -> Self {
        Self { dns }
    }
}

impl<D: DnsLookup> Discovery for TxtDiscovery<D> {
    fn source(&self) -> Source {
        Source::Txt
    }

    async fn discover(&self, domain: &Domain, methods: Methods) -> Methods {
        let name = txt_name(domain);
        match self.dns.txt(&name).await {
            Ok(records) => {
                debug!(name = %name, count = records.len(), "TXT lookup");
                collect(&records, methods)
            }
            Err(e) => {
                debug!(name = %name, error = %e, "TXT lookup failed");
                methods
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StaticDns;

    #[test]
    fn parses_declarations() {
        assert_eq!(
            parse_entry("_xmpp-client-websocket=wss://chat.example.com/ws"),
            Some((Method::Websocket, "wss://chat.example.com/ws".to_string()))
        );
        assert_eq!(
            parse_entry("_xmpp-client-xbosh=https://example.com/http-bind"),
            Some((Method::Xbosh, "https://example.com/http-bind".to_string()))
        );
    }

    #[test]
    fn rejects_other_entries() {
        for entry in [
            "v=spf1 include:example.com ~all",
            "_xmpp-client-xbosh=http://example.com/http-bind",
            "_xmpp-client-websocket=ws://example.com/ws",
            "_xmpp-client-websocket=wss://",
            "_xmpp-client-tcp=https://example.com",
            " _xmpp-client-xbosh=https://example.com/http-bind",
            "_XMPP-CLIENT-XBOSH=https://example.com/http-bind",
        ] {
            assert_eq!(parse_entry(entry), None, "{entry:?}");
        }
    }

    #[test]
    fn url_stops_at_newline() {
        assert_eq!(
            parse_entry("_xmpp-client-xbosh=https://a.example/bosh\ntrailing"),
            Some((Method::Xbosh, "https://a.example/bosh".to_string()))
        );
    }

    #[test]
    fn collects_across_records_and_entries() {
        let records = [
            TxtRecord::from_strings([
                "_xmpp-client-websocket=wss://chat.example.com/ws",
                "v=spf1 -all",
            ]),
            TxtRecord {
                entries: vec![vec![0xff, 0xfe], b"_xmpp-client-xbosh=https://example.com/bosh".to_vec()],
            },
            TxtRecord::from_strings(["_xmpp-client-websocket=wss://alt.example.com/ws"]),
        ];
        let methods = collect(&records, Methods::new());

        assert_eq!(
            methods.get(Method::Websocket),
            Some(
                &[
                    Endpoint::url("wss://chat.example.com/ws"),
                    Endpoint::url("wss://alt.example.com/ws"),
                ][..]
            )
        );
        assert_eq!(
            methods.get(Method::Xbosh),
            Some(&[Endpoint::url("https://example.com/bosh")][..])
        );
        assert_eq!(methods.get(Method::Tcp), None);
    }

    #[tokio::test]
    async fn queries_xmppconnect_name() {
        let dns = StaticDns::new().with_txt(
            "_xmppconnect.example.com",
            [TxtRecord::from_strings(["_xmpp-client-xbosh=https://example.com/bosh"])],
        );
        let discovery = TxtDiscovery::new(dns.clone());
        let domain = Domain::parse(Some("example.com")).unwrap();

        let methods = discovery.discover(&domain, Methods::new()).await;
        assert_eq!(methods.len(), 1);
        assert_eq!(dns.queries(), vec!["TXT _xmppconnect.example.com"]);
    }
}
